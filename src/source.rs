//! Document source selection
//!
//! Turns the three form inputs (upload, URL, test-folder pick) into a single
//! [`Locator`] plus a label for the status panel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::{Locator, SelectionError};

const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];
const URL_LABEL_CHARS: usize = 50;

/// Which input the user chose on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Upload,
    Url,
    Repo,
}

impl SourceMode {
    pub const ALL: [SourceMode; 3] = [SourceMode::Upload, SourceMode::Url, SourceMode::Repo];

    /// Form value of this mode
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Upload => "upload",
            SourceMode::Url => "url",
            SourceMode::Repo => "repo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceMode::Upload => "Upload a local file",
            SourceMode::Url => "URL (e.g. GitHub)",
            SourceMode::Repo => "Test folder (data/test_docs/)",
        }
    }

    /// Which input widget is shown while this mode is selected.
    pub fn visibility(self) -> InputVisibility {
        InputVisibility {
            upload: self == SourceMode::Upload,
            url: self == SourceMode::Url,
            repo_doc: self == SourceMode::Repo,
        }
    }

    /// Visibility for every mode, keyed by form value.
    pub fn visibility_table() -> BTreeMap<&'static str, InputVisibility> {
        Self::ALL
            .into_iter()
            .map(|mode| (mode.as_str(), mode.visibility()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputVisibility {
    pub upload: bool,
    pub url: bool,
    pub repo_doc: bool,
}

/// A file received from the browser, already spooled to disk.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub file: NamedTempFile,
}

/// Raw form inputs for one analyze click.
#[derive(Debug, Default)]
pub struct AnalysisRequest {
    pub mode: Option<SourceMode>,
    pub upload: Option<UploadedFile>,
    pub url: Option<String>,
    pub repo_doc: Option<String>,
}

/// The one input that matches the selected mode.
#[derive(Debug)]
pub enum DocumentSource {
    Upload(UploadedFile),
    Url(String),
    RepoDoc(String),
}

impl AnalysisRequest {
    pub fn into_source(self) -> Result<DocumentSource, SelectionError> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let source = match self.mode {
            Some(SourceMode::Upload) => self.upload.map(DocumentSource::Upload),
            Some(SourceMode::Url) => non_blank(self.url).map(DocumentSource::Url),
            Some(SourceMode::Repo) => non_blank(self.repo_doc).map(DocumentSource::RepoDoc),
            None => None,
        };

        source.ok_or(SelectionError::NoDocument)
    }
}

/// A source turned into something the analyzer can consume.
///
/// Holds the spooled upload, if any, so the temp file outlives the analysis.
#[derive(Debug)]
pub struct ResolvedSource {
    pub locator: Locator,
    pub label: String,
    _upload: Option<NamedTempFile>,
}

pub fn resolve(source: DocumentSource, config: &Config) -> Result<ResolvedSource, SelectionError> {
    let resolved = match source {
        DocumentSource::Upload(upload) => ResolvedSource {
            locator: Locator::Path(upload.file.path().to_path_buf()),
            label: format!("Local file: {}", upload.filename),
            _upload: Some(upload.file),
        },
        DocumentSource::Url(raw) => {
            let url = raw.trim();
            match url::Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => return Err(SelectionError::InvalidUrl(url.to_string())),
            }
            ResolvedSource {
                locator: Locator::Url(url.to_string()),
                label: format!("URL: {}", shorten(url, URL_LABEL_CHARS)),
                _upload: None,
            }
        }
        DocumentSource::RepoDoc(name) => {
            let name = name.trim();
            if !is_plain_file_name(name) {
                return Err(SelectionError::InvalidDocumentName(name.to_string()));
            }
            ResolvedSource {
                locator: Locator::Path(config.analysis.documents_dir.join(name)),
                label: format!("Test folder: {}", name),
                _upload: None,
            }
        }
    };

    debug!(locator = %resolved.locator, label = %resolved.label, "Resolved document source");
    Ok(resolved)
}

/// List `.pdf` and `.docx` files directly inside `dir`, sorted by name.
///
/// A missing or unreadable directory yields an empty list.
pub fn list_repo_documents(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Documents directory not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_supported_extension(path))
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();

    names.sort();
    names
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn is_plain_file_name(name: &str) -> bool {
    let path = PathBuf::from(name);
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

fn shorten(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(docs_dir: &Path) -> Config {
        let dir = docs_dir.to_string_lossy().into_owned();
        Config::from_lookup(
            |key| (key == "REPO_DOCS_DIR").then(|| dir.clone()),
            Path::new("/unused"),
        )
        .unwrap()
    }

    #[test]
    fn test_listing_is_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.docx", "c.pdf", "notes.txt", "scan.PDF"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.pdf"), b"x").unwrap();

        assert_eq!(list_repo_documents(dir.path()), vec!["a.docx", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_listing_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_repo_documents(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_visibility_shows_exactly_one_input() {
        for mode in SourceMode::ALL {
            let v = mode.visibility();
            assert_eq!([v.upload, v.url, v.repo_doc].iter().filter(|b| **b).count(), 1);
        }
        assert!(SourceMode::Url.visibility().url);
        assert!(SourceMode::Repo.visibility().repo_doc);
        assert_eq!(SourceMode::visibility_table().len(), 3);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(SourceMode::parse("upload"), Some(SourceMode::Upload));
        assert_eq!(SourceMode::parse(" repo "), Some(SourceMode::Repo));
        assert_eq!(SourceMode::parse("ftp"), None);
    }

    #[test]
    fn test_missing_input_for_mode_is_no_document() {
        let upload_without_file = AnalysisRequest {
            mode: Some(SourceMode::Upload),
            url: Some("https://example.com/a.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(upload_without_file.into_source().unwrap_err(), SelectionError::NoDocument);

        let blank_url = AnalysisRequest {
            mode: Some(SourceMode::Url),
            url: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank_url.into_source().unwrap_err(), SelectionError::NoDocument);

        let no_mode = AnalysisRequest {
            repo_doc: Some("a.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(no_mode.into_source().unwrap_err(), SelectionError::NoDocument);
    }

    #[test]
    fn test_mode_selects_matching_input() {
        let request = AnalysisRequest {
            mode: Some(SourceMode::Repo),
            url: Some("https://example.com/ignored.pdf".to_string()),
            repo_doc: Some("report.pdf".to_string()),
            ..Default::default()
        };
        match request.into_source().unwrap() {
            DocumentSource::RepoDoc(name) => assert_eq!(name, "report.pdf"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_repo_doc() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        let resolved = resolve(DocumentSource::RepoDoc("report.pdf".to_string()), &config).unwrap();
        assert_eq!(resolved.locator, Locator::Path(dir.path().join("report.pdf")));
        assert_eq!(resolved.label, "Test folder: report.pdf");

        for bad in ["../secret.pdf", "sub/report.pdf", "/etc/passwd"] {
            let err = resolve(DocumentSource::RepoDoc(bad.to_string()), &config).unwrap_err();
            assert_eq!(err, SelectionError::InvalidDocumentName(bad.to_string()));
        }
    }

    #[test]
    fn test_resolve_url() {
        let config = test_config(Path::new("/docs"));

        let resolved = resolve(
            DocumentSource::Url(" https://example.com/a.pdf ".to_string()),
            &config,
        )
        .unwrap();
        assert_eq!(resolved.locator, Locator::Url("https://example.com/a.pdf".to_string()));
        assert_eq!(resolved.label, "URL: https://example.com/a.pdf");

        let long = format!("https://example.com/{}.pdf", "x".repeat(80));
        let resolved = resolve(DocumentSource::Url(long.clone()), &config).unwrap();
        assert_eq!(resolved.label, format!("URL: {}...", &long[..50]));

        let err = resolve(DocumentSource::Url("file:///etc/passwd".to_string()), &config).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidUrl(_)));
    }

    #[test]
    fn test_resolve_upload_keeps_file_alive() {
        let config = test_config(Path::new("/docs"));
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let path = file.path().to_path_buf();

        let resolved = resolve(
            DocumentSource::Upload(UploadedFile {
                filename: "contract.pdf".to_string(),
                file,
            }),
            &config,
        )
        .unwrap();
        assert_eq!(resolved.label, "Local file: contract.pdf");
        assert_eq!(resolved.locator, Locator::Path(path.clone()));
        assert!(path.exists());

        drop(resolved);
        assert!(!path.exists());
    }
}
