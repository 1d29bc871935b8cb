use axum::{response::Html, routing::get, Router};

use crate::source::SourceMode;

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<String> {
    Html(render_index())
}

/// Render the form. Input visibility per mode comes from [`SourceMode::visibility`].
pub fn render_index() -> String {
    let visibility = serde_json::to_string(&SourceMode::visibility_table()).unwrap_or_else(|_| "{}".to_string());

    let mode_options: String = SourceMode::ALL
        .iter()
        .map(|mode| {
            format!(
                r#"<label class="choice"><input type="radio" name="mode" value="{value}"{checked} /> {label}</label>"#,
                value = mode.as_str(),
                label = mode.label(),
                checked = if *mode == SourceMode::Upload { " checked" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ");

    INDEX_TEMPLATE
        .replace("__MODE_OPTIONS__", &mode_options)
        .replace("__VISIBILITY__", &visibility)
}

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>AI Document Insight Assistant</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .columns { display: flex; gap: 1.5rem; flex-wrap: wrap; }
    .column { flex: 1 1 420px; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    .choice { display: block; margin: 0.25rem 0; font-weight: normal; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input[type=text], select, textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    textarea { min-height: 8rem; background: #f6f8fa; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; font-size: 1rem; }
    [hidden] { display: none !important; }
  </style>
</head>
<body>
  <h1>AI Document Insight Assistant</h1>
  <p>Automatic analysis of PDF and DOCX documents with Azure AI Document Intelligence and Azure OpenAI.</p>

  <div class="columns">
    <div class="column">
      <div class="card">
        <label>Document source</label>
      __MODE_OPTIONS__

        <div id="uploadInput">
          <label for="fileInput">Upload a document (PDF/DOCX)</label>
          <input id="fileInput" type="file" accept=".pdf,.docx" />
        </div>
        <div id="urlInput">
          <label for="urlField">Document URL</label>
          <input id="urlField" type="text" placeholder="https://example.com/document.pdf" />
        </div>
        <div id="repoInput">
          <label for="repoDoc">Document from the test folder</label>
          <select id="repoDoc"></select>
        </div>

        <button id="analyzeBtn">Analyze document</button>
      </div>

      <div class="card">
        <label for="status">Status</label>
        <textarea id="status" readonly></textarea>
      </div>
    </div>

    <div class="column">
      <div class="card">
        <label for="summary">Summary</label>
        <textarea id="summary" readonly></textarea>
        <label for="keyPoints">Key points</label>
        <textarea id="keyPoints" readonly></textarea>
      </div>
    </div>
  </div>

  <script>
    const visibility = __VISIBILITY__;
    const inputs = {
      upload: document.getElementById('uploadInput'),
      url: document.getElementById('urlInput'),
      repo_doc: document.getElementById('repoInput'),
    };
    const analyzeBtn = document.getElementById('analyzeBtn');

    function currentMode() {
      const checked = document.querySelector('input[name=mode]:checked');
      return checked ? checked.value : '';
    }

    function applyVisibility() {
      const shown = visibility[currentMode()] || {};
      for (const [key, element] of Object.entries(inputs)) {
        element.hidden = !shown[key];
      }
    }

    async function loadDocuments() {
      const select = document.getElementById('repoDoc');
      const res = await fetch('/api/documents');
      const json = await res.json();
      select.replaceChildren();
      for (const name of json.documents) {
        const option = document.createElement('option');
        option.value = name;
        option.textContent = name;
        select.appendChild(option);
      }
    }

    document.querySelectorAll('input[name=mode]').forEach((radio) => {
      radio.addEventListener('change', applyVisibility);
    });

    analyzeBtn.addEventListener('click', async () => {
      const formData = new FormData();
      formData.append('mode', currentMode());
      const fileInput = document.getElementById('fileInput');
      if (fileInput.files.length) {
        formData.append('file', fileInput.files[0]);
      }
      formData.append('url', document.getElementById('urlField').value);
      formData.append('repo_doc', document.getElementById('repoDoc').value);

      analyzeBtn.disabled = true;
      document.getElementById('status').value = 'Analyzing... this usually takes 10-20 seconds.';
      try {
        const res = await fetch('/api/analyze', { method: 'POST', body: formData });
        const json = await res.json();
        document.getElementById('summary').value = json.summary;
        document.getElementById('keyPoints').value = json.key_points;
        document.getElementById('status').value = json.status;
      } catch (err) {
        document.getElementById('status').value = 'Error: ' + err;
      } finally {
        analyzeBtn.disabled = false;
      }
    });

    applyVisibility();
    loadDocuments();
  </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_lists_three_modes() {
        let html = render_index();
        assert_eq!(html.matches(r#"name="mode""#).count(), 3);
        assert!(html.contains(r#"value="upload" checked"#));
        assert!(!html.contains("__VISIBILITY__"));
        assert!(!html.contains("__MODE_OPTIONS__"));
    }

    #[test]
    fn test_index_embeds_visibility_table() {
        let html = render_index();
        assert!(html.contains(r#""url":{"upload":false,"url":true,"repo_doc":false}"#));
    }
}
