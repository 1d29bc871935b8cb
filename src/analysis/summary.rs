//! Summary prompt and reply parsing
//!
//! The model is asked for a JSON object `{"summary": ..., "key_points": [...]}`.
//! Replies that are not JSON are read as plain text: bullet or numbered lines
//! become key points and everything else forms the summary. Whatever part
//! cannot be found is left empty.

use serde_json::{Map, Value};

pub const SYSTEM_INSTRUCTION: &str = "You are an assistant that analyzes business and technical documents. \
Answer in the language of the document. Reply with a single JSON object and nothing else.";

const DOCUMENT_OPEN: &str = "<document>";
const DOCUMENT_CLOSE: &str = "</document>";

/// Summary and key points pulled out of a model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryParts {
    pub summary: String,
    pub key_points: Vec<String>,
}

const KEY_POINTS_FIELDS: [&str; 3] = ["key_points", "keyPoints", "key points"];

pub fn build_prompt(excerpt: &str) -> String {
    format!(
        r#"Analyze the document below.

Return a JSON object with exactly these fields:
- "summary": a concise summary of the document in 3-5 sentences
- "key_points": an array of 3-7 short strings with the most important points

{open}
{excerpt}
{close}"#,
        open = DOCUMENT_OPEN,
        close = DOCUMENT_CLOSE,
        excerpt = excerpt,
    )
}

/// Return at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

pub fn parse_summary_response(content: &str) -> SummaryParts {
    let body = strip_code_fence(content.trim());

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => parse_json_fields(&fields),
        _ => parse_plain_text(body),
    }
}

// Each field is read on its own; a field of the wrong type counts as missing.
fn parse_json_fields(fields: &Map<String, Value>) -> SummaryParts {
    let summary = match fields.get("summary") {
        Some(Value::String(text)) => text.trim().to_string(),
        _ => String::new(),
    };

    let key_points = match KEY_POINTS_FIELDS.iter().find_map(|name| fields.get(*name)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|point| !point.is_empty())
            .collect(),
        Some(Value::String(text)) => text
            .lines()
            .map(str::trim)
            .map(|line| strip_bullet(line).unwrap_or(line))
            .filter(|point| !point.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    SummaryParts { summary, key_points }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string ("json") on the opening fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_plain_text(text: &str) -> SummaryParts {
    let mut summary_lines = Vec::new();
    let mut key_points = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_section_heading(line) {
            continue;
        }
        match strip_bullet(line) {
            Some(point) if !point.is_empty() => key_points.push(point.to_string()),
            Some(_) => {}
            None => summary_lines.push(line),
        }
    }

    SummaryParts {
        summary: summary_lines.join("\n"),
        key_points,
    }
}

fn is_section_heading(line: &str) -> bool {
    let heading = line.trim_start_matches('#').trim().trim_matches('*').trim();
    let Some(title) = heading.strip_suffix(':').or(line.starts_with('#').then_some(heading)) else {
        return false;
    };
    let title = title.to_lowercase();
    title == "summary" || title == "key points" || title == "key takeaways"
}

fn strip_bullet(line: &str) -> Option<&str> {
    if matches!(line, "-" | "*" | "•" | "–") {
        return Some("");
    }
    for marker in ["- ", "* ", "• ", "– "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }

    // "1." or "1)"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.starts_with(' ') {
                return Some(rest.trim());
            }
        }
    }

    None
}
