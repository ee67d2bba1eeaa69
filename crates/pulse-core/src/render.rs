//! Result rendering.
//!
//! A persona's combined result is free text whose shape is decided by the
//! analysis process, not by us. Rendering tries, in order: a structured
//! JSON interpretation, a markdown conversion, and finally plain text with
//! newlines turned into line breaks. The renderer is a pure function and
//! re-runs in full on every call.

use pulldown_cmark::{html, Parser};
use serde_json::Value;

use crate::run::AnalysisResults;

/// Renders one combined result to an HTML fragment.
pub fn render_markup(content: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return render_json(&value);
    }
    if looks_like_markdown(content) {
        let mut out = String::new();
        html::push_html(&mut out, Parser::new(content));
        return out;
    }
    // Plain text: escape, then keep the author's line structure.
    escape(content).replace('\n', "<br/>")
}

fn render_json(value: &Value) -> String {
    match value {
        // One block per array element.
        Value::Array(items) => {
            let mut out = String::new();
            for item in items {
                out.push_str("<div class=\"result-item\">");
                match item {
                    Value::Object(fields) => {
                        for (key, field) in fields {
                            push_property(&mut out, key, field);
                        }
                    }
                    other => out.push_str(&escape(&scalar_text(other))),
                }
                out.push_str("</div>");
            }
            out
        }
        // One line per object key.
        Value::Object(fields) => {
            let mut out = String::new();
            for (key, field) in fields {
                push_property(&mut out, key, field);
            }
            out
        }
        other => escape(&scalar_text(other)),
    }
}

fn push_property(out: &mut String, key: &str, value: &Value) {
    out.push_str("<p><strong>");
    out.push_str(&escape(key));
    out.push_str(":</strong> ");
    out.push_str(&escape(&scalar_text(value)));
    out.push_str("</p>");
}

/// Display form of a leaf value: strings unquoted, everything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Cheap check for markdown constructs, used to pick conversion over the
/// plain-text fallback for strings that carry no markup at all.
fn looks_like_markdown(content: &str) -> bool {
    let line_marker = content.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with('#')
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
            || trimmed.starts_with("> ")
            || trimmed.starts_with("```")
            || trimmed
                .split_once(". ")
                .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    });
    line_marker || content.contains("**") || content.contains("](")
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Rendered analysis/QnA fragments for one persona.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RenderedPersona {
    pub name: String,
    pub description: String,
    /// `None` when the persona has no combined analysis result yet.
    pub analysis_html: Option<String>,
    /// `None` when the persona has no combined QnA result yet.
    pub qna_html: Option<String>,
}

/// Renders every persona of a run result.
pub fn render_results(results: &AnalysisResults) -> Vec<RenderedPersona> {
    results
        .personas
        .iter()
        .map(|persona| RenderedPersona {
            name: persona.name.clone(),
            description: persona.description.clone(),
            analysis_html: render_section(&persona.analysis.combined_result),
            qna_html: render_section(&persona.qna.combined_result),
        })
        .collect()
}

fn render_section(combined_result: &str) -> Option<String> {
    if combined_result.is_empty() {
        None
    } else {
        Some(render_markup(combined_result))
    }
}
