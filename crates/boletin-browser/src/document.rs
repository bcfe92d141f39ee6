//! Read-only capture of a settled page.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Rendered document as seen at one instant.
///
/// Holds plain strings only, so it can cross await points; parsing into a
/// DOM happens synchronously wherever the snapshot is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// URL of the document after redirects
    pub url: String,
    /// Serialized DOM
    pub html: String,
    /// Visible text of `<body>`
    pub body_text: String,
}

impl DocumentSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            body_text: body_text.into(),
        }
    }

    /// Snapshot whose body text is derived from the markup.
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let body_text = visible_text(&html);
        Self {
            url: url.into(),
            html,
            body_text,
        }
    }
}

/// Text of `<body>`, one line per text node, script and style content excluded.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut lines = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}
