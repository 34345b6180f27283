//! Fragment scanning — the little structure we read out of opaque payloads.
//!
//! A node placeholder is any element whose `class` attribute carries the
//! `js-load-node` marker and which has a `data-id` attribute:
//!
//! ```text
//! <div class="closable hidden js-load-node event" data-id="140234">
//!   <span class="head">CAkEvent 140234</span>
//! </div>
//! ```
//!
//! The remaining class tokens are the node's kind tags. Everything else in
//! the payload is left alone.

use std::sync::LazyLock;

use regex::Regex;

/// Class marker identifying a node placeholder.
pub const NODE_MARKER: &str = "js-load-node";

/// Class tokens that are presentation markers, not kinds.
const NON_KIND_CLASSES: &[&str] = &[NODE_MARKER, "hidden", "closable"];

/// A node placeholder found in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: String,
    pub kinds: Vec<String>,
    pub label: String,
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z][a-zA-Z0-9-]*(\s[^>]*)?>").expect("static regex"));

// Anchored on whitespace: `data-class=` and `x-data-id=` must not match.
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static regex")
});

static DATA_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sdata-id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static regex")
});

static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[^>]*\sclass\s*=\s*["'](?:[^"']*\s)?head(?:\s[^"']*)?["'][^>]*>([^<]*)"#)
        .expect("static regex")
});

static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:div|p|li|tr|pre|ul|ol|table|h[1-6])>").expect("static regex")
});

/// First capture group that matched (double- or single-quoted value).
fn attr_value(re: &Regex, attrs: &str) -> Option<String> {
    let caps = re.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Find every node placeholder in `html`, in document order.
pub fn scan_placeholders(html: &str) -> Vec<Placeholder> {
    // (start, end-of-open-tag, id, kinds)
    let mut found: Vec<(usize, usize, String, Vec<String>)> = Vec::new();

    for m in TAG_RE.find_iter(html) {
        let tag = m.as_str();
        let Some(classes) = attr_value(&CLASS_RE, tag) else {
            continue;
        };
        let tokens: Vec<&str> = classes.split_whitespace().collect();
        if !tokens.contains(&NODE_MARKER) {
            continue;
        }
        let Some(id) = attr_value(&DATA_ID_RE, tag) else {
            continue;
        };
        let kinds = tokens
            .iter()
            .filter(|t| !NON_KIND_CLASSES.contains(t))
            .map(|t| t.to_string())
            .collect();
        found.push((m.start(), m.end(), id, kinds));
    }

    let mut placeholders = Vec::with_capacity(found.len());
    for (i, (_, open_end, id, kinds)) in found.iter().enumerate() {
        let section_end = found.get(i + 1).map_or(html.len(), |next| next.0);
        let section = &html[*open_end..section_end];
        let label = HEAD_RE
            .captures(section)
            .and_then(|c| c.get(1))
            .map(|m| decode_entities(m.as_str().trim()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match kinds.first() {
                Some(kind) => format!("{kind} {id}"),
                None => id.clone(),
            });
        placeholders.push(Placeholder {
            id: id.clone(),
            kinds: kinds.clone(),
            label,
        });
    }
    placeholders
}

/// Flatten a fragment into plain text for terminal display.
pub fn to_text(html: &str) -> String {
    let broken = LINE_BREAK_RE.replace_all(html, "\n");
    let stripped = ANY_TAG_RE.replace_all(&broken, "");
    let decoded = decode_entities(&stripped);

    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in decoded.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 || lines.is_empty() {
                continue;
            }
            lines.push("");
        } else {
            blank_run = 0;
            lines.push(line);
        }
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.join("\n")
}

/// Decode the handful of entities the backend templates emit.
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
