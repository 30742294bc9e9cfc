//! Header Rendering - Directive Block Synthesis
//!
//! Declared order is output order. Every name and value is sanitized so
//! an embedded line terminator can never split a directive line into two.

use std::fmt;

use crate::digest::sha256_hex;
use crate::metadata::{DirectiveValue, MetadataConfig};

pub const BLOCK_OPEN: &str = "// ==UserScript==";
pub const BLOCK_CLOSE: &str = "// ==/UserScript==";
pub const DIRECTIVE_PREFIX: &str = "// @";

pub const GRANT_KEY: &str = "grant";
/// Sentinel grant: emitted verbatim, no namespace prefix.
pub const UNSAFE_WINDOW: &str = "unsafeWindow";
pub const MODERN_GRANT_PREFIX: &str = "GM.";
pub const LEGACY_GRANT_PREFIX: &str = "GM_";

/// Trim, then delete every newline, carriage return, and tab. Interior
/// occurrences are deleted outright, not replaced by spaces.
pub fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// One rendered `// @name value` line. Name and value are sanitized
/// independently; an empty value leaves a trailing space.
pub fn directive_line(name: &str, value: &str) -> String {
    format!("{}{} {}", DIRECTIVE_PREFIX, sanitize(name), sanitize(value))
}

/// The rendered directive block: an ordered line sequence wrapped by the
/// opening and closing delimiters, terminated by one blank separator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    lines: Vec<String>,
}

impl HeaderBlock {
    /// The directive lines, without delimiters.
    pub fn directive_lines(&self) -> &[String] {
        &self.lines
    }

    /// The full block text. Ends with the closing delimiter's newline plus
    /// exactly one blank line, so concatenation with artifact content needs
    /// no further separator handling.
    pub fn to_text(&self) -> String {
        let mut out = String::from(BLOCK_OPEN);
        for line in &self.lines {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(BLOCK_CLOSE);
        out.push_str("\n\n");
        out
    }

    /// Header text followed by the content, content bytes untouched.
    pub fn prepend_to(&self, content: &str) -> String {
        let mut out = self.to_text();
        out.push_str(content);
        out
    }

    /// SHA-256 of the rendered text. Stable identity for a configuration.
    pub fn fingerprint(&self) -> String {
        sha256_hex(self.to_text().as_bytes())
    }
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Render the directive block for a configuration.
///
/// Deterministic: iteration follows the configuration's declaration order,
/// and list elements keep their source order. Falsy values (empty string,
/// `false`, empty list) emit nothing.
pub fn render(config: &MetadataConfig) -> HeaderBlock {
    let mut lines = Vec::new();

    for (key, value) in config.directives() {
        match value {
            DirectiveValue::Text(s) => {
                if s.is_empty() {
                    continue;
                }
                lines.push(directive_line(key, s));
            }
            DirectiveValue::Flag(false) => {}
            DirectiveValue::Flag(true) => {
                lines.push(directive_line(key, ""));
            }
            DirectiveValue::List(items) => {
                if key == GRANT_KEY {
                    push_grant_lines(&mut lines, items, config.gm3_compat());
                } else {
                    for item in items {
                        lines.push(directive_line(key, item));
                    }
                }
            }
        }
    }

    HeaderBlock { lines }
}

/// Grant directives carry the namespace shim: the sentinel passes through
/// untouched, everything else gets the `GM.` prefix, and compat mode adds
/// the legacy `GM_` form immediately after its modern counterpart.
fn push_grant_lines(lines: &mut Vec<String>, items: &[String], gm3_compat: bool) {
    for item in items {
        if item == UNSAFE_WINDOW {
            lines.push(directive_line(GRANT_KEY, UNSAFE_WINDOW));
        } else {
            lines.push(directive_line(
                GRANT_KEY,
                &format!("{}{}", MODERN_GRANT_PREFIX, item),
            ));
            if gm3_compat {
                lines.push(directive_line(
                    GRANT_KEY,
                    &format!("{}{}", LEGACY_GRANT_PREFIX, item),
                ));
            }
        }
    }
}
