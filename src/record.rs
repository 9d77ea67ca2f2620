use std::fmt;
use std::ops::Range;

use biblatex::RawBibliography;
use once_cell::sync::Lazy;
use regex::Regex;

/// One `name = value` line of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Whitespace the field line starts with.
    pub indent: String,
    pub name: String,
    /// Raw value text with its delimiters (`{…}`, `"…"`, or a bare token such as `2020`).
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            indent: "\t".to_string(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// The value as plain text: braces and surrounding quotes dropped, whitespace collapsed.
    pub fn text(&self) -> String {
        let v = self.value.trim();
        let v = v
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(v);
        let unbraced: String = v.chars().filter(|c| !matches!(c, '{' | '}')).collect();
        unbraced
            .trim_end_matches(',')
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A bibtex record held as an ordered field list.
///
/// Parsed once from whatever text a lookup returned, and rendered back to text only when it
/// is appended to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Entry type without the `@`, e.g. `article`.
    pub kind: String,
    pub key: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no record marker `@` found")]
    NoMarker,
    #[error("failed to parse bibtex: {0}")]
    Syntax(String),
}

// A record starts at an `@` that opens a line, so addresses in leading noise are skipped.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*@").unwrap());

impl Record {
    /// Parse the first record found in `src`.
    ///
    /// Anything before the first line starting with `@` is ignored, as are further records.
    /// Values keep their source text, delimiters included, so a record renders back the way
    /// it arrived.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let start = MARKER_RE.find(src).ok_or(ParseError::NoMarker)?.end() - 1;
        let src = &src[start..];
        let bib = RawBibliography::parse(src).map_err(|e| ParseError::Syntax(e.to_string()))?;
        let entry = &bib.entries.first().ok_or(ParseError::NoMarker)?.v;

        let fields = entry
            .fields
            .iter()
            .map(|pair| Field {
                indent: indent_before(src, pair.key.span.start),
                name: pair.key.v.to_string(),
                value: value_text(src, pair.value.span.clone()),
            })
            .collect();

        Ok(Record {
            kind: entry.kind.v.to_string(),
            key: entry.key.v.to_string(),
            fields,
        })
    }

    /// First field called exactly `name`.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Plain-text value of the first field called `name`, if present and non-empty.
    pub fn value(&self, name: &str) -> Option<String> {
        self.get(name).map(Field::text).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@{}{{{},", self.kind, self.key)?;
        let last = self.fields.len().saturating_sub(1);
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i < last { "," } else { "" };
            writeln!(f, "{}{} = {}{}", field.indent, field.name, field.value, sep)?;
        }
        writeln!(f, "}}")
    }
}

/// Whitespace between the previous token and the field name at `pos`.
fn indent_before(src: &str, pos: usize) -> String {
    let line = &src[src[..pos].rfind('\n').map_or(0, |i| i + 1)..pos];
    line[line.trim_end().len()..].to_string()
}

/// Source text of a value. The span may or may not cover the outer `{}` or `""`; adjacent
/// delimiters are pulled in so the raw value always carries them.
fn value_text(src: &str, span: Range<usize>) -> String {
    let (mut start, mut end) = (span.start, span.end);
    let before = src[..start].chars().next_back();
    let after = src[end..].chars().next();
    match (before, after) {
        (Some('{'), Some('}')) | (Some('"'), Some('"')) => {
            start -= 1;
            end += 1;
        }
        _ => {}
    }
    let text = src[start..end].trim().trim_end_matches(',').trim_end();
    if text.is_empty() {
        "{}".to_string()
    } else {
        text.to_string()
    }
}
