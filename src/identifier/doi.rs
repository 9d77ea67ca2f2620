use std::fmt;

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use url::Url;

use crate::identifier::Identifier;

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// Case-insensitive, based on Crossref guidance. The suffix runs until a character outside
// the class, so a query string, fragment or whitespace ends it.
static DOI_ANYWHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(10\.\d{4,9})/([-._;()/:A-Z0-9]+)").unwrap());

/// A DOI found somewhere in the input, split into registrant prefix and suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doi<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> Identifier<'a> for Doi<'a> {
    fn parse(identifier: &'a str) -> Option<Self> {
        DOI_ANYWHERE_RE.captures_iter(identifier).find_map(|caps| {
            let suffix = trim_suffix(caps.get(2)?.as_str());
            (!suffix.is_empty()).then(|| Doi {
                prefix: caps.get(1).map_or("", |m| m.as_str()),
                suffix,
            })
        })
    }
}

/// Drop trailing punctuation that belongs to the surrounding prose. A closing parenthesis
/// is kept when it closes one opened inside the suffix.
fn trim_suffix(mut s: &str) -> &str {
    while let Some(last) = s.chars().next_back() {
        let drop = match last {
            '.' | ',' | ';' | ':' | '/' => true,
            ')' => s.matches('(').count() < s.matches(')').count(),
            _ => false,
        };
        if !drop {
            break;
        }
        s = &s[..s.len() - 1];
    }
    s
}

impl<'a> Doi<'a> {
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn suffix(&self) -> &'a str {
        self.suffix
    }

    /// The doi.org resolver URL, with the suffix percent-encoded.
    pub fn to_url(&self) -> Url {
        let enc_suffix = utf8_percent_encode(self.suffix, PATH_SEGMENT_ENCODE_SET).to_string();
        Url::parse(format!("https://doi.org/{}/{}", self.prefix, enc_suffix).as_str()).unwrap()
    }
}

impl fmt::Display for Doi<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.suffix)
    }
}
