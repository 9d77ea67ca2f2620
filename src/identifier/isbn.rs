use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::identifier::Identifier;

static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9-]{9,}$").unwrap());

/// Input that is nothing but digits and hyphens, at least nine of them.
///
/// No checksum validation; the lookup service decides whether the number exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Isbn<'a>(&'a str);

impl<'a> Identifier<'a> for Isbn<'a> {
    fn parse(identifier: &'a str) -> Option<Self> {
        let s = identifier.trim();
        ISBN_RE.is_match(s).then_some(Isbn(s))
    }
}

impl<'a> Isbn<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl fmt::Display for Isbn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
