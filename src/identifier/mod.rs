pub mod doi;
pub mod isbn;

use crate::error::{AddError, InputKind};

pub use doi::Doi;
pub use isbn::Isbn;

pub trait Identifier<'a>: Sized + 'a {
    fn parse(identifier: &'a str) -> Option<Self>;
}

/// What the user handed us, decided once before any lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Doi(Doi<'a>),
    Isbn(Isbn<'a>),
    Empty,
    /// Free-form reference text, only produced when text parsing is enabled.
    Text(&'a str),
}

impl Input<'_> {
    pub fn kind(&self) -> Option<InputKind> {
        match self {
            Input::Doi(_) => Some(InputKind::Doi),
            Input::Isbn(_) => Some(InputKind::Isbn),
            Input::Text(_) => Some(InputKind::Text),
            Input::Empty => None,
        }
    }
}

/// Classify `input`.
///
/// NOTE: Ordering is important here, as it signifies priority. A DOI anywhere in the string
/// wins over everything else, so reference text that carries a DOI is looked up by DOI.
pub fn classify(input: &str, parse_text: bool) -> Result<Input<'_>, AddError> {
    let input = input.trim();
    if let Some(doi) = Doi::parse(input) {
        Ok(Input::Doi(doi))
    } else if let Some(isbn) = Isbn::parse(input) {
        Ok(Input::Isbn(isbn))
    } else if input.is_empty() {
        Ok(Input::Empty)
    } else if parse_text {
        Ok(Input::Text(input))
    } else {
        Err(AddError::InvalidInput)
    }
}
