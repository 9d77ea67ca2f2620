use std::path::PathBuf;

/// Which kind of lookup produced a record, so failures can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Doi,
    Isbn,
    Text,
}

impl InputKind {
    fn not_found_message(self) -> &'static str {
        match self {
            InputKind::Doi => "DOI invalid",
            InputKind::Isbn => "ISBN invalid",
            InputKind::Text => "no reference found in text",
        }
    }
}

/// Everything that can end a run without a new record.
///
/// The first three variants display the exact messages the launcher shows to the user in place
/// of a citekey.
#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("input invalid")]
    InvalidInput,

    #[error("{}", .0.not_found_message())]
    RecordNotFound(InputKind),

    #[error("ISBN not registered.")]
    IsbnNotRegistered,

    #[error("cannot access bibliography {}: {source}", path.display())]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("lookup failed: {0:#}")]
    Fetch(anyhow::Error),
}
