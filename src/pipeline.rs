use crate::citekey;
use crate::config::Config;
use crate::error::{AddError, InputKind};
use crate::fetch::Fetcher;
use crate::identifier::{Input, classify};
use crate::normalize::{insert_keywords, normalize};
use crate::record::Record;
use crate::store::{Store, unique_citekey};

pub const PLACEHOLDER_KEY: &str = "NEW_ENTRY";

/// Appended verbatim for empty input.
pub const PLACEHOLDER_ENTRY: &str = "@misc{NEW_ENTRY,\n\tauthor = {Doe, Jane},\n\ttitle = {NEW_ENTRY},\n\tpages = {1--1},\n\tyear = 0000\n}\n";

/// Marker the ISBN service answers with for unknown numbers.
const ISBN_NOT_FOUND: &str = "Not found";

/// One input in, one record appended, one citekey out.
pub struct Pipeline<F> {
    config: Config,
    store: Store,
    fetcher: F,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(config: Config, fetcher: F) -> Self {
        let store = Store::new(&config.library);
        Pipeline {
            config,
            store,
            fetcher,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Add a record for `input` and return its citekey.
    ///
    /// The store is only written after a record has been fetched, checked and keyed, so every
    /// error path leaves it untouched.
    pub fn run(&self, input: &str) -> Result<String, AddError> {
        let input = classify(input, self.config.parse_text)?;
        tracing::debug!(kind = ?input.kind(), "classified input");
        let (kind, raw) = match input {
            Input::Empty => return self.add_placeholder(),
            Input::Doi(doi) => (InputKind::Doi, self.fetcher.fetch_doi(&doi)),
            Input::Isbn(isbn) => (InputKind::Isbn, self.fetcher.fetch_isbn(&isbn)),
            Input::Text(text) => (InputKind::Text, self.fetcher.parse_text(text)),
        };
        let raw = raw.map_err(AddError::Fetch)?;
        tracing::info!(?kind, bytes = raw.len(), "fetched record");

        let mut record = accept(kind, &raw)?;
        normalize(&mut record, &self.config.ignored_fields);

        let candidate = citekey::generate(&record);
        let existing = self.store.read()?;
        record.key = unique_citekey(&candidate, &existing);
        if record.key != candidate {
            tracing::info!(%candidate, key = %record.key, "citekey taken, using suffix");
        }
        insert_keywords(&mut record);

        self.store.append(&record.to_string())?;
        Ok(record.key)
    }

    fn add_placeholder(&self) -> Result<String, AddError> {
        tracing::info!("empty input, adding placeholder entry");
        self.store.append(PLACEHOLDER_ENTRY)?;
        Ok(PLACEHOLDER_KEY.to_string())
    }
}

/// Check a lookup response and parse the record in it.
fn accept(kind: InputKind, raw: &str) -> Result<Record, AddError> {
    if kind == InputKind::Isbn && raw.contains(ISBN_NOT_FOUND) {
        return Err(AddError::IsbnNotRegistered);
    }
    Record::parse(raw).map_err(|err| {
        tracing::debug!(?kind, %err, "response holds no usable record");
        AddError::RecordNotFound(kind)
    })
}
