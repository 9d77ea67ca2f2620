pub mod anystyle;

use std::time::Duration;

use anyhow::Context;
use indicatif::ProgressBar;
use url::Url;

use crate::config::Config;
use crate::fetch::anystyle::Anystyle;
use crate::identifier::{Doi, Isbn};

const USER_AGENT: &str = concat!("bibadd/", env!("CARGO_PKG_VERSION"));

/// Where raw bibtex comes from. Each method returns the collaborator's response text as-is;
/// judging whether it holds a record is up to the caller.
pub trait Fetcher {
    fn fetch_doi(&self, doi: &Doi<'_>) -> anyhow::Result<String>;
    fn fetch_isbn(&self, isbn: &Isbn<'_>) -> anyhow::Result<String>;
    fn parse_text(&self, text: &str) -> anyhow::Result<String>;
}

/// doi.org content negotiation, an ISBN-to-bibtex service, and a local reference parser.
pub struct Remote {
    agent: ureq::Agent,
    isbn_endpoint: Url,
    parser: Anystyle,
}

impl Remote {
    pub fn new(config: &Config) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_global(config.timeout)
            .http_status_as_error(false)
            .build();
        Remote {
            agent: ureq::Agent::new_with_config(cfg),
            isbn_endpoint: config.isbn_endpoint.clone(),
            parser: Anystyle::new(&config.anystyle, &config.cache_dir),
        }
    }

    /// GET `url` and return the body whatever the status; error pages are judged by content.
    fn get(&self, url: &Url, accept: &str) -> anyhow::Result<String> {
        let res = self
            .agent
            .get(url.as_str())
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT)
            .call()
            .with_context(|| format!("failed request for URL {url}"))?;
        tracing::debug!(%url, status = %res.status(), "lookup answered");
        res.into_body().read_to_string().context("read body")
    }
}

impl Fetcher for Remote {
    fn fetch_doi(&self, doi: &Doi<'_>) -> anyhow::Result<String> {
        let url = doi.to_url();
        tracing::debug!(prefix = doi.prefix(), suffix = doi.suffix(), "DOI lookup");
        with_spinner(format!("resolving DOI {doi}"), || {
            self.get(&url, "application/x-bibtex")
        })
    }

    fn fetch_isbn(&self, isbn: &Isbn<'_>) -> anyhow::Result<String> {
        let mut url = self.isbn_endpoint.clone();
        url.query_pairs_mut().append_pair("isbn", isbn.as_str());
        with_spinner(format!("looking up ISBN {isbn}"), || {
            self.get(&url, "text/plain, application/x-bibtex")
        })
    }

    fn parse_text(&self, text: &str) -> anyhow::Result<String> {
        with_spinner("parsing reference text".to_string(), || self.parser.parse(text))
    }
}

/// Run `f` while a spinner ticks on stderr. Nothing is drawn when stderr is not a terminal.
fn with_spinner<T>(message: String, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}
