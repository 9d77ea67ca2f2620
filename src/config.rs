use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use url::Url;

use crate::normalize::default_ignored_fields;

pub const DEFAULT_ISBN_ENDPOINT: &str = "https://www.ebook.de/de/tools/isbn2bibtex";
const DEFAULT_ANYSTYLE: &str = "anystyle";

/// Optional settings read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Path to the bibliography, `~` allowed
    pub library: Option<PathBuf>,
    pub parse_text: Option<bool>,
    /// Fields dropped from every new record
    pub ignored_fields: Option<Vec<String>>,
    /// ISBN-to-bibtex service, queried with `?isbn=<ISBN>`
    pub isbn_endpoint: Option<String>,
    /// Reference parser executable
    pub anystyle: Option<PathBuf>,
    /// Where input for the reference parser is staged
    pub cache_dir: Option<PathBuf>,
    /// Upper bound for each HTTP request; unbounded when unset
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read `path`, or the default location when `path` is `None`.
    ///
    /// A missing file at the default location yields an empty config; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "loading config");
        let text = read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bibadd").join("config.toml"))
}

/// Settings for one run, passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub library: PathBuf,
    pub parse_text: bool,
    pub ignored_fields: Vec<String>,
    pub isbn_endpoint: Url,
    pub anystyle: PathBuf,
    pub cache_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Defaults for everything but the library path.
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Config {
            library: library.into(),
            parse_text: false,
            ignored_fields: default_ignored_fields(),
            isbn_endpoint: Url::parse(DEFAULT_ISBN_ENDPOINT).unwrap(),
            anystyle: PathBuf::from(DEFAULT_ANYSTYLE),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("bibadd"),
            timeout: None,
        }
    }

    /// Layer command-line (or environment) values over the config file.
    pub fn resolve(
        file: FileConfig,
        library: Option<PathBuf>,
        parse_text: Option<bool>,
    ) -> Result<Self> {
        let library = library
            .or(file.library)
            .ok_or_else(|| {
                anyhow!("no bibliography configured; pass --library or set bibtex_library_path")
            })?;
        let mut config = Config::new(expand_tilde(&library));
        config.parse_text = parse_text.or(file.parse_text).unwrap_or(false);
        if let Some(fields) = file.ignored_fields {
            config.ignored_fields = fields;
        }
        if let Some(endpoint) = file.isbn_endpoint {
            config.isbn_endpoint = Url::parse(&endpoint)
                .with_context(|| format!("invalid isbn_endpoint {endpoint:?}"))?;
        }
        if let Some(anystyle) = file.anystyle {
            config.anystyle = expand_tilde(&anystyle);
        }
        if let Some(dir) = file.cache_dir {
            config.cache_dir = expand_tilde(&dir);
        }
        config.timeout = file.timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return path.to_path_buf();
    };
    match path.to_str().and_then(|s| s.strip_prefix('~')) {
        Some("") => home,
        Some(rest) => match rest.strip_prefix('/') {
            Some(rel) => home.join(rel),
            None => path.to_path_buf(),
        },
        None => path.to_path_buf(),
    }
}
