use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::AddError;

const SUFFIXES: std::ops::RangeInclusive<char> = 'a'..='z';

/// The bibliography file. It is only ever read whole or appended to.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String, AddError> {
        let bytes = fs::read(&self.path).map_err(|source| self.error(source))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Append `text` to the end of the existing file.
    ///
    /// The file must exist. If it does not end in a newline, one is written first so the new
    /// record starts on its own line.
    pub fn append(&self, text: &str) -> Result<(), AddError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.error(source))?;
        let needs_break = !ends_with_newline(&mut file).map_err(|source| self.error(source))?;

        let mut out = String::with_capacity(text.len() + 1);
        if needs_break {
            out.push('\n');
        }
        out.push_str(text);
        file.write_all(out.as_bytes())
            .map_err(|source| self.error(source))?;
        tracing::debug!(path = %self.path.display(), bytes = out.len(), "appended to store");
        Ok(())
    }

    fn error(&self, source: io::Error) -> AddError {
        AddError::Store {
            path: self.path.clone(),
            source,
        }
    }
}

/// Empty files count as ending in a newline.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Citekeys of every record in `store`: the text between `{` and the first `,` on each line
/// that starts with `@`.
pub fn existing_citekeys(store: &str) -> HashSet<&str> {
    store
        .lines()
        .filter(|line| line.starts_with('@'))
        .filter_map(|line| line.split_once('{'))
        .map(|(_, rest)| rest.split(',').next().unwrap_or(rest).trim())
        .collect()
}

/// Make `candidate` unique against the citekeys already in `store`.
///
/// Tries the bare candidate, then `a` through `z` appended. When all 26 suffixes are taken the
/// `z` key is returned even though it collides.
pub fn unique_citekey(candidate: &str, store: &str) -> String {
    let taken = existing_citekeys(store);
    if !taken.contains(candidate) {
        return candidate.to_string();
    }
    let mut key = candidate.to_string();
    for suffix in SUFFIXES {
        key = format!("{candidate}{suffix}");
        if !taken.contains(key.as_str()) {
            return key;
        }
    }
    tracing::warn!(%candidate, "all citekey suffixes taken, reusing {key}");
    key
}
