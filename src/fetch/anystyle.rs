use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};

/// The `anystyle` reference parser, run as a child process.
///
/// It cannot read from stdin, so the text is staged in a temporary file under the cache
/// directory. The file is removed once the parser is done with it.
pub struct Anystyle {
    program: PathBuf,
    cache_dir: PathBuf,
}

impl Anystyle {
    pub fn new(program: &Path, cache_dir: &Path) -> Self {
        Anystyle {
            program: program.to_path_buf(),
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    pub fn parse(&self, text: &str) -> anyhow::Result<String> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("failed to create {}", self.cache_dir.display()))?;
        let mut staged = tempfile::Builder::new()
            .prefix("bibadd-")
            .suffix(".txt")
            .tempfile_in(&self.cache_dir)
            .context("failed to stage reference text")?;
        staged.write_all(text.as_bytes())?;
        staged.flush()?;

        tracing::debug!(program = %self.program.display(), input = %staged.path().display(), "running reference parser");
        let output = Command::new(&self.program)
            .args(["--stdout", "--format=bib", "parse"])
            .arg(staged.path())
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
