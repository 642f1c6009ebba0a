use std::{
    io,
    path::{Path, PathBuf},
};

/// Represents a Cadence script, whether it comes from a file or was provided directly as a
/// string. An empty text occurs in REPL mode, where lines are fed incrementally.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Source {
    path: PathBuf,
    text: String,
}

impl Source {
    pub fn from_path<P>(filepath: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(&filepath)?;
        let absolute_path = filepath.as_ref().canonicalize()?;
        Ok(Self::with_path(absolute_path, text))
    }

    /// Provide code directly as a string without reading from the file system.
    pub fn from_text(text: &str) -> Self {
        Self {
            path: "<stdin>".into(),
            text: text.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    fn with_path(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }
}
