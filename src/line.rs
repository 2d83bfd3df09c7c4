//! Lines delivered to callers and the callback types that receive them.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Error type a line callback may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single line callback invocation.
pub type CallbackResult = std::result::Result<(), BoxError>;

pub(crate) type LineCallback = Box<dyn FnMut(&Line) -> CallbackResult + Send>;
pub(crate) type ErrorHook = Box<dyn FnMut(&crate::PollError) + Send>;

/// A complete line read from a watched file, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    path: PathBuf,
    text: String,
}

impl Line {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The file this line was read from, as returned by resolution.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Callback that writes `path: line` to standard output, flushing after every line.
pub fn stdout_callback() -> impl FnMut(&Line) -> CallbackResult + Send + 'static {
    |line: &Line| -> CallbackResult {
        let mut out = std::io::stdout().lock();
        write_line(&mut out, line)?;
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, line: &Line) -> std::io::Result<()> {
    writeln!(out, "{}: {}", line.path().display(), line.text())?;
    out.flush()
}
