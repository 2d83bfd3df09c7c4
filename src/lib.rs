//! Polling `tail -f` over single files or whole glob patterns.
//!
//! A [`Watcher`] follows one target: a fixed path, or a glob pattern that is
//! re-resolved every poll cycle so files appearing later are picked up and
//! files disappearing are forgotten. Each complete new line is handed to a
//! callback together with the file it came from. Truncated files are read
//! again from the start.
//!
//! # Example
//!
//! ```rust,no_run
//! use glob_tail::{CallbackResult, Line, WatchConfig, Watcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut watcher = Watcher::glob(
//!         "logs/*.log",
//!         |line: &Line| -> CallbackResult {
//!             println!("{}: {}", line.path().display(), line.text());
//!             Ok(())
//!         },
//!         WatchConfig::default(),
//!     )?;
//!     watcher.start()?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     watcher.stop_and_wait().await;
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod config;
mod error;
mod line;
mod offsets;
mod reader;
mod resolver;
mod set;
mod stream;
mod watcher;

pub mod logging;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use config::{CallbackPolicy, DEFAULT_POLL_INTERVAL, StartPosition, WatchConfig};
pub use error::{Error, PollError, Result};
pub use line::{BoxError, CallbackResult, Line, stdout_callback};
pub use resolver::{GlobResolver, WatchTarget};
pub use set::WatcherSet;
pub use stream::LineStream;
pub use watcher::{Watcher, WatcherState};

use std::path::PathBuf;

/// Creates a stream of new lines from every file matching `pattern`.
///
/// # Example
///
/// ```rust,no_run
/// use glob_tail::{WatchConfig, tail_glob};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut stream = tail_glob("logs/*.log", WatchConfig::default())?;
///
///     while let Some(line) = stream.next().await {
///         println!("{}: {}", line.path().display(), line.text());
///     }
///
///     Ok(())
/// }
/// ```
pub fn tail_glob(pattern: impl Into<String>, config: WatchConfig) -> Result<LineStream> {
    LineStream::new(WatchTarget::glob(pattern)?, config)
}

/// Creates a stream of new lines appended to a single existing file.
pub fn tail_file(path: impl Into<PathBuf>, config: WatchConfig) -> Result<LineStream> {
    LineStream::new(WatchTarget::file(path), config)
}
