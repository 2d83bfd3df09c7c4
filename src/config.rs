//! Watcher configuration.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default time between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where reading starts for a file first matched while the watcher is running.
///
/// Files already present when the watcher is constructed always start at
/// their end, whatever this is set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPosition {
    /// Deliver the file's existing content.
    #[default]
    Beginning,
    /// Skip the existing content and only deliver lines appended later.
    End,
}

/// What a watcher does when its line callback fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackPolicy {
    /// Log the failure and carry on with the next line.
    #[default]
    Isolate,
    /// Log the failure and stop the watcher.
    Abort,
}

/// Settings for a single [`Watcher`](crate::Watcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub poll_interval: Duration,
    pub new_file_start: StartPosition,
    pub callback_policy: CallbackPolicy,
    /// Line terminator byte. A `\r` directly before a `\n` terminator is stripped too.
    pub separator: u8,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            new_file_start: StartPosition::default(),
            callback_policy: CallbackPolicy::default(),
            separator: b'\n',
        }
    }
}

impl WatchConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_new_file_start(mut self, new_file_start: StartPosition) -> Self {
        self.new_file_start = new_file_start;
        self
    }

    pub fn with_callback_policy(mut self, callback_policy: CallbackPolicy) -> Self {
        self.callback_policy = callback_policy;
        self
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Checks the settings before a watcher is built from them.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        Ok(())
    }
}
