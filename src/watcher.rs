//! Polling watcher that follows a file or glob pattern and delivers new lines.

use crate::config::{CallbackPolicy, StartPosition, WatchConfig};
use crate::error::{Error, PollError, Result};
use crate::line::{CallbackResult, ErrorHook, Line, LineCallback};
use crate::offsets::OffsetTable;
use crate::reader::{ReadOutcome, read_from};
use crate::resolver::WatchTarget;
use std::any::Any;
use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`Watcher`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Initializing,
    Active,
    Stopping,
    Stopped,
}

/// Follows one [`WatchTarget`], invoking a callback for every new line.
///
/// Offsets are seeded when the watcher is built, so content already present
/// at that point is never delivered. Each started watcher runs as its own
/// tokio task. Dropping a watcher stops it.
pub struct Watcher {
    target: WatchTarget,
    poll_loop: Option<PollLoop>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<WatcherState>>,
    task: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Builds a watcher for any target.
    ///
    /// Fixed paths are validated here and fail with [`Error::NotFound`],
    /// [`Error::NotReadable`] or [`Error::IsDirectory`]. A glob matching
    /// nothing is fine.
    pub fn new<F>(target: WatchTarget, callback: F, config: WatchConfig) -> Result<Self>
    where
        F: FnMut(&Line) -> CallbackResult + Send + 'static,
    {
        config.validate()?;

        let offsets = match &target {
            WatchTarget::FixedPath(path) => {
                let size = validate_fixed_path(path)?;
                let mut offsets = OffsetTable::new();
                offsets.insert(path.clone(), size);
                offsets
            }
            WatchTarget::Glob(_) => OffsetTable::seeded_at_end(target.resolve()),
        };
        debug!("Seeded {} offsets for {}", offsets.len(), target);

        let cancel = CancellationToken::new();
        let (state, _) = watch::channel(WatcherState::Initializing);
        let state = Arc::new(state);

        let poll_loop = PollLoop {
            target: target.clone(),
            offsets,
            callback: Box::new(callback),
            error_hook: None,
            config,
            cancel: cancel.clone(),
            state: state.clone(),
        };

        Ok(Self {
            target,
            poll_loop: Some(poll_loop),
            cancel,
            state,
            task: None,
        })
    }

    /// Follows a single file; the callback receives each line's text.
    pub fn file<P, F>(path: P, mut callback: F, config: WatchConfig) -> Result<Self>
    where
        P: Into<PathBuf>,
        F: FnMut(&str) -> CallbackResult + Send + 'static,
    {
        Self::new(
            WatchTarget::file(path),
            move |line: &Line| callback(line.text()),
            config,
        )
    }

    /// Follows every file matching `pattern`; the callback receives the line and its path.
    pub fn glob<F>(pattern: impl Into<String>, callback: F, config: WatchConfig) -> Result<Self>
    where
        F: FnMut(&Line) -> CallbackResult + Send + 'static,
    {
        Self::new(WatchTarget::glob(pattern)?, callback, config)
    }

    /// Installs a hook that sees every skipped read and callback failure.
    ///
    /// Has no effect once the watcher has been started.
    pub fn with_error_hook<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&PollError) + Send + 'static,
    {
        if let Some(poll_loop) = self.poll_loop.as_mut() {
            poll_loop.error_hook = Some(Box::new(hook));
        }
        self
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Spawns the poll loop onto the current tokio runtime and returns immediately.
    ///
    /// A watcher runs at most once: starting it again fails with
    /// [`Error::AlreadyStarted`], and starting it after [`stop`](Self::stop)
    /// fails with [`Error::Stopped`].
    pub fn start(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() || self.state() == WatcherState::Stopped {
            return Err(Error::Stopped);
        }
        let poll_loop = self.poll_loop.take().ok_or(Error::AlreadyStarted)?;

        self.state.send_replace(WatcherState::Active);
        info!("Watching {}", self.target);
        self.task = Some(tokio::spawn(poll_loop.run()));
        Ok(())
    }

    /// Requests termination without waiting for it.
    ///
    /// The loop finishes at most its in-flight read and never polls again.
    pub fn stop(&self) {
        self.cancel.cancel();
        self.state.send_if_modified(|state| {
            let next = match *state {
                WatcherState::Initializing => WatcherState::Stopped,
                WatcherState::Active => WatcherState::Stopping,
                WatcherState::Stopping | WatcherState::Stopped => return false,
            };
            *state = next;
            true
        });
    }

    /// Requests termination and waits for the poll loop to exit.
    pub async fn stop_and_wait(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Watcher task for {} failed: {}", self.target, e);
                self.state.send_replace(WatcherState::Stopped);
            }
        }
    }

    /// Resolves once the watcher has reached [`WatcherState::Stopped`].
    pub async fn stopped(&self) {
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|s| *s == WatcherState::Stopped).await;
    }

    #[cfg(test)]
    pub(crate) fn subscribe(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("target", &self.target)
            .field("state", &self.state())
            .finish()
    }
}

/// Checks a fixed path can be followed and returns its current size.
fn validate_fixed_path(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Error::NotReadable {
            path: path.to_path_buf(),
            source: e,
        },
        _ => Error::Io(e),
    })?;

    if metadata.is_dir() {
        return Err(Error::IsDirectory {
            path: path.to_path_buf(),
        });
    }

    std::fs::File::open(path).map_err(|source| Error::NotReadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(metadata.len())
}

/// State owned by a running watcher task. Nothing outside the task touches it.
struct PollLoop {
    target: WatchTarget,
    offsets: OffsetTable,
    callback: LineCallback,
    error_hook: Option<ErrorHook>,
    config: WatchConfig,
    cancel: CancellationToken,
    state: Arc<watch::Sender<WatcherState>>,
}

impl PollLoop {
    async fn run(mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            if self.poll_once().await.is_break() {
                break;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        self.state.send_replace(WatcherState::Stopped);
        info!("Stopped watching {}", self.target);
    }

    /// One poll cycle: resolve, read every match in order, then swap in the new offsets.
    ///
    /// Returns `Break` when the watcher must stop.
    async fn poll_once(&mut self) -> ControlFlow<()> {
        let paths = self.target.resolve();
        let mut next = OffsetTable::with_capacity(paths.len());

        for path in paths {
            if self.cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let start = match self.offsets.get(&path) {
                Some(offset) => offset,
                None => first_sight_offset(&path, self.config.new_file_start).await,
            };

            let outcome = read_from(&path, start, self.config.separator).await;
            if self.apply(path, start, outcome, &mut next).is_break() {
                return ControlFlow::Break(());
            }
        }

        if next.len() != self.offsets.len() {
            debug!(
                "{} now tracks {} files (was {})",
                self.target,
                next.len(),
                self.offsets.len()
            );
        }
        self.offsets = next;
        ControlFlow::Continue(())
    }

    /// Delivers the lines of one read and records where `path` is read from next.
    ///
    /// A skipped read keeps `start`, the offset the read began at.
    fn apply(
        &mut self,
        path: PathBuf,
        start: u64,
        outcome: ReadOutcome,
        next: &mut OffsetTable,
    ) -> ControlFlow<()> {
        match outcome {
            ReadOutcome::Lines {
                offset,
                lines,
                truncated,
            } => {
                if truncated {
                    info!("{} was truncated, reading from the start", path.display());
                }
                for text in lines {
                    if self.deliver(Line::new(path.clone(), text)).is_break() {
                        return ControlFlow::Break(());
                    }
                }
                next.insert(path, offset);
            }
            ReadOutcome::SkippedPermission => {
                self.report(&PollError::SkippedPermission { path: path.clone() });
                next.insert(path, start);
            }
            ReadOutcome::SkippedTransient(source) => {
                self.report(&PollError::SkippedTransient {
                    path: path.clone(),
                    source,
                });
                next.insert(path, start);
            }
        }
        ControlFlow::Continue(())
    }

    fn deliver(&mut self, line: Line) -> ControlFlow<()> {
        let callback = &mut self.callback;
        let reason = match catch_unwind(AssertUnwindSafe(|| callback(&line))) {
            Ok(Ok(())) => return ControlFlow::Continue(()),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        let failure = PollError::Callback {
            path: line.path().to_path_buf(),
            reason,
        };

        match self.config.callback_policy {
            CallbackPolicy::Isolate => {
                self.report(&failure);
                ControlFlow::Continue(())
            }
            CallbackPolicy::Abort => {
                error!("Stopping watcher for {}: {}", self.target, failure);
                self.notify_hook(&failure);
                ControlFlow::Break(())
            }
        }
    }

    fn report(&mut self, failure: &PollError) {
        match failure {
            PollError::SkippedPermission { .. } | PollError::SkippedTransient { .. } => {
                debug!("{}", failure)
            }
            PollError::Callback { .. } => warn!("{}", failure),
        }
        self.notify_hook(failure);
    }

    fn notify_hook(&mut self, failure: &PollError) {
        if let Some(hook) = self.error_hook.as_mut() {
            hook(failure);
        }
    }
}

/// Offset for a file first matched while running.
async fn first_sight_offset(path: &Path, start: StartPosition) -> u64 {
    debug!("New file matched: {}", path.display());
    match start {
        StartPosition::Beginning => 0,
        StartPosition::End => tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.len())
            .unwrap_or(0),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    }
}
