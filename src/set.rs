//! Lifecycle coordination for a group of independent watchers.

use crate::error::Result;
use crate::watcher::Watcher;

/// A collection of watchers started and stopped together.
///
/// Watchers share nothing with each other; each runs as its own task with
/// its own poll cadence.
#[derive(Debug, Default)]
pub struct WatcherSet {
    watchers: Vec<Watcher>,
}

impl WatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, watcher: Watcher) {
        self.watchers.push(watcher);
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watcher> {
        self.watchers.iter()
    }

    /// Starts every watcher.
    ///
    /// A watcher that fails to start does not keep the others from starting;
    /// the first failure is returned once all have been tried.
    pub fn start_all(&mut self) -> Result<()> {
        let mut first_error = None;
        let mut started = 0;

        for watcher in &mut self.watchers {
            match watcher.start() {
                Ok(()) => started += 1,
                Err(e) => {
                    tracing::warn!("Could not start watcher for {}: {}", watcher.target(), e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        tracing::info!("Started {} of {} watchers", started, self.watchers.len());
        first_error.map_or(Ok(()), Err)
    }

    /// Signals every watcher to stop and returns without waiting.
    pub fn stop_all(&self) {
        for watcher in &self.watchers {
            watcher.stop();
        }
    }

    /// Signals every watcher to stop, then waits until all their loops have exited.
    pub async fn stop_all_and_wait(&mut self) {
        self.stop_all();
        futures::future::join_all(self.watchers.iter_mut().map(Watcher::stop_and_wait)).await;
        tracing::info!("Stopped {} watchers", self.watchers.len());
    }
}

impl Extend<Watcher> for WatcherSet {
    fn extend<I: IntoIterator<Item = Watcher>>(&mut self, iter: I) {
        self.watchers.extend(iter);
    }
}

impl FromIterator<Watcher> for WatcherSet {
    fn from_iter<I: IntoIterator<Item = Watcher>>(iter: I) -> Self {
        Self {
            watchers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogDir;
    use crate::{CallbackResult, Line, WatchConfig, WatcherState};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn recording_watcher(pattern: String, sink: Arc<Mutex<Vec<Line>>>) -> Watcher {
        Watcher::glob(
            pattern,
            move |line: &Line| -> CallbackResult {
                sink.lock().unwrap().push(line.clone());
                Ok(())
            },
            WatchConfig::default().with_poll_interval(Duration::from_millis(10)),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_set() {
        let mut set = WatcherSet::new();
        assert!(set.is_empty());
        assert!(set.start_all().is_ok());
        set.stop_all();
    }

    #[tokio::test]
    async fn test_start_and_stop_all_and_wait() {
        let dir = TempLogDir::new().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));

        let mut set: WatcherSet = ["*.log", "*.txt"]
            .into_iter()
            .map(|glob| recording_watcher(dir.pattern(glob), lines.clone()))
            .collect();
        assert_eq!(set.len(), 2);

        set.start_all().unwrap();
        assert!(set.iter().all(|w| w.state() == WatcherState::Active));

        dir.create("a.log", "from log\n").unwrap();
        dir.create("b.txt", "from txt\n").unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while lines.lock().unwrap().len() < 2 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        set.stop_all_and_wait().await;
        assert!(set.iter().all(|w| w.state() == WatcherState::Stopped));

        let mut texts: Vec<String> = lines
            .lock()
            .unwrap()
            .iter()
            .map(|line| line.text().to_string())
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["from log", "from txt"]);
    }

    #[tokio::test]
    async fn test_stop_all_is_fire_and_forget() {
        let dir = TempLogDir::new().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let mut set = WatcherSet::new();
        set.add(recording_watcher(dir.pattern("*.log"), lines.clone()));
        set.start_all().unwrap();

        set.stop_all();
        assert!(set.iter().all(|w| matches!(
            w.state(),
            WatcherState::Stopping | WatcherState::Stopped
        )));

        for watcher in set.iter() {
            tokio::time::timeout(Duration::from_secs(5), watcher.stopped())
                .await
                .unwrap();
        }
        assert!(set.start_all().is_err());
    }

    #[tokio::test]
    async fn test_start_all_starts_the_rest_when_one_fails() {
        let dir = TempLogDir::new().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));

        let stopped = recording_watcher(dir.pattern("*.txt"), lines.clone());
        stopped.stop();

        let mut set = WatcherSet::new();
        set.add(recording_watcher(dir.pattern("*.log"), lines.clone()));
        set.add(stopped);
        set.add(recording_watcher(dir.pattern("*.csv"), lines.clone()));

        let result = set.start_all();
        assert!(matches!(result, Err(crate::Error::Stopped)));

        let states: Vec<WatcherState> = set.iter().map(Watcher::state).collect();
        assert_eq!(
            states,
            vec![
                WatcherState::Active,
                WatcherState::Stopped,
                WatcherState::Active
            ]
        );

        set.stop_all_and_wait().await;
    }
}
