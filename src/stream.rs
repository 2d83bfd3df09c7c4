//! Stream adapter over a running watcher.

use crate::config::WatchConfig;
use crate::error::Result;
use crate::line::{CallbackResult, Line};
use crate::resolver::WatchTarget;
use crate::watcher::Watcher;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// A stream of new lines from a watch target.
///
/// Backed by a started [`Watcher`] whose callback forwards into a channel.
/// Dropping the stream stops the watcher.
pub struct LineStream {
    receiver: UnboundedReceiverStream<Line>,
    watcher: Watcher,
}

impl LineStream {
    /// Builds and starts a watcher for `target`. Must be called inside a tokio runtime.
    pub fn new(target: WatchTarget, config: WatchConfig) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = Watcher::new(
            target,
            move |line: &Line| -> CallbackResult {
                // The receiver only goes away together with the watcher.
                let _ = tx.send(line.clone());
                Ok(())
            },
            config,
        )?;
        watcher.start()?;

        Ok(LineStream {
            receiver: UnboundedReceiverStream::new(rx),
            watcher,
        })
    }

    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// Stops the underlying watcher; lines already read are still yielded.
    pub fn stop(&self) {
        self.watcher.stop();
    }
}

impl Stream for LineStream {
    type Item = Line;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}
