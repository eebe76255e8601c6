//! Delays a changing value until it has been quiet for a fixed interval.
//!
//! Typical use is search input: every keystroke goes through the
//! [`DebounceSender`], and only the text that survives a full quiet interval
//! reaches the receiver that triggers a fetch.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct DebounceSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> DebounceSender<T> {
    /// Feeds a new raw value and restarts the quiet interval.
    ///
    /// Returns `false` once the debounce task has stopped.
    pub fn send(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

/// Spawns the debounce task on the current tokio runtime.
///
/// The receiver starts at `initial`. Dropping the sender flushes a value that
/// is still waiting out its interval, then stops the task.
pub fn debounce<T>(initial: T, delay: Duration) -> (DebounceSender<T>, watch::Receiver<T>)
where
    T: Send + Sync + 'static,
{
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<T>();
    let (output_tx, output_rx) = watch::channel(initial);

    tokio::spawn(async move {
        while let Some(mut latest) = input_rx.recv().await {
            loop {
                tokio::select! {
                    next = input_rx.recv() => match next {
                        Some(value) => latest = value,
                        None => {
                            let _ = output_tx.send(latest);
                            return;
                        }
                    },
                    _ = tokio::time::sleep(delay) => break,
                }
            }

            debug!(delay_ms = delay.as_millis() as u64, "debounced value settled");
            if output_tx.send(latest).is_err() {
                break;
            }
        }
    });

    (DebounceSender { tx: input_tx }, output_rx)
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
