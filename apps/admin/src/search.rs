//! Interactive search: one query per input line, fetched once typing settles.

use std::time::Duration;

use anyhow::Result;
use client_core::{debounce, PageSource, RemoteCollection};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Feeds each input line through the debouncer and reloads `collection` with
/// the settled text, calling `show` after every reload. Returns once input
/// ends and the last pending query has been shown.
pub async fn run_search<R, S, F>(
    input: R,
    collection: &mut RemoteCollection<S>,
    delay: Duration,
    mut show: F,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    S: PageSource<Filter = String>,
    F: FnMut(&RemoteCollection<S>),
{
    let (sender, mut settled) = debounce(collection.filter().clone(), delay);
    let mut sender = Some(sender);
    let mut lines = input.lines();
    let mut searches = 0;

    loop {
        tokio::select! {
            line = lines.next_line(), if sender.is_some() => match line? {
                Some(line) => {
                    if let Some(sender) = &sender {
                        sender.send(line.trim().to_string());
                    }
                }
                None => sender = None,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let query = settled.borrow_and_update().clone();
                debug!(%query, "searching");
                collection.set_filter(query).await?;
                searches += 1;
                show(collection);
            }
        }
    }

    Ok(searches)
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
