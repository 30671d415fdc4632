//! Rate limiting for bursts of events.

use std::time::Duration;

use futures_core::Stream;
use tokio::time::Instant;
use tokio_stream::StreamExt;

enum Tick<T> {
    Item(Option<T>),
    Quiet,
}

/// Coalesces bursts: an item is emitted only once `delay` has passed with no
/// newer item arriving. Each new item replaces the pending one and restarts
/// the quiet period.
///
/// When `input` ends, a still-pending item is emitted immediately.
///
/// Every item of a burst except the last is dropped, so apply this to events
/// where only the latest matters (for example repeated toggles of the same
/// checkbox), not to a mixed stream of independent toggles.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
/// use permtree::debounce::debounce;
/// use tokio_stream::StreamExt;
///
/// # async fn example() {
/// let bursts = tokio_stream::iter(vec![1, 2, 3]);
/// let settled: Vec<i32> = debounce(bursts, Duration::from_millis(250)).collect().await;
/// assert_eq!(settled, vec![3]);
/// # }
/// ```
pub fn debounce<S>(input: S, delay: Duration) -> impl Stream<Item = S::Item>
where
    S: Stream,
{
    async_stream::stream! {
        tokio::pin!(input);
        let mut pending = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let tick = tokio::select! {
                next = input.next() => Tick::Item(next),
                _ = quiet(deadline) => Tick::Quiet,
            };
            match tick {
                Tick::Item(Some(item)) => {
                    pending = Some(item);
                    deadline = Some(Instant::now() + delay);
                }
                Tick::Item(None) => break,
                Tick::Quiet => {
                    deadline = None;
                    if let Some(item) = pending.take() {
                        yield item;
                    }
                }
            }
        }

        if let Some(item) = pending.take() {
            yield item;
        }
    }
}

async fn quiet(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
