//! Background requests whose results are applied on the UI loop

use std::future::Future;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Spawns request futures and hands back their completions in arrival order.
///
/// Nothing is cancelled or de-duplicated: overlapping requests all complete
/// and whichever arrives last is applied last.
pub struct Requests<C> {
    tx: UnboundedSender<C>,
    rx: UnboundedReceiver<C>,
    in_flight: usize,
}

impl<C: Send + 'static> Requests<C> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, in_flight: 0 }
    }

    /// Run `fut` on the runtime; its output shows up in `try_next`/`next`
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = C> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Receiver only goes away with the screen itself
            let _ = tx.send(fut.await);
        });
    }

    /// A finished completion, without waiting
    pub fn try_next(&mut self) -> Option<C> {
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next completion; `None` once nothing is in flight
    pub async fn next(&mut self) -> Option<C> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

impl<C: Send + 'static> Default for Requests<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completions_arrive_in_finish_order() {
        let mut requests = Requests::new();
        requests.spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "slow"
        });
        requests.spawn(async { "fast" });
        assert_eq!(requests.in_flight(), 2);

        assert_eq!(requests.next().await, Some("fast"));
        assert_eq!(requests.next().await, Some("slow"));
        assert!(!requests.is_busy());
        assert_eq!(requests.next().await, None);
    }

    #[tokio::test]
    async fn test_try_next_does_not_block() {
        let mut requests: Requests<u8> = Requests::new();
        assert!(requests.try_next().is_none());

        requests.spawn(async { 1 });
        // Give the spawned task a chance to run
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(requests.try_next(), Some(1));
        assert_eq!(requests.in_flight(), 0);
    }
}
