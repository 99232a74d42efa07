use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const STATUS_MESSAGES: [&str; 5] = [
    "Warming up the virtual studio...",
    "Our AI stylist is selecting the perfect fit...",
    "Adjusting the lighting and shadows...",
    "Adding the final magical touches...",
    "This is taking a bit longer than usual, but perfection takes time!",
];

/// Rotates [`STATUS_MESSAGES`] on a watch channel while an attempt runs.
///
/// Publishes the first message immediately, then the next one every
/// `interval`, wrapping around. Dropping the ticker stops the task and
/// clears the channel back to `None`.
pub struct StatusTicker {
    handle: JoinHandle<()>,
    tx: Arc<watch::Sender<Option<String>>>,
}

impl StatusTicker {
    pub fn start(tx: Arc<watch::Sender<Option<String>>>, interval: Duration) -> Self {
        tx.send_replace(Some(STATUS_MESSAGES[0].to_string()));

        let task_tx = Arc::clone(&tx);
        let period = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            // the first tick fires immediately
            ticks.tick().await;
            let mut index = 0;
            loop {
                ticks.tick().await;
                index = (index + 1) % STATUS_MESSAGES.len();
                log::debug!("Status: {}", STATUS_MESSAGES[index]);
                task_tx.send_replace(Some(STATUS_MESSAGES[index].to_string()));
            }
        });

        Self { handle, tx }
    }

    /// Stops rotating and clears the channel.
    pub fn stop(self) {
        self.halt();
    }

    fn halt(&self) {
        self.handle.abort();
        self.tx.send_replace(None);
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rotates_and_clears() {
        let (tx, mut rx) = watch::channel(None);
        let tx = Arc::new(tx);

        let ticker = StatusTicker::start(Arc::clone(&tx), Duration::from_secs(3));
        assert_eq!(rx.borrow_and_update().as_deref(), Some(STATUS_MESSAGES[0]));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_deref(), Some(STATUS_MESSAGES[1]));

        ticker.stop();
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wraps_around() {
        let (tx, mut rx) = watch::channel(None);
        let _ticker = StatusTicker::start(Arc::new(tx), Duration::from_secs(3));

        let mut seen = vec![rx.borrow_and_update().clone()];
        while seen.len() < STATUS_MESSAGES.len() + 1 {
            rx.changed().await.unwrap();
            seen.push(rx.borrow_and_update().clone());
        }
        assert_eq!(seen[STATUS_MESSAGES.len()].as_deref(), Some(STATUS_MESSAGES[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_rotation() {
        let (tx, mut rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let ticker = StatusTicker::start(Arc::clone(&tx), Duration::from_secs(3));

        ticker.stop();
        let _ = rx.borrow_and_update();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), None);
    }
}
