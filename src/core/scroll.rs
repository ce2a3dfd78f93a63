//! Scroll position readings and the event source views subscribe to.

use tokio::sync::broadcast;
use tracing::debug;

/// Distance from the bottom of the document, in lines, that counts as "near".
pub const DEFAULT_SCROLL_THRESHOLD: usize = 80;

/// A snapshot of the document scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Offset of the first visible line.
    pub scroll_top: usize,
    /// Height of the viewport.
    pub client_height: usize,
    /// Total height of the rendered document.
    pub scroll_height: usize,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self, threshold: usize) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height.saturating_sub(threshold)
    }
}

/// Document-level scroll event stream.
///
/// Listeners are registered with [`ScrollSource::subscribe`] and stay
/// registered for as long as the returned [`ScrollSubscription`] lives.
pub struct ScrollSource {
    sender: broadcast::Sender<ScrollMetrics>,
}

impl ScrollSource {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> ScrollSubscription {
        debug!("Scroll listener registered");
        ScrollSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publishes a scroll reading. Returns how many listeners received it.
    pub fn emit(&self, metrics: ScrollMetrics) -> usize {
        self.sender.send(metrics).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ScrollSource {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered scroll listener; deregisters on drop.
pub struct ScrollSubscription {
    receiver: broadcast::Receiver<ScrollMetrics>,
}

impl ScrollSubscription {
    /// Waits for the next scroll reading. Returns `None` once the source is gone.
    ///
    /// Readings missed while the listener lagged behind are skipped; only the
    /// position the document is at now matters.
    pub async fn next(&mut self) -> Option<ScrollMetrics> {
        loop {
            match self.receiver.recv().await {
                Ok(metrics) => return Some(metrics),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Scroll listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        debug!("Scroll listener deregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_bottom_threshold() {
        let metrics = ScrollMetrics {
            scroll_top: 0,
            client_height: 40,
            scroll_height: 200,
        };
        assert!(!metrics.is_near_bottom(80));

        let metrics = ScrollMetrics {
            scroll_top: 80,
            ..metrics
        };
        assert!(metrics.is_near_bottom(80));

        let metrics = ScrollMetrics {
            scroll_top: 79,
            ..metrics
        };
        assert!(!metrics.is_near_bottom(80));
    }

    #[test]
    fn test_short_document_is_always_near_bottom() {
        let metrics = ScrollMetrics {
            scroll_top: 0,
            client_height: 24,
            scroll_height: 30,
        };
        assert!(metrics.is_near_bottom(80));
    }

    #[tokio::test]
    async fn test_subscription_receives_and_deregisters() {
        let source = ScrollSource::new();
        assert_eq!(source.listener_count(), 0);

        let mut subscription = source.subscribe();
        assert_eq!(source.listener_count(), 1);

        let metrics = ScrollMetrics {
            scroll_top: 10,
            client_height: 20,
            scroll_height: 100,
        };
        assert_eq!(source.emit(metrics), 1);
        assert_eq!(subscription.next().await, Some(metrics));

        drop(subscription);
        assert_eq!(source.listener_count(), 0);
        assert_eq!(source.emit(metrics), 0);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_source_dropped() {
        let source = ScrollSource::new();
        let mut subscription = source.subscribe();
        drop(source);
        assert_eq!(subscription.next().await, None);
    }
}
