//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::lifecycle::signals::wait_for_signal;

/// Broadcasts a single stop notification to the server and its reload task.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver to hand to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(subscribers = notified, "Shutdown triggered");
        notified
    }

    /// Wait for SIGINT/SIGTERM, then trigger.
    pub async fn trigger_on_signal(&self) -> std::io::Result<usize> {
        wait_for_signal().await?;
        Ok(self.trigger())
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.subscribe();
        let mut reload = shutdown.subscribe();

        assert_eq!(shutdown.trigger(), 2);
        assert!(server.recv().await.is_ok());
        assert!(reload.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers() {
        assert_eq!(Shutdown::new().trigger(), 0);
    }
}
