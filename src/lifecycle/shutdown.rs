//! Shutdown coordination for the relay.

use tokio::sync::broadcast;

/// Broadcast handle that stops a running `RelayServer`.
///
/// Tests and embedders keep the handle and call `trigger`; the server holds a
/// receiver from `subscribe` and passes it to `requested`.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to drain and stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `Shutdown::trigger` fires.
///
/// A dropped coordinator never resolves, so a server whose handle went out of
/// scope keeps serving until Ctrl+C.
pub async fn requested(receiver: &mut broadcast::Receiver<()>) {
    match receiver.recv().await {
        Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        _ => tracing::info!("Shutdown requested"),
    }
}
