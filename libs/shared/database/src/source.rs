use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::realtime::RealtimeClient;

/// A readable, subscribable collection of JSON nodes.
///
/// Consumers that aggregate live data (the appointment feed) depend on this
/// trait rather than on the concrete store client, so they can be driven by
/// an in-memory fake in tests.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// One-shot read of the node at `path`.
    async fn fetch(&self, path: &str) -> Result<Value>;

    /// Subscribe to the node at `path`. The stream yields the current value
    /// once available and again on every subsequent change.
    fn watch(&self, path: &str) -> SnapshotStream;
}

/// A change stream for one node. Dropping the stream cancels the underlying
/// subscription task, so no polling outlives its consumer.
pub struct SnapshotStream {
    rx: mpsc::Receiver<Value>,
    task: JoinHandle<()>,
}

impl SnapshotStream {
    pub fn new(rx: mpsc::Receiver<Value>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    /// Wait for the next snapshot. Returns None once the subscription ends.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

impl Drop for SnapshotStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl SnapshotSource for RealtimeClient {
    async fn fetch(&self, path: &str) -> Result<Value> {
        self.get(path, None).await
    }

    /// The hosted store exposes change feeds to its own SDKs; over plain
    /// REST we approximate one by polling and suppressing unchanged values.
    fn watch(&self, path: &str) -> SnapshotStream {
        let (tx, rx) = mpsc::channel(8);
        let client = self.clone();
        let path = path.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(client.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Value> = None;

            loop {
                ticker.tick().await;
                match client.get::<Value>(&path, None).await {
                    Ok(snapshot) => {
                        if last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        last = Some(snapshot.clone());
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("Snapshot poll failed for {}: {}", path, err),
                }
            }
        });

        SnapshotStream::new(rx, task)
    }
}
