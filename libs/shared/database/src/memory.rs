use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use crate::source::{SnapshotSource, SnapshotStream};

/// In-memory stand-in for the hosted store, for tests and local development.
/// Writes notify watchers immediately instead of waiting for a poll cycle.
pub struct MemorySource {
    nodes: Arc<RwLock<HashMap<String, Value>>>,
    changes: broadcast::Sender<(String, Value)>,
}

impl MemorySource {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            nodes: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Replace the node at `path` and notify watchers.
    pub fn set(&self, path: &str, value: Value) {
        self.nodes
            .write()
            .unwrap()
            .insert(path.to_string(), value.clone());
        // No receivers is fine; watchers may not have subscribed yet.
        let _ = self.changes.send((path.to_string(), value));
    }

    fn current(&self, path: &str) -> Value {
        self.nodes
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Value> {
        Ok(self.current(path))
    }

    fn watch(&self, path: &str) -> SnapshotStream {
        let (tx, rx) = mpsc::channel(8);
        let mut changes = self.changes.subscribe();
        let initial = {
            let nodes = self.nodes.read().unwrap();
            nodes.get(path).cloned()
        };
        let path = path.to_string();

        let task = tokio::spawn(async move {
            if let Some(value) = initial {
                if tx.send(value).await.is_err() {
                    return;
                }
            }
            loop {
                match changes.recv().await {
                    Ok((changed_path, value)) if changed_path == path => {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        SnapshotStream::new(rx, task)
    }
}
