use tokio::sync::RwLock;

/// Single-slot diagnostic surface.
///
/// Every write replaces the previous message. Writes are attributed to a sync generation,
/// a write from an older generation than the stored one is ignored.
#[derive(Debug, Default)]
pub struct LastError {
    slot: RwLock<(u64, Option<String>)>,
}

impl LastError {
    /// Records a failure message.
    pub async fn record(&self, generation: u64, message: impl Into<String>) {
        self.set(generation, Some(message.into())).await;
    }

    /// Replaces the slot with the outcome of a pass, clearing it when the pass had no failures.
    pub async fn set(&self, generation: u64, message: Option<String>) {
        let mut slot = self.slot.write().await;
        if slot.0 > generation {
            return;
        }
        *slot = (generation, message);
    }

    pub async fn get(&self) -> Option<String> {
        self.slot.read().await.1.clone()
    }
}
