use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use qa_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InFlightKey {
    Vote { user_id: Uuid, answer_id: Uuid },
    Accept { user_id: Uuid, question_id: Uuid },
}

/// Tracks write actions currently running so the same user cannot race
/// themselves on one answer or question.
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<DashMap<InFlightKey, ()>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, key: InFlightKey) -> Result<InFlightGuard, AppError> {
        match self.keys.entry(key) {
            Entry::Occupied(_) => {
                tracing::warn!(?key, "Rejected concurrent action");
                Err(AppError::Conflict(
                    "Another request for this item is still in progress".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    keys: Arc::clone(&self.keys),
                    key,
                })
            }
        }
    }

    pub fn is_held(&self, key: &InFlightKey) -> bool {
        self.keys.contains_key(key)
    }
}

/// Releases its key on drop, including when the owning future is cancelled.
pub struct InFlightGuard {
    keys: Arc<DashMap<InFlightKey, ()>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}
