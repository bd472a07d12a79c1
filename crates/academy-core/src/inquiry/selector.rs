//! Read-side helpers layered on `subscribe` and `get_snapshot`.

use std::sync::{Arc, Mutex, PoisonError};

use super::model::{InquiryId, InquiryRecord};
use super::store::{InquiryStore, Snapshot, Subscription};

/// Memoizing projection of the store's snapshot.
///
/// The projection re-runs only when the snapshot `Arc` has been replaced
/// since the previous read.
pub struct Selector<T, F> {
    store: InquiryStore,
    projection: F,
    cache: Option<(Snapshot, T)>,
    runs: usize,
}

impl<T, F> Selector<T, F>
where
    F: Fn(&[InquiryRecord]) -> T,
{
    /// Create a selector over `store`.
    #[must_use]
    pub fn new(store: &InquiryStore, projection: F) -> Self {
        Self {
            store: store.clone(),
            projection,
            cache: None,
            runs: 0,
        }
    }

    /// Projected value for the current snapshot.
    pub fn get(&mut self) -> &T {
        let snapshot = self.store.get_snapshot();
        let entry = match self.cache.take() {
            Some((seen, value)) if Arc::ptr_eq(&seen, &snapshot) => (seen, value),
            _ => {
                let value = (self.projection)(&snapshot);
                self.runs += 1;
                (snapshot, value)
            }
        };
        &self.cache.insert(entry).1
    }

    /// How many times the projection has run.
    #[must_use]
    pub const fn runs(&self) -> usize {
        self.runs
    }
}

/// Keeps a possibly stale identifier resolved against the live store.
///
/// The resolved id is recomputed after every mutation, so a watch on a row
/// number or legacy id follows the record that currently sits there.
/// Dropping the watch unsubscribes it.
#[derive(Debug)]
pub struct InquiryWatch {
    store: InquiryStore,
    raw: String,
    resolved: Arc<Mutex<Option<InquiryId>>>,
    subscription: Option<Subscription>,
}

impl InquiryWatch {
    /// Start watching `raw`.
    #[must_use]
    pub fn new(store: &InquiryStore, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let resolved = Arc::new(Mutex::new(store.resolve(&raw)));

        let subscription = {
            let handle = store.clone();
            let raw = raw.clone();
            let resolved = Arc::clone(&resolved);
            store.subscribe(move || {
                let next = handle.resolve(&raw);
                *resolved.lock().unwrap_or_else(PoisonError::into_inner) = next;
            })
        };

        Self {
            store: store.clone(),
            raw,
            resolved,
            subscription: Some(subscription),
        }
    }

    /// The identifier as the caller supplied it.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Id the identifier currently resolves to.
    #[must_use]
    pub fn current_id(&self) -> Option<InquiryId> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the identifier currently resolves to.
    #[must_use]
    pub fn current(&self) -> Option<InquiryRecord> {
        self.current_id().and_then(|id| self.store.find(&id))
    }

    /// Stop watching.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for InquiryWatch {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
