//! The observable inquiry store.
//!
//! One [`InquiryStore`] is built at the application root and handed to every
//! consumer. It owns the current snapshot, the subscriber list and the
//! persistence adapter. Mutations run synchronously: the new snapshot is
//! computed and swapped in under a write lock, mirrored to the adapter, and
//! then every registered listener is called in registration order.
//!
//! # Example
//!
//! ```ignore
//! use academy_core::{InquiryStore, NewInquiry};
//!
//! let store = InquiryStore::mock_only();
//! let subscription = store.subscribe(|| println!("inquiries changed"));
//!
//! let id = store.create_inquiry(NewInquiry::new("결제 문의", "환불 요청합니다"));
//! assert!(store.get_snapshot().iter().any(|r| r.id == id));
//!
//! subscription.unsubscribe();
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use chrono::Utc;
use tracing::{debug, error, warn};

use super::draft::{NewInquiry, NewMessage, NewStudentInquiry, StatusChangeOptions};
use super::model::{InquiryId, InquiryRecord, InquiryStatus, MessageId};
use super::mutation;
use super::resolver::resolve_inquiry_id;
use super::seed::{seed_inquiries, template_record};
use crate::Result;
use crate::config::StoreConfig;
use crate::persistence::{NullAdapter, PersistenceAdapter};

/// An immutable view of every inquiry at one instant.
///
/// Between mutations the store hands out the same `Arc`, so consumers can
/// skip work with [`Arc::ptr_eq`].
pub type Snapshot = Arc<Vec<InquiryRecord>>;

type Listener = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    adapter: Box<dyn PersistenceAdapter>,
    server_snapshot: Snapshot,
    /// Identity fields `create_inquiry` copies.
    template: InquiryRecord,
    live: RwLock<Option<Snapshot>>,
    /// Serializes swap-and-save so the adapter never holds an older
    /// snapshot than the live one.
    commit_lock: Mutex<()>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl Inner {
    /// Snapshot the live state starts from: the adapter's cached collection,
    /// or the seed data when there is none or it cannot be read.
    fn initial_snapshot(&self) -> Snapshot {
        match self.adapter.load() {
            Ok(Some(records)) => {
                debug!(
                    adapter = self.adapter.name(),
                    count = records.len(),
                    "Initialized inquiry store from cache"
                );
                Arc::new(records)
            }
            Ok(None) => {
                debug!(
                    adapter = self.adapter.name(),
                    "Initialized inquiry store from seed data"
                );
                Arc::clone(&self.server_snapshot)
            }
            Err(e) => {
                warn!(
                    adapter = self.adapter.name(),
                    error = %e,
                    "Ignoring unreadable inquiry cache; using seed data"
                );
                Arc::clone(&self.server_snapshot)
            }
        }
    }

    fn remove_listener(&self, id: u64) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Observable, single-writer store of inquiry records.
///
/// Cloning is cheap and yields another handle to the same store.
#[derive(Clone)]
pub struct InquiryStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for InquiryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InquiryStore")
            .field("adapter", &self.inner.adapter.name())
            .field("initialized", &self.is_initialized())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl InquiryStore {
    /// Create a store mirroring its snapshots through `adapter`.
    #[must_use]
    pub fn new(adapter: impl PersistenceAdapter + 'static) -> Self {
        Self::with_adapter(Box::new(adapter))
    }

    /// Create a store over an already boxed adapter.
    #[must_use]
    pub fn with_adapter(adapter: Box<dyn PersistenceAdapter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                server_snapshot: Arc::new(seed_inquiries()),
                template: template_record(),
                live: RwLock::new(None),
                commit_lock: Mutex::new(()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a store that never persists; demo data stays deterministic.
    #[must_use]
    pub fn mock_only() -> Self {
        Self::new(NullAdapter)
    }

    /// Create a store with the adapter `config` selects.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::with_adapter(config.build_adapter()?))
    }

    /// Register `listener` to be called after every mutation.
    ///
    /// Each call registers independently, even for the same closure.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Current snapshot, initializing the store on first use.
    #[must_use]
    pub fn get_snapshot(&self) -> Snapshot {
        {
            let live = self.inner.live.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(snapshot) = live.as_ref() {
                return Arc::clone(snapshot);
            }
        }
        let mut live = self
            .inner
            .live
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(live.get_or_insert_with(|| self.inner.initial_snapshot()))
    }

    /// The fixed seed dataset, for contexts that render without storage.
    ///
    /// Never changes, whatever mutations the live store has seen.
    #[must_use]
    pub fn get_server_snapshot(&self) -> Snapshot {
        Arc::clone(&self.inner.server_snapshot)
    }

    /// Whether the live snapshot has been seeded yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Project the current snapshot.
    pub fn select<T>(&self, projection: impl FnOnce(&[InquiryRecord]) -> T) -> T {
        projection(&self.get_snapshot())
    }

    /// Look up a record by exact id.
    #[must_use]
    pub fn find(&self, id: &InquiryId) -> Option<InquiryRecord> {
        self.select(|records| records.iter().find(|r| &r.id == id).cloned())
    }

    /// Resolve a possibly stale or malformed identifier against the current
    /// snapshot. See [`resolve_inquiry_id`].
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<InquiryId> {
        self.select(|records| resolve_inquiry_id(raw, records))
    }

    /// Resolve `raw` and return the record it points at.
    #[must_use]
    pub fn find_resolved(&self, raw: &str) -> Option<InquiryRecord> {
        self.select(|records| {
            let id = resolve_inquiry_id(raw, records)?;
            records.iter().find(|r| r.id == id).cloned()
        })
    }

    /// Open an inquiry whose student, parent, instructor and assistant are
    /// copied from the template record. Returns the new record's id.
    pub fn create_inquiry(&self, draft: NewInquiry) -> InquiryId {
        let template = &self.inner.template;
        let mut full = NewStudentInquiry::new(draft.title, draft.content, template.student.clone());
        full.category = draft.category;
        full.role = draft.role;
        full.author = draft.author;
        full.parent.clone_from(&template.parent);
        full.instructor = Some(template.instructor.clone());
        full.assistant.clone_from(&template.assistant);
        self.create_inquiry_for_student(full)
    }

    /// Open an inquiry with caller-supplied identity fields. Returns the new
    /// record's id.
    pub fn create_inquiry_for_student(&self, draft: NewStudentInquiry) -> InquiryId {
        let template_instructor = self.inner.template.instructor.clone();
        self.commit("create_inquiry", |records| {
            let (next, id) = mutation::create(records, draft, &template_instructor, Utc::now());
            (Some(next), id)
        })
    }

    /// Append `message` to the record with exactly `id`.
    ///
    /// Returns `false` when no record has that id.
    pub fn add_inquiry_message(&self, id: &InquiryId, message: NewMessage) -> bool {
        self.commit("add_inquiry_message", |records| {
            let next = mutation::append_message(records, id, message, Utc::now());
            let changed = next.is_some();
            (next, changed)
        })
    }

    /// Move the record with exactly `id` to `status`.
    ///
    /// Every transition is accepted, including out of `종료`. Unless
    /// `options` suppress it, a system message recording the edge is appended
    /// first. Returns `false` when no record has that id.
    pub fn set_inquiry_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
        options: StatusChangeOptions,
    ) -> bool {
        self.commit("set_inquiry_status", |records| {
            let next = mutation::change_status(records, id, status, options, Utc::now());
            let changed = next.is_some();
            (next, changed)
        })
    }

    /// Remove one message from the record with exactly `id`.
    ///
    /// Returns `false` when the record or message does not exist, or the
    /// message is the only one left in its thread.
    pub fn delete_inquiry_message(&self, id: &InquiryId, message_id: &MessageId) -> bool {
        self.commit("delete_inquiry_message", |records| {
            let next = mutation::remove_message(records, id, message_id);
            let changed = next.is_some();
            (next, changed)
        })
    }

    /// Compute, swap, persist, notify.
    ///
    /// The commit lock covers compute, swap and persist, so saves land in
    /// the same order as swaps. The snapshot write lock covers only
    /// compute-and-swap, so readers are not held up by a slow adapter.
    /// Listeners run after both are released and may read or mutate the
    /// store again from inside their callback.
    fn commit<R>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&[InquiryRecord]) -> (Option<Vec<InquiryRecord>>, R),
    ) -> R {
        let commit = self
            .inner
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (snapshot, result) = {
            let mut live = self
                .inner
                .live
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let current = Arc::clone(live.get_or_insert_with(|| self.inner.initial_snapshot()));
            let (next, result) = apply(&current);
            let Some(next) = next else {
                debug!(operation, "Inquiry mutation matched nothing");
                return result;
            };
            let next = Arc::new(next);
            *live = Some(Arc::clone(&next));
            (next, result)
        };

        debug!(operation, count = snapshot.len(), "Inquiry snapshot replaced");
        self.persist(&snapshot);
        drop(commit);
        self.notify();
        result
    }

    fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.inner.adapter.save(snapshot) {
            warn!(
                adapter = self.inner.adapter.name(),
                error = %e,
                "Failed to mirror inquiry snapshot; keeping in-memory state"
            );
        }
    }

    /// Call every listener registered right now, in registration order.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    fn notify(&self) {
        let listeners: Vec<(u64, Listener)> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                error!(listener = id, "Inquiry listener panicked during notification");
            }
        }
    }
}

/// Handle returned by [`InquiryStore::subscribe`].
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
#[must_use = "the listener stays registered until `unsubscribe` is called"]
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Deregister the listener. A no-op if the store is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner.remove_listener(self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::inquiry::{InquiryActor, NewInquiry};
    use crate::persistence::{KeyValueAdapter, KeyValueStorage, MemoryStorage};

    fn counter(store: &InquiryStore) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let subscription = store.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, subscription)
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn lazily_initializes_from_seed() {
            let store = InquiryStore::mock_only();
            assert!(!store.is_initialized());

            let snapshot = store.get_snapshot();
            assert!(store.is_initialized());
            assert_eq!(*snapshot, seed_inquiries());
        }

        #[test]
        fn snapshot_is_referentially_stable_between_mutations() {
            let store = InquiryStore::mock_only();
            let first = store.get_snapshot();
            let second = store.get_snapshot();
            assert!(Arc::ptr_eq(&first, &second));

            store.create_inquiry(NewInquiry::new("제목", "내용"));
            let third = store.get_snapshot();
            assert!(!Arc::ptr_eq(&second, &third));
            assert!(Arc::ptr_eq(&third, &store.get_snapshot()));
        }

        #[test]
        fn old_snapshot_is_not_mutated() {
            let store = InquiryStore::mock_only();
            let before = store.get_snapshot();
            store.set_inquiry_status(
                &"inq-1".into(),
                InquiryStatus::Closed,
                StatusChangeOptions::default(),
            );
            assert_eq!(*before, seed_inquiries());
        }

        #[test]
        fn server_snapshot_ignores_mutations() {
            let store = InquiryStore::mock_only();
            let server = store.get_server_snapshot();
            store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert!(Arc::ptr_eq(&server, &store.get_server_snapshot()));
            assert_eq!(server.len(), seed_inquiries().len());
        }

        #[test]
        fn clones_share_state() {
            let store = InquiryStore::mock_only();
            let other = store.clone();
            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert!(other.find(&id).is_some());
        }
    }

    mod subscription_tests {
        use super::*;

        #[test]
        fn listeners_run_after_each_mutation() {
            let store = InquiryStore::mock_only();
            let (count, _subscription) = counter(&store);

            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));
            store.add_inquiry_message(
                &id,
                NewMessage::new(InquiryActor::Instructor, "박지훈", "확인했습니다"),
            );
            assert_eq!(count.load(Ordering::SeqCst), 2);
        }

        #[test]
        fn no_op_mutation_does_not_notify() {
            let store = InquiryStore::mock_only();
            let (count, _subscription) = counter(&store);
            let before = store.get_snapshot();

            assert!(!store.delete_inquiry_message(&"inq-404".into(), &"msg-1".into()));
            assert_eq!(count.load(Ordering::SeqCst), 0);
            assert!(Arc::ptr_eq(&before, &store.get_snapshot()));
        }

        #[test]
        fn same_closure_subscribed_twice_is_independent() {
            let store = InquiryStore::mock_only();
            let count = Arc::new(AtomicUsize::new(0));
            let listener = {
                let count = Arc::clone(&count);
                move || {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            };
            let first = store.subscribe(listener.clone());
            let _second = store.subscribe(listener);

            store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert_eq!(count.load(Ordering::SeqCst), 2);

            first.unsubscribe();
            store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert_eq!(count.load(Ordering::SeqCst), 3);
        }

        #[test]
        fn listeners_run_in_registration_order() {
            let store = InquiryStore::mock_only();
            let order = Arc::new(Mutex::new(Vec::new()));
            let subscriptions: Vec<_> = (0..3)
                .map(|n| {
                    let order = Arc::clone(&order);
                    store.subscribe(move || order.lock().unwrap().push(n))
                })
                .collect();

            store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
            subscriptions.into_iter().for_each(Subscription::unsubscribe);
            assert_eq!(store.listener_count(), 0);
        }

        #[test]
        fn panicking_listener_does_not_block_others() {
            let store = InquiryStore::mock_only();
            let _bad = store.subscribe(|| panic!("listener failure"));
            let (count, _good) = counter(&store);

            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert_eq!(count.load(Ordering::SeqCst), 1);
            assert!(store.find(&id).is_some());
        }

        #[test]
        fn listener_sees_new_snapshot_and_may_reenter() {
            let store = InquiryStore::mock_only();
            let seen = Arc::new(AtomicUsize::new(0));
            let _subscription = {
                let handle = store.clone();
                let seen = Arc::clone(&seen);
                store.subscribe(move || {
                    seen.store(handle.get_snapshot().len(), Ordering::SeqCst);
                })
            };

            store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert_eq!(seen.load(Ordering::SeqCst), seed_inquiries().len() + 1);
        }

        #[test]
        fn unsubscribe_after_store_dropped_is_harmless() {
            let store = InquiryStore::mock_only();
            let subscription = store.subscribe(|| {});
            drop(store);
            subscription.unsubscribe();
        }
    }

    mod persistence_tests {
        use super::*;
        use crate::Error;

        struct FailingAdapter;

        impl PersistenceAdapter for FailingAdapter {
            fn name(&self) -> &'static str {
                "failing"
            }

            fn load(&self) -> Result<Option<Vec<InquiryRecord>>> {
                Err(Error::Config("unreadable".to_string()))
            }

            fn save(&self, _records: &[InquiryRecord]) -> Result<()> {
                Err(Error::QuotaExceeded {
                    key: "inquiries".to_string(),
                    limit: 0,
                })
            }
        }

        /// Key-value adapter whose first save stalls.
        struct SlowFirstSave {
            inner: KeyValueAdapter<MemoryStorage>,
            first: std::sync::atomic::AtomicBool,
        }

        impl PersistenceAdapter for SlowFirstSave {
            fn name(&self) -> &'static str {
                "slow-first-save"
            }

            fn load(&self) -> Result<Option<Vec<InquiryRecord>>> {
                self.inner.load()
            }

            fn save(&self, records: &[InquiryRecord]) -> Result<()> {
                if self.first.swap(false, Ordering::SeqCst) {
                    std::thread::sleep(std::time::Duration::from_millis(300));
                }
                self.inner.save(records)
            }
        }

        #[test]
        fn overlapping_commits_leave_cache_at_latest_snapshot() {
            let storage = MemoryStorage::new();
            let store = InquiryStore::new(SlowFirstSave {
                inner: KeyValueAdapter::new(storage.clone()),
                first: std::sync::atomic::AtomicBool::new(true),
            });
            store.get_snapshot();

            let slow = {
                let store = store.clone();
                std::thread::spawn(move || store.create_inquiry(NewInquiry::new("첫 문의", "내용")))
            };
            std::thread::sleep(std::time::Duration::from_millis(50));
            let fast = {
                let store = store.clone();
                std::thread::spawn(move || store.create_inquiry(NewInquiry::new("둘째 문의", "내용")))
            };
            slow.join().unwrap();
            fast.join().unwrap();

            let cached = KeyValueAdapter::new(storage).load().unwrap().unwrap();
            assert_eq!(cached, *store.get_snapshot());
            assert_eq!(cached.len(), seed_inquiries().len() + 2);
        }

        #[test]
        fn mutations_are_mirrored_to_adapter() {
            let storage = MemoryStorage::new();
            let store = InquiryStore::new(KeyValueAdapter::new(storage.clone()));
            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));

            let reopened = InquiryStore::new(KeyValueAdapter::new(storage));
            assert_eq!(reopened.get_snapshot()[0].id, id);
        }

        #[test]
        fn initialization_prefers_cached_collection() {
            let storage = MemoryStorage::new();
            let mut cached = seed_inquiries();
            cached.truncate(2);
            KeyValueAdapter::new(storage.clone()).save(&cached).unwrap();

            let store = InquiryStore::new(KeyValueAdapter::new(storage));
            assert_eq!(*store.get_snapshot(), cached);
        }

        #[test]
        fn adapter_failures_are_swallowed() {
            let store = InquiryStore::new(FailingAdapter);
            let (count, _subscription) = counter(&store);

            assert_eq!(*store.get_snapshot(), seed_inquiries());
            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));
            assert!(store.find(&id).is_some());
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn quota_exceeded_keeps_memory_state_and_stale_cache() {
            let storage = MemoryStorage::with_quota(64);
            let store = InquiryStore::new(KeyValueAdapter::new(storage.clone()));
            let id = store.create_inquiry(NewInquiry::new("제목", "내용"));

            assert!(store.find(&id).is_some());
            assert!(storage.get_item(crate::persistence::DEFAULT_STORAGE_KEY).unwrap().is_none());
        }
    }
}
