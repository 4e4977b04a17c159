//! Lifecycle-aware observable values.
//!
//! A [`LiveData`] holds the latest value published by a producer and hands it to every observer
//! registered against a live [`Lifecycle`]. Destroying the lifecycle (or dropping every handle to
//! it) deregisters its observers, so results arriving after a screen is gone are never delivered.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

/// Work to run when a lifecycle ends, dropped early once `is_stale` holds.
struct Cleanup {
    is_stale: Box<dyn Fn() -> bool + Send>,
    run: Box<dyn FnOnce() + Send>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LifecycleInner {
    destroyed: AtomicBool,
    cleanups: Mutex<Vec<Cleanup>>,
}

impl LifecycleInner {
    fn run_cleanups(&self) {
        let cleanups = std::mem::take(&mut *lock(&self.cleanups));
        for cleanup in cleanups {
            (cleanup.run)();
        }
    }
}

impl Drop for LifecycleInner {
    fn drop(&mut self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.run_cleanups();
    }
}

/// Scope that observers are bound to, such as the view of a screen.
///
/// Handles are cheap to clone and share the same state.
#[derive(Clone)]
pub struct Lifecycle {
    inner: Arc<LifecycleInner>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            inner: Arc::new(LifecycleInner {
                destroyed: AtomicBool::new(false),
                cleanups: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    /// Deregister every observer bound to this lifecycle.
    ///
    /// Destroying twice is a no-op.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.run_cleanups();
    }

    /// Run `cleanup` on destruction.
    ///
    /// Returns `false`, without keeping `cleanup`, if the lifecycle is already destroyed.
    /// Stale cleanups registered earlier are dropped on the way.
    fn on_destroy(&self, cleanup: Cleanup) -> bool {
        let mut cleanups = lock(&self.inner.cleanups);
        if self.is_destroyed() {
            return false;
        }
        cleanups.retain(|c| !(c.is_stale)());
        cleanups.push(cleanup);
        true
    }

    #[cfg(test)]
    pub(crate) fn pending_cleanups(&self) -> usize {
        lock(&self.inner.cleanups).len()
    }

    fn downgrade(&self) -> Weak<LifecycleInner> {
        Arc::downgrade(&self.inner)
    }
}

#[derive(Default)]
struct DeliveryState {
    /// Version of the last value handed to the callback.
    version: u64,
    delivering: Option<ThreadId>,
}

/// Serializes the calls to one observer.
#[derive(Default)]
struct Delivery {
    state: Mutex<DeliveryState>,
    done: Condvar,
}

struct DeliveryGuard<'a>(&'a Delivery);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        lock(&self.0.state).delivering = None;
        self.0.done.notify_all();
    }
}

struct Observer<T> {
    id: u64,
    owner: Weak<LifecycleInner>,
    callback: Arc<dyn Fn(&T) + Send + Sync>,
    delivery: Arc<Delivery>,
}

impl<T> Observer<T> {
    fn is_active(&self) -> bool {
        self.owner
            .upgrade()
            .map(|owner| !owner.destroyed.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Call back with `value`, published as `version`, unless a newer value already went out.
    ///
    /// Waits while another thread is calling this observer. A publish made from inside the
    /// callback is delivered right away on the same thread.
    fn deliver(&self, version: u64, value: &T) {
        let current = thread::current().id();
        let mut state = lock(&self.delivery.state);
        while matches!(state.delivering, Some(other) if other != current) {
            state = self
                .delivery
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if version <= state.version || !self.is_active() {
            return;
        }
        state.version = version;
        if state.delivering == Some(current) {
            drop(state);
            (self.callback)(value);
            return;
        }
        state.delivering = Some(current);
        drop(state);
        let _guard = DeliveryGuard(&self.delivery);
        (self.callback)(value);
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Observer {
            id: self.id,
            owner: self.owner.clone(),
            callback: self.callback.clone(),
            delivery: self.delivery.clone(),
        }
    }
}

struct LiveDataInner<T> {
    value: Option<T>,
    /// Bumped on every publish.
    version: u64,
    observers: Vec<Observer<T>>,
    next_id: u64,
}

/// Observable holder of the latest value.
///
/// Clones share the same value and observers.
pub struct LiveData<T> {
    inner: Arc<Mutex<LiveDataInner<T>>>,
}

impl<T> Clone for LiveData<T> {
    fn clone(&self) -> Self {
        LiveData {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for LiveData<T> {
    fn default() -> Self {
        Self::new()
    }
}

static OBSERVER_IDS: AtomicU64 = AtomicU64::new(0);

impl<T: Clone + Send + 'static> LiveData<T> {
    pub fn new() -> Self {
        LiveData {
            inner: Arc::new(Mutex::new(LiveDataInner {
                value: None,
                version: 0,
                observers: Vec::new(),
                next_id: OBSERVER_IDS.fetch_add(1, Ordering::Relaxed) << 32,
            })),
        }
    }

    pub fn with_value(value: T) -> Self {
        let live_data = Self::new();
        {
            let mut inner = lock(&live_data.inner);
            inner.value = Some(value);
            inner.version = 1;
        }
        live_data
    }

    /// Latest published value, if any.
    pub fn value(&self) -> Option<T> {
        lock(&self.inner).value.clone()
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }

    pub fn has_observers(&self) -> bool {
        self.observer_count() > 0
    }

    /// Register `callback` for as long as `owner` lives.
    ///
    /// If a value was already published, `callback` receives it right away, unless a newer
    /// value published meanwhile reached it first. Observing with a destroyed lifecycle does
    /// nothing.
    pub fn observe<F>(&self, owner: &Lifecycle, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        if owner.is_destroyed() {
            return;
        }
        let (observer, version, current) = {
            let mut inner = lock(&self.inner);
            let observer = Observer {
                id: inner.next_id,
                owner: owner.downgrade(),
                callback: Arc::new(callback),
                delivery: Arc::default(),
            };
            inner.next_id += 1;
            inner.observers.push(observer.clone());
            (observer, inner.version, inner.value.clone())
        };

        let id = observer.id;
        let weak = Arc::downgrade(&self.inner);
        let alive = weak.clone();
        let registered = owner.on_destroy(Cleanup {
            is_stale: Box::new(move || alive.strong_count() == 0),
            run: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).observers.retain(|o| o.id != id);
                }
            }),
        });
        if !registered {
            lock(&self.inner).observers.retain(|o| o.id != id);
            return;
        }

        if let Some(value) = current {
            observer.deliver(version, &value);
        }
    }

    /// Publish a new value and notify every active observer.
    ///
    /// Observers run on the calling thread, after the internal lock is released, so they may
    /// read or publish values themselves.
    pub fn set(&self, value: T) {
        let (version, observers) = {
            let mut inner = lock(&self.inner);
            inner.value = Some(value.clone());
            inner.version += 1;
            (inner.version, inner.observers.clone())
        };
        for observer in observers {
            observer.deliver(version, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(&u32) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &u32| sink.lock().unwrap().push(*v))
    }

    #[test]
    fn notify_observers() {
        let live = LiveData::new();
        let owner = Lifecycle::new();
        let (seen, callback) = recorder();
        live.observe(&owner, callback);
        live.set(1);
        live.set(2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(live.value(), Some(2));
    }

    #[test]
    fn deliver_current_value_on_observe() {
        let live = LiveData::with_value(7);
        let owner = Lifecycle::new();
        let (seen, callback) = recorder();
        live.observe(&owner, callback);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn destroy_deregisters() {
        let live = LiveData::new();
        let owner = Lifecycle::new();
        let (seen, callback) = recorder();
        live.observe(&owner, callback);
        assert_eq!(live.observer_count(), 1);
        owner.destroy();
        owner.destroy();
        assert!(!live.has_observers());
        live.set(3);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn observe_after_destroy_is_ignored() {
        let live = LiveData::with_value(1);
        let owner = Lifecycle::new();
        owner.destroy();
        let (seen, callback) = recorder();
        live.observe(&owner, callback);
        assert_eq!(live.observer_count(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn dropping_lifecycle_deregisters() {
        let live = LiveData::new();
        let (seen, callback) = recorder();
        {
            let owner = Lifecycle::new();
            live.observe(&owner, callback);
            live.set(1);
        }
        live.set(2);
        assert_eq!(live.observer_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn lifecycles_are_independent() {
        let live = LiveData::new();
        let screen1 = Lifecycle::new();
        let screen2 = Lifecycle::new();
        let (seen1, callback1) = recorder();
        let (seen2, callback2) = recorder();
        live.observe(&screen1, callback1);
        live.observe(&screen2, callback2);
        screen1.destroy();
        live.set(5);
        assert!(seen1.lock().unwrap().is_empty());
        assert_eq!(*seen2.lock().unwrap(), vec![5]);
    }

    #[test]
    fn observer_may_publish() {
        let live: LiveData<u32> = LiveData::new();
        let echo: LiveData<u32> = LiveData::new();
        let owner = Lifecycle::new();
        let echo_clone = echo.clone();
        live.observe(&owner, move |v| echo_clone.set(v * 10));
        live.set(4);
        assert_eq!(echo.value(), Some(40));
    }

    #[test]
    fn observer_may_publish_to_itself() {
        let live: LiveData<u32> = LiveData::new();
        let owner = Lifecycle::new();
        let (seen, record) = recorder();
        let publisher = live.clone();
        live.observe(&owner, move |v| {
            record(v);
            if *v < 3 {
                publisher.set(v + 1);
            }
        });
        live.set(1);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(live.value(), Some(3));
    }

    #[test]
    fn concurrent_set_never_leaves_observer_stale() {
        for _ in 0..2000 {
            let live = LiveData::with_value(0);
            let owner = Lifecycle::new();
            let (seen, callback) = recorder();
            let publisher = live.clone();
            let handle = thread::spawn(move || publisher.set(1));
            live.observe(&owner, callback);
            handle.join().unwrap();

            let seen = seen.lock().unwrap();
            assert_eq!(seen.last(), Some(&1), "observer saw {:?}", *seen);
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(live.value(), Some(1));
        }
    }

    #[test]
    fn dropped_live_data_releases_cleanups() {
        let owner = Lifecycle::new();
        for _ in 0..10 {
            let live = LiveData::with_value(1u32);
            live.observe(&owner, |_| {});
        }
        let live: LiveData<u32> = LiveData::new();
        live.observe(&owner, |_| {});
        assert_eq!(owner.pending_cleanups(), 1);
        owner.destroy();
        assert!(!live.has_observers());
    }
}
