//! Generic single-value state container.
//!
//! A [`Store`] holds exactly one value of `S`. Readers get an immutable
//! snapshot (`Rc<S>`); writers go through [`Store::update`] or an
//! [`Updater`]. Every update replaces the snapshot wholesale, so a reader never
//! sees half of an update.
//!
//! # Scoped updaters
//!
//! ```text
//!   Updater<AppState>  ──project(game)──▶  Updater<GameBranch>
//!                                              │
//!                                   project(current_row_class)
//!                                              ▼
//!                                        Updater<RowClass>
//! ```
//!
//! A projected updater rewrites one field of its parent and copies every
//! sibling across untouched. Two updaters are equal when they write to the same
//! path of the same store, so projecting the same key twice from the same
//! parent always yields equal updaters.
//!
//! The container is single-threaded (`Rc`/`RefCell`). Updater closures must be
//! pure over the snapshot they are handed: an update issued from inside another
//! update's closure is overwritten when the outer one commits.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A pending change: either a replacement value or a function of the
/// previous value.
pub enum Update<T> {
    Replace(T),
    With(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    pub fn with(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::With(Box::new(f))
    }

    /// Produce the next value from `prev`.
    pub fn resolve(self, prev: &T) -> T {
        match self {
            Self::Replace(value) => value,
            Self::With(f) => f(prev),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Names one field of `P` holding a `T`.
pub struct Key<P, T> {
    name: &'static str,
    get: fn(&P) -> &T,
    get_mut: fn(&mut P) -> &mut T,
}

impl<P, T> Key<P, T> {
    pub fn new(name: &'static str, get: fn(&P) -> &T, get_mut: fn(&mut P) -> &mut T) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, parent: &'a P) -> &'a T {
        (self.get)(parent)
    }

    pub fn get_mut<'a>(&self, parent: &'a mut P) -> &'a mut T {
        (self.get_mut)(parent)
    }
}

impl<P, T> Clone for Key<P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for Key<P, T> {}

impl<P, T> fmt::Debug for Key<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Write handle for a value inside a [`Store`].
///
/// Cloning is cheap. An updater outliving its store silently does nothing.
pub struct Updater<T> {
    /// Identity of the owning store.
    origin: Rc<()>,
    /// Dotted field path from the root; empty for the root itself.
    path: Rc<str>,
    apply: Rc<dyn Fn(Update<T>)>,
}

impl<T> Clone for Updater<T> {
    fn clone(&self) -> Self {
        Self {
            origin: Rc::clone(&self.origin),
            path: Rc::clone(&self.path),
            apply: Rc::clone(&self.apply),
        }
    }
}

impl<T> PartialEq for Updater<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.origin, &other.origin) && self.path == other.path
    }
}

impl<T> Eq for Updater<T> {}

impl<T> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater").field("path", &self.path).finish()
    }
}

impl<T: 'static> Updater<T> {
    /// Replace the value outright.
    pub fn set(&self, value: T) {
        (self.apply)(Update::Replace(value));
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        (self.apply)(Update::with(f));
    }

    pub fn apply(&self, update: Update<T>) {
        (self.apply)(update);
    }

    /// Dotted path this updater writes to, e.g. `game.current_row_class`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when both updaters write to the same place in the same store.
    pub fn same_target(&self, other: &Self) -> bool {
        self == other
    }

    /// Scope this updater down to one field.
    ///
    /// The result writes only `key`, leaving sibling fields as they were in
    /// the snapshot the write was applied to.
    pub fn project<U: 'static>(&self, key: Key<T, U>) -> Updater<U>
    where
        T: Clone,
    {
        let path: Rc<str> = if self.path.is_empty() {
            Rc::from(key.name())
        } else {
            Rc::from(format!("{}.{}", self.path, key.name()))
        };
        let parent = self.clone();

        Updater {
            origin: Rc::clone(&self.origin),
            path,
            apply: Rc::new(move |update: Update<U>| {
                parent.update(move |prev: &T| {
                    let value = update.resolve(key.get(prev));
                    let mut next = prev.clone();
                    *key.get_mut(&mut next) = value;
                    next
                });
            }),
        }
    }
}

type Listener<S> = Rc<dyn Fn(&S)>;

struct StoreInner<S> {
    state: RefCell<Rc<S>>,
    listeners: RefCell<Vec<(u64, Listener<S>)>>,
    next_listener_id: Cell<u64>,
    origin: Rc<()>,
}

/// Holds the single current value of `S`.
pub struct Store<S> {
    inner: Rc<StoreInner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<S: Clone + PartialEq + 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(Rc::new(initial)),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                origin: Rc::new(()),
            }),
        }
    }

    /// Current value. Later updates do not affect a snapshot already taken.
    pub fn snapshot(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Apply an update, notifying subscribers if the value changed.
    ///
    /// Returns whether anything changed.
    pub fn update(&self, update: impl Into<Update<S>>) -> bool {
        let prev = self.snapshot();
        let next = update.into().resolve(&prev);
        if next == *prev {
            return false;
        }

        *self.inner.state.borrow_mut() = Rc::new(next);
        self.notify();
        true
    }

    /// Root updater. Equal to every other root updater of this store.
    pub fn updater(&self) -> Updater<S> {
        let weak: Weak<StoreInner<S>> = Rc::downgrade(&self.inner);
        Updater {
            origin: Rc::clone(&self.inner.origin),
            path: Rc::from(""),
            apply: Rc::new(move |update: Update<S>| match weak.upgrade() {
                Some(inner) => {
                    Store { inner }.update(update);
                }
                None => tracing::debug!("update dropped, store is gone"),
            }),
        }
    }

    /// Watch the part of the state picked out by `select`.
    ///
    /// `on_change` runs after an update only when the selected value differs
    /// from the last one seen, so unrelated branches never wake it. Dropping
    /// the returned [`Subscription`] unsubscribes.
    pub fn subscribe<T, F, C>(&self, select: F, on_change: C) -> Subscription
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&S) -> T + 'static,
        C: Fn(&T) + 'static,
    {
        let last = RefCell::new(select(&self.snapshot()));
        let listener: Listener<S> = Rc::new(move |state: &S| {
            let value = select(state);
            let previous = last.replace(value.clone());
            if previous != value {
                on_change(&value);
            }
        });

        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        // A listener may update the store again; later listeners then see
        // the newest value rather than the one that triggered this pass.
        for listener in listeners {
            let current = self.snapshot();
            listener(&current);
        }
    }
}

/// Keeps a [`Store::subscribe`] listener registered until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the listener for the lifetime of the store.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Inner {
        flag: bool,
        label: String,
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Root {
        inner: Inner,
        count: u32,
    }

    fn inner_key() -> Key<Root, Inner> {
        Key::new("inner", |r| &r.inner, |r| &mut r.inner)
    }

    fn flag_key() -> Key<Inner, bool> {
        Key::new("flag", |i| &i.flag, |i| &mut i.flag)
    }

    fn nested_flag_key() -> Key<Root, bool> {
        Key::new("inner.flag", |r| &r.inner.flag, |r| &mut r.inner.flag)
    }

    fn sample() -> Root {
        Root {
            inner: Inner {
                flag: false,
                label: "keep".to_string(),
            },
            count: 7,
        }
    }

    #[test]
    fn test_update_replace_and_fn() {
        let store = Store::new(0u32);

        assert!(store.update(5u32));
        assert_eq!(*store.snapshot(), 5);

        assert!(store.update(Update::with(|n: &u32| n + 1)));
        assert_eq!(*store.snapshot(), 6);

        // equal value is not a change
        assert!(!store.update(6u32));
    }

    #[test]
    fn test_snapshot_is_stable() {
        let store = Store::new(sample());
        let before = store.snapshot();

        store.updater().update(|r: &Root| Root {
            count: r.count + 1,
            ..r.clone()
        });

        assert_eq!(before.count, 7);
        assert_eq!(store.snapshot().count, 8);
    }

    #[test]
    fn test_project_preserves_siblings() {
        let store = Store::new(sample());
        let inner = store.updater().project(inner_key());

        inner.update(|i: &Inner| Inner {
            flag: true,
            ..i.clone()
        });

        assert_eq!(
            *store.snapshot(),
            Root {
                inner: Inner {
                    flag: true,
                    label: "keep".to_string(),
                },
                count: 7,
            }
        );
    }

    #[test]
    fn test_two_level_projection_matches_direct_key() {
        let stepwise = Store::new(sample());
        let direct = Store::new(sample());

        let two_level = stepwise.updater().project(inner_key()).project(flag_key());
        let one_level = direct.updater().project(nested_flag_key());
        assert_eq!(two_level.path(), "inner.flag");
        assert_eq!(one_level.path(), "inner.flag");

        two_level.update(|f: &bool| !f);
        one_level.update(|f: &bool| !f);
        assert_eq!(*stepwise.snapshot(), *direct.snapshot());

        two_level.set(false);
        one_level.set(false);
        assert_eq!(*stepwise.snapshot(), *direct.snapshot());
        assert_eq!(stepwise.snapshot().inner.label, "keep");
        assert_eq!(stepwise.snapshot().count, 7);
    }

    #[test]
    fn test_projection_identity_is_stable() {
        let store = Store::new(sample());
        let root = store.updater();

        assert_eq!(root, store.updater());
        assert_eq!(root.project(inner_key()), root.project(inner_key()));
        assert_eq!(
            root.project(inner_key()).project(flag_key()),
            store.updater().project(inner_key()).project(flag_key())
        );

        let other = Store::new(sample());
        assert_ne!(root.project(inner_key()), other.updater().project(inner_key()));
    }

    #[test]
    fn test_selective_subscription() {
        let store = Store::new(sample());
        let flag_changes = Rc::new(Cell::new(0));
        let count_changes = Rc::new(Cell::new(0));

        let seen = Rc::clone(&flag_changes);
        let _flag_sub = store.subscribe(|r: &Root| r.inner.flag, move |_| seen.set(seen.get() + 1));
        let seen = Rc::clone(&count_changes);
        let _count_sub = store.subscribe(|r: &Root| r.count, move |_| seen.set(seen.get() + 1));

        let count_key: Key<Root, u32> = Key::new("count", |r| &r.count, |r| &mut r.count);
        let count = store.updater().project(count_key);
        count.set(8);
        count.set(9);
        assert_eq!(count_changes.get(), 2);
        assert_eq!(flag_changes.get(), 0);

        store.updater().project(nested_flag_key()).set(true);
        assert_eq!(flag_changes.get(), 1);
        assert_eq!(count_changes.get(), 2);
    }

    #[test]
    fn test_unsubscribe_on_drop() {
        let store = Store::new(0u32);
        let hits = Rc::new(Cell::new(0));

        let seen = Rc::clone(&hits);
        let sub = store.subscribe(|n: &u32| *n, move |_| seen.set(seen.get() + 1));
        assert_eq!(store.subscriber_count(), 1);

        store.update(1u32);
        drop(sub);
        store.update(2u32);

        assert_eq!(hits.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_detached_subscription_survives() {
        let store = Store::new(0u32);
        let hits = Rc::new(Cell::new(0));

        let seen = Rc::clone(&hits);
        store
            .subscribe(|n: &u32| *n, move |_| seen.set(seen.get() + 1))
            .detach();

        store.update(1u32);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_listener_may_update_store() {
        let store = Store::new(0u32);
        let updater = store.updater();

        // clamp anything above 10 back down
        store
            .subscribe(|n: &u32| *n, move |n| {
                if *n > 10 {
                    updater.set(10);
                }
            })
            .detach();

        let last_seen = Rc::new(Cell::new(0));
        let seen = Rc::clone(&last_seen);
        store.subscribe(|n: &u32| *n, move |n| seen.set(*n)).detach();

        store.update(42u32);
        assert_eq!(*store.snapshot(), 10);
        assert_eq!(last_seen.get(), 10);
    }

    #[test]
    fn test_updater_outliving_store_is_inert() {
        let updater = {
            let store = Store::new(0u32);
            store.updater()
        };
        updater.set(3);
        assert_eq!(updater.path(), "");
    }
}
