use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::key::EventKey;
use crate::listener::Listener;
use crate::{Callback, Context, EventError, EventPayload};

/// Per-event listener storage. A `None` slot is a tombstone: a record
/// removed while a dispatch over this list was in progress, left in place
/// so indices already captured by that pass stay valid.
type Slots<T> = Vec<Option<Listener<T>>>;

/// The listener registry and dispatch engine.
///
/// Owns, per event name, the ordered sequence of listener records, plus a
/// secondary index from namespace tag to the records carrying that tag.
/// Registration order is dispatch order.
///
/// All methods take `&self`: state lives behind `RefCell`/`Cell` and every
/// borrow is released before a callback runs, so a listener may call back
/// into the same registry (`on`, `off`, `fire`) from inside a dispatch.
/// Removal is firing-aware — while a dispatch is running, by-name removal
/// tombstones the slot instead of splicing it, and the dispatch loop skips
/// and compacts tombstones itself.
///
/// Not thread-safe: callbacks and contexts carry no `Send`/`Sync` bounds,
/// so instances are confined to the thread that owns them.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use ns_events::{Callback, ListenerRegistry};
///
/// let registry: ListenerRegistry<u32> = ListenerRegistry::new();
/// let callback: Callback<u32> = Arc::new(|_, payload| {
///     assert_eq!(**payload, 7);
///     Ok(())
/// });
/// registry.on("tick", Arc::clone(&callback), None);
/// registry.fire("tick", &Arc::new(7)).unwrap();
/// assert!(registry.has_listener("tick", &callback, None));
/// ```
pub struct ListenerRegistry<T> {
    by_name: RefCell<BTreeMap<String, Slots<T>>>,
    by_namespace: RefCell<BTreeMap<String, Vec<Listener<T>>>>,
    depth: Cell<u32>,
}

impl<T> ListenerRegistry<T> {
    /// Creates an empty registry. All state is initialized here; no method
    /// lazily creates storage.
    pub fn new() -> Self {
        Self {
            by_name: RefCell::new(BTreeMap::new()),
            by_namespace: RefCell::new(BTreeMap::new()),
            depth: Cell::new(0),
        }
    }

    /// True while a `fire` call on this registry is invoking listeners,
    /// including re-entrant passes started from inside a listener.
    pub fn firing(&self) -> bool {
        self.depth.get() > 0
    }

    /// Registers `callback` for the event named by `key`.
    ///
    /// If a listener with the same `(callback, context)` identity is already
    /// attached to the event, nothing happens. A listener registered while
    /// its own event is being dispatched is invoked before that pass ends.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use ns_events::{Callback, ListenerRegistry};
    ///
    /// let registry: ListenerRegistry<String> = ListenerRegistry::new();
    /// let callback: Callback<String> = Arc::new(|_, _| Ok(()));
    /// registry.on("save", Arc::clone(&callback), None);
    /// registry.on("save", Arc::clone(&callback), None); // duplicate, ignored
    /// assert_eq!(registry.listener_count("save"), 1);
    /// ```
    pub fn on(&self, key: &str, callback: Callback<T>, context: Option<Context>) {
        self.register(key, callback, context, false);
    }

    /// Registers `callback` as a one-shot listener: on its first invocation
    /// the record is deregistered (by the original `(callback, context)`
    /// identity) before the callback body runs. Duplicate suppression works
    /// exactly as for [`on`](Self::on).
    pub fn once(&self, key: &str, callback: Callback<T>, context: Option<Context>) {
        self.register(key, callback, context, true);
    }

    fn register(&self, key: &str, callback: Callback<T>, context: Option<Context>, once: bool) {
        let key = EventKey::parse(key);
        let mut names = self.by_name.borrow_mut();
        let slots = names.entry(key.name.to_string()).or_default();
        if slots
            .iter()
            .flatten()
            .any(|listener| listener.matches(&callback, context.as_ref()))
        {
            trace!("duplicate listener for `{}` ignored", key.name);
            return;
        }

        let listener = Listener::new(key.name, key.namespace, callback, context, once);
        if let Some(namespace) = key.namespace {
            self.by_namespace
                .borrow_mut()
                .entry(namespace.to_string())
                .or_default()
                .push(listener.clone());
        }
        slots.push(Some(listener));
        trace!("listener registered for `{}`", key.name);
    }

    /// Removes every listener of every event.
    ///
    /// Safe to call from inside a dispatch: the by-name lists are truncated
    /// in place so the running pass sees an empty list instead of a dangling
    /// one. The namespace index is cleared outright in both cases.
    pub fn off_all(&self) {
        debug!("clearing all listeners");
        {
            let mut names = self.by_name.borrow_mut();
            if self.firing() {
                for slots in names.values_mut() {
                    slots.clear();
                }
            } else {
                names.clear();
            }
        }
        self.by_namespace.borrow_mut().clear();
    }

    /// Removes listeners in bulk.
    ///
    /// With a plain event name, removes every listener of that event. With a
    /// namespaced key (`"name.ns"`), removes every listener tagged `ns`
    /// across all events — the base name is not consulted; the tag alone
    /// selects. Namespace buckets are spliced immediately even while firing;
    /// only the by-name lists defer physical removal to the running pass.
    pub fn off(&self, key: &str) {
        let key = EventKey::parse(key);
        match key.namespace {
            Some(namespace) => self.purge_namespace(namespace),
            None => self.clear_event(key.name),
        }
    }

    /// Removes the single listener of `key`'s event with matching
    /// `(callback, context)` identity. A context of `None` matches only
    /// listeners registered without a context. No-op when nothing matches.
    pub fn off_listener(&self, key: &str, callback: &Callback<T>, context: Option<&Context>) {
        let name = EventKey::parse(key).name;
        self.remove_single(name, callback, context);
    }

    /// Dispatches an event synchronously to all currently-registered
    /// listeners of `key`'s base name, in registration order.
    ///
    /// Listeners appended to this event from inside the pass are reached by
    /// the same pass (the live length is re-read every step); listeners
    /// removed mid-pass are never invoked once removed. A listener error
    /// aborts the pass and propagates as [`EventError::Listener`]; the
    /// firing state is restored on every exit path, so subsequent dispatches
    /// behave normally. An event with no listeners is a no-op, not an error.
    pub fn fire(&self, key: &str, payload: &EventPayload<T>) -> Result<(), EventError> {
        let name = EventKey::parse(key).name;
        if self.by_name.borrow().get(name).is_none_or(Vec::is_empty) {
            return Ok(());
        }

        // Restores the pre-call firing state on every exit path, including
        // unwinds out of a panicking listener.
        let _guard = FiringGuard::enter(&self.depth);

        let mut index = 0;
        loop {
            let current = {
                let mut names = self.by_name.borrow_mut();
                let Some(slots) = names.get_mut(name) else { break };
                if index >= slots.len() {
                    break;
                }
                if let Some(listener) = &slots[index] {
                    Some((
                        Arc::clone(listener.callback()),
                        listener.context().map(Arc::clone),
                        listener.is_once(),
                    ))
                } else {
                    // Tombstone: splice it out and retry this index.
                    slots.remove(index);
                    None
                }
            };
            let Some((callback, context, once)) = current else {
                continue;
            };

            if once {
                self.remove_single(name, &callback, context.as_ref());
            }
            if let Err(source) = callback(context.as_ref(), payload) {
                debug!("listener for `{name}` failed: {source}");
                return Err(EventError::Listener {
                    event: name.to_string(),
                    source,
                });
            }
            index += 1;
        }

        self.finish_pass(name);
        Ok(())
    }

    /// True iff at least one live listener matches `key` — its base name,
    /// and its namespace when the key carries one. Tombstones left by an
    /// in-progress dispatch are never counted.
    pub fn has(&self, key: &str) -> bool {
        self.listener_count(key) > 0
    }

    /// True iff a live listener of `key`'s event matches the
    /// `(callback, context)` identity.
    pub fn has_listener(&self, key: &str, callback: &Callback<T>, context: Option<&Context>) -> bool {
        let name = EventKey::parse(key).name;
        self.by_name.borrow().get(name).is_some_and(|slots| {
            slots
                .iter()
                .flatten()
                .any(|listener| listener.matches(callback, context))
        })
    }

    /// Number of live listeners matching `key` (base name, plus namespace
    /// filter when the key carries one).
    pub fn listener_count(&self, key: &str) -> usize {
        let key = EventKey::parse(key);
        self.by_name.borrow().get(key.name).map_or(0, |slots| {
            slots
                .iter()
                .flatten()
                .filter(|listener| match key.namespace {
                    Some(namespace) => listener.namespace() == Some(namespace),
                    None => true,
                })
                .count()
        })
    }

    /// Names of events that currently have one or more live listeners.
    pub fn event_names(&self) -> Vec<String> {
        self.by_name
            .borrow()
            .iter()
            .filter(|(_, slots)| slots.iter().any(Option::is_some))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Visits every live listener as `(event, callback, context)`, event
    /// names in sorted order, registration order within each event.
    ///
    /// The visitor must not mutate the registry; doing so is unsupported
    /// and aborts with a borrow panic.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &Callback<T>, Option<&Context>),
    {
        let names = self.by_name.borrow();
        for (name, slots) in names.iter() {
            for listener in slots.iter().flatten() {
                visitor(name, listener.callback(), listener.context());
            }
        }
    }

    /// Like [`for_each`](Self::for_each) but hands the visitor the raw
    /// [`Listener`] record. Same ordering, same no-mutation rule.
    pub fn for_each_meta<F>(&self, mut visitor: F)
    where
        F: FnMut(&Listener<T>),
    {
        let names = self.by_name.borrow();
        for slots in names.values() {
            for listener in slots.iter().flatten() {
                visitor(listener);
            }
        }
    }

    /// Removes every listener of one event. Truncates in place while
    /// firing; deletes the map entry otherwise. The namespace index drops
    /// the event's records immediately in both cases.
    fn clear_event(&self, name: &str) {
        debug!("clearing listeners for `{name}`");
        {
            let mut names = self.by_name.borrow_mut();
            if self.firing() {
                if let Some(slots) = names.get_mut(name) {
                    slots.clear();
                }
            } else {
                names.remove(name);
            }
        }
        let mut spaces = self.by_namespace.borrow_mut();
        spaces.retain(|_, bucket| {
            bucket.retain(|listener| listener.event() != name);
            !bucket.is_empty()
        });
    }

    /// Removes every listener tagged `namespace`, wherever it lives. The
    /// namespace bucket goes away immediately; the by-name records are
    /// tombstoned while firing, spliced otherwise.
    fn purge_namespace(&self, namespace: &str) {
        let Some(bucket) = self.by_namespace.borrow_mut().remove(namespace) else {
            return;
        };
        debug!("purging {} listener(s) tagged `{namespace}`", bucket.len());
        let firing = self.firing();
        let mut names = self.by_name.borrow_mut();
        for handle in bucket {
            let Some(slots) = names.get_mut(handle.event()) else {
                continue;
            };
            let Some(index) = slots.iter().position(|slot| {
                slot.as_ref()
                    .is_some_and(|l| l.matches(handle.callback(), handle.context()))
            }) else {
                continue;
            };
            if firing {
                slots[index] = None;
            } else {
                slots.remove(index);
                let empty = slots.is_empty();
                if empty {
                    names.remove(handle.event());
                }
            }
        }
    }

    /// Removes one record by identity. While firing the slot becomes a
    /// tombstone so the in-flight pass keeps its indices; otherwise the
    /// record is spliced and an emptied event entry is deleted. The
    /// record's namespace entry is spliced immediately either way.
    fn remove_single(&self, name: &str, callback: &Callback<T>, context: Option<&Context>) {
        let namespace = {
            let mut names = self.by_name.borrow_mut();
            let Some(slots) = names.get_mut(name) else {
                return;
            };
            let Some(index) = slots.iter().position(|slot| {
                slot.as_ref().is_some_and(|l| l.matches(callback, context))
            }) else {
                return;
            };
            let namespace = slots[index]
                .as_ref()
                .and_then(|l| l.namespace().map(str::to_string));
            if self.firing() {
                slots[index] = None;
            } else {
                slots.remove(index);
                let empty = slots.is_empty();
                if empty {
                    names.remove(name);
                }
            }
            namespace
        };
        trace!("listener removed from `{name}`");
        if let Some(namespace) = namespace {
            self.drop_namespace_entry(&namespace, name, callback, context);
        }
    }

    fn drop_namespace_entry(
        &self,
        namespace: &str,
        event: &str,
        callback: &Callback<T>,
        context: Option<&Context>,
    ) {
        let mut spaces = self.by_namespace.borrow_mut();
        if let Some(bucket) = spaces.get_mut(namespace) {
            if let Some(index) = bucket
                .iter()
                .position(|l| l.event() == event && l.matches(callback, context))
            {
                bucket.remove(index);
            }
            let empty = bucket.is_empty();
            if empty {
                spaces.remove(namespace);
            }
        }
    }

    /// End-of-pass bookkeeping: compact remaining tombstones (outermost
    /// pass only, so an outer pass over the same list never has stable
    /// indices pulled out from under it) and delete the entry if the list
    /// ended up empty.
    fn finish_pass(&self, name: &str) {
        let mut names = self.by_name.borrow_mut();
        let Some(slots) = names.get_mut(name) else {
            return;
        };
        if self.depth.get() == 1 {
            slots.retain(Option::is_some);
        }
        let empty = slots.is_empty();
        if empty {
            names.remove(name);
        }
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            by_name: self.by_name.clone(),
            by_namespace: self.by_namespace.clone(),
            // The firing state belongs to the running pass, not the data.
            depth: Cell::new(0),
        }
    }
}

/// Increments the re-entrancy depth for the duration of one dispatch pass;
/// the `Drop` impl restores it on normal return, error return, and unwind.
struct FiringGuard<'a> {
    depth: &'a Cell<u32>,
}

impl<'a> FiringGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for FiringGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}
