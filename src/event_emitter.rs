use crate::listener::Listener;
use crate::registry::ListenerRegistry;
use crate::{Callback, Context, EventError, EventPayload};

/// The public emitter: a thin facade over [`ListenerRegistry`] that makes
/// dispatch public under the name `emit` and chains the subscribe surface.
/// It adds no behavior of its own.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::sync::Arc;
/// use ns_events::{Callback, EventEmitter};
///
/// let emitter: EventEmitter<String> = EventEmitter::new();
/// let hits = Rc::new(Cell::new(0u32));
///
/// let counter = Rc::clone(&hits);
/// let callback: Callback<String> = Arc::new(move |_, payload| {
///     assert_eq!(payload.as_ref(), "draft");
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// emitter.on("save", Arc::clone(&callback), None);
/// emitter.emit("save", Arc::new("draft".to_string())).unwrap();
/// assert_eq!(hits.get(), 1);
///
/// emitter.off_listener("save", &callback, None);
/// assert!(!emitter.has("save"));
/// ```
pub struct EventEmitter<T> {
    registry: ListenerRegistry<T>,
}

impl<T> EventEmitter<T> {
    /// Creates an emitter with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: ListenerRegistry::new(),
        }
    }

    /// The underlying registry, for callers that want the core surface
    /// (e.g. [`fire`](ListenerRegistry::fire) or [`firing`](ListenerRegistry::firing)).
    pub fn registry(&self) -> &ListenerRegistry<T> {
        &self.registry
    }

    /// Registers a listener. Duplicates (same callback allocation and
    /// context) are ignored. Returns the emitter for chaining.
    pub fn on(&self, key: &str, callback: Callback<T>, context: Option<Context>) -> &Self {
        self.registry.on(key, callback, context);
        self
    }

    /// Registers a one-shot listener: it is deregistered before its first
    /// invocation runs, so a re-entrant emit from inside its own callback
    /// will not invoke it again.
    ///
    /// # Example
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use std::sync::Arc;
    /// use ns_events::{Callback, EventEmitter};
    ///
    /// let emitter: EventEmitter<u32> = EventEmitter::new();
    /// let hits = Rc::new(Cell::new(0u32));
    ///
    /// let counter = Rc::clone(&hits);
    /// let callback: Callback<u32> = Arc::new(move |_, _| {
    ///     counter.set(counter.get() + 1);
    ///     Ok(())
    /// });
    ///
    /// emitter.once("ready", Arc::clone(&callback), None);
    /// emitter.emit("ready", Arc::new(1)).unwrap();
    /// emitter.emit("ready", Arc::new(2)).unwrap();
    /// assert_eq!(hits.get(), 1);
    /// assert!(!emitter.has_listener("ready", &callback, None));
    /// ```
    pub fn once(&self, key: &str, callback: Callback<T>, context: Option<Context>) -> &Self {
        self.registry.once(key, callback, context);
        self
    }

    /// Removes every listener of every event. Safe mid-dispatch: listeners
    /// not yet reached by the running pass are not invoked.
    pub fn off_all(&self) -> &Self {
        self.registry.off_all();
        self
    }

    /// Removes listeners in bulk: by exact event name, or by namespace tag
    /// when the key is namespaced (`"name.ns"` removes everything tagged
    /// `ns`, across all events).
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use ns_events::{Callback, EventEmitter};
    ///
    /// let emitter: EventEmitter<()> = EventEmitter::new();
    /// let a: Callback<()> = Arc::new(|_, _| Ok(()));
    /// let b: Callback<()> = Arc::new(|_, _| Ok(()));
    ///
    /// emitter.on("change.form", a, None).on("change.page", b, None);
    /// emitter.off("change.form");
    /// assert_eq!(emitter.listener_count("change"), 1);
    /// ```
    pub fn off(&self, key: &str) -> &Self {
        self.registry.off(key);
        self
    }

    /// Removes the single listener with matching `(callback, context)`
    /// identity. No-op when nothing matches.
    pub fn off_listener(&self, key: &str, callback: &Callback<T>, context: Option<&Context>) -> &Self {
        self.registry.off_listener(key, callback, context);
        self
    }

    /// Public name for the registry's [`fire`](ListenerRegistry::fire):
    /// synchronous dispatch to all listeners of the event, in registration
    /// order. Returns the emitter on success so dispatch chains; a listener
    /// error propagates immediately.
    pub fn emit(&self, key: &str, payload: EventPayload<T>) -> Result<&Self, EventError> {
        self.registry.fire(key, &payload)?;
        Ok(self)
    }

    /// True iff at least one live listener matches the key (base name plus
    /// optional namespace filter).
    pub fn has(&self, key: &str) -> bool {
        self.registry.has(key)
    }

    /// True iff a live listener matches the `(callback, context)` identity.
    pub fn has_listener(&self, key: &str, callback: &Callback<T>, context: Option<&Context>) -> bool {
        self.registry.has_listener(key, callback, context)
    }

    /// Number of live listeners matching the key.
    pub fn listener_count(&self, key: &str) -> usize {
        self.registry.listener_count(key)
    }

    /// Names of events that currently have live listeners.
    pub fn event_names(&self) -> Vec<String> {
        self.registry.event_names()
    }

    /// Visits every live listener as `(event, callback, context)`. The
    /// visitor must not mutate the emitter.
    pub fn for_each<F>(&self, visitor: F) -> &Self
    where
        F: FnMut(&str, &Callback<T>, Option<&Context>),
    {
        self.registry.for_each(visitor);
        self
    }

    /// Visits every live listener as a raw [`Listener`] record.
    pub fn for_each_meta<F>(&self, visitor: F) -> &Self
    where
        F: FnMut(&Listener<T>),
    {
        self.registry.for_each_meta(visitor);
        self
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter").finish_non_exhaustive()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}
