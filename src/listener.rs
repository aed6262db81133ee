use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::{Callback, Context};

/// One registration: a callback, the event it is attached to, and the
/// optional namespace tag and bound context it was registered with.
///
/// Listeners are created by `on`/`once` and owned by the registry; external
/// code only ever observes them through `for_each_meta`. Identity is the
/// `(callback, context)` pair, compared by `Arc` allocation — the callback
/// value itself is never inspected or cloned into a new allocation.
pub struct Listener<T> {
    event: String,
    namespace: Option<String>,
    callback: Callback<T>,
    context: Option<Context>,
    once: bool,
}

impl<T> Listener<T> {
    pub(crate) fn new(
        event: &str,
        namespace: Option<&str>,
        callback: Callback<T>,
        context: Option<Context>,
        once: bool,
    ) -> Self {
        Self {
            event: event.to_string(),
            namespace: namespace.map(str::to_string),
            callback,
            context,
            once,
        }
    }

    /// Base event name this listener is registered under.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Namespace tag, if the registration key carried one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The callback as registered. For one-shot listeners this is still the
    /// original callback, so identity lookups match what the caller holds.
    pub fn callback(&self) -> &Callback<T> {
        &self.callback
    }

    /// The bound context, if the listener was registered with one.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Whether this listener deregisters itself before its first invocation.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Identity check: same callback allocation and same bound context.
    /// An absent context matches only an absent context.
    pub fn matches(&self, callback: &Callback<T>, context: Option<&Context>) -> bool {
        Arc::ptr_eq(&self.callback, callback) && same_context(self.context.as_ref(), context)
    }
}

pub(crate) fn same_context(a: Option<&Context>, b: Option<&Context>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            namespace: self.namespace.clone(),
            callback: Arc::clone(&self.callback),
            context: self.context.as_ref().map(Arc::clone),
            once: self.once,
        }
    }
}

impl<T> Debug for Listener<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("event", &self.event)
            .field("namespace", &self.namespace)
            .field("once", &self.once)
            .finish()
    }
}

impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.callback, other.context.as_ref())
    }
}

impl<T> Eq for Listener<T> {}
