use std::any::Any;
use std::error::Error;
use std::sync::Arc;

/// Type alias for an event payload pointer.
///
/// Emitting clones the `Arc`, never the payload itself, so a single payload
/// value is shared by every listener of a dispatch pass.
///
/// # Example
/// ```
/// use ns_events::EventPayload;
///
/// let payload: EventPayload<String> = EventPayload::new(String::from("clicked"));
/// assert_eq!(payload.as_ref(), "clicked");
/// ```
pub type EventPayload<T> = Arc<T>;

/// Outcome of a single listener invocation.
///
/// An `Err` aborts the dispatch pass that invoked the listener and
/// propagates to the `emit` caller as [`EventError::Listener`]; the
/// remaining listeners of that pass are not invoked.
///
/// [`EventError::Listener`]: crate::EventError::Listener
pub type CallbackResult = Result<(), Box<dyn Error>>;

/// The optional receiver a listener is bound to.
///
/// Contexts are identity-compared (`Arc::ptr_eq`), together with the
/// callback, to decide whether two registrations are the same listener.
/// A listener registered without a context only ever matches an absent
/// context. Callbacks downcast the `dyn Any` to recover the concrete
/// receiver type.
pub type Context = Arc<dyn Any>;

/// Type alias for a callback pointer.
///
/// The first parameter is the bound [`Context`] the listener was registered
/// with, or `None` when it was registered without one. Callbacks are
/// identity-compared by their `Arc` allocation: registering the same
/// `Callback` clone twice for one event is a no-op, and removal takes the
/// same clone to find the registration again.
///
/// No `Send`/`Sync` bounds: the emitter is a single-owner-thread type.
///
/// # Example
/// ```
/// use ns_events::{Callback, Context, EventPayload};
///
/// let callback: Callback<u32> = std::sync::Arc::new(|_ctx: Option<&Context>, payload: &EventPayload<u32>| {
///     assert_eq!(**payload, 42);
///     Ok(())
/// });
/// ```
pub type Callback<T> = Arc<dyn Fn(Option<&Context>, &EventPayload<T>) -> CallbackResult>;
