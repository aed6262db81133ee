//! # ns-events
//!
//! A synchronous, in-process publish/subscribe registry: register listeners
//! by event name, remove them individually, by event, or by namespace tag,
//! and dispatch events to every currently-registered listener on the
//! calling thread.
//!
//! - **[`ListenerRegistry`]**: the core — ordered listener storage, a
//!   namespace index, and the dispatch engine with its re-entrancy rules.
//! - **[`EventEmitter`]**: the public facade; exposes dispatch as `emit`.
//! - **[`Subscribe`]**: the interface-only contract for the subscribe
//!   surface.
//!
//! Listeners may call `on`, `off`, or `emit` on the same emitter from
//! inside a dispatch: additions to the event being dispatched are delivered
//! before that pass ends, and removals take effect immediately (a removed
//! listener is never invoked afterwards, even within the running pass).
//! Registration keys take an optional namespace suffix (`"click.toolbar"`)
//! for bulk removal by tag.
//!
//! Not thread-safe: callbacks carry no `Send`/`Sync` bounds, so an emitter
//! is confined to the thread that owns it. There is no locking and no
//! deferred delivery; every call completes synchronously or propagates a
//! listener error to the `emit` caller.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use ns_events::{Callback, EventEmitter};
//!
//! let emitter: EventEmitter<String> = EventEmitter::new();
//! let callback: Callback<String> = Arc::new(|_, payload| {
//!     assert_eq!(payload.as_ref(), "hello");
//!     Ok(())
//! });
//!
//! emitter.on("greet", Arc::clone(&callback), None);
//! emitter.emit("greet", Arc::new("hello".to_string()))?;
//! # Ok::<(), ns_events::EventError>(())
//! ```

mod constants;
mod error;
mod event_emitter;
mod key;
mod listener;
mod registry;
mod subscribe;

pub use constants::{Callback, CallbackResult, Context, EventPayload};
pub use error::EventError;
pub use event_emitter::EventEmitter;
pub use key::{EventKey, NAMESPACE_DELIMITER};
pub use listener::Listener;
pub use registry::ListenerRegistry;
pub use subscribe::Subscribe;

#[cfg(test)]
mod tests;
