use thiserror::Error;

/// Errors surfaced by the event system.
///
/// Caller misuse is deliberately not represented here: emitting an event
/// nobody listens to, removing a listener that was never registered, or
/// querying an unknown name all resolve to no-ops or `false` returns. The
/// one failure surface is a listener failing while its event is dispatched;
/// that error is never swallowed and propagates to the `emit` caller.
#[derive(Debug, Error)]
pub enum EventError {
    /// A listener returned an error during dispatch. The remaining
    /// listeners of that pass were not invoked; the registry stays valid
    /// for subsequent calls.
    #[error("listener for event `{event}` failed")]
    Listener {
        /// Base name of the event that was being dispatched.
        event: String,
        /// The error the listener returned.
        #[source]
        source: Box<dyn std::error::Error>,
    },
}
