use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::{Callback, Context, EventEmitter, EventError};

fn logging(order: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Callback<u32> {
    let order = Rc::clone(order);
    Arc::new(move |_, _| {
        order.borrow_mut().push(label);
        Ok(())
    })
}

/// Listeners observe events in registration order.
#[test]
fn listeners_invoked_in_registration_order() {
    let emitter = EventEmitter::<u32>::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    emitter
        .on("x", logging(&order, "first"), None)
        .on("x", logging(&order, "second"), None)
        .on("x", logging(&order, "third"), None);

    emitter.emit("x", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["first", "second", "third"]);
}

/// Every listener of a pass receives the same payload value.
#[test]
fn payload_reaches_every_listener() {
    let emitter = EventEmitter::<u32>::new();
    let sum = Rc::new(Cell::new(0));

    for _ in 0..3 {
        let sum = Rc::clone(&sum);
        let callback: Callback<u32> = Arc::new(move |_, payload| {
            sum.set(sum.get() + **payload);
            Ok(())
        });
        emitter.on("tick", callback, None);
    }

    emitter.emit("tick", Arc::new(5)).unwrap();
    assert_eq!(sum.get(), 15);
}

/// The bound context arrives as the callback's first argument; an absent
/// context arrives as `None`.
#[test]
fn context_passed_to_callback() {
    let emitter = EventEmitter::<u32>::new();
    let seen = Rc::new(RefCell::new(Vec::<String>::new()));
    let context: Context = Arc::new("widget-3".to_string());

    let sink = Rc::clone(&seen);
    let bound: Callback<u32> = Arc::new(move |ctx, _| {
        let name = ctx
            .and_then(|c| c.downcast_ref::<String>())
            .cloned()
            .unwrap_or_default();
        sink.borrow_mut().push(name);
        Ok(())
    });
    let sink = Rc::clone(&seen);
    let unbound: Callback<u32> = Arc::new(move |ctx, _| {
        assert!(ctx.is_none());
        sink.borrow_mut().push("unbound".to_string());
        Ok(())
    });

    emitter.on("x", bound, Some(Arc::clone(&context)));
    emitter.on("x", unbound, None);
    emitter.emit("x", Arc::new(0)).unwrap();
    assert_eq!(*seen.borrow(), ["widget-3", "unbound"]);
}

/// Emitting an event nobody listens to is a no-op, and successful dispatch
/// chains.
#[test]
fn emit_without_listeners_is_noop_and_chains() {
    let emitter = EventEmitter::<u32>::new();
    emitter
        .emit("ghost", Arc::new(0))
        .unwrap()
        .emit("still-ghost", Arc::new(0))
        .unwrap();
}

/// A listener registered for the event being dispatched is reached by the
/// same pass, after the listeners that were already attached.
#[test]
fn listener_added_mid_dispatch_runs_in_same_pass() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let tail = logging(&order, "tail");
    let opener: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let order = Rc::clone(&order);
        Arc::new(move |_, _| {
            order.borrow_mut().push("opener");
            emitter.on("x", Arc::clone(&tail), None);
            Ok(())
        })
    };

    emitter.on("x", opener, None);
    emitter.on("x", logging(&order, "second"), None);
    emitter.emit("x", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["opener", "second", "tail"]);
}

/// A listener removed mid-pass before its turn is never invoked in that
/// pass.
#[test]
fn listener_removed_mid_dispatch_is_skipped() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let doomed = logging(&order, "doomed");
    let dropper: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let order = Rc::clone(&order);
        let doomed = Arc::clone(&doomed);
        Arc::new(move |_, _| {
            order.borrow_mut().push("dropper");
            emitter.off_listener("x", &doomed, None);
            Ok(())
        })
    };

    emitter.on("x", dropper, None);
    emitter.on("x", Arc::clone(&doomed), None);
    emitter.emit("x", Arc::new(0)).unwrap();

    assert_eq!(*order.borrow(), ["dropper"]);
    assert_eq!(emitter.listener_count("x"), 1);
    assert!(!emitter.has_listener("x", &doomed, None));
}

/// A one-shot listener fires once; a later emit does not see it.
#[test]
fn once_invoked_exactly_once() {
    let emitter = EventEmitter::<u32>::new();
    let hits = Rc::new(Cell::new(0));
    let callback: Callback<u32> = {
        let hits = Rc::clone(&hits);
        Arc::new(move |_, _| {
            hits.set(hits.get() + 1);
            Ok(())
        })
    };

    emitter.once("ready", Arc::clone(&callback), None);
    emitter.emit("ready", Arc::new(0)).unwrap();
    emitter.emit("ready", Arc::new(0)).unwrap();

    assert_eq!(hits.get(), 1);
    assert!(!emitter.has_listener("ready", &callback, None));
}

/// The one-shot record is deregistered before its callback body runs, so
/// its own invocation already cannot see it.
#[test]
fn once_invisible_inside_own_invocation() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let slot: Rc<RefCell<Option<Callback<u32>>>> = Rc::new(RefCell::new(None));
    let hits = Rc::new(Cell::new(0));

    let callback: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let slot = Rc::clone(&slot);
        let hits = Rc::clone(&hits);
        Arc::new(move |_, _| {
            let me = slot.borrow().clone().unwrap();
            assert!(!emitter.has_listener("ready", &me, None));
            assert!(!emitter.has("ready"));
            hits.set(hits.get() + 1);
            Ok(())
        })
    };
    slot.borrow_mut().replace(Arc::clone(&callback));

    emitter.once("ready", Arc::clone(&callback), None);
    emitter.emit("ready", Arc::new(0)).unwrap();
    assert_eq!(hits.get(), 1);
}

/// A failing listener aborts its pass; the error reaches the emit caller
/// with the listener's own error as source, and the registry stays healthy.
#[test]
fn listener_error_propagates_and_aborts_pass() {
    let emitter = EventEmitter::<u32>::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let failing: Callback<u32> = Arc::new(|_, _| Err("boom".into()));

    emitter.on("x", logging(&order, "first"), None);
    emitter.on("x", Arc::clone(&failing), None);
    emitter.on("x", logging(&order, "third"), None);
    emitter.on("y", logging(&order, "other"), None);

    let err = emitter.emit("x", Arc::new(0)).unwrap_err();
    match err {
        EventError::Listener { event, source } => {
            assert_eq!(event, "x");
            assert_eq!(source.to_string(), "boom");
        }
    }
    assert_eq!(*order.borrow(), ["first"]);
    assert!(!emitter.registry().firing());

    // An unrelated dispatch afterwards completes normally.
    emitter.emit("y", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["first", "other"]);

    // And once the failing listener is gone, the event itself is healthy.
    emitter.off_listener("x", &failing, None);
    order.borrow_mut().clear();
    emitter.emit("x", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["first", "third"]);
}

/// A failing one-shot listener was already deregistered; the error does not
/// resurrect it.
#[test]
fn failing_once_listener_is_still_removed() {
    let emitter = EventEmitter::<u32>::new();
    let failing: Callback<u32> = Arc::new(|_, _| Err("boom".into()));

    emitter.once("ready", Arc::clone(&failing), None);
    assert!(emitter.emit("ready", Arc::new(0)).is_err());
    assert!(!emitter.has_listener("ready", &failing, None));
    emitter.emit("ready", Arc::new(0)).unwrap();
}

/// `off_all` from inside a pass: listeners already reached were invoked,
/// nobody after the call is, and the registry ends up empty.
#[test]
fn off_all_mid_dispatch_stops_remaining_listeners() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let wipe: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let order = Rc::clone(&order);
        Arc::new(move |_, _| {
            order.borrow_mut().push("wipe");
            emitter.off_all();
            Ok(())
        })
    };

    emitter.on("x", logging(&order, "first"), None);
    emitter.on("x", wipe, None);
    emitter.on("x", logging(&order, "third"), None);
    emitter.on("y", logging(&order, "other"), None);

    emitter.emit("x", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["first", "wipe"]);
    assert!(emitter.event_names().is_empty());
    assert!(!emitter.has("x"));
    assert!(!emitter.has("y"));

    emitter.emit("y", Arc::new(0)).unwrap();
    assert_eq!(*order.borrow(), ["first", "wipe"]);
}

/// An emit nested inside a listener runs its own pass to completion before
/// the outer pass resumes, and the firing state survives it.
#[test]
fn nested_emit_of_different_event_runs_to_completion() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let order = Rc::new(RefCell::new(Vec::new()));

    let relay: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let order = Rc::clone(&order);
        Arc::new(move |_, _| {
            order.borrow_mut().push("outer-first");
            assert!(emitter.registry().firing());
            emitter.emit("inner", Arc::new(1)).unwrap();
            // Back in the outer pass: still firing.
            assert!(emitter.registry().firing());
            Ok(())
        })
    };

    emitter.on("outer", relay, None);
    emitter.on("outer", logging(&order, "outer-second"), None);
    emitter.on("inner", logging(&order, "inner-first"), None);
    emitter.on("inner", logging(&order, "inner-second"), None);

    emitter.emit("outer", Arc::new(0)).unwrap();
    assert_eq!(
        *order.borrow(),
        ["outer-first", "inner-first", "inner-second", "outer-second"]
    );
    assert!(!emitter.registry().firing());
}

/// Re-entrant emit of the same event runs a full nested pass; the outer
/// pass then continues where it left off.
#[test]
fn reentrant_same_event_emit() {
    let emitter = Rc::new(EventEmitter::<u32>::new());
    let heads = Rc::new(Cell::new(0));
    let tails = Rc::new(Cell::new(0));

    let head: Callback<u32> = {
        let emitter = Rc::clone(&emitter);
        let heads = Rc::clone(&heads);
        Arc::new(move |_, payload| {
            heads.set(heads.get() + 1);
            if **payload == 0 {
                emitter.emit("x", Arc::new(1)).unwrap();
            }
            Ok(())
        })
    };
    let tail: Callback<u32> = {
        let tails = Rc::clone(&tails);
        Arc::new(move |_, _| {
            tails.set(tails.get() + 1);
            Ok(())
        })
    };

    emitter.on("x", head, None);
    emitter.on("x", tail, None);
    emitter.emit("x", Arc::new(0)).unwrap();

    assert_eq!(heads.get(), 2);
    assert_eq!(tails.get(), 2);
    assert!(!emitter.registry().firing());
}
