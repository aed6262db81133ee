//! Example: namespaced listeners for bulk teardown
use std::sync::Arc;

use ns_events::{Callback, EventEmitter, EventError};

fn main() -> Result<(), EventError> {
    let emitter: EventEmitter<String> = EventEmitter::new();

    let form: Callback<String> = Arc::new(|_, value| {
        println!("form sees {value}");
        Ok(())
    });
    let page: Callback<String> = Arc::new(|_, value| {
        println!("page sees {value}");
        Ok(())
    });

    emitter.on("change.form", form, None);
    emitter.on("change.page", page, None);

    // Both tags listen on the base event.
    emitter.emit("change", Arc::new("dark-mode".to_string()))?;

    // Tear down everything tagged `form`; the page listener survives.
    emitter.off("change.form");
    emitter.emit("change", Arc::new("light-mode".to_string()))?;
    Ok(())
}
