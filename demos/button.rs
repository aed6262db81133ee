//! Example: GUI button click event
use std::sync::Arc;

use ns_events::{Callback, EventEmitter, EventError};

fn main() -> Result<(), EventError> {
    let emitter: EventEmitter<String> = EventEmitter::new();
    let callback: Callback<String> = Arc::new(|_, payload| {
        println!("button clicked: {payload}");
        Ok(())
    });
    emitter.on("button_click", callback, None);

    // Simulate button click
    emitter.emit("button_click", Arc::new("OK".to_string()))?;
    Ok(())
}
