//! DOM event adapter
//!
//! Mouse and touch events both become a single [`PointerSample`]; nothing
//! past this module looks at the event type.

use flow_core::PointerSample;
use wasm_bindgen::JsCast;
use web_sys::{Event, MouseEvent, TouchEvent};

/// Pointer position carried by a mouse or touch event
pub fn sample_from_event(event: &Event) -> Option<PointerSample> {
    if event.type_().starts_with("touch") {
        let touch_event = event.dyn_ref::<TouchEvent>()?;
        // `touchend` has no active touches left, only changed ones
        let touch = touch_event
            .touches()
            .get(0)
            .or_else(|| touch_event.changed_touches().get(0))?;
        return Some(PointerSample::new(touch.client_x() as f64, touch.client_y() as f64));
    }

    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(PointerSample::new(mouse.client_x() as f64, mouse.client_y() as f64))
}
