// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delay selection buttons.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use afterimage_core::control::parse_delay;
use afterimage_core::error::ParseDelayError;
use afterimage_core::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, Element, Event};

/// Binds a click handler to every element named `delay` in `document`.
///
/// On click, the element's `value` attribute is read and parsed with
/// [`parse_delay`]; the result, well-formed or not, goes to `on_select`.
/// Returns the number of elements bound.
///
/// # Errors
///
/// Propagates a failure to add an event listener.
pub fn bind_delay_buttons(
    document: &Document,
    on_select: impl FnMut(Result<Duration, ParseDelayError>) + 'static,
) -> Result<u32, JsValue> {
    let on_select = Rc::new(RefCell::new(on_select));
    let nodes = document.get_elements_by_name("delay");
    let mut bound = 0;

    for i in 0..nodes.length() {
        let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };

        let target = element.clone();
        let select = Rc::clone(&on_select);
        let on_click = Closure::wrap(Box::new(move |_event: Event| {
            let raw = target.get_attribute("value").unwrap_or_default();
            (&mut *select.borrow_mut())(parse_delay(&raw));
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // Buttons live as long as the page.
        on_click.forget();
        bound += 1;
    }
    Ok(bound)
}
