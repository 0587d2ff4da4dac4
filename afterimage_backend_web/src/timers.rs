// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` / `setTimeout` timer host.
//!
//! [`BrowserTimers`] implements [`TimerHost`] on top of the browser's timer
//! globals. Each [`TimerKind`] owns at most one registration; arming a kind
//! replaces its previous registration and cancelling clears it on the JS side
//! before the closure is released.
//!
//! A JS closure must not be dropped while it is running. Closures replaced or
//! cancelled from inside a timer callback are parked and released at the
//! start of the next callback.
//!
//! [`TimerHost`]: afterimage_core::timer::TimerHost

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use afterimage_core::time::{Duration, HostTime, TICKS_PER_MILLI};
use afterimage_core::timer::{TimerFire, TimerHost, TimerKind};

// Direct global bindings; these exist on both `Window` and worker scopes.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setInterval")]
    fn js_set_interval(handler: &JsValue, timeout: i32) -> i32;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn js_set_timeout(handler: &JsValue, timeout: i32) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn js_clear_interval(id: i32);

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn js_clear_timeout(id: i32);
}

/// Largest delay browsers honour; longer values overflow and fire at once.
const MAX_TIMER_MILLIS: i32 = i32::MAX;

/// Converts a [`Duration`] to the whole milliseconds a browser timer takes,
/// rounding up so a timer never fires early.
pub(crate) fn millis_for_timer(d: Duration) -> i32 {
    let ms = d.ticks().div_ceil(TICKS_PER_MILLI);
    i32::try_from(ms).unwrap_or(MAX_TIMER_MILLIS)
}

/// Converts a `performance.now()` reading to [`HostTime`].
pub(crate) fn host_time_from_millis(ms: f64) -> HostTime {
    if !(ms.is_finite() && ms > 0.0) {
        return HostTime::ZERO;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "performance.now() is a small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

type TimerClosure = Closure<dyn FnMut()>;

struct Registration {
    handle: i32,
    repeating: bool,
    token: u64,
    closure: TimerClosure,
}

struct TimersInner {
    /// Receives every fire. Usually routes to the app that owns these timers.
    dispatch: Box<dyn Fn(TimerFire)>,

    slots: RefCell<[Option<Registration>; 3]>,

    /// Distinguishes a registration from the one that replaced it.
    next_token: Cell<u64>,

    /// `true` while `dispatch` runs.
    firing: Cell<bool>,

    /// Closures released while `firing`; dropped on the next fire.
    parked: RefCell<Vec<TimerClosure>>,
}

impl TimersInner {
    fn release(&self, registration: Registration) {
        if registration.repeating {
            js_clear_interval(registration.handle);
        } else {
            js_clear_timeout(registration.handle);
        }
        if self.firing.get() {
            self.parked.borrow_mut().push(registration.closure);
        }
    }

    fn fire(&self, kind: TimerKind, epoch: u64, token: u64) {
        // Nothing parked can be running: parked closures are cleared on the
        // JS side and the one running now has not been parked yet.
        self.parked.borrow_mut().clear();
        self.firing.set(true);

        // A timeout is done once it fires; is_armed() must say so.
        let finished = {
            let mut slots = self.slots.borrow_mut();
            let slot = &mut slots[kind.index()];
            match slot {
                Some(r) if r.token == token && !r.repeating => slot.take(),
                _ => None,
            }
        };
        if let Some(r) = finished {
            self.parked.borrow_mut().push(r.closure);
        }

        (self.dispatch)(TimerFire { kind, epoch });
        self.firing.set(false);
    }
}

/// Browser [`TimerHost`] backed by `setInterval` and `setTimeout`.
///
/// Fires are delivered to the `dispatch` callback given to
/// [`new`](Self::new). The callback may re-enter this host (arm or cancel
/// other kinds) through whatever owns it.
pub struct BrowserTimers {
    inner: Rc<TimersInner>,
}

impl BrowserTimers {
    /// Creates a timer host with nothing armed.
    pub fn new(dispatch: impl Fn(TimerFire) + 'static) -> Self {
        Self {
            inner: Rc::new(TimersInner {
                dispatch: Box::new(dispatch),
                slots: RefCell::new([None, None, None]),
                next_token: Cell::new(0),
                firing: Cell::new(false),
                parked: RefCell::new(Vec::new()),
            }),
        }
    }

    fn arm(&mut self, kind: TimerKind, epoch: u64, after: Duration, repeating: bool) {
        let token = self.inner.next_token.get();
        self.inner.next_token.set(token.wrapping_add(1));

        let weak: Weak<TimersInner> = Rc::downgrade(&self.inner);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.fire(kind, epoch, token);
            }
        }) as Box<dyn FnMut()>);

        let millis = millis_for_timer(after);
        let handler: &JsValue = closure.as_ref();
        let handle = if repeating {
            js_set_interval(handler, millis)
        } else {
            js_set_timeout(handler, millis)
        };

        let previous = self.inner.slots.borrow_mut()[kind.index()].replace(Registration {
            handle,
            repeating,
            token,
            closure,
        });
        if let Some(previous) = previous {
            self.inner.release(previous);
        }
    }
}

impl TimerHost for BrowserTimers {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn set_interval(&mut self, kind: TimerKind, epoch: u64, period: Duration) {
        self.arm(kind, epoch, period, true);
    }

    fn set_timeout(&mut self, kind: TimerKind, epoch: u64, delay: Duration) {
        self.arm(kind, epoch, delay, false);
    }

    fn cancel(&mut self, kind: TimerKind) {
        let taken = self.inner.slots.borrow_mut()[kind.index()].take();
        if let Some(registration) = taken {
            self.inner.release(registration);
        }
    }

    fn is_armed(&self, kind: TimerKind) -> bool {
        self.inner.slots.borrow()[kind.index()].is_some()
    }
}

impl Drop for BrowserTimers {
    fn drop(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
    }
}

impl core::fmt::Debug for BrowserTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slots = self.inner.slots.borrow();
        let mut armed = f.debug_map();
        for kind in TimerKind::ALL {
            if let Some(r) = &slots[kind.index()] {
                armed.entry(&kind.as_str(), &r.handle);
            }
        }
        armed.finish()
    }
}
