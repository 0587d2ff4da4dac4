// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Webcam mirror that shows you what you looked like a few seconds ago.
//!
//! The page holds a small live preview, a canvas that replays snapshots after
//! the selected delay, and one button per delay preset. Camera access is
//! requested on load; once granted, the default delay starts immediately.
//!
//! Build with: `wasm-pack build --target web demos/web_mirror`
//! Then serve `demos/web_mirror/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::RefCell;

use afterimage_backend_web::{
    AlertNotifier, BrowserTimers, Camera, CanvasSurface, ConsoleSink, bind_delay_buttons,
};
use afterimage_core::app::MirrorApp;
use afterimage_core::config::MirrorConfig;
use afterimage_core::error::{CaptureError, ParseDelayError};
use afterimage_core::time::Duration;
use afterimage_core::timer::TimerFire;
use afterimage_core::trace::Tracer;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlVideoElement};

const DISPLAY_WIDTH_PX: u32 = 640;
const PREVIEW_WIDTH_PX: u32 = 160;

type WebMirror = MirrorApp<Camera, CanvasSurface, BrowserTimers>;

/// Everything the page's callbacks share.
struct App {
    mirror: RefCell<WebMirror>,
    sink: RefCell<ConsoleSink>,
    status: HtmlElement,
}

impl App {
    fn new(config: MirrorConfig, surface: CanvasSurface, status: HtmlElement) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let timers = BrowserTimers::new(move |fire| {
                if let Some(app) = weak.upgrade() {
                    app.on_timer(fire);
                }
            });
            Self {
                mirror: RefCell::new(MirrorApp::new(config, surface, timers)),
                sink: RefCell::new(ConsoleSink::new()),
                status,
            }
        })
    }

    fn on_timer(&self, fire: TimerFire) {
        let mut sink = self.sink.borrow_mut();
        let mut tracer = Tracer::new(&mut *sink);
        self.mirror.borrow_mut().on_timer(fire, &mut tracer);
    }

    fn on_camera(self: &Rc<Self>, acquired: Result<Camera, CaptureError>, document: &Document) {
        let attached = {
            let mut sink = self.sink.borrow_mut();
            let mut tracer = Tracer::new(&mut *sink);
            self.mirror
                .borrow_mut()
                .attach_source(acquired, &mut AlertNotifier, &mut tracer)
        };
        if let Err(e) = attached {
            self.set_status(&format!("Camera unavailable ({})", e.name()));
            return;
        }

        let weak = Rc::downgrade(self);
        let bound = bind_delay_buttons(document, move |selection| {
            if let Some(app) = weak.upgrade() {
                app.select(selection);
            }
        });
        if let Err(e) = bound {
            self.set_status(&format!("Delay buttons unavailable: {e:?}"));
        }

        let default_delay = self.mirror.borrow().mirror().config().default_delay;
        self.select(Ok(default_delay));
    }

    fn select(&self, selection: Result<Duration, ParseDelayError>) {
        let delay = selection.as_ref().ok().copied();
        let result = {
            let mut sink = self.sink.borrow_mut();
            let mut tracer = Tracer::new(&mut *sink);
            self.mirror.borrow_mut().select_delay(selection, &mut tracer)
        };
        match (result, delay) {
            (Ok(()), Some(delay)) => {
                self.set_status(&format!("Delay: {}", delay_label(delay.as_millis())));
            }
            (Ok(()), None) => {}
            (Err(e), _) => self.set_status(&format!("Could not start: {e}")),
        }
    }

    fn set_status(&self, text: &str) {
        self.status.set_text_content(Some(text));
    }
}

/// Entry point for the web-mirror demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;
    let config = MirrorConfig::web();

    let shell = create_shell(&document)?;
    body.append_child(&shell)?;

    let title = element(&document, "h1")?;
    title.set_text_content(Some("afterimage"));
    style(&title, "margin: 0; font-size: 22px; color: #17304a;")?;
    shell.append_child(&title)?;

    let stage = element(&document, "div")?;
    style(&stage, "position: relative;")?;
    shell.append_child(&stage)?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.unchecked_into();
    canvas.set_width(DISPLAY_WIDTH_PX);
    style(
        &canvas,
        &format!(
            "display: block; width: {DISPLAY_WIDTH_PX}px; background: #10121f; border-radius: 12px;"
        ),
    )?;
    stage.append_child(&canvas)?;

    let video: HtmlVideoElement = document.create_element("video")?.unchecked_into();
    video.set_muted(true);
    video.set_attribute("playsinline", "")?;
    style(
        &video,
        &format!(
            "position: absolute; right: 10px; bottom: 10px; width: {PREVIEW_WIDTH_PX}px; border-radius: 8px; border: 2px solid rgba(255,255,255,0.8); transform: scaleX(-1);"
        ),
    )?;
    stage.append_child(&video)?;

    let buttons = element(&document, "div")?;
    style(&buttons, "display: flex; gap: 8px;")?;
    for &preset in config.delay_presets {
        let button = delay_button(&document, preset)?;
        buttons.append_child(&button)?;
    }
    shell.append_child(&buttons)?;

    let status = element(&document, "div")?;
    status.set_text_content(Some("Waiting for camera…"));
    style(
        &status,
        "font: 13px/1.2 ui-monospace, SFMono-Regular, Menlo, monospace; color: #17304a;",
    )?;
    shell.append_child(&status)?;

    let app = App::new(config, CanvasSurface::new(canvas)?, status);

    wasm_bindgen_futures::spawn_local(async move {
        let acquired = Camera::start(video).await;
        app.on_camera(acquired, &document);
    });

    Ok(())
}

fn delay_button(doc: &Document, delay_ms: u32) -> Result<HtmlButtonElement, JsValue> {
    let button: HtmlButtonElement = doc.create_element("button")?.unchecked_into();
    button.set_name("delay");
    button.set_value(&button_value(delay_ms));
    button.set_text_content(Some(&delay_label(u64::from(delay_ms))));
    style(
        &button,
        "border: 0; border-radius: 999px; padding: 8px 16px; background: #0f5d71; color: #eff8ff; font-weight: 600; cursor: pointer;",
    )?;
    Ok(button)
}

/// The `value` attribute a delay button carries; read back by
/// [`bind_delay_buttons`] on click.
fn button_value(delay_ms: u32) -> String {
    format!("{delay_ms}")
}

/// Button and status text for a delay.
fn delay_label(delay_ms: u64) -> String {
    match delay_ms {
        0 => String::from("live"),
        ms if ms % 1_000 == 0 => format!("{} s", ms / 1_000),
        ms => format!("{ms} ms"),
    }
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn create_shell(doc: &Document) -> Result<HtmlElement, JsValue> {
    let shell = element(doc, "section")?;
    style(
        &shell,
        "padding: 24px 28px 20px; border-radius: 20px; background: rgba(255,255,255,0.82); border: 1px solid rgba(22,44,65,0.15); box-shadow: 0 24px 70px rgba(26,43,64,0.2); display: grid; gap: 14px; justify-items: center;",
    )?;
    Ok(shell)
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afterimage_core::control::parse_delay;

    #[test]
    fn labels_for_presets() {
        let labels: alloc::vec::Vec<String> = MirrorConfig::web()
            .delay_presets
            .iter()
            .map(|&ms| delay_label(u64::from(ms)))
            .collect();
        assert_eq!(labels, ["live", "1 s", "3 s", "5 s", "10 s"]);
    }

    #[test]
    fn preset_buttons_parse_back_to_their_delay() {
        for &preset in MirrorConfig::web().delay_presets {
            assert_eq!(
                parse_delay(&button_value(preset)),
                Ok(Duration::from_millis(u64::from(preset))),
                "preset {preset}"
            );
        }
    }

    #[test]
    fn odd_delays_show_milliseconds() {
        assert_eq!(delay_label(1_500), "1500 ms");
        assert_eq!(delay_label(50), "50 ms");
    }
}
