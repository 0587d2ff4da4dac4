// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `getUserMedia` capture source.
//!
//! [`Camera::start`] asks for a video-only stream, binds it to a `<video>`
//! element and starts playback once the element knows the stream's
//! dimensions. Each [`capture`](FrameSource::capture) draws the element's
//! current frame into a fresh off-screen canvas.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;

use afterimage_core::backend::FrameSource;
use afterimage_core::error::CaptureError;
use afterimage_core::geometry::FrameSize;
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlCanvasElement, HtmlVideoElement, MediaDevices, MediaStream, MediaStreamConstraints,
    MediaStreamTrack,
};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`.
const HAVE_CURRENT_DATA: u16 = 2;

/// A live camera stream playing in a `<video>` element.
pub struct Camera {
    video: HtmlVideoElement,
    stream: MediaStream,
    _on_metadata: Closure<dyn FnMut()>,
}

impl core::fmt::Debug for Camera {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera")
            .field("stream", &self.stream.id())
            .field("ready_state", &self.video.ready_state())
            .finish_non_exhaustive()
    }
}

impl Camera {
    /// Requests the camera and binds the stream to `video`.
    ///
    /// # Errors
    ///
    /// A [`CaptureError`] carrying the host error's `name` when the user
    /// denies access or no camera can be opened, or
    /// [`CaptureError::unsupported`] when the page has no
    /// `navigator.mediaDevices` (for example on an insecure origin).
    pub async fn start(video: HtmlVideoElement) -> Result<Self, CaptureError> {
        let devices = media_devices().ok_or_else(CaptureError::unsupported)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::FALSE);
        constraints.set_video(&JsValue::TRUE);
        let request = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| capture_error(&e))?;
        let stream: MediaStream = JsFuture::from(request)
            .await
            .map_err(|e| capture_error(&e))?
            .unchecked_into();

        let playing = video.clone();
        let on_metadata = Closure::wrap(Box::new(move || match playing.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    warn_play_failed(&e);
                }
            }),
            Err(e) => warn_play_failed(&e),
        }) as Box<dyn FnMut()>);
        video.set_onloadedmetadata(Some(on_metadata.as_ref().unchecked_ref()));
        video.set_src_object(Some(&stream));

        Ok(Self {
            video,
            stream,
            _on_metadata: on_metadata,
        })
    }

    /// The `<video>` element the stream plays in.
    #[must_use]
    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    fn settings_size(&self) -> Option<FrameSize> {
        let track: MediaStreamTrack = self.stream.get_video_tracks().get(0).dyn_into().ok()?;
        let settings = track.get_settings();
        let width = Reflect::get(&settings, &JsValue::from_str("width")).ok()?;
        let height = Reflect::get(&settings, &JsValue::from_str("height")).ok()?;
        Some(FrameSize::new(
            dimension(width.as_f64()?)?,
            dimension(height.as_f64()?)?,
        ))
    }

    fn element_size(&self) -> Option<FrameSize> {
        let size = FrameSize::new(self.video.video_width(), self.video.video_height());
        (!size.is_empty()).then_some(size)
    }

    fn snapshot(&self, size: FrameSize) -> Result<HtmlCanvasElement, JsValue> {
        let document = self
            .video
            .owner_document()
            .ok_or_else(|| JsValue::from_str("video element has no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.unchecked_into();
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        crate::context_2d(&canvas)?.draw_image_with_html_video_element_and_dw_and_dh(
            &self.video,
            0.0,
            0.0,
            f64::from(size.width),
            f64::from(size.height),
        )?;
        Ok(canvas)
    }
}

impl FrameSource for Camera {
    type Image = HtmlCanvasElement;

    /// Resolution from the video track's settings, falling back to the
    /// element's intrinsic size once metadata has loaded.
    fn native_size(&self) -> Option<FrameSize> {
        self.settings_size().or_else(|| self.element_size())
    }

    fn capture(&mut self, size: FrameSize) -> Option<HtmlCanvasElement> {
        if self.video.ready_state() < HAVE_CURRENT_DATA {
            return None;
        }
        self.snapshot(size).ok()
    }
}

fn media_devices() -> Option<MediaDevices> {
    let navigator = web_sys::window()?.navigator();
    let devices = Reflect::get(&navigator, &JsValue::from_str("mediaDevices")).ok()?;
    if devices.is_undefined() || devices.is_null() {
        return None;
    }
    Some(devices.unchecked_into())
}

/// The `name` of a DOM exception, if it has a non-empty one.
fn error_name(error: &JsValue) -> Option<String> {
    Reflect::get(error, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
        .filter(|n| !n.is_empty())
}

/// Builds a [`CaptureError`] from a rejected `getUserMedia` promise.
fn capture_error(error: &JsValue) -> CaptureError {
    let name = error_name(error).unwrap_or_else(|| String::from(CaptureError::UNKNOWN_NAME));
    CaptureError::from_name(name)
}

/// Console text for a rejected `play()`, typically an autoplay policy block.
fn play_failed_line(name: Option<&str>) -> String {
    format!(
        "[afterimage] camera preview did not start playing ({})",
        name.unwrap_or(CaptureError::UNKNOWN_NAME)
    )
}

fn warn_play_failed(error: &JsValue) {
    crate::console::warn(&play_failed_line(error_name(error).as_deref()));
}

/// Converts a track setting to a pixel count.
fn dimension(v: f64) -> Option<u32> {
    if !(v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX)) {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range checked above; fractional pixels truncate"
    )]
    let px = v as u32;
    Some(px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_accepts_whole_pixels() {
        assert_eq!(dimension(1280.0), Some(1280));
        assert_eq!(dimension(1.0), Some(1));
    }

    #[test]
    fn play_failure_names_the_error() {
        let line = play_failed_line(Some("NotAllowedError"));
        assert!(line.contains("NotAllowedError"), "got: {line}");
        let line = play_failed_line(None);
        assert!(
            line.contains(CaptureError::UNKNOWN_NAME),
            "unnamed rejections still say something: {line}"
        );
    }

    #[test]
    fn dimension_rejects_nonsense() {
        assert_eq!(dimension(0.0), None);
        assert_eq!(dimension(-640.0), None);
        assert_eq!(dimension(f64::NAN), None);
        assert_eq!(dimension(f64::INFINITY), None);
        assert_eq!(dimension(1e12), None, "wider than u32");
    }
}
