// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D canvas display surface.

use alloc::format;

use afterimage_core::backend::Surface;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Draws snapshots onto an on-page `<canvas>`.
///
/// The layout width comes from the canvas's CSS box. Its backing store is
/// kept at the same width and at the height the mirror asks for, so
/// snapshots draw 1:1 at the origin.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl core::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Wraps `canvas`.
    ///
    /// # Errors
    ///
    /// Fails if the canvas has no 2-D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = crate::context_2d(&canvas)?;
        Ok(Self { canvas, context })
    }

    /// The wrapped canvas.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlCanvasElement;

    fn display_width(&self) -> u32 {
        u32::try_from(self.canvas.client_width())
            .ok()
            .filter(|w| *w > 0)
            .unwrap_or_else(|| self.canvas.width())
    }

    fn set_display_height(&mut self, height: u32) {
        let width = self.display_width();
        // Assigning either dimension wipes the canvas, so only do it on change.
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
            let _ = self
                .canvas
                .style()
                .set_property("height", &format!("{height}px"));
        }
    }

    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn draw(&mut self, image: &HtmlCanvasElement) {
        let _ = self
            .context
            .draw_image_with_html_canvas_element(image, 0.0, 0.0);
    }
}
