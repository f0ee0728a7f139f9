//! Rendering: draws sprites to a 2D context.
//!
//! This module is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. It receives read-only views of
//! stage state and produces pixels — it never mutates engine state. Fallible
//! `Canvas2D` calls propagate errors via `Result<(), JsValue>`, handled by
//! the top-level caller ([`crate::engine::Engine::render`]).
//!
//! Sprites referencing an [`ImageId`] the host never registered are skipped
//! with a warning rather than failing the whole frame; a missing image is a
//! setup problem, not a render-time error.

use std::collections::HashMap;

use log::warn;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::sprite::{Appearance, ImageId, Sprite, Stage};
use crate::viewport::Viewport;

/// Host-registered images and spritesheets, keyed by opaque handle.
#[derive(Default)]
pub struct ImageStore {
    images: HashMap<ImageId, HtmlImageElement>,
}

impl ImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the image behind a handle.
    pub fn insert(&mut self, id: ImageId, image: HtmlImageElement) {
        self.images.insert(id, image);
    }

    /// Drop a registered image.
    pub fn remove(&mut self, id: ImageId) -> Option<HtmlImageElement> {
        self.images.remove(&id)
    }

    /// Look up the image behind a handle.
    #[must_use]
    pub fn get(&self, id: ImageId) -> Option<&HtmlImageElement> {
        self.images.get(&id)
    }
}

/// Clear the full backing store.
pub fn clear(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    ctx.clear_rect(0.0, 0.0, viewport.backing_w, viewport.backing_h);
}

/// Draw every live sprite in arena order (bottom first).
///
/// # Errors
///
/// Returns `Err` if a `Canvas2D` call fails.
pub fn draw_stage(
    ctx: &CanvasRenderingContext2d,
    stage: &Stage,
    images: &ImageStore,
) -> Result<(), JsValue> {
    for (_, sprite) in stage.iter() {
        draw_sprite(ctx, sprite, images)?;
    }
    Ok(())
}

/// Draw one sprite: a color fill, a full-source image blit, or the current
/// animation frame's sub-region of a spritesheet.
///
/// # Errors
///
/// Returns `Err` if a `Canvas2D` call fails.
pub fn draw_sprite(
    ctx: &CanvasRenderingContext2d,
    sprite: &Sprite,
    images: &ImageStore,
) -> Result<(), JsValue> {
    match &sprite.appearance {
        Appearance::Color(color) => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(sprite.x, sprite.y, sprite.w, sprite.h);
            Ok(())
        }
        Appearance::StaticImage { image, width, height } => {
            let Some(element) = images.get(*image) else {
                warn!("image {image:?} not registered; skipping sprite");
                return Ok(());
            };
            ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                element, 0.0, 0.0, *width, *height, sprite.x, sprite.y, sprite.w, sprite.h,
            )
        }
        Appearance::AnimatedSheet { sheet, frame_w, frame_h, anim } => {
            let Some(element) = images.get(*sheet) else {
                warn!("spritesheet {sheet:?} not registered; skipping sprite");
                return Ok(());
            };
            let frame = anim.current_frame();
            let sx = f64::from(frame.col) * frame_w;
            let sy = f64::from(frame.row) * frame_h;
            ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                element, sx, sy, *frame_w, *frame_h, sprite.x, sprite.y, sprite.w, sprite.h,
            )
        }
    }
}
