//! Top-level engine: the testable [`EngineCore`] and the browser-bound
//! [`Engine`].
//!
//! `EngineCore` owns every piece of runtime state — stage, mouse, touch,
//! keyboard, viewport — as one explicit context, so multiple independent
//! scenes (or tests) never share process globals. Input entry points convert
//! raw window coordinates, run the matching tracker, dispatch the resulting
//! [`SpriteEvent`]s to sprite handlers synchronously, and hand the same
//! events back to the host.
//!
//! The per-frame host contract, in order: [`EngineCore::advance_animations`],
//! then [`Engine::render`], then [`EngineCore::drain_contacts`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::error::ConfigError;
use crate::input::{Contact, Keyboard, MouseState, SpriteEvent, TouchTracker};
use crate::render::{self, ImageStore};
use crate::sprite::{ImageId, SpriteId, Stage};
use crate::viewport::{Point, Viewport};

/// All engine state that does not depend on the canvas element.
///
/// Separated from [`Engine`] so it can be driven and inspected in plain
/// native tests.
#[derive(Default)]
pub struct EngineCore {
    pub stage: Stage,
    pub mouse: MouseState,
    pub touch: TouchTracker,
    pub keyboard: Keyboard,
    pub viewport: Viewport,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canvas sizing used for coordinate conversion.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn to_canvas(&self, raw_x: f64, raw_y: f64) -> Result<Point, ConfigError> {
        self.viewport.to_canvas(Point::new(raw_x, raw_y))
    }

    // --- Mouse events ---

    /// A mouse button was pressed at window coordinates `(raw_x, raw_y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_mouse_down(&mut self, raw_x: f64, raw_y: f64) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> = self.mouse.on_down(position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    /// The mouse moved.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_mouse_move(&mut self, raw_x: f64, raw_y: f64) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> = self.mouse.on_move(position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    /// The mouse button was released. The pressed sprite stays observable to
    /// handlers during dispatch and is cleared afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_mouse_up(&mut self, raw_x: f64, raw_y: f64) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let was_down = self.mouse.is_down;
        let events: Vec<SpriteEvent> = self.mouse.on_up(position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        if was_down {
            self.mouse.clear_pressed();
        }
        Ok(events)
    }

    // --- Touch events ---

    /// One changed touch began. Hosts call this once per changed touch in the
    /// device event.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_touch_start(
        &mut self,
        identifier: i32,
        raw_x: f64,
        raw_y: f64,
    ) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> =
            self.touch.on_start(identifier, position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    /// One changed touch moved. Unknown identifiers are tolerated as no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_touch_move(
        &mut self,
        identifier: i32,
        raw_x: f64,
        raw_y: f64,
    ) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> =
            self.touch.on_move(identifier, position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    /// One changed touch lifted. Unknown identifiers are tolerated as no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_touch_end(
        &mut self,
        identifier: i32,
        raw_x: f64,
        raw_y: f64,
    ) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> =
            self.touch.on_end(identifier, position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    /// One changed touch was cancelled by the device.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the viewport cannot
    /// map window coordinates.
    pub fn on_touch_cancel(
        &mut self,
        identifier: i32,
        raw_x: f64,
        raw_y: f64,
    ) -> Result<Vec<SpriteEvent>, ConfigError> {
        let position = self.to_canvas(raw_x, raw_y)?;
        let events: Vec<SpriteEvent> =
            self.touch.on_cancel(identifier, position, &self.stage).into_iter().collect();
        self.stage.dispatch(&events);
        Ok(events)
    }

    // --- Keyboard events ---

    /// A key went down.
    pub fn on_key_down(&mut self, key: &str) {
        self.keyboard.on_key_down(key);
    }

    /// A key went up.
    pub fn on_key_up(&mut self, key: &str) {
        self.keyboard.on_key_up(key);
    }

    // --- Per-frame steps ---

    /// Advance every animated sprite by one tick.
    ///
    /// # Errors
    ///
    /// Returns the first playback error (a jump-to target that was never
    /// defined).
    pub fn advance_animations(&mut self) -> Result<(), ConfigError> {
        self.stage.advance_all()
    }

    /// Run the per-frame contact pass over every active touch contact.
    pub fn drain_contacts(&mut self, callbacks: &mut [&mut dyn FnMut(&Contact)]) {
        self.touch.drain_and_advance(callbacks);
    }
}

/// The full engine. Wraps [`EngineCore`] and owns the browser canvas
/// element, its 2D context, and the host-registered images.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: ImageStore,
    pub core: EngineCore,
}

impl Engine {
    /// Bind the engine to a canvas element.
    ///
    /// The viewport starts as an identity mapping over the canvas's current
    /// backing size; hosts that scale the canvas with CSS call
    /// [`Engine::set_display_size`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let backing_w = f64::from(canvas.width());
        let backing_h = f64::from(canvas.height());
        let mut core = EngineCore::new();
        core.viewport = Viewport::new(backing_w, backing_h, backing_w, backing_h);
        Ok(Self { canvas, ctx, images: ImageStore::new(), core })
    }

    /// Resize the canvas backing store, keeping the displayed size unchanged.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.core.viewport.backing_w = f64::from(width);
        self.core.viewport.backing_h = f64::from(height);
    }

    /// Record the displayed (CSS) size used to convert incoming coordinates.
    pub fn set_display_size(&mut self, display_w: f64, display_h: f64) {
        self.core.viewport.display_w = display_w;
        self.core.viewport.display_h = display_h;
    }

    /// Register (or replace) the image behind an [`ImageId`].
    pub fn register_image(&mut self, id: ImageId, image: HtmlImageElement) {
        self.images.insert(id, image);
    }

    /// Draw every sprite in arena order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        render::clear(&self.ctx, &self.core.viewport);
        render::draw_stage(&self.ctx, &self.core.stage, &self.images)
    }

    /// Draw one sprite. A stale handle draws nothing.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a `Canvas2D` call fails.
    pub fn draw_sprite(&self, id: SpriteId) -> Result<(), JsValue> {
        match self.core.stage.get(id) {
            Some(sprite) => render::draw_sprite(&self.ctx, sprite, &self.images),
            None => Ok(()),
        }
    }
}
