//! Coordinate transform between window space and canvas space.
//!
//! Input events arrive in window/page coordinates; drawing happens in the
//! coordinate system of the canvas backing store. The mapping is a plain
//! linear scale between the displayed (CSS) size and the backing size. A
//! zero-sized display is rejected with a [`ConfigError`] instead of silently
//! producing non-finite coordinates.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A point in window space or canvas space, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Map a window-space coordinate onto the canvas backing store.
///
/// # Errors
///
/// Returns [`ConfigError::DegenerateViewport`] when either displayed
/// dimension is zero or negative.
pub fn to_canvas_space(
    raw: Point,
    backing_w: f64,
    backing_h: f64,
    display_w: f64,
    display_h: f64,
) -> Result<Point, ConfigError> {
    if display_w <= 0.0 || display_h <= 0.0 {
        return Err(ConfigError::DegenerateViewport { width: display_w, height: display_h });
    }
    Ok(Point {
        x: raw.x * backing_w / display_w,
        y: raw.y * backing_h / display_h,
    })
}

/// Canvas sizing state: backing-store size and displayed (CSS) size.
///
/// Defaults to all zeros; converting through a default viewport fails until
/// the host supplies real dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Backing-store width in device pixels.
    pub backing_w: f64,
    /// Backing-store height in device pixels.
    pub backing_h: f64,
    /// Displayed width in CSS pixels.
    pub display_w: f64,
    /// Displayed height in CSS pixels.
    pub display_h: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(backing_w: f64, backing_h: f64, display_w: f64, display_h: f64) -> Self {
        Self { backing_w, backing_h, display_w, display_h }
    }

    /// Convert a window-space point to canvas space.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DegenerateViewport`] when the displayed size is
    /// zero or negative.
    pub fn to_canvas(&self, raw: Point) -> Result<Point, ConfigError> {
        to_canvas_space(raw, self.backing_w, self.backing_h, self.display_w, self.display_h)
    }
}
