//! Error taxonomy for the engine.
//!
//! Everything here is a `ConfigError`: the host supplied an invalid sprite
//! spec, animation definition, or viewport, and the offending call reports it
//! immediately. Benign device-event noise (a move or end for a contact the
//! tracker never saw) is deliberately *not* an error — the trackers recover
//! from it silently with a debug log.

use thiserror::Error;

/// Invalid configuration supplied by the host, surfaced at the offending call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A sprite spec must set exactly one of color, image, or spritesheet.
    #[error("sprite spec must set exactly one appearance mode, found {found}")]
    AppearanceMode {
        /// How many appearance modes the spec actually set.
        found: usize,
    },

    /// An appearance mode was selected but one of its required fields is missing.
    #[error("sprite spec selects the {mode} mode but is missing `{field}`")]
    MissingField {
        /// The selected appearance mode.
        mode: &'static str,
        /// The absent field.
        field: &'static str,
    },

    /// Animations step at least one tick per frame.
    #[error("animation `{name}`: ticks_per_frame must be at least 1")]
    TicksPerFrame {
        /// Name of the offending animation.
        name: String,
    },

    /// An animation with no frames can never show anything.
    #[error("animation `{name}`: frame list must not be empty")]
    EmptyFrames {
        /// Name of the offending animation.
        name: String,
    },

    /// `play` (or a jump-to completion) referenced an undefined animation.
    #[error("no animation named `{name}` is defined for this sprite")]
    UnknownAnimation {
        /// The name that was looked up.
        name: String,
    },

    /// Animation operations only apply to spritesheet sprites.
    #[error("sprite has no spritesheet appearance; animations do not apply")]
    NotAnimated,

    /// The sprite handle points at a removed or recycled arena slot.
    #[error("sprite handle is stale or the sprite was removed")]
    StaleSprite,

    /// A zero-sized display cannot be mapped onto the backing store.
    #[error("displayed canvas size is {width}x{height}; cannot map window coordinates")]
    DegenerateViewport {
        /// Displayed (CSS) width at the time of the call.
        width: f64,
        /// Displayed (CSS) height at the time of the call.
        height: f64,
    },
}
