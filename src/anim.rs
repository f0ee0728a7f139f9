//! Per-sprite frame animation: named definitions and the playback state machine.
//!
//! An [`AnimationState`] is either idle (no active name) or playing one named
//! animation from its library. `play` switches animations and resets the tick
//! counter; `advance` is the once-per-frame step that selects the frame to
//! show and applies the on-complete transition when the frame index runs off
//! the end. The tick counter increments even on the frame a completion
//! transition occurs, so an animation entered through a transition begins at
//! tick 1 rather than 0 — long-standing behavior that callers tune around.

#[cfg(test)]
#[path = "anim_test.rs"]
mod anim_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A `(column, row)` address into a spritesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Column index; the source x offset is `col * frame_w`.
    pub col: u32,
    /// Row index; the source y offset is `row * frame_h`.
    pub row: u32,
}

impl Frame {
    #[must_use]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// What happens when an animation's last frame has been shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnComplete {
    /// Restart the same animation from its first frame.
    #[default]
    Repeat,
    /// Switch to another animation in the same library.
    JumpTo(String),
    /// Stop and hold a fixed frame.
    FreezeAt(Frame),
}

/// A named animation: frame sequence, pacing, and completion behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDef {
    /// Ticks each frame stays on screen. Must be at least 1.
    pub ticks_per_frame: u32,
    /// Ordered frames to cycle through. Must be non-empty.
    pub frames: Vec<Frame>,
    /// Transition applied when the sequence ends.
    #[serde(default)]
    pub on_complete: OnComplete,
}

/// Playback state for one spritesheet sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    library: HashMap<String, AnimationDef>,
    active: Option<String>,
    elapsed: u32,
    default_frame: Frame,
    current: Frame,
}

impl AnimationState {
    /// New idle state showing `default_frame`.
    #[must_use]
    pub fn new(default_frame: Frame) -> Self {
        Self {
            library: HashMap::new(),
            active: None,
            elapsed: 0,
            default_frame,
            current: default_frame,
        }
    }

    /// Insert or overwrite an animation definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TicksPerFrame`] or [`ConfigError::EmptyFrames`]
    /// for a definition that could never play.
    pub fn define(&mut self, name: &str, def: AnimationDef) -> Result<(), ConfigError> {
        if def.ticks_per_frame < 1 {
            return Err(ConfigError::TicksPerFrame { name: name.to_owned() });
        }
        if def.frames.is_empty() {
            return Err(ConfigError::EmptyFrames { name: name.to_owned() });
        }
        self.library.insert(name.to_owned(), def);
        Ok(())
    }

    /// Start an animation. Idempotent when `name` is already active: the
    /// running animation keeps its tick counter and is not restarted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAnimation`] if `name` is not defined.
    pub fn play(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.library.contains_key(name) {
            return Err(ConfigError::UnknownAnimation { name: name.to_owned() });
        }
        if self.active.as_deref() != Some(name) {
            self.active = Some(name.to_owned());
            self.elapsed = 0;
        }
        Ok(())
    }

    /// The once-per-frame playback step.
    ///
    /// While the computed frame index is in range, the indexed frame becomes
    /// current. Past the end, the on-complete transition runs: repeat and
    /// jump-to clear the active name and re-enter `play`; freeze holds the
    /// fixed frame and goes idle. The tick counter increments unconditionally
    /// afterwards, including on transition frames.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAnimation`] if a jump-to target was
    /// never defined.
    pub fn advance(&mut self) -> Result<(), ConfigError> {
        let Some(name) = self.active.clone() else {
            return Ok(());
        };
        let Some(def) = self.library.get(&name) else {
            return Err(ConfigError::UnknownAnimation { name });
        };
        let index = (self.elapsed / def.ticks_per_frame) as usize;
        if let Some(frame) = def.frames.get(index).copied() {
            self.current = frame;
        } else {
            let on_complete = def.on_complete.clone();
            self.active = None;
            match on_complete {
                OnComplete::Repeat => self.play(&name)?,
                OnComplete::JumpTo(next) => self.play(&next)?,
                OnComplete::FreezeAt(frame) => self.current = frame,
            }
        }
        self.elapsed += 1;
        Ok(())
    }

    /// Name of the running animation, if any.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Ticks since the active animation started.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// The frame currently rendered.
    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.current
    }

    /// The frame shown before any animation ever ran.
    #[must_use]
    pub fn default_frame(&self) -> Frame {
        self.default_frame
    }

    /// Whether `name` exists in the library.
    #[must_use]
    pub fn has_animation(&self, name: &str) -> bool {
        self.library.contains_key(name)
    }
}
