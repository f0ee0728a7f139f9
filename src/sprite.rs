//! Sprite entities and the stage that owns them.
//!
//! A [`Sprite`] is a positioned rectangle with exactly one appearance mode,
//! enforced by the [`Appearance`] enum: a solid color, a static image, or an
//! animated spritesheet. Only the spritesheet mode carries animation state.
//!
//! The [`Stage`] is the explicit context object replacing process-wide
//! registries: it owns every sprite in a generational arena, keeps the
//! clickable registry in registration order, and holds the contact handlers
//! that input dispatch feeds. Removing a sprite bumps its slot generation, so
//! stale [`SpriteId`]s are detected on every access and a handler can never
//! fire for a discarded sprite.

#[cfg(test)]
#[path = "sprite_test.rs"]
mod sprite_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::anim::{AnimationDef, AnimationState, Frame};
use crate::error::ConfigError;
use crate::geom;
use crate::input::SpriteEvent;
use crate::viewport::Point;

/// Opaque handle to a host-registered image or spritesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u32);

/// Generational handle to a sprite slot in a [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId {
    index: u32,
    generation: u32,
}

/// Exactly one way a sprite is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Appearance {
    /// Fill the sprite rectangle with a CSS color.
    Color(String),
    /// Blit the full source rectangle of a static image.
    StaticImage {
        image: ImageId,
        /// Source width in image pixels.
        width: f64,
        /// Source height in image pixels.
        height: f64,
    },
    /// Blit the current animation frame out of a shared sheet.
    AnimatedSheet {
        sheet: ImageId,
        /// Width of one frame cell in sheet pixels.
        frame_w: f64,
        /// Height of one frame cell in sheet pixels.
        frame_h: f64,
        anim: AnimationState,
    },
}

/// A drawable entity on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Left edge in canvas space. Owners move sprites by mutating these.
    pub x: f64,
    /// Top edge in canvas space.
    pub y: f64,
    /// Drawn width in canvas space.
    pub w: f64,
    /// Drawn height in canvas space.
    pub h: f64,
    /// Free-form role tag ("player", "pause-button", ...).
    pub tag: Option<String>,
    /// The single appearance mode.
    pub appearance: Appearance,
}

impl Sprite {
    /// Animation state, present only for spritesheet sprites.
    #[must_use]
    pub fn anim(&self) -> Option<&AnimationState> {
        match &self.appearance {
            Appearance::AnimatedSheet { anim, .. } => Some(anim),
            _ => None,
        }
    }

    /// Mutable animation state, present only for spritesheet sprites.
    pub fn anim_mut(&mut self) -> Option<&mut AnimationState> {
        match &mut self.appearance {
            Appearance::AnimatedSheet { anim, .. } => Some(anim),
            _ => None,
        }
    }
}

/// Host-supplied sprite creation options, JSON-friendly.
///
/// Exactly one of `color`, `image`, or `sheet` selects the appearance mode;
/// anything else is a [`ConfigError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteSpec {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Free-form role tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Color mode: a CSS fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Static-image mode: the image handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageId>,
    /// Static-image mode: source width in image pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_w: Option<f64>,
    /// Static-image mode: source height in image pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_h: Option<f64>,
    /// Spritesheet mode: the sheet handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<ImageId>,
    /// Spritesheet mode: frame shown while no animation is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_frame: Option<Frame>,
    /// Spritesheet mode: frame cell width in sheet pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_w: Option<f64>,
    /// Spritesheet mode: frame cell height in sheet pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_h: Option<f64>,
}

impl SpriteSpec {
    /// Validate the spec and build its tagged appearance.
    fn appearance(&self) -> Result<Appearance, ConfigError> {
        let found = [self.color.is_some(), self.image.is_some(), self.sheet.is_some()]
            .into_iter()
            .filter(|set| *set)
            .count();
        if found != 1 {
            return Err(ConfigError::AppearanceMode { found });
        }

        if let Some(color) = &self.color {
            return Ok(Appearance::Color(color.clone()));
        }

        if let Some(image) = self.image {
            let width = self
                .image_w
                .ok_or(ConfigError::MissingField { mode: "image", field: "image_w" })?;
            let height = self
                .image_h
                .ok_or(ConfigError::MissingField { mode: "image", field: "image_h" })?;
            return Ok(Appearance::StaticImage { image, width, height });
        }

        let Some(sheet) = self.sheet else {
            return Err(ConfigError::AppearanceMode { found: 0 });
        };
        let default_frame = self
            .default_frame
            .ok_or(ConfigError::MissingField { mode: "spritesheet", field: "default_frame" })?;
        let frame_w = self
            .frame_w
            .ok_or(ConfigError::MissingField { mode: "spritesheet", field: "frame_w" })?;
        let frame_h = self
            .frame_h
            .ok_or(ConfigError::MissingField { mode: "spritesheet", field: "frame_h" })?;
        Ok(Appearance::AnimatedSheet {
            sheet,
            frame_w,
            frame_h,
            anim: AnimationState::new(default_frame),
        })
    }
}

/// Handler invoked for each [`SpriteEvent`] hitting the owning sprite.
pub type ContactHandler = Box<dyn FnMut(&mut Stage, &SpriteEvent)>;

struct Slot {
    generation: u32,
    sprite: Option<Sprite>,
}

/// Owns all live sprites, the clickable registry, and contact handlers.
#[derive(Default)]
pub struct Stage {
    slots: Vec<Slot>,
    free: Vec<u32>,
    clickables: Vec<SpriteId>,
    handlers: HashMap<SpriteId, ContactHandler>,
}

impl Stage {
    /// Create an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a spec and create the sprite, returning its handle.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the spec sets zero or multiple
    /// appearance modes, or omits a field the selected mode requires.
    pub fn create_sprite(&mut self, spec: &SpriteSpec) -> Result<SpriteId, ConfigError> {
        let appearance = spec.appearance()?;
        let sprite = Sprite {
            x: spec.x,
            y: spec.y,
            w: spec.w,
            h: spec.h,
            tag: spec.tag.clone(),
            appearance,
        };
        Ok(self.insert(sprite))
    }

    /// Create a sprite and register it as clickable in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Stage::create_sprite`].
    pub fn create_clickable_sprite(
        &mut self,
        spec: &SpriteSpec,
        handler: ContactHandler,
    ) -> Result<SpriteId, ConfigError> {
        let id = self.create_sprite(spec)?;
        // Freshly created handles are always live, so registration can't fail.
        self.handlers.insert(id, handler);
        self.clickables.push(id);
        Ok(id)
    }

    /// Validate every spec, then create all sprites. Nothing is created if
    /// any spec is invalid.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] among the specs.
    pub fn load_scene(&mut self, specs: &[SpriteSpec]) -> Result<Vec<SpriteId>, ConfigError> {
        let mut sprites = Vec::with_capacity(specs.len());
        for spec in specs {
            let appearance = spec.appearance()?;
            sprites.push(Sprite {
                x: spec.x,
                y: spec.y,
                w: spec.w,
                h: spec.h,
                tag: spec.tag.clone(),
                appearance,
            });
        }
        Ok(sprites.into_iter().map(|sprite| self.insert(sprite)).collect())
    }

    fn insert(&mut self, sprite: Sprite) -> SpriteId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.sprite = Some(sprite);
            SpriteId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, sprite: Some(sprite) });
            SpriteId { index, generation: 0 }
        }
    }

    /// Remove a sprite, unregistering it from the clickable registry and
    /// dropping its handler. Returns the sprite, or `None` for a stale
    /// handle. The slot generation is bumped so the old handle is dead.
    pub fn remove_sprite(&mut self, id: SpriteId) -> Option<Sprite> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let sprite = slot.sprite.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.clickables.retain(|clickable| *clickable != id);
        self.handlers.remove(&id);
        Some(sprite)
    }

    /// Whether `id` refers to a live sprite.
    #[must_use]
    pub fn contains(&self, id: SpriteId) -> bool {
        self.get(id).is_some()
    }

    /// Borrow a sprite, or `None` for a stale handle.
    #[must_use]
    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.sprite.as_ref()
    }

    /// Mutably borrow a sprite, or `None` for a stale handle.
    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.sprite.as_mut()
    }

    /// Live sprites in arena (creation-slot) order.
    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let sprite = slot.sprite.as_ref()?;
            let id = SpriteId { index: index as u32, generation: slot.generation };
            Some((id, sprite))
        })
    }

    /// Number of live sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.sprite.is_some()).count()
    }

    /// Whether the stage has no live sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Clickable registry ---

    /// Register a contact handler, making the sprite clickable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleSprite`] for a dead handle.
    pub fn set_contact_handler(
        &mut self,
        id: SpriteId,
        handler: ContactHandler,
    ) -> Result<(), ConfigError> {
        if !self.contains(id) {
            return Err(ConfigError::StaleSprite);
        }
        self.handlers.insert(id, handler);
        if !self.clickables.contains(&id) {
            self.clickables.push(id);
        }
        Ok(())
    }

    /// Drop a sprite's handler and unregister it from hit-testing.
    pub fn clear_contact_handler(&mut self, id: SpriteId) {
        self.handlers.remove(&id);
        self.clickables.retain(|clickable| *clickable != id);
    }

    /// Whether the sprite is registered for hit-testing.
    #[must_use]
    pub fn is_clickable(&self, id: SpriteId) -> bool {
        self.clickables.contains(&id)
    }

    /// First registered clickable sprite containing `point`, in registration
    /// order.
    #[must_use]
    pub fn find_clickable_at(&self, point: Point) -> Option<SpriteId> {
        geom::first_containing(
            self.clickables
                .iter()
                .filter_map(|id| self.get(*id).map(|sprite| (*id, sprite))),
            point,
        )
    }

    /// Hand each event to its owning sprite's handler.
    ///
    /// Events whose sprite has been removed are skipped, so a stale handle
    /// can never reach a handler. Handlers get `&mut Stage` access and may
    /// create, mutate, or remove sprites, including their own.
    pub fn dispatch(&mut self, events: &[SpriteEvent]) {
        for event in events {
            if !self.contains(event.sprite) {
                continue;
            }
            let Some(mut handler) = self.handlers.remove(&event.sprite) else {
                continue;
            };
            handler(self, event);
            // Put the handler back unless the handler removed its sprite,
            // unregistered itself, or installed a replacement.
            if self.clickables.contains(&event.sprite) {
                self.handlers.entry(event.sprite).or_insert(handler);
            }
        }
    }

    // --- Animation ---

    /// Insert or overwrite a named animation on a spritesheet sprite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleSprite`] for a dead handle,
    /// [`ConfigError::NotAnimated`] for a non-spritesheet sprite, and the
    /// definition's own validation errors.
    pub fn define_animation(
        &mut self,
        id: SpriteId,
        name: &str,
        def: AnimationDef,
    ) -> Result<(), ConfigError> {
        let sprite = self.get_mut(id).ok_or(ConfigError::StaleSprite)?;
        let anim = sprite.anim_mut().ok_or(ConfigError::NotAnimated)?;
        anim.define(name, def)
    }

    /// Start (or keep running) a named animation on a sprite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleSprite`], [`ConfigError::NotAnimated`], or
    /// [`ConfigError::UnknownAnimation`].
    pub fn play(&mut self, id: SpriteId, name: &str) -> Result<(), ConfigError> {
        let sprite = self.get_mut(id).ok_or(ConfigError::StaleSprite)?;
        let anim = sprite.anim_mut().ok_or(ConfigError::NotAnimated)?;
        anim.play(name)
    }

    /// Advance one sprite's animation by one tick. A no-op for sprites
    /// without a spritesheet appearance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StaleSprite`] for a dead handle, or the
    /// playback error from a bad jump-to target.
    pub fn advance(&mut self, id: SpriteId) -> Result<(), ConfigError> {
        let sprite = self.get_mut(id).ok_or(ConfigError::StaleSprite)?;
        match sprite.anim_mut() {
            Some(anim) => anim.advance(),
            None => Ok(()),
        }
    }

    /// Advance every animated sprite by one tick, in arena order.
    ///
    /// # Errors
    ///
    /// Returns the first playback error encountered.
    pub fn advance_all(&mut self) -> Result<(), ConfigError> {
        for slot in &mut self.slots {
            if let Some(anim) = slot.sprite.as_mut().and_then(Sprite::anim_mut) {
                anim.advance()?;
            }
        }
        Ok(())
    }
}
