//! Contact tracking: the mouse pointer, multi-touch contacts, and keyboard.
//!
//! Both pointer variants run the same algorithm — convert to canvas space
//! upstream, update the contact entry, hit-test the clickable registry, and
//! produce a typed [`SpriteEvent`] for the sprite under the contact. The
//! mouse is a single implicit contact with identifier
//! [`MOUSE_CONTACT_ID`]; touches are keyed by the device-assigned identifier
//! and survive one drain cycle past their end so per-frame consumers still
//! observe the ended phase.
//!
//! Events referencing identifiers the tracker never saw are tolerated as
//! logged no-ops; devices deliver them out of order and crashing on them
//! would be wrong.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::sprite::{SpriteId, Stage};
use crate::viewport::Point;

/// Contact identifier used for the single mouse pointer.
pub const MOUSE_CONTACT_ID: i32 = 0;

/// Lifecycle phase of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPhase {
    /// The contact just began; promoted to `Moving` after one drain cycle.
    Started,
    /// The contact is ongoing (whether or not it actually moved).
    Moving,
    /// The contact lifted; purged on the next drain cycle.
    Ended,
    /// The device cancelled the contact; purged on the next drain cycle.
    Cancelled,
}

/// One physical touch, or the mouse pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Device-assigned identifier; not guaranteed contiguous.
    pub identifier: i32,
    /// Last observed position in canvas space.
    pub position: Point,
    pub phase: ContactPhase,
    /// Clickable sprite under the contact at its last event, if any.
    pub sprite: Option<SpriteId>,
}

/// Typed event produced when a contact hits a clickable sprite.
///
/// Dispatch hands these to the owning sprite's registered handler; hosts also
/// receive them back from the engine's input entry points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteEvent {
    /// The sprite that was hit.
    pub sprite: SpriteId,
    pub phase: ContactPhase,
    /// Contact position in canvas space.
    pub position: Point,
    /// Identifier of the originating contact.
    pub contact: i32,
}

fn hit_event(
    stage: &Stage,
    phase: ContactPhase,
    position: Point,
    contact: i32,
) -> Option<SpriteEvent> {
    stage
        .find_clickable_at(position)
        .map(|sprite| SpriteEvent { sprite, phase, position, contact })
}

/// State of the single mouse pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    /// Whether a button is currently held.
    pub is_down: bool,
    /// Last observed position in canvas space.
    pub position: Option<Point>,
    /// Clickable sprite under the pointer at its last event, if any.
    pub active_sprite: Option<SpriteId>,
    /// Sprite that was under the pointer at press time; cleared at release.
    pub pressed_sprite: Option<SpriteId>,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&mut self, position: Point, phase: ContactPhase, stage: &Stage) -> Option<SpriteEvent> {
        self.position = Some(position);
        let event = hit_event(stage, phase, position, MOUSE_CONTACT_ID);
        self.active_sprite = event.map(|e| e.sprite);
        event
    }

    /// A button was pressed. Repeat presses while already down are ignored.
    pub fn on_down(&mut self, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        if self.is_down {
            return None;
        }
        self.is_down = true;
        let event = self.track(position, ContactPhase::Started, stage);
        if event.is_some() {
            self.pressed_sprite = self.active_sprite;
        }
        event
    }

    /// The pointer moved. Every move re-fires against the sprite under it.
    pub fn on_move(&mut self, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        self.track(position, ContactPhase::Moving, stage)
    }

    /// The button was released. Spurious releases while not down are ignored.
    ///
    /// `pressed_sprite` is left set so a handler observing the release can
    /// still see which sprite the press landed on; the caller clears it with
    /// [`MouseState::clear_pressed`] after dispatching the event.
    pub fn on_up(&mut self, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        if !self.is_down {
            return None;
        }
        self.is_down = false;
        self.track(position, ContactPhase::Ended, stage)
    }

    /// Forget the pressed sprite; called after the release event is dispatched.
    pub fn clear_pressed(&mut self) {
        self.pressed_sprite = None;
    }
}

/// Tracks every concurrently-active touch contact, in registration order.
#[derive(Default)]
pub struct TouchTracker {
    contacts: Vec<Contact>,
}

impl TouchTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All active contacts, oldest first.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Look up a contact by identifier.
    #[must_use]
    pub fn find(&self, identifier: i32) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.identifier == identifier)
    }

    fn index_of(&self, identifier: i32) -> Option<usize> {
        self.contacts.iter().position(|contact| contact.identifier == identifier)
    }

    /// A new touch began. An entry for a recycled identifier is overwritten
    /// in place rather than duplicated.
    pub fn on_start(&mut self, identifier: i32, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        let event = hit_event(stage, ContactPhase::Started, position, identifier);
        let contact = Contact {
            identifier,
            position,
            phase: ContactPhase::Started,
            sprite: event.map(|e| e.sprite),
        };
        match self.index_of(identifier) {
            Some(index) => self.contacts[index] = contact,
            None => self.contacts.push(contact),
        }
        event
    }

    /// A tracked touch moved.
    pub fn on_move(&mut self, identifier: i32, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        self.update(identifier, position, ContactPhase::Moving, stage)
    }

    /// A tracked touch lifted. The entry survives until the next drain cycle.
    pub fn on_end(&mut self, identifier: i32, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        self.update(identifier, position, ContactPhase::Ended, stage)
    }

    /// The device cancelled a tracked touch. The entry survives until the
    /// next drain cycle.
    pub fn on_cancel(&mut self, identifier: i32, position: Point, stage: &Stage) -> Option<SpriteEvent> {
        self.update(identifier, position, ContactPhase::Cancelled, stage)
    }

    fn update(
        &mut self,
        identifier: i32,
        position: Point,
        phase: ContactPhase,
        stage: &Stage,
    ) -> Option<SpriteEvent> {
        let Some(index) = self.index_of(identifier) else {
            debug!("ignoring {phase:?} for unknown contact {identifier}");
            return None;
        };
        let event = hit_event(stage, phase, position, identifier);
        let contact = &mut self.contacts[index];
        contact.position = position;
        contact.phase = phase;
        contact.sprite = event.map(|e| e.sprite);
        event
    }

    /// Per-frame contact pass: run every callback over every active contact
    /// in registration order, then purge ended/cancelled contacts, then
    /// promote just-started contacts to `Moving`.
    ///
    /// A contact that started and ended between two drains is therefore
    /// observed exactly once with its terminal phase before disappearing.
    pub fn drain_and_advance(&mut self, callbacks: &mut [&mut dyn FnMut(&Contact)]) {
        for contact in &self.contacts {
            for callback in callbacks.iter_mut() {
                callback(contact);
            }
        }
        self.contacts
            .retain(|contact| !matches!(contact.phase, ContactPhase::Ended | ContactPhase::Cancelled));
        for contact in &mut self.contacts {
            if contact.phase == ContactPhase::Started {
                contact.phase = ContactPhase::Moving;
            }
        }
    }
}

/// Maps host key names to named actions ("left", "jump", ...).
///
/// Several keys may drive the same action and one key may drive several
/// actions; each key event toggles every binding it matches.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    bindings: Vec<(String, String)>,
    active: HashSet<String>,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a host key name (e.g. `"ArrowLeft"`) to an action name.
    pub fn bind(&mut self, key: &str, action: &str) {
        self.bindings.push((key.to_owned(), action.to_owned()));
    }

    /// Bind the arrow keys to `left` / `right` / `up` / `down`.
    pub fn bind_arrows(&mut self) {
        self.bind("ArrowLeft", "left");
        self.bind("ArrowRight", "right");
        self.bind("ArrowUp", "up");
        self.bind("ArrowDown", "down");
    }

    /// Bind W/A/S/D to `up` / `left` / `down` / `right`.
    pub fn bind_wasd(&mut self) {
        self.bind("w", "up");
        self.bind("a", "left");
        self.bind("s", "down");
        self.bind("d", "right");
    }

    /// A key went down; activates every action bound to it.
    pub fn on_key_down(&mut self, key: &str) {
        for (bound, action) in &self.bindings {
            if bound == key {
                self.active.insert(action.clone());
            }
        }
    }

    /// A key went up; deactivates every action bound to it.
    pub fn on_key_up(&mut self, key: &str) {
        for (bound, action) in &self.bindings {
            if bound == key {
                self.active.remove(action);
            }
        }
    }

    /// Whether an action is currently held.
    #[must_use]
    pub fn is_active(&self, action: &str) -> bool {
        self.active.contains(action)
    }
}
