#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::input::ContactPhase;

// =============================================================
// Helpers
// =============================================================

fn color_spec(x: f64, y: f64, w: f64, h: f64) -> SpriteSpec {
    SpriteSpec {
        x,
        y,
        w,
        h,
        color: Some("#00ff00".to_owned()),
        ..Default::default()
    }
}

fn sheet_spec() -> SpriteSpec {
    SpriteSpec {
        x: 0.0,
        y: 0.0,
        w: 32.0,
        h: 32.0,
        sheet: Some(ImageId(1)),
        default_frame: Some(Frame::new(0, 0)),
        frame_w: Some(16.0),
        frame_h: Some(16.0),
        ..Default::default()
    }
}

fn image_spec() -> SpriteSpec {
    SpriteSpec {
        x: 0.0,
        y: 0.0,
        w: 32.0,
        h: 32.0,
        image: Some(ImageId(2)),
        image_w: Some(64.0),
        image_h: Some(64.0),
        ..Default::default()
    }
}

fn walk_def() -> AnimationDef {
    AnimationDef {
        ticks_per_frame: 2,
        frames: vec![Frame::new(0, 0), Frame::new(1, 0)],
        on_complete: crate::anim::OnComplete::Repeat,
    }
}

fn event_for(id: SpriteId) -> SpriteEvent {
    SpriteEvent {
        sprite: id,
        phase: ContactPhase::Started,
        position: Point::new(1.0, 1.0),
        contact: 0,
    }
}

// =============================================================
// Sprite construction: appearance modes
// =============================================================

#[test]
fn color_spec_builds_color_appearance() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(1.0, 2.0, 3.0, 4.0)).unwrap();
    let sprite = stage.get(id).unwrap();
    assert_eq!(sprite.x, 1.0);
    assert_eq!(sprite.h, 4.0);
    assert!(matches!(&sprite.appearance, Appearance::Color(c) if c == "#00ff00"));
    assert!(sprite.anim().is_none());
}

#[test]
fn image_spec_builds_static_image_appearance() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&image_spec()).unwrap();
    let sprite = stage.get(id).unwrap();
    assert!(matches!(
        sprite.appearance,
        Appearance::StaticImage { image: ImageId(2), width, height } if width == 64.0 && height == 64.0
    ));
    assert!(sprite.anim().is_none());
}

#[test]
fn sheet_spec_builds_animated_appearance_with_default_frame() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&sheet_spec()).unwrap();
    let sprite = stage.get(id).unwrap();
    let anim = sprite.anim().unwrap();
    assert_eq!(anim.current_frame(), Frame::new(0, 0));
    assert!(anim.active().is_none());
}

#[test]
fn spec_with_no_appearance_is_rejected() {
    let mut stage = Stage::new();
    let spec = SpriteSpec { x: 0.0, y: 0.0, w: 1.0, h: 1.0, ..Default::default() };
    let err = stage.create_sprite(&spec);
    assert_eq!(err, Err(ConfigError::AppearanceMode { found: 0 }));
    assert!(stage.is_empty());
}

#[test]
fn spec_with_two_appearances_is_rejected() {
    let mut stage = Stage::new();
    let mut spec = color_spec(0.0, 0.0, 1.0, 1.0);
    spec.image = Some(ImageId(3));
    spec.image_w = Some(8.0);
    spec.image_h = Some(8.0);
    let err = stage.create_sprite(&spec);
    assert_eq!(err, Err(ConfigError::AppearanceMode { found: 2 }));
}

#[test]
fn spec_with_all_three_appearances_is_rejected() {
    let mut stage = Stage::new();
    let mut spec = color_spec(0.0, 0.0, 1.0, 1.0);
    spec.image = Some(ImageId(3));
    spec.sheet = Some(ImageId(4));
    let err = stage.create_sprite(&spec);
    assert_eq!(err, Err(ConfigError::AppearanceMode { found: 3 }));
}

#[test]
fn image_spec_missing_dimensions_is_rejected() {
    let mut stage = Stage::new();
    let mut spec = image_spec();
    spec.image_h = None;
    let err = stage.create_sprite(&spec);
    assert_eq!(err, Err(ConfigError::MissingField { mode: "image", field: "image_h" }));
}

#[test]
fn sheet_spec_missing_default_frame_is_rejected() {
    let mut stage = Stage::new();
    let mut spec = sheet_spec();
    spec.default_frame = None;
    let err = stage.create_sprite(&spec);
    assert_eq!(
        err,
        Err(ConfigError::MissingField { mode: "spritesheet", field: "default_frame" })
    );
}

#[test]
fn sprite_spec_deserializes_from_host_json() {
    let spec: SpriteSpec = serde_json::from_str(
        r##"{"x": 10, "y": 20, "w": 30, "h": 40, "color": "#123456", "tag": "pause-button"}"##,
    )
    .unwrap();
    assert_eq!(spec.tag.as_deref(), Some("pause-button"));
    let mut stage = Stage::new();
    let id = stage.create_sprite(&spec).unwrap();
    assert_eq!(stage.get(id).unwrap().tag.as_deref(), Some("pause-button"));
}

// =============================================================
// Arena: handles, removal, staleness
// =============================================================

#[test]
fn create_then_get_round_trips() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(5.0, 5.0, 1.0, 1.0)).unwrap();
    assert!(stage.contains(id));
    assert_eq!(stage.len(), 1);
}

#[test]
fn owner_mutates_geometry_through_get_mut() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    stage.get_mut(id).unwrap().x = 42.0;
    assert_eq!(stage.get(id).unwrap().x, 42.0);
}

#[test]
fn remove_returns_the_sprite_and_frees_the_slot() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    let sprite = stage.remove_sprite(id).unwrap();
    assert_eq!(sprite.w, 1.0);
    assert!(!stage.contains(id));
    assert!(stage.is_empty());
}

#[test]
fn stale_handle_is_dead_after_slot_reuse() {
    let mut stage = Stage::new();
    let old = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    stage.remove_sprite(old);

    // The freed slot is reused; the old handle must not resolve to the
    // replacement sprite.
    let new = stage.create_sprite(&color_spec(9.0, 9.0, 1.0, 1.0)).unwrap();
    assert!(stage.get(old).is_none());
    assert_eq!(stage.get(new).unwrap().x, 9.0);
    assert_ne!(old, new);
}

#[test]
fn remove_twice_is_a_no_op() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(stage.remove_sprite(id).is_some());
    assert!(stage.remove_sprite(id).is_none());
}

#[test]
fn iter_walks_live_sprites_in_slot_order() {
    let mut stage = Stage::new();
    let a = stage.create_sprite(&color_spec(1.0, 0.0, 1.0, 1.0)).unwrap();
    let b = stage.create_sprite(&color_spec(2.0, 0.0, 1.0, 1.0)).unwrap();
    let c = stage.create_sprite(&color_spec(3.0, 0.0, 1.0, 1.0)).unwrap();
    stage.remove_sprite(b);

    let ids: Vec<SpriteId> = stage.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![a, c]);
}

#[test]
fn load_scene_creates_all_or_nothing() {
    let mut stage = Stage::new();
    let bad = SpriteSpec { x: 0.0, y: 0.0, w: 1.0, h: 1.0, ..Default::default() };
    let result = stage.load_scene(&[color_spec(0.0, 0.0, 1.0, 1.0), bad]);
    assert!(result.is_err());
    assert!(stage.is_empty());

    let ids = stage
        .load_scene(&[color_spec(0.0, 0.0, 1.0, 1.0), sheet_spec()])
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(stage.len(), 2);
}

// =============================================================
// Clickable registry
// =============================================================

#[test]
fn sprites_are_not_clickable_by_default() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    assert!(!stage.is_clickable(id));
    assert_eq!(stage.find_clickable_at(Point::new(5.0, 5.0)), None);
}

#[test]
fn set_contact_handler_registers_for_hit_testing() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    stage.set_contact_handler(id, Box::new(|_, _| {})).unwrap();
    assert!(stage.is_clickable(id));
    assert_eq!(stage.find_clickable_at(Point::new(5.0, 5.0)), Some(id));
}

#[test]
fn set_contact_handler_on_stale_handle_fails() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    stage.remove_sprite(id);
    let err = stage.set_contact_handler(id, Box::new(|_, _| {}));
    assert_eq!(err, Err(ConfigError::StaleSprite));
}

#[test]
fn clear_contact_handler_unregisters() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    stage.set_contact_handler(id, Box::new(|_, _| {})).unwrap();
    stage.clear_contact_handler(id);
    assert!(!stage.is_clickable(id));
    assert_eq!(stage.find_clickable_at(Point::new(5.0, 5.0)), None);
}

#[test]
fn hit_test_picks_first_registered_among_overlaps() {
    let mut stage = Stage::new();
    let under = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    let over = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    stage.set_contact_handler(over, Box::new(|_, _| {})).unwrap();
    stage.set_contact_handler(under, Box::new(|_, _| {})).unwrap();

    // Registration order decides, not creation order.
    assert_eq!(stage.find_clickable_at(Point::new(5.0, 5.0)), Some(over));
}

#[test]
fn removing_a_sprite_unregisters_it() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 10.0, 10.0)).unwrap();
    stage.set_contact_handler(id, Box::new(|_, _| {})).unwrap();
    stage.remove_sprite(id);
    assert_eq!(stage.find_clickable_at(Point::new(5.0, 5.0)), None);
}

#[test]
fn create_clickable_sprite_is_one_step() {
    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(&color_spec(0.0, 0.0, 10.0, 10.0), Box::new(|_, _| {}))
        .unwrap();
    assert!(stage.is_clickable(id));
}

// =============================================================
// Dispatch
// =============================================================

#[test]
fn dispatch_invokes_the_owning_handler() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&hits);

    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(move |_, event| log.borrow_mut().push(event.phase)),
        )
        .unwrap();

    stage.dispatch(&[event_for(id)]);
    stage.dispatch(&[event_for(id)]);
    assert_eq!(hits.borrow().as_slice(), &[ContactPhase::Started, ContactPhase::Started]);
}

#[test]
fn dispatch_skips_events_for_removed_sprites() {
    let hits = Rc::new(RefCell::new(0));
    let count = Rc::clone(&hits);

    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(move |_, _| *count.borrow_mut() += 1),
        )
        .unwrap();
    stage.remove_sprite(id);

    stage.dispatch(&[event_for(id)]);
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn handler_can_mutate_its_own_sprite() {
    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(|stage, event| {
                if let Some(sprite) = stage.get_mut(event.sprite) {
                    sprite.x += 1.0;
                }
            }),
        )
        .unwrap();

    stage.dispatch(&[event_for(id)]);
    stage.dispatch(&[event_for(id)]);
    assert_eq!(stage.get(id).unwrap().x, 2.0);
}

#[test]
fn handler_survives_across_dispatches() {
    let hits = Rc::new(RefCell::new(0));
    let count = Rc::clone(&hits);

    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(move |_, _| *count.borrow_mut() += 1),
        )
        .unwrap();

    for _ in 0..3 {
        stage.dispatch(&[event_for(id)]);
    }
    assert_eq!(*hits.borrow(), 3);
    assert!(stage.is_clickable(id));
}

#[test]
fn handler_removing_its_own_sprite_stops_firing() {
    let hits = Rc::new(RefCell::new(0));
    let count = Rc::clone(&hits);

    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(move |stage, event| {
                *count.borrow_mut() += 1;
                stage.remove_sprite(event.sprite);
            }),
        )
        .unwrap();

    stage.dispatch(&[event_for(id)]);
    stage.dispatch(&[event_for(id)]);
    assert_eq!(*hits.borrow(), 1);
    assert!(!stage.contains(id));
}

#[test]
fn handler_unregistering_itself_stops_firing() {
    let hits = Rc::new(RefCell::new(0));
    let count = Rc::clone(&hits);

    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(move |stage, event| {
                *count.borrow_mut() += 1;
                stage.clear_contact_handler(event.sprite);
            }),
        )
        .unwrap();

    stage.dispatch(&[event_for(id)]);
    stage.dispatch(&[event_for(id)]);
    assert_eq!(*hits.borrow(), 1);
    assert!(stage.contains(id));
    assert!(!stage.is_clickable(id));
}

#[test]
fn handler_can_create_sprites() {
    let mut stage = Stage::new();
    let id = stage
        .create_clickable_sprite(
            &color_spec(0.0, 0.0, 10.0, 10.0),
            Box::new(|stage, _| {
                stage
                    .create_sprite(&SpriteSpec {
                        x: 50.0,
                        y: 50.0,
                        w: 4.0,
                        h: 4.0,
                        color: Some("#0000ff".to_owned()),
                        ..Default::default()
                    })
                    .unwrap();
            }),
        )
        .unwrap();

    stage.dispatch(&[event_for(id)]);
    assert_eq!(stage.len(), 2);
}

// =============================================================
// Animation through the stage
// =============================================================

#[test]
fn define_and_play_on_sheet_sprite() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&sheet_spec()).unwrap();
    stage.define_animation(id, "walk", walk_def()).unwrap();
    stage.play(id, "walk").unwrap();
    assert_eq!(stage.get(id).unwrap().anim().unwrap().active(), Some("walk"));
}

#[test]
fn define_animation_on_color_sprite_fails() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    let err = stage.define_animation(id, "walk", walk_def());
    assert_eq!(err, Err(ConfigError::NotAnimated));
}

#[test]
fn play_on_stale_handle_fails() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&sheet_spec()).unwrap();
    stage.define_animation(id, "walk", walk_def()).unwrap();
    stage.remove_sprite(id);
    assert_eq!(stage.play(id, "walk"), Err(ConfigError::StaleSprite));
}

#[test]
fn advance_is_a_no_op_for_color_sprites() {
    let mut stage = Stage::new();
    let id = stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert_eq!(stage.advance(id), Ok(()));
}

#[test]
fn advance_all_steps_every_animated_sprite() {
    let mut stage = Stage::new();
    let a = stage.create_sprite(&sheet_spec()).unwrap();
    let b = stage.create_sprite(&sheet_spec()).unwrap();
    stage.create_sprite(&color_spec(0.0, 0.0, 1.0, 1.0)).unwrap();
    for id in [a, b] {
        stage.define_animation(id, "walk", walk_def()).unwrap();
        stage.play(id, "walk").unwrap();
    }

    stage.advance_all().unwrap();
    assert_eq!(stage.get(a).unwrap().anim().unwrap().elapsed(), 1);
    assert_eq!(stage.get(b).unwrap().anim().unwrap().elapsed(), 1);
}
