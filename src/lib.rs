//! Minimal runtime for 2D canvas games.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It manages
//! drawable sprites with per-sprite frame animation, and unified pointer
//! input (mouse plus multi-touch) with hit-testing against clickable
//! sprites. The host JavaScript layer drives the frame loop and forwards DOM
//! input events; the engine converts coordinates, tracks contacts, advances
//! animations, and dispatches typed [`input::SpriteEvent`]s to sprite
//! handlers.
//!
//! Everything except [`render`] and the [`engine::Engine`] wrapper is plain
//! Rust with no browser dependency, so the whole core is testable natively
//! through [`engine::EngineCore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`sprite`] | Sprite entities, the stage arena, and the clickable registry |
//! | [`anim`] | Animation definitions and the playback state machine |
//! | [`input`] | Mouse/touch contact trackers, sprite events, keyboard |
//! | [`geom`] | Pure hit-testing, distance, angle, and velocity helpers |
//! | [`viewport`] | Window-space to canvas-space coordinate transform |
//! | [`render`] | Canvas2D drawing; the only module touching `web_sys` |
//! | [`error`] | The [`error::ConfigError`] taxonomy |

pub mod anim;
pub mod engine;
pub mod error;
pub mod geom;
pub mod input;
pub mod render;
pub mod sprite;
pub mod viewport;
