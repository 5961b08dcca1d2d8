//! # Daydream Controls Library
//!
//! Turn Daydream motion-controller gamepad input into semantic button and
//! trackpad events.
//!
//! This library binds a single controller by id prefix and hand, tracks each
//! button through idle, touched and pressed, emits `down`/`up`/`touchstart`/
//! `touchend` edges plus raw change notifications, and keeps the controller
//! model's button colors in step with their state.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod runner;
pub mod telemetry;
