//! Vitrine: model viewer core.
//!
//! Per-mesh material overrides with standard to physical promotion,
//! open/close playback of a model's animation clip at a chosen duration,
//! and one-shot auto-framing of each freshly loaded model.

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod render;
pub mod scene;
pub mod ui;
