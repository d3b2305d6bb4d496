//! nabu engine.
//!
//! Window, GPU device and render backend, plus the per-frame bridge that
//! feeds platform input into `nabu-gui` and turns its draw data into GPU work.

pub mod backend;
pub mod bridge;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod platform;
pub mod time;
pub mod window;
