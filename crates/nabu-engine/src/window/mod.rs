//! Event loop and window lifecycle.
//!
//! Owns the winit event loop and the single window, and wires them to the
//! GPU device, the render backend and the GUI bridge.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
