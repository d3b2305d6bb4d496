//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per frame yields the delta
//! fed to the GUI as `Io::delta_time`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
