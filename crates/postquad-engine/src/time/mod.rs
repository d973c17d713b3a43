//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per frame. `Elapsed`
//! accumulates the deltas into the animation time used by the post pass.

mod frame_clock;

pub use frame_clock::{Elapsed, FrameClock, FrameTime};
