//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform::winit` translates window events into `InputEvent`s.

pub mod platform;
mod state;
mod types;

pub use state::{InputState, PointerState};
pub use types::{
    ButtonState, InputEvent, MouseButton, PointerButtonEvent, PointerMoveEvent, TouchEvent,
    TouchPhase,
};
