use std::collections::HashSet;

use super::types::{
    ButtonState, InputEvent, MouseButton, PointerButtonEvent, PointerMoveEvent, TouchEvent,
    TouchPhase,
};

/// What the geometry generator needs to know about the pointer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerState {
    /// Primary button (or a touch contact) is held.
    pub primary_down: bool,

    /// Last known pointer position in logical pixels. Starts at the origin and
    /// keeps its value when the pointer leaves the window.
    pub position: (f32, f32),
}

impl PointerState {
    #[inline]
    pub const fn new(primary_down: bool, x: f32, y: f32) -> Self {
        Self { primary_down, position: (x, y) }
    }
}

/// Current input state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Last known pointer position in logical pixels.
    pub pointer_pos: (f32, f32),

    /// Currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,

    /// Touch contact currently acting as the primary pointer.
    pub active_touch: Option<u64>,
}

impl InputState {
    /// Applies a platform-agnostic input event.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases can be lost while unfocused; avoid a stuck button.
                    self.buttons_down.clear();
                    self.active_touch = None;
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = (*x, *y);
            }

            InputEvent::PointerButton(PointerButtonEvent { button, state }) => match state {
                ButtonState::Pressed => {
                    self.buttons_down.insert(*button);
                }
                ButtonState::Released => {
                    self.buttons_down.remove(button);
                }
            },

            InputEvent::Touch(TouchEvent { id, phase, x, y }) => match phase {
                TouchPhase::Started => {
                    if self.active_touch.is_none() {
                        self.active_touch = Some(*id);
                    }
                    if self.active_touch == Some(*id) {
                        self.pointer_pos = (*x, *y);
                    }
                }
                TouchPhase::Moved => {
                    if self.active_touch == Some(*id) {
                        self.pointer_pos = (*x, *y);
                    }
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    if self.active_touch == Some(*id) {
                        self.active_touch = None;
                    }
                }
            },
        }
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// Snapshot for the geometry generator.
    pub fn pointer(&self) -> PointerState {
        PointerState {
            primary_down: self.button_down(MouseButton::PRIMARY) || self.active_touch.is_some(),
            position: self.pointer_pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state: ButtonState::Pressed })
    }

    fn release(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state: ButtonState::Released })
    }

    fn touch(id: u64, phase: TouchPhase, x: f32, y: f32) -> InputEvent {
        InputEvent::Touch(TouchEvent { id, phase, x, y })
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn pointer_starts_released_at_origin() {
        let s = InputState::default();
        assert_eq!(s.pointer(), PointerState::new(false, 0.0, 0.0));
    }

    #[test]
    fn left_press_and_release_toggle_primary() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Left));
        assert!(s.pointer().primary_down);
        s.apply_event(&release(MouseButton::Left));
        assert!(!s.pointer().primary_down);
    }

    #[test]
    fn other_buttons_do_not_count_as_primary() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Right));
        s.apply_event(&press(MouseButton::Middle));
        assert!(!s.pointer().primary_down);
        assert!(s.button_down(MouseButton::Right));
    }

    #[test]
    fn move_updates_last_position() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 100.0, y: 40.0 }));
        s.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 120.0, y: 60.0 }));
        assert_eq!(s.pointer().position, (120.0, 60.0));
    }

    #[test]
    fn focus_loss_releases_buttons() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Left));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.pointer().primary_down);
    }

    // ── touch ─────────────────────────────────────────────────────────────

    #[test]
    fn touch_holds_primary_and_tracks_position() {
        let mut s = InputState::default();
        s.apply_event(&touch(7, TouchPhase::Started, 10.0, 20.0));
        assert_eq!(s.pointer(), PointerState::new(true, 10.0, 20.0));

        s.apply_event(&touch(7, TouchPhase::Moved, 30.0, 40.0));
        assert_eq!(s.pointer().position, (30.0, 40.0));

        s.apply_event(&touch(7, TouchPhase::Ended, 30.0, 40.0));
        assert_eq!(s.pointer(), PointerState::new(false, 30.0, 40.0));
    }

    #[test]
    fn second_finger_is_ignored() {
        let mut s = InputState::default();
        s.apply_event(&touch(1, TouchPhase::Started, 10.0, 10.0));
        s.apply_event(&touch(2, TouchPhase::Started, 90.0, 90.0));
        s.apply_event(&touch(2, TouchPhase::Moved, 95.0, 95.0));
        assert_eq!(s.pointer().position, (10.0, 10.0));

        s.apply_event(&touch(2, TouchPhase::Ended, 95.0, 95.0));
        assert!(s.pointer().primary_down);
    }
}
