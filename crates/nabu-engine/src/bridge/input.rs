//! Event-driven half of the input snapshot.
//!
//! Each handler mutates [`Io`] directly and never fails: codes outside the
//! tracked ranges are dropped.

use nabu_gui::{Io, KEYS_DOWN_LEN, MOUSE_BUTTONS_LEN};

use crate::input::{Action, InputEvent, Key};

#[inline]
fn slot(code: i32, len: usize) -> Option<usize> {
    usize::try_from(code).ok().filter(|&i| i < len)
}

#[inline]
fn apply(bit: &mut bool, action: Action) {
    match action {
        Action::Press => *bit = true,
        Action::Release => *bit = false,
        Action::Repeat => {}
    }
}

/// Updates the pressed bit for `code` and recomputes the modifier flags.
pub fn on_key(io: &mut Io, code: i32, action: Action) {
    if let Some(i) = slot(code, KEYS_DOWN_LEN) {
        apply(&mut io.keys_down[i], action);
    }

    let down = |key: Key| slot(key.code(), KEYS_DOWN_LEN).is_some_and(|i| io.keys_down[i]);
    let ctrl = down(Key::ControlLeft) || down(Key::ControlRight);
    let shift = down(Key::ShiftLeft) || down(Key::ShiftRight);
    let alt = down(Key::AltLeft) || down(Key::AltRight);
    let sup = down(Key::SuperLeft) || down(Key::SuperRight);

    io.key_ctrl = ctrl;
    io.key_shift = shift;
    io.key_alt = alt;
    io.key_super = sup;
}

/// Queues a Unicode scalar value. Surrogates and NUL are dropped.
pub fn on_char(io: &mut Io, codepoint: u32) {
    if let Some(c) = char::from_u32(codepoint) {
        io.add_input_character(c);
    }
}

pub fn on_mouse_button(io: &mut Io, button: i32, action: Action) {
    if let Some(i) = slot(button, MOUSE_BUTTONS_LEN) {
        apply(&mut io.mouse_down[i], action);
    }
}

/// Accumulates wheel deltas until the GUI consumes them at frame end.
pub fn on_scroll(io: &mut Io, dx: f64, dy: f64) {
    io.mouse_wheel_h += dx as f32;
    io.mouse_wheel += dy as f32;
}

/// The GUI owns keyboard input this frame (a text field has focus).
#[inline]
pub fn wants_keyboard(io: &Io) -> bool {
    io.want_capture_keyboard
}

/// The pointer is over, or dragging, a GUI element.
#[inline]
pub fn wants_mouse(io: &Io) -> bool {
    io.want_capture_mouse
}

/// Routes a platform event to its handler.
///
/// Pointer motion and focus changes are not events for the GUI: the frame
/// synchronizer polls both once per frame.
pub fn apply_event(io: &mut Io, event: &InputEvent) {
    match *event {
        InputEvent::Key { key, action } => on_key(io, key.code(), action),
        InputEvent::Char(c) => on_char(io, u32::from(c)),
        InputEvent::MouseButton { button, action } => on_mouse_button(io, button.index(), action),
        InputEvent::Scroll { dx, dy } => on_scroll(io, dx, dy),
        InputEvent::CursorMoved { .. } | InputEvent::CursorLeft | InputEvent::Focused(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    #[test]
    fn press_release_round_trip_touches_only_that_key() {
        let mut io = Io::default();
        for code in 0..KEYS_DOWN_LEN as i32 {
            on_key(&mut io, code, Action::Press);
            let pressed: Vec<usize> = (0..KEYS_DOWN_LEN).filter(|&i| io.keys_down[i]).collect();
            assert_eq!(pressed, vec![code as usize]);

            on_key(&mut io, code, Action::Release);
            assert!(io.keys_down.iter().all(|&d| !d), "key {code} stuck");
        }
        assert!(!io.key_ctrl && !io.key_shift && !io.key_alt && !io.key_super);
    }

    #[test]
    fn out_of_range_codes_are_ignored() {
        let mut io = Io::default();
        on_key(&mut io, -1, Action::Press);
        on_key(&mut io, KEYS_DOWN_LEN as i32, Action::Press);
        on_key(&mut io, i32::MAX, Action::Press);
        assert!(io.keys_down.iter().all(|&d| !d));

        on_mouse_button(&mut io, 5, Action::Press);
        on_mouse_button(&mut io, -3, Action::Press);
        assert!(io.mouse_down.iter().all(|&d| !d));
    }

    #[test]
    fn modifiers_are_or_of_both_sides() {
        let mut io = Io::default();
        on_key(&mut io, Key::ControlLeft.code(), Action::Press);
        on_key(&mut io, Key::ControlRight.code(), Action::Press);
        assert!(io.key_ctrl);

        on_key(&mut io, Key::ControlLeft.code(), Action::Release);
        assert!(io.key_ctrl, "right ctrl still held");

        on_key(&mut io, Key::ControlRight.code(), Action::Release);
        assert!(!io.key_ctrl);

        on_key(&mut io, Key::SuperRight.code(), Action::Press);
        on_key(&mut io, Key::ShiftLeft.code(), Action::Press);
        on_key(&mut io, Key::AltRight.code(), Action::Press);
        assert!(io.key_super && io.key_shift && io.key_alt);
    }

    #[test]
    fn repeat_keeps_key_down() {
        let mut io = Io::default();
        let code = Key::A.code();
        on_key(&mut io, code, Action::Press);
        on_key(&mut io, code, Action::Repeat);
        assert!(io.keys_down[code as usize]);
    }

    #[test]
    fn scroll_accumulates_within_a_frame() {
        let mut io = Io::default();
        let deltas = [(0.5, 1.0), (-1.5, 2.0), (0.25, -0.5)];
        for (dx, dy) in deltas {
            on_scroll(&mut io, dx, dy);
        }
        assert_eq!(io.mouse_wheel_h, -0.75);
        assert_eq!(io.mouse_wheel, 2.5);
    }

    #[test]
    fn chars_are_queued_in_order() {
        let mut io = Io::default();
        on_char(&mut io, 'h' as u32);
        on_char(&mut io, 0xD800);
        on_char(&mut io, 0);
        on_char(&mut io, 'é' as u32);
        assert_eq!(io.input_queue_characters, vec!['h', 'é']);
    }

    #[test]
    fn capture_queries_pass_through() {
        let mut io = Io::default();
        assert!(!wants_keyboard(&io) && !wants_mouse(&io));
        io.want_capture_keyboard = true;
        assert!(wants_keyboard(&io));
        assert!(!wants_mouse(&io));
        io.want_capture_mouse = true;
        assert!(wants_mouse(&io));
    }

    #[test]
    fn events_dispatch_to_handlers() {
        let mut io = Io::default();
        apply_event(&mut io, &InputEvent::Key { key: Key::Enter, action: Action::Press });
        apply_event(&mut io, &InputEvent::Char('x'));
        apply_event(
            &mut io,
            &InputEvent::MouseButton { button: MouseButton::Right, action: Action::Press },
        );
        apply_event(
            &mut io,
            &InputEvent::MouseButton { button: MouseButton::Other(2), action: Action::Press },
        );
        apply_event(&mut io, &InputEvent::Scroll { dx: 0.0, dy: -1.0 });
        apply_event(&mut io, &InputEvent::CursorMoved { x: 5.0, y: 5.0 });
        apply_event(&mut io, &InputEvent::CursorLeft);

        assert!(io.keys_down[Key::Enter.code() as usize]);
        assert_eq!(io.input_queue_characters, vec!['x']);
        assert_eq!(io.mouse_down, [false, true, false, false, false]);
        assert_eq!(io.mouse_wheel, -1.0);
        assert!(!io.is_mouse_pos_valid());
    }
}
