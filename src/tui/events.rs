//! Event Handling - Keyboard input decoding
//!
//! Raw crossterm events become [`Input`]s; everything past this point only
//! sees high-level [`Key`]s.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::element::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Leave the console from any screen
    Quit,
    /// Terminal resized; redraw only
    Redraw,
    Key(Key),
    None,
}

pub fn decode_event(event: Event) -> Input {
    match event {
        Event::Key(key) => decode_key(key),
        Event::Resize(..) => Input::Redraw,
        _ => Input::None,
    }
}

pub fn decode_key(key: KeyEvent) -> Input {
    if key.kind == KeyEventKind::Release {
        return Input::None;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Input::Quit,
        (_, KeyCode::Tab) => Input::Key(Key::Tab),
        (_, KeyCode::BackTab) => Input::Key(Key::BackTab),
        (_, KeyCode::Up) => Input::Key(Key::Up),
        (_, KeyCode::Down) => Input::Key(Key::Down),
        (_, KeyCode::Left) => Input::Key(Key::Left),
        (_, KeyCode::Right) => Input::Key(Key::Right),
        (_, KeyCode::Enter) => Input::Key(Key::Enter),
        (_, KeyCode::Backspace) => Input::Key(Key::Backspace),
        (_, KeyCode::Esc) => Input::Key(Key::Esc),
        (m, KeyCode::Char(ch)) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Input::Key(Key::Char(ch))
        }
        _ => Input::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_c_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(decode_key(key), Input::Quit);
    }

    #[test]
    fn test_plain_c_is_a_character() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(decode_key(key), Input::Key(Key::Char('c')));

        let key = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT);
        assert_eq!(decode_key(key), Input::Key(Key::Char('C')));
    }

    #[test]
    fn test_navigation_keys() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let back = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(decode_key(tab), Input::Key(Key::Tab));
        assert_eq!(decode_key(back), Input::Key(Key::BackTab));
    }

    #[test]
    fn test_alt_chords_are_ignored() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(decode_key(key), Input::None);
    }

    #[test]
    fn test_resize_redraws() {
        assert_eq!(decode_event(Event::Resize(80, 24)), Input::Redraw);
    }
}
