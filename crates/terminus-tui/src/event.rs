//! Conversion from terminal key events to mode machine input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use terminus_modal::KeyInput;

/// Convert a crossterm key event into a [`KeyInput`].
///
/// Returns `None` for releases, repeats on terminals that report them,
/// Alt chords and keys the keybinding table has no name for.
pub fn key_input(event: KeyEvent) -> Option<KeyInput> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let key = match event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        // Ctrl chords match on the lowercase letter.
        KeyCode::Char(c) if ctrl => c.to_ascii_lowercase().to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Up => "ArrowUp".into(),
        KeyCode::Down => "ArrowDown".into(),
        KeyCode::Left => "ArrowLeft".into(),
        KeyCode::Right => "ArrowRight".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };

    Some(if ctrl {
        KeyInput::ctrl(key)
    } else {
        KeyInput::plain(key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyInput> {
        key_input(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_characters_keep_case() {
        assert_eq!(
            press(KeyCode::Char('G'), KeyModifiers::SHIFT),
            Some(KeyInput::plain("G"))
        );
        assert_eq!(
            press(KeyCode::Char('j'), KeyModifiers::NONE),
            Some(KeyInput::plain("j"))
        );
    }

    #[test]
    fn test_ctrl_chords() {
        let input = press(KeyCode::Char('C'), KeyModifiers::CONTROL | KeyModifiers::SHIFT).unwrap();
        assert_eq!(input.match_key(), "C-c");
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(
            press(KeyCode::Esc, KeyModifiers::NONE).map(|k| k.match_key()),
            Some("Esc".to_string())
        );
        assert_eq!(
            press(KeyCode::Down, KeyModifiers::NONE).map(|k| k.match_key()),
            Some("ArrowDown".to_string())
        );
        assert_eq!(
            press(KeyCode::F(2), KeyModifiers::NONE).map(|k| k.match_key()),
            Some("F2".to_string())
        );
        assert_eq!(
            press(KeyCode::Char(' '), KeyModifiers::NONE).and_then(|k| k.printable()),
            Some(' ')
        );
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::ALT), None);
        assert_eq!(press(KeyCode::Insert, KeyModifiers::NONE), None);

        let mut release = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(key_input(release), None);
    }
}
