use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use humilhador_core::CardCapability;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Key that runs the card action in normal mode.
pub fn action_key(capability: CardCapability) -> char {
    match capability {
        CardCapability::Export => 'p',
        CardCapability::Share => 's',
    }
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => {
            if app.input_mode == InputMode::Editing {
                for c in text.chars().filter(|c| !c.is_control()) {
                    insert_char(app, c);
                }
            }
        }
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Esc => app.dismiss_notice(),
        KeyCode::Char(c) if c == action_key(app.capability()) => {
            if !app.trigger_action() {
                tracing::debug!("Card action ignored: reveal not finished or action running");
            }
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            if !app.loading {
                app.submit();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.username_input, app.input_cursor);
                app.username_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.username_input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.username_input, app.input_cursor);
                app.username_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.username_input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.username_input.chars().count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let byte_pos = char_to_byte_index(&app.username_input, app.input_cursor);
    app.username_input.insert(byte_pos, c);
    app.input_cursor += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RoastApiClient;
    use humilhador_core::card::ClipboardSharer;
    use std::sync::Arc;

    fn app() -> App {
        App::new(
            RoastApiClient::new("http://127.0.0.1:9"),
            Arc::new(ClipboardSharer::new(None)),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("ação", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_editing_keys() {
        let mut app = app();
        for c in "octocta".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.username_input, "octoct");

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.username_input, "octocat");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.username_input, "ctocat");
        assert_eq!(app.input_cursor, 0);
    }

    #[test]
    fn test_action_key_ignored_before_reveal() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char(action_key(CardCapability::Share)));
        assert!(app.action_task.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_from_editing() {
        let mut app = app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(action_key(CardCapability::Export), 'p');
        assert_eq!(action_key(CardCapability::Share), 's');
    }
}
