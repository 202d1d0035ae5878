use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A pending notice blocks everything until acknowledged
    if app.session.notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.session.dismiss_notice();
        }
        return;
    }

    // Handle the file prompt if it's open
    if app.show_file_prompt {
        match key.code {
            KeyCode::Esc => {
                app.show_file_prompt = false;
                app.file_input.clear();
            }
            KeyCode::Enter => {
                let path = app.file_input.trim();
                if !path.is_empty() {
                    app.session.composer.set_file(path);
                }
                app.show_file_prompt = false;
                app.file_input.clear();
            }
            KeyCode::Backspace => {
                app.file_input.pop();
            }
            KeyCode::Char(c) => {
                app.file_input.push(c);
            }
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.session.composer.move_end();
        }

        // Switch between the chat and document-answer endpoints
        KeyCode::Tab => app.toggle_target(),

        // Chat log scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        // Document actions
        KeyCode::Char('f') => {
            app.show_file_prompt = true;
            app.file_input.clear();
        }
        KeyCode::Char('u') => app.upload_selected_file(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Dispatch to the current target; typing can continue while the
        // reply is in flight
        KeyCode::Enter => app.send_current_draft(),
        KeyCode::Tab => app.toggle_target(),
        KeyCode::Backspace => app.session.composer.backspace(),
        KeyCode::Delete => app.session.composer.delete(),
        KeyCode::Left => app.session.composer.move_left(),
        KeyCode::Right => app.session.composer.move_right(),
        KeyCode::Home => app.session.composer.move_home(),
        KeyCode::End => app.session.composer.move_end(),
        KeyCode::Char(c) => app.session.composer.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.scroll_down();
            app.scroll_down();
            app.scroll_down();
        }
        MouseEventKind::ScrollUp => {
            app.scroll_up();
            app.scroll_up();
            app.scroll_up();
        }
        _ => {}
    }
}
