pub mod screens;
pub mod widgets;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use std::io::Stdout;
use std::time::Duration;

use crate::app::{App, ConfirmAction, Screen};
use widgets::ConfirmDialog;

/// Run the TUI application
pub fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render(app, frame))?;

        app.check_status_expiry();

        // Poll with timeout so expired status messages get cleared
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render the current screen
fn render(app: &App, frame: &mut Frame) {
    screens::accelerator::render(app, frame);

    match &app.screen {
        Screen::Page => {}
        Screen::Help => screens::help::render(frame),
        Screen::Confirm(action) => render_confirm(action, frame),
    }
}

fn render_confirm(action: &ConfirmAction, frame: &mut Frame) {
    let (title, message) = match action {
        ConfirmAction::DiscardChanges => (
            "Discard Changes",
            "The accelerator selection has not been saved. Quit anyway?",
        ),
    };

    ConfirmDialog::new(title, message).render(frame.area(), frame.buffer_mut());
}

/// Handle keyboard input
fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.screen.clone() {
        Screen::Page => handle_page(app, key)?,
        Screen::Help => app.pop_screen(),
        Screen::Confirm(action) => handle_confirm(app, action, key)?,
    }

    Ok(())
}

fn handle_page(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.page.select_next(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.page.select_prev(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.page.select(index);
        }
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Char('o') => {
            let url = app.page.selected_panel().map(|p| p.accelerator().doc_link().url);
            if let Some(url) = url {
                match open_url_in_browser(url) {
                    Ok(()) => app.set_status(format!("Opened {}", url)),
                    Err(e) => {
                        log::warn!("Could not open {}: {}", url, e);
                        app.set_status(format!("Error: {}", e));
                    }
                }
            }
        }
        KeyCode::Enter | KeyCode::Char('s') => match app.save() {
            Ok(()) => app.should_quit = true,
            Err(e) => {
                log::warn!("Saving machine failed: {:#}", e);
                app.set_status(format!("Error: {:#}", e));
            }
        },
        KeyCode::Char('?') => app.push_screen(Screen::Help),
        KeyCode::Esc | KeyCode::Char('q') => app.request_quit(),
        _ => {}
    }
    Ok(())
}

fn handle_confirm(app: &mut App, action: ConfirmAction, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('n') => app.pop_screen(),
        KeyCode::Char('y') | KeyCode::Enter => match action {
            ConfirmAction::DiscardChanges => {
                log::info!("Discarding unsaved accelerator selection");
                app.should_quit = true;
            }
        },
        _ => {}
    }
    Ok(())
}

/// Open a URL in the default browser
fn open_url_in_browser(url: &str) -> Result<()> {
    use std::process::{Command, Stdio};

    let openers: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(target_os = "windows") {
        &["explorer"]
    } else {
        &["xdg-open", "firefox", "chromium", "google-chrome"]
    };

    for opener in openers {
        let spawned = Command::new(opener)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if spawned.is_ok() {
            return Ok(());
        }
    }

    anyhow::bail!("No browser found. Please visit: {}", url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{Accelerator, Platform};
    use std::path::PathBuf;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn linux_app() -> App {
        App::new(Platform::Linux, "Test VM", PathBuf::from("/tmp/unused.json"))
    }

    #[test]
    fn test_space_toggles_selected_tab() {
        let mut app = linux_app();
        handle_key(&mut app, press(KeyCode::Right)).unwrap();
        handle_key(&mut app, press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.machine.accelerators(), &[Accelerator::Kvm, Accelerator::Xen]);

        handle_key(&mut app, press(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.machine.accelerators(), &[Accelerator::Kvm]);
    }

    #[test]
    fn test_number_keys_select_tab() {
        let mut app = linux_app();
        handle_key(&mut app, press(KeyCode::Char('3'))).unwrap();
        assert_eq!(app.page.selected(), 2);
        handle_key(&mut app, press(KeyCode::Char('9'))).unwrap();
        assert_eq!(app.page.selected(), 2);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = linux_app();
        handle_key(&mut app, press(KeyCode::Char('?'))).unwrap();
        assert_eq!(app.screen, Screen::Help);
        handle_key(&mut app, press(KeyCode::Char('z'))).unwrap();
        assert_eq!(app.screen, Screen::Page);
    }

    #[test]
    fn test_quit_with_unsaved_changes() {
        let mut app = linux_app();
        handle_key(&mut app, press(KeyCode::Char(' '))).unwrap();
        handle_key(&mut app, press(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);

        handle_key(&mut app, press(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.screen, Screen::Page);

        handle_key(&mut app, press(KeyCode::Esc)).unwrap();
        handle_key(&mut app, press(KeyCode::Char('y'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_immediately() {
        let mut app = linux_app();
        handle_key(&mut app, press(KeyCode::Char(' '))).unwrap();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(app.should_quit);
    }
}
