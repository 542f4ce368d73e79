use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::accel::Platform;
use crate::machine::Machine;
use crate::wizard::AcceleratorPage;

/// Application screens/views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Accelerator tabs
    Page,
    /// Help screen
    Help,
    /// Confirmation dialog
    Confirm(ConfirmAction),
}

/// Actions that need confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Leave without saving toggles made on the page
    DiscardChanges,
}

pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Screen history for back navigation
    pub screen_stack: Vec<Screen>,
    /// Machine being configured
    pub machine: Machine,
    /// Accelerator page (owns the panels)
    pub page: AcceleratorPage,
    /// Where the machine definition is written on save
    pub output_path: PathBuf,
    /// Toggled since the last save
    pub dirty: bool,
    /// Set once the machine has been written
    pub saved: bool,
    /// Status message
    pub status_message: Option<String>,
    status_time: Option<Instant>,
    /// Should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(platform: Platform, name: &str, output_path: PathBuf) -> Self {
        let mut machine = Machine::new(name);
        let page = AcceleratorPage::new(platform, &mut machine);

        Self {
            screen: Screen::Page,
            screen_stack: Vec::new(),
            machine,
            page,
            output_path,
            dirty: false,
            saved: false,
            status_message: None,
            status_time: None,
            should_quit: false,
        }
    }

    /// Push a new screen onto the stack
    pub fn push_screen(&mut self, screen: Screen) {
        let current = std::mem::replace(&mut self.screen, screen);
        self.screen_stack.push(current);
    }

    /// Pop back to previous screen
    pub fn pop_screen(&mut self) {
        if let Some(screen) = self.screen_stack.pop() {
            self.screen = screen;
        }
    }

    /// Toggle the accelerator on the selected tab
    pub fn toggle_selected(&mut self) {
        self.page.toggle_selected(&mut self.machine);
        self.dirty = true;

        if let Some(panel) = self.page.selected_panel() {
            let state = if panel.is_checked() { "enabled" } else { "disabled" };
            let label = panel.accelerator().tab_label();
            self.set_status(format!("{} {}", label, state));
        }
    }

    /// Write the machine definition to the output path
    pub fn save(&mut self) -> Result<()> {
        self.machine.save(&self.output_path)?;
        self.dirty = false;
        self.saved = true;
        self.set_status(format!("Saved to {}", self.output_path.display()));
        Ok(())
    }

    /// Quit, asking first when toggles would be lost
    pub fn request_quit(&mut self) {
        if self.dirty {
            self.push_screen(Screen::Confirm(ConfirmAction::DiscardChanges));
        } else {
            self.should_quit = true;
        }
    }

    /// Set a status message (auto-clears after 5 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_time = None;
    }

    /// Check and clear status if expired (call in event loop)
    pub fn check_status_expiry(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed().as_secs() >= 5 {
                self.clear_status();
            }
        }
    }
}
