//! Machine accelerator wizard page
//!
//! The page holds one backend panel per accelerator offered on the platform.
//! Each panel mirrors whether its accelerator is in the machine's set; every
//! toggle is forwarded straight to the machine, so the two never disagree.

use crate::accel::{Accelerator, Platform};
use crate::machine::AcceleratorSink;

/// A single backend tab: checkbox state plus the accelerator it controls
#[derive(Debug)]
pub struct BackendPanel {
    accelerator: Accelerator,
    checked: bool,
}

impl BackendPanel {
    /// Create a panel. A panel that starts checked enables its accelerator
    /// on the machine right away.
    pub fn new(accelerator: Accelerator, checked: bool, sink: &mut dyn AcceleratorSink) -> Self {
        let mut panel = Self {
            accelerator,
            checked: false,
        };
        if checked {
            panel.set_enabled(true, sink);
        }
        log::debug!("{} panel created", accelerator.tab_label());
        panel
    }

    pub fn accelerator(&self) -> Accelerator {
        self.accelerator
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Apply a checkbox state change
    pub fn set_enabled(&mut self, enabled: bool, sink: &mut dyn AcceleratorSink) {
        self.checked = enabled;
        if enabled {
            sink.add_accelerator(self.accelerator);
        } else {
            sink.remove_accelerator(self.accelerator);
        }
    }

    pub fn toggle(&mut self, sink: &mut dyn AcceleratorSink) {
        self.set_enabled(!self.checked, sink);
    }
}

impl Drop for BackendPanel {
    fn drop(&mut self) {
        log::debug!("{} panel destroyed", self.accelerator.tab_label());
    }
}

/// The accelerator page: a tab per available backend
#[derive(Debug)]
pub struct AcceleratorPage {
    platform: Platform,
    panels: Vec<BackendPanel>,
    selected: usize,
}

impl AcceleratorPage {
    pub const TITLE: &'static str = "Machine accelerator";

    pub fn new(platform: Platform, sink: &mut dyn AcceleratorSink) -> Self {
        let panels = platform
            .panel_table()
            .iter()
            .map(|spec| BackendPanel::new(spec.accelerator, spec.default_enabled, sink))
            .collect();

        log::debug!("AcceleratorPage created for {}", platform);

        Self {
            platform,
            panels,
            selected: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        Self::TITLE
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn panels(&self) -> &[BackendPanel] {
        &self.panels
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_panel(&self) -> Option<&BackendPanel> {
        self.panels.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.panels.len() {
            self.selected = index;
        }
    }

    pub fn select_next(&mut self) {
        if !self.panels.is_empty() {
            self.selected = (self.selected + 1) % self.panels.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.panels.is_empty() {
            self.selected = (self.selected + self.panels.len() - 1) % self.panels.len();
        }
    }

    /// Flip the checkbox on the selected tab
    pub fn toggle_selected(&mut self, sink: &mut dyn AcceleratorSink) {
        if let Some(panel) = self.panels.get_mut(self.selected) {
            panel.toggle(sink);
        }
    }

    /// Set the checkbox of the panel for `accelerator`. Returns false when the
    /// platform has no such panel.
    pub fn set_checked(
        &mut self,
        accelerator: Accelerator,
        enabled: bool,
        sink: &mut dyn AcceleratorSink,
    ) -> bool {
        match self.panels.iter_mut().find(|p| p.accelerator == accelerator) {
            Some(panel) => {
                panel.set_enabled(enabled, sink);
                true
            }
            None => false,
        }
    }
}

impl Drop for AcceleratorPage {
    fn drop(&mut self) {
        log::debug!("AcceleratorPage destroyed");
    }
}
