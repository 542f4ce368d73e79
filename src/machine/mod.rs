//! New machine definition
//!
//! Holds the parts of a machine definition this tool edits: its name and the
//! ordered set of accelerators QEMU should try.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::accel::Accelerator;

/// Receiver of accelerator toggles
pub trait AcceleratorSink {
    fn add_accelerator(&mut self, accelerator: Accelerator);
    fn remove_accelerator(&mut self, accelerator: Accelerator);
}

/// Machine definition being configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    /// Insertion ordered, no duplicates
    #[serde(default)]
    accelerators: Vec<Accelerator>,
    pub created: DateTime<Local>,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accelerators: Vec::new(),
            created: Local::now(),
        }
    }

    pub fn accelerators(&self) -> &[Accelerator] {
        &self.accelerators
    }

    pub fn has_accelerator(&self, accelerator: Accelerator) -> bool {
        self.accelerators.contains(&accelerator)
    }

    /// QEMU arguments for the selected accelerators, in order of preference
    pub fn qemu_accel_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for accel in &self.accelerators {
            args.push("-accel".to_string());
            args.push(accel.id().to_string());
        }
        args
    }

    /// Comma separated ids, or "none"
    pub fn accelerator_summary(&self) -> String {
        if self.accelerators.is_empty() {
            return "none".to_string();
        }
        self.accelerators
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Load a machine definition from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read machine definition {:?}", path))?;
        let mut machine: Machine = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse machine definition {:?}", path))?;

        // Hand-edited files may repeat an entry
        let mut seen = Vec::new();
        machine.accelerators.retain(|a| {
            if seen.contains(a) {
                false
            } else {
                seen.push(*a);
                true
            }
        });

        Ok(machine)
    }

    /// Save the machine definition as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize machine definition")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write machine definition to {:?}", path))?;

        log::info!("Saved machine '{}' to {:?}", self.name, path);
        Ok(())
    }
}

impl AcceleratorSink for Machine {
    fn add_accelerator(&mut self, accelerator: Accelerator) {
        if !self.has_accelerator(accelerator) {
            self.accelerators.push(accelerator);
        }
        log::debug!("Machine '{}': added accelerator {}", self.name, accelerator);
    }

    fn remove_accelerator(&mut self, accelerator: Accelerator) {
        self.accelerators.retain(|a| *a != accelerator);
        log::debug!("Machine '{}': removed accelerator {}", self.name, accelerator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vm-accel-test-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut machine = Machine::new("test");
        machine.add_accelerator(Accelerator::Kvm);
        machine.add_accelerator(Accelerator::Kvm);
        assert_eq!(machine.accelerators(), &[Accelerator::Kvm]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut machine = Machine::new("test");
        machine.add_accelerator(Accelerator::Tcg);
        machine.remove_accelerator(Accelerator::Xen);
        assert_eq!(machine.accelerators(), &[Accelerator::Tcg]);
    }

    #[test]
    fn test_add_then_remove() {
        let mut machine = Machine::new("test");
        machine.add_accelerator(Accelerator::Whpx);
        machine.remove_accelerator(Accelerator::Whpx);
        assert!(!machine.has_accelerator(Accelerator::Whpx));
        assert!(machine.accelerators().is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut machine = Machine::new("test");
        machine.add_accelerator(Accelerator::Tcg);
        machine.add_accelerator(Accelerator::Kvm);
        assert_eq!(machine.accelerators(), &[Accelerator::Tcg, Accelerator::Kvm]);
        assert_eq!(machine.accelerator_summary(), "tcg, kvm");
    }

    #[test]
    fn test_qemu_accel_args() {
        let mut machine = Machine::new("test");
        assert!(machine.qemu_accel_args().is_empty());
        assert_eq!(machine.accelerator_summary(), "none");

        machine.add_accelerator(Accelerator::Kvm);
        machine.add_accelerator(Accelerator::Tcg);
        assert_eq!(machine.qemu_accel_args(), vec!["-accel", "kvm", "-accel", "tcg"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join("debian.json");

        let mut machine = Machine::new("Debian");
        machine.add_accelerator(Accelerator::Xen);
        machine.add_accelerator(Accelerator::Haxm);
        machine.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"hax\""));

        let loaded = Machine::load(&path).unwrap();
        assert_eq!(loaded.name, "Debian");
        assert_eq!(loaded.accelerators(), &[Accelerator::Xen, Accelerator::Haxm]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_drops_duplicates() {
        let dir = scratch_dir("dupes");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dupes.json");
        std::fs::write(
            &path,
            r#"{"name":"x","accelerators":["kvm","tcg","kvm"],"created":"2024-01-01T00:00:00+00:00"}"#,
        )
        .unwrap();

        let loaded = Machine::load(&path).unwrap();
        assert_eq!(loaded.accelerators(), &[Accelerator::Kvm, Accelerator::Tcg]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Machine::load(Path::new("/nonexistent/vm-accel/machine.json"));
        assert!(result.is_err());
    }
}
