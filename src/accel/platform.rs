//! Host platform detection and the per-platform accelerator table

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Accelerator;

/// Host platform, as far as accelerator availability is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    #[serde(rename = "macos")]
    MacOs,
    #[serde(rename = "freebsd")]
    FreeBsd,
    Other,
}

/// One row of the platform table: which backend gets a tab, and whether it
/// starts out checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSpec {
    pub accelerator: Accelerator,
    pub default_enabled: bool,
}

impl PanelSpec {
    const fn new(accelerator: Accelerator, default_enabled: bool) -> Self {
        Self {
            accelerator,
            default_enabled,
        }
    }
}

const LINUX_PANELS: &[PanelSpec] = &[
    PanelSpec::new(Accelerator::Kvm, true),
    PanelSpec::new(Accelerator::Xen, false),
    PanelSpec::new(Accelerator::Tcg, false),
];

const WINDOWS_PANELS: &[PanelSpec] = &[
    PanelSpec::new(Accelerator::Haxm, true),
    PanelSpec::new(Accelerator::Whpx, false),
    PanelSpec::new(Accelerator::Tcg, false),
];

const MACOS_PANELS: &[PanelSpec] = &[
    PanelSpec::new(Accelerator::Hvf, true),
    PanelSpec::new(Accelerator::Tcg, false),
];

// TCG is the only backend there, so it starts enabled
const FREEBSD_PANELS: &[PanelSpec] = &[PanelSpec::new(Accelerator::Tcg, true)];

const OTHER_PANELS: &[PanelSpec] = &[PanelSpec::new(Accelerator::Tcg, false)];

impl Platform {
    /// Platform this binary was compiled for
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBsd
        } else {
            Self::Other
        }
    }

    /// Backends offered on this platform, in tab order. TCG is always last.
    pub fn panel_table(&self) -> &'static [PanelSpec] {
        match self {
            Self::Linux => LINUX_PANELS,
            Self::Windows => WINDOWS_PANELS,
            Self::MacOs => MACOS_PANELS,
            Self::FreeBsd => FREEBSD_PANELS,
            Self::Other => OTHER_PANELS,
        }
    }

    pub fn offers(&self, accelerator: Accelerator) -> bool {
        self.panel_table().iter().any(|p| p.accelerator == accelerator)
    }

    /// Accelerators enabled before any user interaction
    pub fn default_accelerators(&self) -> Vec<Accelerator> {
        self.panel_table()
            .iter()
            .filter(|p| p.default_enabled)
            .map(|p| p.accelerator)
            .collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::FreeBsd => "freebsd",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "windows" | "win" => Ok(Self::Windows),
            "macos" | "darwin" | "mac" => Ok(Self::MacOs),
            "freebsd" => Ok(Self::FreeBsd),
            "other" => Ok(Self::Other),
            other => bail!("Unknown platform '{}'", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accels(platform: Platform) -> Vec<Accelerator> {
        platform.panel_table().iter().map(|p| p.accelerator).collect()
    }

    #[test]
    fn test_panel_table_per_platform() {
        use Accelerator::*;
        assert_eq!(accels(Platform::Linux), vec![Kvm, Xen, Tcg]);
        assert_eq!(accels(Platform::Windows), vec![Haxm, Whpx, Tcg]);
        assert_eq!(accels(Platform::MacOs), vec![Hvf, Tcg]);
        assert_eq!(accels(Platform::FreeBsd), vec![Tcg]);
        assert_eq!(accels(Platform::Other), vec![Tcg]);
    }

    #[test]
    fn test_tcg_always_last() {
        for platform in [
            Platform::Linux,
            Platform::Windows,
            Platform::MacOs,
            Platform::FreeBsd,
            Platform::Other,
        ] {
            assert_eq!(accels(platform).last(), Some(&Accelerator::Tcg));
        }
    }

    #[test]
    fn test_default_accelerators() {
        assert_eq!(Platform::Linux.default_accelerators(), vec![Accelerator::Kvm]);
        assert_eq!(Platform::Windows.default_accelerators(), vec![Accelerator::Haxm]);
        assert_eq!(Platform::MacOs.default_accelerators(), vec![Accelerator::Hvf]);
        assert_eq!(Platform::FreeBsd.default_accelerators(), vec![Accelerator::Tcg]);
        assert!(Platform::Other.default_accelerators().is_empty());
    }

    #[test]
    fn test_offers() {
        assert!(Platform::Linux.offers(Accelerator::Xen));
        assert!(!Platform::Linux.offers(Accelerator::Hvf));
        assert!(Platform::MacOs.offers(Accelerator::Tcg));
    }

    #[test]
    fn test_parse_display() {
        for platform in [
            Platform::Linux,
            Platform::Windows,
            Platform::MacOs,
            Platform::FreeBsd,
            Platform::Other,
        ] {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("Darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert!("plan9".parse::<Platform>().is_err());
    }
}
