//! Accelerator backends
//!
//! The closed set of QEMU accelerators a machine can be configured with,
//! along with the static text shown on each backend's tab.

pub mod platform;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use platform::Platform;

/// QEMU accelerator backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accelerator {
    Kvm,
    Xen,
    #[serde(rename = "hax")]
    Haxm,
    Whpx,
    Hvf,
    Tcg,
}

/// Documentation link shown under a backend's description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocLink {
    pub text: &'static str,
    pub url: &'static str,
}

impl Accelerator {
    pub const ALL: [Accelerator; 6] = [
        Accelerator::Kvm,
        Accelerator::Xen,
        Accelerator::Haxm,
        Accelerator::Whpx,
        Accelerator::Hvf,
        Accelerator::Tcg,
    ];

    /// Identifier passed to QEMU (`-accel <id>`)
    pub fn id(&self) -> &'static str {
        match self {
            Self::Kvm => "kvm",
            Self::Xen => "xen",
            Self::Haxm => "hax",
            Self::Whpx => "whpx",
            Self::Hvf => "hvf",
            Self::Tcg => "tcg",
        }
    }

    /// Short name used as the tab label
    pub fn tab_label(&self) -> &'static str {
        match self {
            Self::Kvm => "KVM",
            Self::Xen => "XEN",
            Self::Haxm => "HAXM",
            Self::Whpx => "WHPX",
            Self::Hvf => "HVF",
            Self::Tcg => "TCG",
        }
    }

    /// Label next to the checkbox
    pub fn title(&self) -> &'static str {
        match self {
            Self::Kvm => "Kernel-based Virtual Machine (KVM)",
            Self::Xen => "Xen Hypervisor",
            Self::Haxm => "Hardware Accelerated Execution Manager (HAXM)",
            Self::Whpx => "Windows Hypervisor Platform (WHPX)",
            Self::Hvf => "Hypervisor Framework (HVF)",
            Self::Tcg => "Tiny Code Generator (TCG)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Kvm => {
                "KVM (for Kernel-based Virtual Machine) is a full virtualization solution \
                 for GNU/Linux on x86 hardware containing virtualization extensions \
                 (Intel VT or AMD-V)."
            }
            Self::Xen => {
                "The Xen Project hypervisor is an open-source type-1 or baremetal hypervisor, \
                 which makes it possible to run many instances of an operating system or \
                 indeed different operating systems in parallel on a single machine (or host)."
            }
            Self::Haxm => {
                "Intel® Hardware Accelerated Execution Manager (Intel® HAXM) is a \
                 hardware-assisted virtualization engine (hypervisor) that uses Intel® \
                 Virtualization Technology (Intel® VT) to speed up Android* app emulation \
                 on a host machine."
            }
            Self::Whpx => {
                "The Windows Hypervisor Platform adds an extended user-mode API for \
                 third-party virtualization stacks and applications to create and manage \
                 partitions at the hypervisor level, configure memory mappings for the \
                 partition, and create and control execution of virtual processors."
            }
            Self::Hvf => {
                "Apple® Hypervisor Framework. Build virtualization solutions on top of a \
                 lightweight hypervisor, without the need for third-party kernel extensions."
            }
            Self::Tcg => {
                "The Tiny Code Generator (TCG) exists to transform target insns (the \
                 processor being emulated) via the TCG frontend to TCG ops which are then \
                 transformed into host insns (the processor executing QEMU itself) via the \
                 TCG backend."
            }
        }
    }

    pub fn doc_link(&self) -> DocLink {
        match self {
            Self::Kvm => DocLink {
                text: "www.linux-kvm.org",
                url: "https://www.linux-kvm.org",
            },
            Self::Xen => DocLink {
                text: "www.xenproject.org",
                url: "https://www.xenproject.org/",
            },
            Self::Haxm => DocLink {
                text: "software.intel.com",
                url: "https://software.intel.com/en-us/articles/intel-hardware-accelerated-execution-manager-intel-haxm",
            },
            Self::Whpx => DocLink {
                text: "docs.microsoft.com",
                url: "https://docs.microsoft.com/en-us/virtualization/api/",
            },
            Self::Hvf => DocLink {
                text: "developer.apple.com",
                url: "https://developer.apple.com/documentation/hypervisor#overview",
            },
            Self::Tcg => DocLink {
                text: "wiki.qemu.org",
                url: "https://wiki.qemu.org/Documentation/TCG",
            },
        }
    }

    /// Best-effort check whether the host exposes this backend.
    ///
    /// Returns `None` when there is no cheap way to tell. Purely informational:
    /// panels and toggles never depend on it.
    pub fn host_support(&self) -> Option<bool> {
        match self {
            Self::Kvm if cfg!(target_os = "linux") => Some(Path::new("/dev/kvm").exists()),
            Self::Xen if cfg!(target_os = "linux") => Some(Path::new("/proc/xen").exists()),
            Self::Tcg => Some(true),
            _ => None,
        }
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Accelerator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kvm" => Ok(Self::Kvm),
            "xen" => Ok(Self::Xen),
            "hax" | "haxm" => Ok(Self::Haxm),
            "whpx" => Ok(Self::Whpx),
            "hvf" => Ok(Self::Hvf),
            "tcg" => Ok(Self::Tcg),
            other => bail!("Unknown accelerator '{}'", other),
        }
    }
}
