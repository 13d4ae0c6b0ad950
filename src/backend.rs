//! Backend selection
//!
//! Which mechanism shows a dialog depends only on the host platform and, on
//! Unix desktops, on which zenity-compatible helper is installed. The helper
//! search runs at most once per `Selector`; its result (including "nothing
//! found") is kept for the selector's lifetime.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::dialog::DialogKind;
use crate::error::{DialogError, Result};

/// Host platform families with distinct dialog backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Any other Unix-like desktop
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }
}

/// A resolved backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// zenity-compatible executable (absolute path)
    Helper(PathBuf),
    /// osascript, fed JavaScript for Automation on stdin
    ScriptHost(PathBuf),
    /// Windows PowerShell running a WinForms script
    PowerShell(PathBuf),
    /// In-process platform API
    Native,
}

pub struct Selector {
    platform: Platform,
    config: BackendConfig,
    helper: OnceLock<Option<PathBuf>>,
    probes: AtomicUsize,
}

impl Selector {
    pub fn new(config: BackendConfig) -> Self {
        Self::for_platform(Platform::current(), config)
    }

    pub fn for_platform(platform: Platform, config: BackendConfig) -> Self {
        Self {
            platform,
            config,
            helper: OnceLock::new(),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Pick the backend for `kind`.
    pub fn resolve(&self, kind: DialogKind) -> Result<Backend> {
        match self.platform {
            Platform::MacOs => Ok(Backend::ScriptHost(PathBuf::from(&self.config.script_host))),
            Platform::Windows => Ok(match kind {
                DialogKind::Message | DialogKind::FileSelection | DialogKind::ColorSelection => {
                    Backend::Native
                }
                DialogKind::Entry
                | DialogKind::Password
                | DialogKind::List
                | DialogKind::Notification => {
                    Backend::PowerShell(PathBuf::from(&self.config.powershell))
                }
            }),
            Platform::Unix => self
                .helper()
                .map(Backend::Helper)
                .ok_or_else(|| DialogError::NoBackendAvailable {
                    searched: self.config.helpers.clone(),
                }),
        }
    }

    fn helper(&self) -> Option<PathBuf> {
        self.helper
            .get_or_init(|| {
                self.probes.fetch_add(1, Ordering::Relaxed);
                let found = search(&self.config.helpers);
                match &found {
                    Some(path) => info!("Using dialog helper {}", path.display()),
                    None => warn!("No dialog helper found among {:?}", self.config.helpers),
                }
                found
            })
            .clone()
    }

    /// How many times the helper search actually ran.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

/// First of `candidates` found on `PATH` (or given as a usable path).
fn search(candidates: &[String]) -> Option<PathBuf> {
    candidates.iter().find_map(|name| match which::which(name) {
        Ok(path) => Some(path),
        Err(e) => {
            debug!("helper {} not usable: {}", name, e);
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(helpers: &[&str]) -> BackendConfig {
        BackendConfig {
            helpers: helpers.iter().map(|h| h.to_string()).collect(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_missing_helpers_fail_permanently() {
        let selector = Selector::for_platform(
            Platform::Unix,
            config(&["/nonexistent/sysdialog-helper", "sysdialog-no-such-helper"]),
        );
        for kind in [DialogKind::Message, DialogKind::Entry, DialogKind::Notification] {
            match selector.resolve(kind) {
                Err(DialogError::NoBackendAvailable { searched }) => assert_eq!(searched.len(), 2),
                other => panic!("expected NoBackendAvailable, got {:?}", other),
            }
        }
        assert_eq!(selector.probe_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolution_is_cached() {
        // `sh` is on PATH on every Unix CI image
        let selector = Selector::for_platform(Platform::Unix, config(&["sysdialog-no-such-helper", "sh"]));
        let first = selector.resolve(DialogKind::Entry).unwrap();
        let second = selector.resolve(DialogKind::List).unwrap();
        assert_eq!(first, second);
        assert!(matches!(first, Backend::Helper(ref p) if p.ends_with("sh")));
        assert_eq!(selector.probe_count(), 1);
    }

    #[test]
    fn test_macos_uses_script_host_without_lookup() {
        let selector = Selector::for_platform(Platform::MacOs, config(&[]));
        assert_eq!(
            selector.resolve(DialogKind::ColorSelection).unwrap(),
            Backend::ScriptHost(PathBuf::from("osascript"))
        );
        assert_eq!(selector.probe_count(), 0);
    }

    #[test]
    fn test_windows_splits_native_and_powershell() {
        let selector = Selector::for_platform(Platform::Windows, config(&[]));
        assert_eq!(selector.resolve(DialogKind::Message).unwrap(), Backend::Native);
        assert_eq!(selector.resolve(DialogKind::FileSelection).unwrap(), Backend::Native);
        assert_eq!(
            selector.resolve(DialogKind::Entry).unwrap(),
            Backend::PowerShell(PathBuf::from("powershell.exe"))
        );
        assert_eq!(selector.probe_count(), 0);
    }
}
