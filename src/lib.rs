//! sysdialog
//!
//! Native modal dialogs (messages, questions, text entry, passwords, lists,
//! file and colour pickers, notifications) behind one blocking call surface.
//!
//! - Linux and BSD desktops: a zenity-compatible helper (`zenity`,
//!   `matedialog`, `qarma`)
//! - macOS: `osascript` running JavaScript for Automation
//! - Windows: Win32 dialogs in process, WinForms through PowerShell for the
//!   kinds Win32 lacks
//!
//! ```no_run
//! use sysdialog::Options;
//!
//! let opts = Options::new().title("Rename").entry_text("untitled");
//! match sysdialog::entry("New name:", &opts) {
//!     Ok(Some(name)) => println!("renaming to {name}"),
//!     Ok(None) => println!("cancelled"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod api;
pub mod backend;
pub mod color;
pub mod config;
pub mod dialog;
pub mod error;
pub mod exec;
#[cfg(windows)]
pub mod native;
pub mod options;
pub mod parse;
pub mod render;

pub use api::{
    dialogs, entry, error, info, list, list_multiple, notify, password, question, select_color,
    select_file, select_file_multiple, select_file_save, warning, Dialogs,
};
pub use backend::{Backend, Platform, Selector};
pub use color::Color;
pub use config::{BackendConfig, Config};
pub use dialog::{DialogKind, FileMode, MessageKind};
pub use error::{DialogError, Result};
pub use options::{DialogIcon, FileFilter, Options};
pub use parse::Credentials;
pub use tokio_util::sync::CancellationToken;
