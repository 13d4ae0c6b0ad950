//! Request rendering
//!
//! Turns a `Dialog` plus `Options` into what a backend consumes: an argument
//! vector for zenity-style helpers, a script for osascript or PowerShell, or
//! a native request structure.

pub mod helper;
pub mod powershell;
pub mod script;

use std::path::PathBuf;
use std::time::Instant;

use crate::backend::Backend;
use crate::dialog::Dialog;
use crate::error::{DialogError, Result};
use crate::options::Options;

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Written to the child's stdin, which is then closed
    pub stdin: Option<String>,
}

/// A rendered request, ready for the engine.
#[derive(Debug)]
pub enum Request {
    Process(Invocation),
    #[cfg(windows)]
    Native(crate::native::NativeRequest),
}

/// Render `dialog` for `backend`. `started` anchors relative timeouts for
/// backends that can give up on their own.
pub fn render(backend: &Backend, dialog: &Dialog<'_>, opts: &Options, started: Instant) -> Result<Request> {
    match backend {
        Backend::Helper(program) => helper::render(program, dialog, opts).map(Request::Process),
        Backend::ScriptHost(program) => {
            script::render(program, dialog, opts, started).map(Request::Process)
        }
        Backend::PowerShell(program) => powershell::render(program, dialog, opts).map(Request::Process),
        Backend::Native => native(dialog, opts),
    }
}

#[cfg(windows)]
fn native(dialog: &Dialog<'_>, opts: &Options) -> Result<Request> {
    crate::native::render(dialog, opts).map(Request::Native)
}

#[cfg(not(windows))]
fn native(_dialog: &Dialog<'_>, _opts: &Options) -> Result<Request> {
    Err(DialogError::UnsupportedConfiguration(
        "native dialogs are only available on Windows".to_string(),
    ))
}

/// List dialogs render exactly one column on every process backend.
pub(crate) fn single_column(opts: &Options) -> Result<Option<&str>> {
    match opts.columns.as_slice() {
        [] => Ok(None),
        [header] => Ok(Some(header.as_str())),
        more => Err(DialogError::UnsupportedConfiguration(format!(
            "multiple columns not supported (got {})",
            more.len()
        ))),
    }
}

/// Split a default filename into directory and file name, the way file
/// pickers want them. A trailing separator means "directory only".
pub(crate) fn split_filename(filename: &str) -> (Option<&str>, Option<&str>) {
    if filename.is_empty() {
        return (None, None);
    }
    match filename.rfind(['/', '\\']) {
        Some(idx) => {
            let (dir, name) = (&filename[..=idx], &filename[idx + 1..]);
            let dir = if dir.len() > 1 { dir.trim_end_matches(['/', '\\']) } else { dir };
            (Some(dir), (!name.is_empty()).then_some(name))
        }
        None => (None, Some(filename)),
    }
}
