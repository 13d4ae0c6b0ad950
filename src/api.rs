//! Dialog functions
//!
//! One method per dialog kind on `Dialogs`, plus free functions that share a
//! process-wide `Dialogs`. Each call resolves the backend, renders the
//! request, runs it and decodes the result; the calling thread blocks until
//! the dialog closes.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Instant;

use tracing::{debug, info_span};
use uuid::Uuid;

use crate::backend::Selector;
use crate::color::Color;
use crate::config::BackendConfig;
use crate::dialog::{Dialog, FileMode, MessageKind};
use crate::error::Result;
use crate::exec::{self, Interrupt};
use crate::options::Options;
use crate::parse::{self, Ack, ColorValue, Credentials, Decode, Items, Outcome, Paths, Secret, Text};
use crate::render;

/// Shows dialogs through the backend its `Selector` resolves. The backend
/// is looked up once, on first use.
pub struct Dialogs {
    selector: Selector,
}

impl Default for Dialogs {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialogs {
    /// Default backend configuration, honouring `SYSDIALOG_HELPER`.
    pub fn new() -> Self {
        Self::with_config(BackendConfig::default().with_env_overrides())
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self::with_selector(Selector::new(config))
    }

    pub fn with_selector(selector: Selector) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    fn show<D: Decode>(&self, dialog: Dialog<'_>, opts: &Options, decoder: D) -> Result<Outcome<D::Output>> {
        let id = Uuid::new_v4();
        let span = info_span!("dialog", %id, kind = ?dialog.kind());
        let _guard = span.enter();

        let backend = self.selector.resolve(dialog.kind())?;
        let started = Instant::now();
        let request = render::render(&backend, &dialog, opts, started)?;
        debug!(?backend, "Rendered dialog request");

        let interrupt = Interrupt {
            cancel: opts.cancel.clone(),
            deadline: opts.expiry(started),
        };
        let raw = exec::invoke(request, interrupt)?;
        parse::parse(&decoder, &raw, opts.extra_button.as_deref())
    }

    fn message(&self, kind: MessageKind, text: &str, opts: &Options) -> Result<bool> {
        let outcome = self.show(Dialog::Message { kind, text }, opts, Ack)?;
        Ok(outcome.into_result()?.is_some())
    }

    /// Error message. `Ok(true)` when acknowledged with OK.
    pub fn error(&self, text: &str, opts: &Options) -> Result<bool> {
        self.message(MessageKind::Error, text, opts)
    }

    pub fn info(&self, text: &str, opts: &Options) -> Result<bool> {
        self.message(MessageKind::Info, text, opts)
    }

    pub fn warning(&self, text: &str, opts: &Options) -> Result<bool> {
        self.message(MessageKind::Warning, text, opts)
    }

    /// Yes/No question. `Ok(false)` when the user said no or closed it.
    pub fn question(&self, text: &str, opts: &Options) -> Result<bool> {
        self.message(MessageKind::Question, text, opts)
    }

    /// Single-line text entry. `Ok(Some(""))` is a confirmed empty answer.
    pub fn entry(&self, text: &str, opts: &Options) -> Result<Option<String>> {
        self.show(Dialog::Entry { text }, opts, Text)?.into_result()
    }

    pub fn password(&self, opts: &Options) -> Result<Option<Credentials>> {
        let decoder = Secret { username: opts.username };
        self.show(Dialog::Password, opts, decoder)?.into_result()
    }

    pub fn list(&self, text: &str, items: &[String], opts: &Options) -> Result<Option<String>> {
        let dialog = Dialog::List { text, items, multiple: false };
        self.show(dialog, opts, Text)?.into_result()
    }

    pub fn list_multiple(&self, text: &str, items: &[String], opts: &Options) -> Result<Option<Vec<String>>> {
        let dialog = Dialog::List { text, items, multiple: true };
        self.show(dialog, opts, Items::default())?.into_result()
    }

    /// Pick one existing file, or a directory when `Options::directory` is set.
    /// A dialog confirmed without a selection gives an empty path.
    pub fn select_file(&self, opts: &Options) -> Result<Option<PathBuf>> {
        let paths = self.select(open_mode(opts), false, opts)?;
        Ok(paths.map(first_or_empty))
    }

    pub fn select_file_save(&self, opts: &Options) -> Result<Option<PathBuf>> {
        let paths = self.select(FileMode::Save, false, opts)?;
        Ok(paths.map(first_or_empty))
    }

    pub fn select_file_multiple(&self, opts: &Options) -> Result<Option<Vec<PathBuf>>> {
        self.select(open_mode(opts), true, opts)
    }

    fn select(&self, mode: FileMode, multiple: bool, opts: &Options) -> Result<Option<Vec<PathBuf>>> {
        let dialog = Dialog::File { mode, multiple };
        self.show(dialog, opts, Paths { multiple })?.into_result()
    }

    pub fn select_color(&self, opts: &Options) -> Result<Option<Color>> {
        self.show(Dialog::Color, opts, ColorValue)?.into_result()
    }

    /// Desktop notification. Returns once it has been handed off.
    pub fn notify(&self, text: &str, opts: &Options) -> Result<()> {
        self.show(Dialog::Notification { text }, opts, Ack)?.into_result()?;
        Ok(())
    }
}

fn first_or_empty(paths: Vec<PathBuf>) -> PathBuf {
    paths.into_iter().next().unwrap_or_default()
}

fn open_mode(opts: &Options) -> FileMode {
    if opts.directory {
        FileMode::Directory
    } else {
        FileMode::Open
    }
}

static DEFAULT: OnceLock<Dialogs> = OnceLock::new();

/// The process-wide `Dialogs` used by the free functions.
pub fn dialogs() -> &'static Dialogs {
    DEFAULT.get_or_init(Dialogs::new)
}

pub fn error(text: &str, opts: &Options) -> Result<bool> {
    dialogs().error(text, opts)
}

pub fn info(text: &str, opts: &Options) -> Result<bool> {
    dialogs().info(text, opts)
}

pub fn warning(text: &str, opts: &Options) -> Result<bool> {
    dialogs().warning(text, opts)
}

pub fn question(text: &str, opts: &Options) -> Result<bool> {
    dialogs().question(text, opts)
}

pub fn entry(text: &str, opts: &Options) -> Result<Option<String>> {
    dialogs().entry(text, opts)
}

pub fn password(opts: &Options) -> Result<Option<Credentials>> {
    dialogs().password(opts)
}

pub fn list(text: &str, items: &[String], opts: &Options) -> Result<Option<String>> {
    dialogs().list(text, items, opts)
}

pub fn list_multiple(text: &str, items: &[String], opts: &Options) -> Result<Option<Vec<String>>> {
    dialogs().list_multiple(text, items, opts)
}

pub fn select_file(opts: &Options) -> Result<Option<PathBuf>> {
    dialogs().select_file(opts)
}

pub fn select_file_save(opts: &Options) -> Result<Option<PathBuf>> {
    dialogs().select_file_save(opts)
}

pub fn select_file_multiple(opts: &Options) -> Result<Option<Vec<PathBuf>>> {
    dialogs().select_file_multiple(opts)
}

pub fn select_color(opts: &Options) -> Result<Option<Color>> {
    dialogs().select_color(opts)
}

pub fn notify(text: &str, opts: &Options) -> Result<()> {
    dialogs().notify(text, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Platform;
    use crate::error::DialogError;

    fn without_helpers() -> Dialogs {
        let config = BackendConfig {
            helpers: vec!["/nonexistent/sysdialog-helper".to_string()],
            ..BackendConfig::default()
        };
        Dialogs::with_selector(Selector::for_platform(Platform::Unix, config))
    }

    #[test]
    fn test_every_call_reports_missing_backend() {
        let dialogs = without_helpers();
        let opts = Options::new();
        let items = vec!["a".to_string()];

        let results: Vec<DialogError> = vec![
            dialogs.error("", &opts).unwrap_err(),
            dialogs.question("", &opts).unwrap_err(),
            dialogs.entry("", &opts).unwrap_err(),
            dialogs.password(&opts).unwrap_err(),
            dialogs.list("", &items, &opts).unwrap_err(),
            dialogs.list_multiple("", &items, &opts).unwrap_err(),
            dialogs.select_file(&opts).unwrap_err(),
            dialogs.select_file_save(&opts).unwrap_err(),
            dialogs.select_file_multiple(&opts).unwrap_err(),
            dialogs.select_color(&opts).unwrap_err(),
            dialogs.notify("", &opts).unwrap_err(),
        ];
        for err in results {
            assert!(matches!(err, DialogError::NoBackendAvailable { .. }), "got {:?}", err);
        }
        assert_eq!(dialogs.selector().probe_count(), 1);
    }

    #[test]
    fn test_directory_option_selects_directory_mode() {
        assert_eq!(open_mode(&Options::new()), FileMode::Open);
        assert_eq!(open_mode(&Options::new().directory()), FileMode::Directory);
    }
}
