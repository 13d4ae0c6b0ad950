//! Dialog options
//!
//! `Options` carries every parameter any backend understands. Builder methods
//! consume and return `self`; a finished `Options` is only ever borrowed by
//! the dialog functions, so concurrent calls can share one safely.
//!
//! String options distinguish "not set" (`None`, the backend applies its own
//! default) from "set to empty" (`Some("")`, rendered as an empty value).

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::color::Color;

/// Icon shown by a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogIcon {
    /// Explicitly no icon (differs from leaving the icon unset)
    NoIcon,
    Error,
    Info,
    Question,
    Warning,
    Password,
}

/// A named set of filename patterns, e.g. `Images: *.png *.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileFilter {
    /// Display name (may be empty)
    pub name: String,
    /// Glob patterns, in display order
    pub patterns: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the command-line form `NAME | PATTERN1 PATTERN2 ...`.
    pub fn parse(spec: &str) -> Self {
        let (name, patterns) = match spec.split_once('|') {
            Some((name, rest)) => (name.trim(), rest),
            None => ("", spec),
        };
        Self {
            name: name.to_string(),
            patterns: patterns.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Extensions of the simple `*.ext` patterns; other globs are dropped.
    pub fn extensions(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter_map(|p| p.strip_prefix("*."))
            .filter(|ext| !ext.is_empty() && !ext.contains(['*', '?', '[']))
            .map(str::to_string)
            .collect()
    }
}

/// Options shared by every dialog function.
#[derive(Debug, Clone, Default)]
pub struct Options {
    // General
    pub(crate) title: Option<String>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) ok_label: Option<String>,
    pub(crate) cancel_label: Option<String>,
    pub(crate) extra_button: Option<String>,
    pub(crate) icon: Option<DialogIcon>,

    // Message
    pub(crate) no_wrap: bool,
    pub(crate) ellipsize: bool,
    pub(crate) default_cancel: bool,

    // Entry and password
    pub(crate) entry_text: Option<String>,
    pub(crate) hide_text: bool,
    pub(crate) username: bool,

    // List
    pub(crate) columns: Vec<String>,
    pub(crate) default_items: Vec<String>,
    pub(crate) disallow_empty: bool,

    // File selection
    pub(crate) directory: bool,
    pub(crate) confirm_overwrite: bool,
    pub(crate) confirm_create: bool,
    pub(crate) show_hidden: bool,
    pub(crate) filename: Option<String>,
    pub(crate) filters: Vec<FileFilter>,

    // Color selection
    pub(crate) color: Option<Color>,
    pub(crate) show_palette: bool,

    // Notification
    pub(crate) subtitle: Option<String>,

    // Cancellation
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) deadline: Option<Instant>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Window width in pixels; 0 leaves it to the backend.
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn ok_label(mut self, label: impl Into<String>) -> Self {
        self.ok_label = Some(label.into());
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    /// Add a third button. Pressing it yields `DialogError::ExtraButton`.
    pub fn extra_button(mut self, label: impl Into<String>) -> Self {
        self.extra_button = Some(label.into());
        self
    }

    pub fn icon(mut self, icon: DialogIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.no_wrap = true;
        self
    }

    pub fn ellipsize(mut self) -> Self {
        self.ellipsize = true;
        self
    }

    /// Give the Cancel button focus by default.
    pub fn default_cancel(mut self) -> Self {
        self.default_cancel = true;
        self
    }

    pub fn entry_text(mut self, text: impl Into<String>) -> Self {
        self.entry_text = Some(text.into());
        self
    }

    pub fn hide_text(mut self) -> Self {
        self.hide_text = true;
        self
    }

    /// Ask for a username as well as the password.
    pub fn username(mut self) -> Self {
        self.username = true;
        self
    }

    /// Column header for list dialogs. Only one column is supported; adding a
    /// second is reported when the dialog is rendered.
    pub fn column(mut self, header: impl Into<String>) -> Self {
        self.columns.push(header.into());
        self
    }

    pub fn default_items(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.default_items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn disallow_empty(mut self) -> Self {
        self.disallow_empty = true;
        self
    }

    pub fn directory(mut self) -> Self {
        self.directory = true;
        self
    }

    pub fn confirm_overwrite(mut self) -> Self {
        self.confirm_overwrite = true;
        self
    }

    pub fn confirm_create(mut self) -> Self {
        self.confirm_create = true;
        self
    }

    pub fn show_hidden(mut self) -> Self {
        self.show_hidden = true;
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    pub fn file_filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn file_filters(mut self, filters: impl IntoIterator<Item = FileFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn show_palette(mut self) -> Self {
        self.show_palette = true;
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Close the dialog when `token` is cancelled.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Close the dialog once `timeout` has elapsed since it was shown.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Close the dialog at an absolute point in time.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The earliest configured expiry, counted from `started`.
    pub(crate) fn expiry(&self, started: Instant) -> Option<Instant> {
        let relative = self.timeout.map(|t| started + t);
        match (relative, self.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whole seconds left before expiry, rounded up. Used by backends that
    /// can give up on their own.
    pub(crate) fn expiry_secs(&self, started: Instant) -> Option<u64> {
        self.expiry(started).map(|at| {
            let left = at.saturating_duration_since(started);
            left.as_secs() + u64::from(left.subsec_nanos() > 0)
        })
    }
}
