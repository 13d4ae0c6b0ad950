//! Dialog kinds and per-call requests

/// Every dialog the crate can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Message,
    Entry,
    List,
    Password,
    FileSelection,
    ColorSelection,
    Notification,
}

/// Flavour of a message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Info,
    Warning,
    /// OK/Cancel (Yes/No) confirmation
    Question,
}

impl MessageKind {
    pub fn flag(self) -> &'static str {
        match self {
            MessageKind::Error => "--error",
            MessageKind::Info => "--info",
            MessageKind::Warning => "--warning",
            MessageKind::Question => "--question",
        }
    }
}

/// What a file selection dialog picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Open,
    Save,
    Directory,
}

/// One dialog call: the kind plus the arguments passed directly to the
/// dialog function (everything else travels in `Options`).
#[derive(Debug, Clone, Copy)]
pub enum Dialog<'a> {
    Message { kind: MessageKind, text: &'a str },
    Entry { text: &'a str },
    Password,
    List { text: &'a str, items: &'a [String], multiple: bool },
    File { mode: FileMode, multiple: bool },
    Color,
    Notification { text: &'a str },
}

impl Dialog<'_> {
    pub fn kind(&self) -> DialogKind {
        match self {
            Dialog::Message { .. } => DialogKind::Message,
            Dialog::Entry { .. } => DialogKind::Entry,
            Dialog::Password => DialogKind::Password,
            Dialog::List { .. } => DialogKind::List,
            Dialog::File { .. } => DialogKind::FileSelection,
            Dialog::Color => DialogKind::ColorSelection,
            Dialog::Notification { .. } => DialogKind::Notification,
        }
    }
}

/// ASCII record separator between list items and paths on the wire. Items
/// containing it cannot round-trip.
pub(crate) const SEPARATOR: &str = "\u{1e}";
