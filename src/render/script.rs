//! osascript (JavaScript for Automation) scripts
//!
//! Each dialog kind has a script body; all share a prelude that defines the
//! exit protocol (0 value, 1 dismissed, 5 gave up, 2 script error). The
//! options are serialised to JSON and bound to `data` ahead of the body.
//! Optional strings are left out of the JSON when unset, because Standard
//! Additions treat a missing parameter and an empty one differently.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::color::Color;
use crate::dialog::{Dialog, FileMode, MessageKind, SEPARATOR};
use crate::error::Result;
use crate::options::{DialogIcon, Options};
use crate::render::{single_column, split_filename, Invocation};

const PRELUDE: &str = include_str!("scripts/prelude.js");
const DIALOG: &str = include_str!("scripts/dialog.js");
const PASSWORD: &str = include_str!("scripts/password.js");
const LIST: &str = include_str!("scripts/list.js");
const FILE: &str = include_str!("scripts/file.js");
const COLOR: &str = include_str!("scripts/color.js");
const NOTIFY: &str = include_str!("scripts/notify.js");

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Serialize)]
struct Payload<'a, O: Serialize> {
    #[serde(skip_serializing_if = "str::is_empty")]
    operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [String]>,
    #[serde(skip_serializing_if = "is_false")]
    username: bool,
    separator: &'static str,
    options: O,
}

impl<'a, O: Serialize> Payload<'a, O> {
    fn new(operation: &'static str, options: O) -> Self {
        Self {
            operation,
            text: None,
            extra: None,
            items: None,
            username: false,
            separator: SEPARATOR,
            options,
        }
    }
}

/// `display dialog` / `display alert` parameters.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DialogOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    alert_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_answer: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    hidden_answer: bool,
    #[serde(rename = "withTitle", skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(rename = "withIcon", skip_serializing_if = "Option::is_none")]
    icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_button: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_button: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    giving_up_after: Option<u64>,
}

/// `choose from list` parameters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOptions<'a> {
    #[serde(rename = "withTitle", skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(rename = "withPrompt", skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    #[serde(rename = "okButtonName", skip_serializing_if = "Option::is_none")]
    ok: Option<&'a str>,
    #[serde(rename = "cancelButtonName", skip_serializing_if = "Option::is_none")]
    cancel: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    default_items: &'a [String],
    #[serde(skip_serializing_if = "is_false")]
    multiple_selections_allowed: bool,
    #[serde(skip_serializing_if = "is_false")]
    empty_selection_allowed: bool,
}

/// `choose file` / `choose file name` / `choose folder` parameters.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileOptions<'a> {
    #[serde(rename = "withPrompt", skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    #[serde(rename = "ofType", skip_serializing_if = "Vec::is_empty")]
    types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_location: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    multiple_selections_allowed: bool,
    #[serde(skip_serializing_if = "is_false")]
    invisibles: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColorOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_color: Option<[f64; 3]>,
}

#[derive(Debug, Serialize)]
struct NotifyOptions<'a> {
    #[serde(rename = "withTitle", skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle: Option<&'a str>,
}

/// Button layout: labels left to right, 1-based indices as AppleScript wants.
#[derive(Debug, PartialEq, Eq)]
struct Buttons<'a> {
    labels: Vec<&'a str>,
    default: usize,
    cancel: Option<usize>,
}

fn buttons(opts: &Options, with_cancel: bool) -> Buttons<'_> {
    let mut labels = Vec::with_capacity(3);
    if let Some(extra) = opts.extra_button.as_deref() {
        labels.push(extra);
    }
    let cancel = with_cancel.then(|| {
        labels.push(opts.cancel_label.as_deref().unwrap_or("Cancel"));
        labels.len()
    });
    labels.push(opts.ok_label.as_deref().unwrap_or("OK"));

    let default = match cancel {
        Some(cancel) if opts.default_cancel => cancel,
        _ => labels.len(),
    };
    Buttons { labels, default, cancel }
}

fn dialog_icon(icon: Option<DialogIcon>) -> Option<&'static str> {
    match icon? {
        DialogIcon::Error => Some("stop"),
        DialogIcon::Info | DialogIcon::Question => Some("note"),
        DialogIcon::Warning => Some("caution"),
        DialogIcon::NoIcon | DialogIcon::Password => None,
    }
}

fn with_buttons<'a>(mut options: DialogOptions<'a>, buttons: Buttons<'a>) -> DialogOptions<'a> {
    options.buttons = buttons.labels;
    options.default_button = Some(buttons.default);
    options.cancel_button = buttons.cancel;
    options
}

fn assemble<O: Serialize>(body: &str, payload: &Payload<'_, O>) -> Result<String> {
    let data = serde_json::to_string(payload)?;
    Ok(format!("{}\nvar data = {}\n\n{}", PRELUDE, data, body))
}

pub fn render(program: &Path, dialog: &Dialog<'_>, opts: &Options, started: Instant) -> Result<Invocation> {
    let giving_up_after = opts.expiry_secs(started);

    let script = match *dialog {
        Dialog::Message { kind, text } => {
            let question = kind == MessageKind::Question;
            // Alerts look better but cannot carry a custom icon or a title bar.
            let (operation, options, text) = if opts.icon.is_some() {
                let options = DialogOptions {
                    title: opts.title.as_deref(),
                    icon: dialog_icon(opts.icon),
                    giving_up_after,
                    ..Default::default()
                };
                ("displayDialog", options, text)
            } else {
                let options = DialogOptions {
                    message: opts.title.as_ref().map(|_| text),
                    alert_type: match kind {
                        MessageKind::Error => Some("critical"),
                        MessageKind::Warning => Some("warning"),
                        MessageKind::Info => Some("informational"),
                        MessageKind::Question => None,
                    },
                    giving_up_after,
                    ..Default::default()
                };
                ("displayAlert", options, opts.title.as_deref().unwrap_or(text))
            };
            let mut payload = Payload::new(operation, with_buttons(options, buttons(opts, question)));
            payload.text = Some(text);
            payload.extra = opts.extra_button.as_deref();
            assemble(DIALOG, &payload)?
        }
        Dialog::Entry { text } => {
            let options = DialogOptions {
                default_answer: Some(opts.entry_text.as_deref().unwrap_or("")),
                hidden_answer: opts.hide_text,
                title: opts.title.as_deref(),
                icon: dialog_icon(opts.icon),
                giving_up_after,
                ..Default::default()
            };
            let mut payload = Payload::new("displayDialog", with_buttons(options, buttons(opts, true)));
            payload.text = Some(text);
            payload.extra = opts.extra_button.as_deref();
            assemble(DIALOG, &payload)?
        }
        Dialog::Password => {
            let options = DialogOptions {
                default_answer: Some(""),
                title: opts.title.as_deref(),
                icon: dialog_icon(opts.icon),
                giving_up_after,
                ..Default::default()
            };
            let mut payload = Payload::new("displayDialog", with_buttons(options, buttons(opts, true)));
            payload.extra = opts.extra_button.as_deref();
            payload.username = opts.username;
            assemble(PASSWORD, &payload)?
        }
        Dialog::List { text, items, multiple } => {
            single_column(opts)?;
            let options = ListOptions {
                title: opts.title.as_deref(),
                prompt: Some(text),
                ok: opts.ok_label.as_deref(),
                cancel: opts.cancel_label.as_deref(),
                default_items: &opts.default_items,
                multiple_selections_allowed: multiple,
                empty_selection_allowed: !opts.disallow_empty,
            };
            let mut payload = Payload::new("", options);
            payload.items = Some(items);
            assemble(LIST, &payload)?
        }
        Dialog::File { mode, multiple } => {
            let (location, name) = opts
                .filename
                .as_deref()
                .map(split_filename)
                .unwrap_or((None, None));
            let mut options = FileOptions {
                prompt: opts.title.as_deref(),
                default_location: location,
                ..Default::default()
            };
            let operation = match mode {
                FileMode::Open => {
                    options.types = opts.filters.iter().flat_map(|f| f.extensions()).collect();
                    options.multiple_selections_allowed = multiple;
                    options.invisibles = opts.show_hidden;
                    "chooseFile"
                }
                FileMode::Directory => {
                    options.multiple_selections_allowed = multiple;
                    options.invisibles = opts.show_hidden;
                    "chooseFolder"
                }
                FileMode::Save => {
                    options.default_name = name;
                    "chooseFileName"
                }
            };
            assemble(FILE, &Payload::new(operation, options))?
        }
        Dialog::Color => {
            let options = ColorOptions {
                default_color: opts.color.map(Color::to_unit_rgb),
            };
            assemble(COLOR, &Payload::new("", options))?
        }
        Dialog::Notification { text } => {
            let options = NotifyOptions {
                title: opts.title.as_deref(),
                subtitle: opts.subtitle.as_deref(),
            };
            let mut payload = Payload::new("", options);
            payload.text = Some(text);
            assemble(NOTIFY, &payload)?
        }
    };

    Ok(Invocation {
        program: program.to_path_buf(),
        args: vec!["-l".to_string(), "JavaScript".to_string()],
        stdin: Some(script),
    })
}
