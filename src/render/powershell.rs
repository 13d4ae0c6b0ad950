//! Windows PowerShell / WinForms scripts for the dialogs Win32 has no
//! ready-made window for (entry, password, list) and for tray
//! notifications.
//!
//! The script travels as `-EncodedCommand` (base64 of UTF-16LE), which
//! sidesteps console code pages. The exit protocol matches the other
//! process backends.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::dialog::{Dialog, SEPARATOR};
use crate::error::{DialogError, Result};
use crate::options::{DialogIcon, Options};
use crate::render::{single_column, Invocation};

const PRELUDE: &str = include_str!("scripts/prelude.ps1");
const ENTRY: &str = include_str!("scripts/entry.ps1");
const PASSWORD: &str = include_str!("scripts/password.ps1");
const LIST: &str = include_str!("scripts/list.ps1");
const NOTIFY: &str = include_str!("scripts/notify.ps1");

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ok: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_text: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    hide_text: bool,
    #[serde(skip_serializing_if = "is_false")]
    username: bool,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    items: &'a [String],
    #[serde(skip_serializing_if = "is_false")]
    multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'static str>,
    #[serde(skip_serializing_if = "is_zero")]
    width: u32,
    #[serde(skip_serializing_if = "is_zero")]
    height: u32,
    separator: &'static str,
}

impl<'a> FormData<'a> {
    fn from_options(opts: &'a Options) -> Self {
        Self {
            title: opts.title.as_deref(),
            ok: opts.ok_label.as_deref(),
            cancel: opts.cancel_label.as_deref(),
            extra: opts.extra_button.as_deref(),
            width: opts.width,
            height: opts.height,
            separator: SEPARATOR,
            ..Default::default()
        }
    }
}

/// Quote `text` as a single-quoted PowerShell literal. PowerShell also
/// treats the typographic single quotes as delimiters, so those double too.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}') {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn assemble(body: &str, data: &FormData<'_>) -> Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(format!("{}\n$data = ConvertFrom-Json {}\n\n{}", PRELUDE, quote(&json), body))
}

/// Base64 of the UTF-16LE script, as `-EncodedCommand` expects.
pub fn encode(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

pub fn render(program: &Path, dialog: &Dialog<'_>, opts: &Options) -> Result<Invocation> {
    let mut data = FormData::from_options(opts);

    let script = match *dialog {
        Dialog::Entry { text } => {
            data.text = Some(text);
            data.entry_text = opts.entry_text.as_deref();
            data.hide_text = opts.hide_text;
            assemble(ENTRY, &data)?
        }
        Dialog::Password => {
            data.username = opts.username;
            assemble(PASSWORD, &data)?
        }
        Dialog::List { text, items, multiple } => {
            data.column = single_column(opts)?;
            data.text = Some(text);
            data.items = items;
            data.multiple = multiple;
            assemble(LIST, &data)?
        }
        Dialog::Notification { text } => {
            data.text = Some(text);
            data.icon = match opts.icon {
                Some(DialogIcon::Error) => Some("error"),
                Some(DialogIcon::Warning) => Some("warning"),
                _ => None,
            };
            assemble(NOTIFY, &data)?
        }
        other => {
            return Err(DialogError::UnsupportedConfiguration(format!(
                "{:?} dialogs are not rendered as PowerShell scripts",
                other.kind()
            )))
        }
    };

    Ok(Invocation {
        program: program.to_path_buf(),
        args: [
            "-NoProfile",
            "-NonInteractive",
            "-Sta",
            "-ExecutionPolicy",
            "Bypass",
            "-EncodedCommand",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(encode(&script)))
        .collect(),
        stdin: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::MessageKind;

    fn decode(invocation: &Invocation) -> String {
        assert_eq!(invocation.args[invocation.args.len() - 2], "-EncodedCommand");
        let bytes = STANDARD.decode(invocation.args.last().unwrap()).unwrap();
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).unwrap()
    }

    fn payload(script: &str) -> serde_json::Value {
        let line = script
            .lines()
            .find_map(|l| l.strip_prefix("$data = ConvertFrom-Json '"))
            .expect("payload line");
        let json = line.strip_suffix('\'').unwrap().replace("''", "'");
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_quote_doubles_single_quotes() {
        assert_eq!(quote("it's"), "'it''s'");
        assert_eq!(quote("\u{2019}"), "'\u{2019}\u{2019}'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_entry_script_round_trips_through_encoding() {
        let opts = Options::new().title("Über 'quotes'").entry_text("");
        let invocation = render(Path::new("powershell.exe"), &Dialog::Entry { text: "Name:" }, &opts).unwrap();
        assert!(invocation.stdin.is_none());

        let script = decode(&invocation);
        assert!(script.starts_with(PRELUDE));
        assert!(script.ends_with(ENTRY));
        let data = payload(&script);
        assert_eq!(data["title"], "Über 'quotes'");
        assert_eq!(data["entryText"], "");
        assert!(data.get("ok").is_none());
    }

    #[test]
    fn test_list_payload_and_columns() {
        let items = vec!["one".to_string(), "two".to_string()];
        let invocation = render(
            Path::new("powershell.exe"),
            &Dialog::List { text: "Pick", items: &items, multiple: true },
            &Options::new().column("Number"),
        )
        .unwrap();
        let data = payload(&decode(&invocation));
        assert_eq!(data["items"], serde_json::json!(["one", "two"]));
        assert_eq!(data["column"], "Number");
        assert_eq!(data["multiple"], true);

        let err = render(
            Path::new("powershell.exe"),
            &Dialog::List { text: "Pick", items: &items, multiple: false },
            &Options::new().column("a").column("b"),
        )
        .unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn test_message_is_not_a_script() {
        let err = render(
            Path::new("powershell.exe"),
            &Dialog::Message { kind: MessageKind::Info, text: "" },
            &Options::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedConfiguration(_)));
    }
}
