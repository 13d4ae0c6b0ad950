//! zenity-family argument vectors
//!
//! Unset options are left out entirely so the helper applies its own
//! defaults; booleans become bare flags.

use std::path::Path;

use crate::dialog::{Dialog, FileMode, SEPARATOR};
use crate::error::Result;
use crate::options::{DialogIcon, FileFilter, Options};
use crate::render::{single_column, Invocation};

pub fn render(program: &Path, dialog: &Dialog<'_>, opts: &Options) -> Result<Invocation> {
    let args = match *dialog {
        Dialog::Message { kind, text } => {
            let mut args = vec![kind.flag().to_string(), "--text".to_string(), text.to_string()];
            push_title(&mut args, opts);
            push_buttons(&mut args, opts);
            push_size(&mut args, opts);
            push_icon(&mut args, opts);
            flag(&mut args, opts.no_wrap, "--no-wrap");
            flag(&mut args, opts.ellipsize, "--ellipsize");
            flag(&mut args, opts.default_cancel, "--default-cancel");
            args
        }
        Dialog::Entry { text } => {
            let mut args = vec!["--entry".to_string(), "--text".to_string(), text.to_string()];
            push_title(&mut args, opts);
            push_buttons(&mut args, opts);
            push_size(&mut args, opts);
            push_icon(&mut args, opts);
            if let Some(entry) = &opts.entry_text {
                args.extend(["--entry-text".to_string(), entry.clone()]);
            }
            flag(&mut args, opts.hide_text, "--hide-text");
            args
        }
        Dialog::Password => {
            let mut args = vec!["--password".to_string()];
            push_title(&mut args, opts);
            push_buttons(&mut args, opts);
            flag(&mut args, opts.username, "--username");
            args
        }
        Dialog::List { text, items, multiple } => {
            let header = single_column(opts)?;
            let mut args = vec!["--list".to_string(), "--text".to_string(), text.to_string()];
            match header {
                Some(header) => args.push(format!("--column={}", header)),
                None => args.extend(["--column=".to_string(), "--hide-header".to_string()]),
            }
            push_title(&mut args, opts);
            push_buttons(&mut args, opts);
            push_size(&mut args, opts);
            push_icon(&mut args, opts);
            if multiple {
                args.extend(["--multiple".to_string(), "--separator".to_string(), SEPARATOR.to_string()]);
            }
            args.extend(items.iter().cloned());
            args
        }
        Dialog::File { mode, multiple } => {
            let mut args = vec!["--file-selection".to_string()];
            push_title(&mut args, opts);
            match mode {
                FileMode::Open => {}
                FileMode::Save => args.push("--save".to_string()),
                FileMode::Directory => args.push("--directory".to_string()),
            }
            flag(&mut args, mode == FileMode::Save && opts.confirm_overwrite, "--confirm-overwrite");
            if multiple {
                args.extend(["--multiple".to_string(), "--separator".to_string(), SEPARATOR.to_string()]);
            }
            if let Some(name) = opts.filename.as_deref().filter(|n| !n.is_empty()) {
                args.extend(["--filename".to_string(), name.to_string()]);
            }
            args.extend(opts.filters.iter().map(filter_arg));
            args
        }
        Dialog::Color => {
            let mut args = vec!["--color-selection".to_string()];
            push_title(&mut args, opts);
            if let Some(color) = opts.color {
                args.extend(["--color".to_string(), color.to_string()]);
            }
            flag(&mut args, opts.show_palette, "--show-palette");
            args
        }
        Dialog::Notification { text } => {
            let mut args = vec!["--notification".to_string(), "--text".to_string(), text.to_string()];
            push_title(&mut args, opts);
            push_icon(&mut args, opts);
            args
        }
    };

    Ok(Invocation {
        program: program.to_path_buf(),
        args,
        stdin: None,
    })
}

fn flag(args: &mut Vec<String>, set: bool, name: &str) {
    if set {
        args.push(name.to_string());
    }
}

fn push_title(args: &mut Vec<String>, opts: &Options) {
    if let Some(title) = &opts.title {
        args.extend(["--title".to_string(), title.clone()]);
    }
}

fn push_buttons(args: &mut Vec<String>, opts: &Options) {
    if let Some(label) = &opts.ok_label {
        args.extend(["--ok-label".to_string(), label.clone()]);
    }
    if let Some(label) = &opts.cancel_label {
        args.extend(["--cancel-label".to_string(), label.clone()]);
    }
    if let Some(label) = &opts.extra_button {
        args.extend(["--extra-button".to_string(), label.clone()]);
    }
}

fn push_size(args: &mut Vec<String>, opts: &Options) {
    if opts.width > 0 {
        args.extend(["--width".to_string(), opts.width.to_string()]);
    }
    if opts.height > 0 {
        args.extend(["--height".to_string(), opts.height.to_string()]);
    }
}

fn push_icon(args: &mut Vec<String>, opts: &Options) {
    let icon: &[&str] = match opts.icon {
        None => &[],
        Some(DialogIcon::NoIcon) => &["--icon-name="],
        Some(DialogIcon::Error) => &["--window-icon=error", "--icon-name=dialog-error"],
        Some(DialogIcon::Info) => &["--window-icon=info", "--icon-name=dialog-information"],
        Some(DialogIcon::Question) => &["--window-icon=question", "--icon-name=dialog-question"],
        Some(DialogIcon::Warning) => &["--window-icon=warning", "--icon-name=dialog-warning"],
        Some(DialogIcon::Password) => &["--icon-name=dialog-password"],
    };
    args.extend(icon.iter().map(|s| s.to_string()));
}

/// `--file-filter=Name | *.a *.b`, the name part omitted when empty.
fn filter_arg(filter: &FileFilter) -> String {
    let patterns = filter.patterns.join(" ");
    if filter.name.is_empty() {
        format!("--file-filter={}", patterns)
    } else {
        format!("--file-filter={} | {}", filter.name, patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::MessageKind;
    use crate::error::DialogError;

    fn argv(dialog: Dialog<'_>, opts: &Options) -> Vec<String> {
        render(Path::new("/usr/bin/zenity"), &dialog, opts).unwrap().args
    }

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn test_explicit_labels_rendered_verbatim() {
        let opts = Options::new()
            .title("Überschrift \"quoted\" ")
            .ok_label("")
            .cancel_label("Nope")
            .extra_button("Later");
        let args = argv(Dialog::Message { kind: MessageKind::Question, text: "Go?" }, &opts);

        let t = position(&args, "--title").unwrap();
        assert_eq!(args[t + 1], "Überschrift \"quoted\" ");
        let ok = position(&args, "--ok-label").unwrap();
        assert_eq!(args[ok + 1], "");
        let extra = position(&args, "--extra-button").unwrap();
        assert_eq!(args[extra + 1], "Later");
        assert_eq!(args[0], "--question");
    }

    #[test]
    fn test_unset_options_are_omitted() {
        let args = argv(Dialog::Message { kind: MessageKind::Info, text: "hi" }, &Options::new());
        assert_eq!(args, vec!["--info", "--text", "hi"]);
    }

    #[test]
    fn test_entry_with_empty_default_and_no_title() {
        let opts = Options::new().entry_text("");
        let args = argv(Dialog::Entry { text: "Name:" }, &opts);
        assert!(position(&args, "--title").is_none());
        let e = position(&args, "--entry-text").unwrap();
        assert_eq!(args[e + 1], "");
    }

    #[test]
    fn test_list_rejects_multiple_columns() {
        let items = vec!["a".to_string()];
        let opts = Options::new().column("One").column("Two");
        let err = render(
            Path::new("zenity"),
            &Dialog::List { text: "", items: &items, multiple: false },
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err, DialogError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn test_list_multiple_layout() {
        let items = vec!["red".to_string(), "-green".to_string()];
        let args = argv(
            Dialog::List { text: "Pick", items: &items, multiple: true },
            &Options::new(),
        );
        assert!(args.contains(&"--hide-header".to_string()));
        let sep = position(&args, "--separator").unwrap();
        assert_eq!(args[sep + 1], SEPARATOR);
        assert_eq!(&args[args.len() - 2..], &items[..]);
    }

    #[test]
    fn test_list_with_header_shows_it() {
        let args = argv(
            Dialog::List { text: "", items: &[], multiple: false },
            &Options::new().column("Fruit"),
        );
        assert!(args.contains(&"--column=Fruit".to_string()));
        assert!(!args.contains(&"--hide-header".to_string()));
    }

    #[test]
    fn test_file_filters_and_modes() {
        let opts = Options::new()
            .filename("/tmp/out.png")
            .confirm_overwrite()
            .file_filter(FileFilter::new("Images", ["*.png", "*.jpg"]))
            .file_filter(FileFilter::new("", ["*"]));
        let args = argv(Dialog::File { mode: FileMode::Save, multiple: false }, &opts);
        assert_eq!(args[0], "--file-selection");
        assert!(args.contains(&"--save".to_string()));
        assert!(args.contains(&"--confirm-overwrite".to_string()));
        assert!(args.contains(&"--file-filter=Images | *.png *.jpg".to_string()));
        assert!(args.contains(&"--file-filter=*".to_string()));
        let f = position(&args, "--filename").unwrap();
        assert_eq!(args[f + 1], "/tmp/out.png");

        let dir = render(
            Path::new("zenity"),
            &Dialog::File { mode: FileMode::Directory, multiple: false },
            &Options::new().confirm_overwrite(),
        )
        .unwrap()
        .args;
        assert!(dir.contains(&"--directory".to_string()));
        assert!(!dir.contains(&"--confirm-overwrite".to_string()));
    }

    #[test]
    fn test_icons() {
        let args = argv(
            Dialog::Message { kind: MessageKind::Warning, text: "" },
            &Options::new().icon(DialogIcon::NoIcon),
        );
        assert!(args.contains(&"--icon-name=".to_string()));

        let args = argv(Dialog::Password, &Options::new().icon(DialogIcon::Password).username());
        assert!(args.contains(&"--username".to_string()));
        // password dialogs take no icon flags
        assert!(!args.iter().any(|a| a.starts_with("--icon-name")));
    }

    #[test]
    fn test_color_and_size() {
        use crate::color::Color;
        let args = argv(
            Dialog::Color,
            &Options::new().color(Color::rgb(1, 2, 3)).show_palette().width(300),
        );
        assert_eq!(args, vec!["--color-selection", "--color", "rgb(1,2,3)", "--show-palette"]);
    }
}
