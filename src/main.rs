//! sysdialog
//!
//! zenity-compatible command line front-end.
//!
//! ```bash
//! sysdialog --question --text "Overwrite?" --extra-button Later
//! sysdialog --list --multiple --column Fruit apple pear plum
//! sysdialog --file-selection --file-filter "Images | *.png *.jpg"
//! ```
//!
//! Exit codes: 0 OK, 1 cancelled or nothing selected (after printing the
//! label when the extra button was pressed), 5 timeout, 255 error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use sysdialog::{Color, Config, DialogError, DialogIcon, Dialogs, FileFilter, Options};

const EXIT_CANCELLED: u8 = 1;
const EXIT_TIMEOUT: u8 = 5;
const EXIT_ERROR: u8 = 255;

#[derive(Parser, Debug)]
#[command(name = "sysdialog")]
#[command(about = "Display native dialogs from the command line")]
#[command(version)]
#[command(group(ArgGroup::new("kind").required(true)))]
struct Cli {
    /// Display error dialog
    #[arg(long, group = "kind")]
    error: bool,

    /// Display info dialog
    #[arg(long, group = "kind")]
    info: bool,

    /// Display warning dialog
    #[arg(long, group = "kind")]
    warning: bool,

    /// Display question dialog
    #[arg(long, group = "kind")]
    question: bool,

    /// Display text entry dialog
    #[arg(long, group = "kind")]
    entry: bool,

    /// Display list dialog
    #[arg(long, group = "kind")]
    list: bool,

    /// Display password dialog
    #[arg(long, group = "kind")]
    password: bool,

    /// Display file selection dialog
    #[arg(long, group = "kind")]
    file_selection: bool,

    /// Display color selection dialog
    #[arg(long, group = "kind")]
    color_selection: bool,

    /// Display notification
    #[arg(long, group = "kind")]
    notification: bool,

    /// Dialog title
    #[arg(long)]
    title: Option<String>,

    /// Dialog width
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Dialog height
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Label of the OK button
    #[arg(long)]
    ok_label: Option<String>,

    /// Label of the Cancel button
    #[arg(long)]
    cancel_label: Option<String>,

    /// Add an extra button
    #[arg(long)]
    extra_button: Option<String>,

    /// Dialog text
    #[arg(long)]
    text: Option<String>,

    /// Window icon (error, info, question, warning)
    #[arg(long)]
    window_icon: Option<String>,

    /// Dialog icon (dialog-error, dialog-information, dialog-question, dialog-warning)
    #[arg(long)]
    icon_name: Option<String>,

    /// Allow multiple items to be selected
    #[arg(long)]
    multiple: bool,

    /// Do not enable text wrapping
    #[arg(long)]
    no_wrap: bool,

    /// Enable ellipsizing in the dialog text
    #[arg(long)]
    ellipsize: bool,

    /// Give Cancel button focus by default
    #[arg(long)]
    default_cancel: bool,

    /// Entry text
    #[arg(long)]
    entry_text: Option<String>,

    /// Hide the entry text
    #[arg(long)]
    hide_text: bool,

    /// Also ask for a username
    #[arg(long)]
    username: bool,

    /// Column header (at most one)
    #[arg(long)]
    column: Vec<String>,

    /// Accepted for zenity compatibility; headers only show with --column
    #[arg(long)]
    hide_header: bool,

    /// Allow empty selection (macOS only)
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    allow_empty: bool,

    /// Activate save mode
    #[arg(long)]
    save: bool,

    /// Activate directory-only selection
    #[arg(long)]
    directory: bool,

    /// Confirm file selection if filename already exists
    #[arg(long)]
    confirm_overwrite: bool,

    /// Confirm file selection if filename does not yet exist (Windows only)
    #[arg(long)]
    confirm_create: bool,

    /// Show hidden files (Windows and macOS only)
    #[arg(long)]
    show_hidden: bool,

    /// Default filename
    #[arg(long)]
    filename: Option<String>,

    /// Filename filter (NAME | PATTERN1 PATTERN2 ...)
    #[arg(long)]
    file_filter: Vec<String>,

    /// Default color
    #[arg(long)]
    color: Option<String>,

    /// Show the palette
    #[arg(long)]
    show_palette: bool,

    /// Dialog timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output separator for multiple selections
    #[arg(long)]
    separator: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// List items
    #[arg(value_name = "ITEM")]
    items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Error,
    Info,
    Warning,
    Question,
    Entry,
    List,
    Password,
    FileSelection,
    ColorSelection,
    Notification,
}

impl Cli {
    fn kind(&self) -> Kind {
        [
            (self.error, Kind::Error),
            (self.info, Kind::Info),
            (self.warning, Kind::Warning),
            (self.question, Kind::Question),
            (self.entry, Kind::Entry),
            (self.list, Kind::List),
            (self.password, Kind::Password),
            (self.file_selection, Kind::FileSelection),
            (self.color_selection, Kind::ColorSelection),
        ]
        .into_iter()
        .find_map(|(set, kind)| set.then_some(kind))
        .unwrap_or(Kind::Notification)
    }
}

/// Title, icon, text, OK and Cancel defaults applied when not given.
struct Defaults {
    title: Option<&'static str>,
    icon: Option<&'static str>,
    text: &'static str,
    ok: Option<&'static str>,
    cancel: Option<&'static str>,
}

fn defaults(kind: Kind) -> Defaults {
    let none = Defaults { title: None, icon: None, text: "", ok: None, cancel: None };
    match kind {
        Kind::Error => Defaults {
            title: Some("Error"),
            icon: Some("dialog-error"),
            text: "An error has occurred.",
            ok: Some("OK"),
            ..none
        },
        Kind::Info => Defaults {
            title: Some("Information"),
            icon: Some("dialog-information"),
            text: "All updates are complete.",
            ok: Some("OK"),
            ..none
        },
        Kind::Warning => Defaults {
            title: Some("Warning"),
            icon: Some("dialog-warning"),
            text: "Are you sure you want to proceed?",
            ok: Some("OK"),
            ..none
        },
        Kind::Question => Defaults {
            title: Some("Question"),
            icon: Some("dialog-question"),
            text: "Are you sure you want to proceed?",
            ok: Some("Yes"),
            cancel: Some("No"),
        },
        Kind::Entry => Defaults {
            title: Some("Add a new entry"),
            text: "Enter new text:",
            ok: Some("OK"),
            cancel: Some("Cancel"),
            ..none
        },
        Kind::List => Defaults {
            title: Some("Select items from the list"),
            text: "Select items from the list below:",
            ok: Some("OK"),
            cancel: Some("Cancel"),
            ..none
        },
        Kind::Password => Defaults {
            title: Some("Type your password"),
            icon: Some("dialog-password"),
            ok: Some("OK"),
            cancel: Some("Cancel"),
            ..none
        },
        Kind::FileSelection | Kind::ColorSelection | Kind::Notification => none,
    }
}

fn parse_icon(name: &str) -> Option<DialogIcon> {
    match name {
        "error" | "dialog-error" => Some(DialogIcon::Error),
        "info" | "dialog-information" => Some(DialogIcon::Info),
        "question" | "dialog-question" => Some(DialogIcon::Question),
        "important" | "warning" | "dialog-warning" => Some(DialogIcon::Warning),
        "dialog-password" => Some(DialogIcon::Password),
        "" => Some(DialogIcon::NoIcon),
        other => {
            warn!("Ignoring unknown icon {:?}", other);
            None
        }
    }
}

fn build_options(cli: &Cli, kind: Kind, timeout_secs: u64) -> anyhow::Result<Options> {
    let d = defaults(kind);
    let mut opts = Options::new().width(cli.width).height(cli.height);

    if let Some(title) = cli.title.as_deref().or(d.title) {
        opts = opts.title(title);
    }
    if let Some(label) = cli.ok_label.as_deref().or(d.ok) {
        opts = opts.ok_label(label);
    }
    if let Some(label) = cli.cancel_label.as_deref().or(d.cancel) {
        opts = opts.cancel_label(label);
    }
    if let Some(label) = &cli.extra_button {
        opts = opts.extra_button(label.as_str());
    }
    let icon = cli.icon_name.as_deref().or(cli.window_icon.as_deref()).or(d.icon);
    if let Some(icon) = icon.and_then(parse_icon) {
        opts = opts.icon(icon);
    }

    if cli.no_wrap {
        opts = opts.no_wrap();
    }
    if cli.ellipsize {
        opts = opts.ellipsize();
    }
    if cli.default_cancel {
        opts = opts.default_cancel();
    }

    if let Some(text) = &cli.entry_text {
        opts = opts.entry_text(text.as_str());
    }
    if cli.hide_text {
        opts = opts.hide_text();
    }
    if cli.username {
        opts = opts.username();
    }

    for header in &cli.column {
        opts = opts.column(header.as_str());
    }
    if !cli.allow_empty {
        opts = opts.disallow_empty();
    }

    if cli.directory {
        opts = opts.directory();
    }
    if cli.confirm_overwrite {
        opts = opts.confirm_overwrite();
    }
    if cli.confirm_create {
        opts = opts.confirm_create();
    }
    if cli.show_hidden {
        opts = opts.show_hidden();
    }
    if let Some(name) = cli.filename.as_deref().filter(|n| !n.is_empty()) {
        opts = opts.filename(name);
    }
    opts = opts.file_filters(cli.file_filter.iter().map(|f| FileFilter::parse(f)));

    if let Some(color) = &cli.color {
        let color: Color = color.parse().with_context(|| format!("Invalid color {:?}", color))?;
        opts = opts.color(color);
    }
    if cli.show_palette {
        opts = opts.show_palette();
    }

    if timeout_secs > 0 {
        opts = opts.timeout(Duration::from_secs(timeout_secs));
    }
    Ok(opts)
}

/// Map a dialog result to an exit code, printing whatever the user chose.
fn report<T>(result: sysdialog::Result<Option<T>>, render: impl FnOnce(T) -> Option<String>) -> u8 {
    match result {
        Ok(Some(value)) => match render(value) {
            Some(line) => {
                println!("{}", line);
                0
            }
            None => EXIT_CANCELLED,
        },
        Ok(None) => EXIT_CANCELLED,
        Err(err) => failure(err),
    }
}

fn confirm(result: sysdialog::Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => EXIT_CANCELLED,
        Err(err) => failure(err),
    }
}

fn failure(err: DialogError) -> u8 {
    match err {
        DialogError::TimedOut => EXIT_TIMEOUT,
        DialogError::ExtraButton(label) => {
            println!("{}", label);
            EXIT_CANCELLED
        }
        DialogError::Interrupted => EXIT_CANCELLED,
        other => {
            eprintln!("{}", other);
            EXIT_ERROR
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = Config::load(cli.config.as_deref())?;
    let kind = cli.kind();
    debug!(?kind, hide_header = cli.hide_header, "Showing dialog");

    let timeout = cli.timeout.unwrap_or(config.cli.timeout_secs);
    let separator = cli.separator.clone().unwrap_or(config.cli.separator);
    let opts = build_options(&cli, kind, timeout)?;
    let dialogs = Dialogs::with_config(config.backend);
    let text = cli.text.as_deref().unwrap_or(defaults(kind).text);

    let code = match kind {
        Kind::Error => confirm(dialogs.error(text, &opts)),
        Kind::Info => confirm(dialogs.info(text, &opts)),
        Kind::Warning => confirm(dialogs.warning(text, &opts)),
        Kind::Question => confirm(dialogs.question(text, &opts)),
        Kind::Entry => report(dialogs.entry(text, &opts), Some),
        Kind::List if cli.multiple => {
            report(dialogs.list_multiple(text, &cli.items, &opts), |items| Some(items.join(separator.as_str())))
        }
        Kind::List => report(dialogs.list(text, &cli.items, &opts), Some),
        Kind::Password => report(dialogs.password(&opts), |creds| {
            Some(match creds.username {
                Some(user) => format!("{}|{}", user, creds.password),
                None => creds.password,
            })
        }),
        Kind::FileSelection if cli.save => report(dialogs.select_file_save(&opts), path_line),
        Kind::FileSelection if cli.multiple => report(dialogs.select_file_multiple(&opts), |paths| {
            let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
            (!paths.is_empty()).then(|| paths.join(separator.as_str()))
        }),
        Kind::FileSelection => report(dialogs.select_file(&opts), path_line),
        Kind::ColorSelection => report(dialogs.select_color(&opts), |c| Some(c.to_string())),
        Kind::Notification => match dialogs.notify(text, &opts) {
            Ok(()) => 0,
            Err(err) => failure(err),
        },
    };
    Ok(code)
}

/// An empty path means nothing was selected.
fn path_line(path: PathBuf) -> Option<String> {
    let line = path.to_string_lossy().into_owned();
    (!line.is_empty()).then_some(line)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(EXIT_ERROR) } else { ExitCode::SUCCESS };
        }
    };

    let filter = EnvFilter::try_from_env("SYSDIALOG_LOG").unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sysdialog").chain(args.iter().copied()))
    }

    #[test]
    fn test_exactly_one_kind_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--info", "--error"]).is_err());
        assert_eq!(parse(&["--file-selection"]).unwrap().kind(), Kind::FileSelection);
        assert_eq!(parse(&["--notification"]).unwrap().kind(), Kind::Notification);
    }

    #[test]
    fn test_list_items_and_columns() {
        let cli = parse(&["--list", "--column", "Fruit", "--multiple", "apple", "pear"]).unwrap();
        assert_eq!(cli.kind(), Kind::List);
        assert_eq!(cli.column, vec!["Fruit"]);
        assert_eq!(cli.items, vec!["apple", "pear"]);
        assert!(cli.allow_empty);

        let cli = parse(&["--list", "--allow-empty=false", "--hide-header"]).unwrap();
        assert!(!cli.allow_empty);
        assert!(cli.hide_header);
    }

    #[test]
    fn test_explicit_empty_values_survive() {
        let cli = parse(&["--entry", "--title=", "--entry-text="]).unwrap();
        assert_eq!(cli.title.as_deref(), Some(""));
        assert_eq!(cli.entry_text.as_deref(), Some(""));
        assert_eq!(cli.ok_label, None);
    }

    #[test]
    fn test_kind_defaults() {
        let d = defaults(Kind::Question);
        assert_eq!(d.ok, Some("Yes"));
        assert_eq!(d.cancel, Some("No"));
        assert_eq!(defaults(Kind::Error).text, "An error has occurred.");
        assert_eq!(defaults(Kind::Password).icon, Some("dialog-password"));
        assert_eq!(defaults(Kind::ColorSelection).title, None);
    }

    #[test]
    fn test_icon_names() {
        assert_eq!(parse_icon("dialog-warning"), Some(DialogIcon::Warning));
        assert_eq!(parse_icon("important"), Some(DialogIcon::Warning));
        assert_eq!(parse_icon(""), Some(DialogIcon::NoIcon));
        assert_eq!(parse_icon("sparkles"), None);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let cli = parse(&["--color-selection", "--color", "not-a-color"]).unwrap();
        assert!(build_options(&cli, Kind::ColorSelection, 0).is_err());
    }

    #[test]
    fn test_failure_exit_codes() {
        assert_eq!(failure(DialogError::TimedOut), EXIT_TIMEOUT);
        assert_eq!(failure(DialogError::ExtraButton("Later".to_string())), EXIT_CANCELLED);
        assert_eq!(failure(DialogError::MalformedOutput("x".to_string())), EXIT_ERROR);
        assert_eq!(confirm(Ok(false)), EXIT_CANCELLED);
        assert_eq!(path_line(PathBuf::new()), None);
    }

    #[test]
    fn test_empty_file_selection_exits_cancelled() {
        assert_eq!(report(Ok(Some(PathBuf::new())), path_line), EXIT_CANCELLED);
        assert_eq!(report(Ok(Some(PathBuf::from("/tmp/a.txt"))), path_line), 0);
    }
}
