//! Windows native dialogs
//!
//! Message boxes and file pickers go through `rfd`, colour picking through
//! `ChooseColorW`. Every dialog is modal to a dedicated thread so the caller
//! can keep watching its cancellation token; on interruption the thread's
//! windows are sent `WM_CLOSE` until the dialog returns.
//!
//! Results are reported as `RawOutput` with the same exit protocol as the
//! process backends, so parsing is shared.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tokio::sync::oneshot;
use tracing::debug;
use windows_sys::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::Controls::Dialogs::{
    ChooseColorW, CommDlgExtendedError, CC_ANYCOLOR, CC_FULLOPEN, CC_RGBINIT, CHOOSECOLORW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{EnumThreadWindows, PostMessageW, WM_CLOSE};

use crate::color::Color;
use crate::dialog::{Dialog, FileMode, MessageKind, SEPARATOR};
use crate::error::{DialogError, Result};
use crate::exec::{Interrupt, RawOutput};
use crate::options::{FileFilter, Options};
use crate::render::split_filename;

const DISMISS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum NativeRequest {
    Message {
        kind: MessageKind,
        title: Option<String>,
        text: String,
        ok: Option<String>,
        cancel: Option<String>,
        extra: Option<String>,
    },
    File {
        mode: FileMode,
        multiple: bool,
        title: Option<String>,
        directory: Option<PathBuf>,
        file_name: Option<String>,
        filters: Vec<FileFilter>,
        confirm_create: bool,
    },
    Color {
        initial: Option<Color>,
        full_open: bool,
    },
}

pub fn render(dialog: &Dialog<'_>, opts: &Options) -> Result<NativeRequest> {
    match *dialog {
        Dialog::Message { kind, text } => Ok(NativeRequest::Message {
            kind,
            title: opts.title.clone(),
            text: text.to_string(),
            ok: opts.ok_label.clone(),
            cancel: opts.cancel_label.clone(),
            extra: opts.extra_button.clone(),
        }),
        Dialog::File { mode, multiple } => {
            let (directory, file_name) = opts
                .filename
                .as_deref()
                .map(split_filename)
                .unwrap_or((None, None));
            Ok(NativeRequest::File {
                mode,
                multiple,
                title: opts.title.clone(),
                directory: directory.map(PathBuf::from),
                file_name: file_name.map(str::to_string),
                filters: opts.filters.clone(),
                confirm_create: opts.confirm_create,
            })
        }
        Dialog::Color => Ok(NativeRequest::Color {
            initial: opts.color,
            full_open: opts.show_palette,
        }),
        other => Err(DialogError::UnsupportedConfiguration(format!(
            "no native {:?} dialog",
            other.kind()
        ))),
    }
}

/// Show `request` on its own thread and wait under `interrupt`.
pub async fn invoke(request: NativeRequest, interrupt: &Interrupt) -> Result<RawOutput> {
    if let Some(err) = interrupt.fired() {
        return Err(err);
    }

    let (tx, mut rx) = oneshot::channel();
    let thread_id = Arc::new(AtomicU32::new(0));
    let owner = Arc::clone(&thread_id);
    std::thread::Builder::new()
        .name("sysdialog-native".to_string())
        .spawn(move || {
            owner.store(unsafe { GetCurrentThreadId() }, Ordering::Release);
            let _ = tx.send(show(request));
        })?;

    let err = tokio::select! {
        biased;
        _ = interrupt.cancelled() => DialogError::Interrupted,
        _ = interrupt.expired() => DialogError::TimedOut,
        res = &mut rx => {
            let output = res.map_err(|_| io::Error::other("native dialog thread exited"))?;
            return match interrupt.fired() {
                Some(err) => Err(err),
                None => Ok(output),
            };
        }
    };

    debug!("Dismissing native dialog: {}", err);
    let mut ticker = tokio::time::interval(DISMISS_INTERVAL);
    loop {
        tokio::select! {
            _ = &mut rx => break,
            _ = ticker.tick() => dismiss(thread_id.load(Ordering::Acquire)),
        }
    }
    Err(err)
}

fn dismiss(thread_id: u32) {
    if thread_id == 0 {
        return;
    }
    unsafe extern "system" fn close(hwnd: HWND, _: LPARAM) -> BOOL {
        PostMessageW(hwnd, WM_CLOSE, 0, 0);
        TRUE
    }
    unsafe {
        EnumThreadWindows(thread_id, Some(close), 0);
    }
}

fn show(request: NativeRequest) -> RawOutput {
    match request {
        NativeRequest::Message { kind, title, text, ok, cancel, extra } => {
            show_message(kind, title, text, ok, cancel, extra)
        }
        NativeRequest::File { mode, multiple, title, directory, file_name, filters, confirm_create } => {
            let output = show_file(mode, multiple, title, directory, file_name, &filters);
            if confirm_create && mode == FileMode::Save && output.code == Some(0) {
                confirm_creation(output)
            } else {
                output
            }
        }
        NativeRequest::Color { initial, full_open } => show_color(initial, full_open),
    }
}

fn show_message(
    kind: MessageKind,
    title: Option<String>,
    text: String,
    ok: Option<String>,
    cancel: Option<String>,
    extra: Option<String>,
) -> RawOutput {
    let question = kind == MessageKind::Question;
    let custom = ok.is_some() || cancel.is_some() || extra.is_some();
    let ok_label = ok.unwrap_or_else(|| if question { "Yes" } else { "OK" }.to_string());
    let cancel_label = cancel.unwrap_or_else(|| if question { "No" } else { "Cancel" }.to_string());

    let buttons = match (question, &extra) {
        (true, Some(extra)) => MessageButtons::YesNoCancelCustom(ok_label.clone(), extra.clone(), cancel_label),
        (true, None) if custom => MessageButtons::OkCancelCustom(ok_label.clone(), cancel_label),
        (true, None) => MessageButtons::YesNo,
        (false, Some(extra)) => MessageButtons::OkCancelCustom(ok_label.clone(), extra.clone()),
        (false, None) if custom => MessageButtons::OkCustom(ok_label.clone()),
        (false, None) => MessageButtons::Ok,
    };
    let level = match kind {
        MessageKind::Error => MessageLevel::Error,
        MessageKind::Warning => MessageLevel::Warning,
        MessageKind::Info | MessageKind::Question => MessageLevel::Info,
    };

    let mut dialog = MessageDialog::new()
        .set_level(level)
        .set_description(text)
        .set_buttons(buttons);
    if let Some(title) = title {
        dialog = dialog.set_title(title);
    }

    match dialog.show() {
        MessageDialogResult::Ok | MessageDialogResult::Yes => RawOutput::exited(0, ""),
        MessageDialogResult::Custom(label) if extra.as_deref() == Some(label.as_str()) => {
            RawOutput::exited(1, label)
        }
        MessageDialogResult::Custom(label) if label == ok_label => RawOutput::exited(0, ""),
        _ => RawOutput::exited(1, ""),
    }
}

fn show_file(
    mode: FileMode,
    multiple: bool,
    title: Option<String>,
    directory: Option<PathBuf>,
    file_name: Option<String>,
    filters: &[FileFilter],
) -> RawOutput {
    let mut dialog = FileDialog::new();
    if let Some(title) = title {
        dialog = dialog.set_title(title);
    }
    if let Some(directory) = directory {
        dialog = dialog.set_directory(directory);
    }
    if let Some(name) = file_name {
        dialog = dialog.set_file_name(name);
    }
    for filter in filters {
        let extensions = filter.extensions();
        if !extensions.is_empty() {
            dialog = dialog.add_filter(filter.name.as_str(), &extensions[..]);
        }
    }

    let picked = match (mode, multiple) {
        (FileMode::Open, false) => dialog.pick_file().map(|p| vec![p]),
        (FileMode::Open, true) => dialog.pick_files(),
        (FileMode::Directory, false) => dialog.pick_folder().map(|p| vec![p]),
        (FileMode::Directory, true) => dialog.pick_folders(),
        (FileMode::Save, _) => dialog.save_file().map(|p| vec![p]),
    };

    match picked {
        Some(paths) if !paths.is_empty() => {
            let joined: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
            RawOutput::exited(0, joined.join(SEPARATOR))
        }
        _ => RawOutput::exited(1, ""),
    }
}

/// Ask before returning a save path that does not exist yet.
fn confirm_creation(output: RawOutput) -> RawOutput {
    let path = PathBuf::from(String::from_utf8_lossy(&output.stdout).into_owned());
    if path.exists() {
        return output;
    }
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_description(format!("{} does not exist.\nDo you want to create it?", path.display()))
        .set_buttons(MessageButtons::YesNo)
        .show();
    match answer {
        MessageDialogResult::Yes => output,
        _ => RawOutput::exited(1, ""),
    }
}

fn show_color(initial: Option<Color>, full_open: bool) -> RawOutput {
    let mut custom = [0u32; 16];
    let mut cc: CHOOSECOLORW = unsafe { std::mem::zeroed() };
    cc.lStructSize = std::mem::size_of::<CHOOSECOLORW>() as u32;
    cc.lpCustColors = custom.as_mut_ptr();
    cc.Flags = CC_ANYCOLOR;
    if let Some(color) = initial {
        cc.rgbResult = color.to_colorref();
        cc.Flags |= CC_RGBINIT;
    }
    if full_open {
        cc.Flags |= CC_FULLOPEN;
    }

    if unsafe { ChooseColorW(&mut cc) } != 0 {
        return RawOutput::exited(0, Color::from_colorref(cc.rgbResult).to_string());
    }
    match unsafe { CommDlgExtendedError() } {
        0 => RawOutput::exited(1, ""),
        code => RawOutput {
            code: Some(2),
            stdout: Vec::new(),
            stderr: format!("ChooseColorW failed: 0x{:x}", code).into_bytes(),
        },
    }
}
