//! Result parsing
//!
//! Every process backend speaks the same exit protocol:
//!
//! | exit | meaning |
//! |---|---|
//! | 0 | value on stdout |
//! | 1 | dismissed; stdout holds the extra button label if that was pressed |
//! | 5 | the dialog gave up on its own |
//! | other | failure, details on stderr |
//!
//! The value itself is decoded by one `Decode` implementation per dialog
//! kind. Emptiness never means "cancelled": an empty line with exit 0 is a
//! valid empty answer.

use std::path::PathBuf;

use crate::color::Color;
use crate::dialog::SEPARATOR;
use crate::error::{DialogError, Result};
use crate::exec::RawOutput;

/// What the user did with a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Value(T),
    Cancelled,
    ExtraButton(String),
}

impl<T> Outcome<T> {
    /// `Some` for a value, `None` for a dismissal. The extra button
    /// becomes `DialogError::ExtraButton`.
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            Outcome::Value(v) => Ok(Some(v)),
            Outcome::Cancelled => Ok(None),
            Outcome::ExtraButton(label) => Err(DialogError::ExtraButton(label)),
        }
    }
}

/// Turns the text a backend printed on success into a typed value.
pub trait Decode {
    type Output;

    fn decode(&self, text: &str) -> Result<Self::Output>;
}

/// Message and notification dialogs carry no value.
pub struct Ack;

impl Decode for Ack {
    type Output = ();

    fn decode(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// A single line of text, possibly empty.
pub struct Text;

impl Decode for Text {
    type Output = String;

    fn decode(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Separator-delimited items. No output means nothing was selected.
pub struct Items<'a> {
    pub separator: &'a str,
}

impl Default for Items<'_> {
    fn default() -> Self {
        Self { separator: SEPARATOR }
    }
}

impl Decode for Items<'_> {
    type Output = Vec<String>;

    fn decode(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(text.split(self.separator).map(str::to_string).collect())
    }
}

/// Result of a password dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Only present when the dialog asked for one
    pub username: Option<String>,
    pub password: String,
}

/// `password` or `username|password`, split at the first `|`.
pub struct Secret {
    pub username: bool,
}

impl Decode for Secret {
    type Output = Credentials;

    fn decode(&self, text: &str) -> Result<Credentials> {
        if !self.username {
            return Ok(Credentials {
                username: None,
                password: text.to_string(),
            });
        }
        let (user, pass) = text
            .split_once('|')
            .ok_or_else(|| DialogError::MalformedOutput("expected username|password".to_string()))?;
        Ok(Credentials {
            username: Some(user.to_string()),
            password: pass.to_string(),
        })
    }
}

/// One path, or several joined by the record separator. An empty line means
/// the dialog was confirmed with nothing selected.
pub struct Paths {
    pub multiple: bool,
}

impl Decode for Paths {
    type Output = Vec<PathBuf>;

    fn decode(&self, text: &str) -> Result<Vec<PathBuf>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if !self.multiple {
            return Ok(vec![PathBuf::from(text)]);
        }
        Ok(text
            .split(SEPARATOR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

/// `rgb(...)`, `rgba(...)` or a hex color.
pub struct ColorValue;

impl Decode for ColorValue {
    type Output = Color;

    fn decode(&self, text: &str) -> Result<Color> {
        text.trim().parse()
    }
}

/// Drop exactly one trailing line terminator.
fn strip_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Interpret `raw` for a dialog configured with the `extra` button label.
pub fn parse<D: Decode>(decoder: &D, raw: &RawOutput, extra: Option<&str>) -> Result<Outcome<D::Output>> {
    match raw.code {
        Some(0) => {
            let text = std::str::from_utf8(&raw.stdout)
                .map_err(|e| DialogError::MalformedOutput(format!("output is not UTF-8: {}", e)))?;
            decoder.decode(strip_newline(text)).map(Outcome::Value)
        }
        Some(1) => {
            let text = String::from_utf8_lossy(&raw.stdout);
            match extra {
                Some(label) if strip_newline(&text) == label => Ok(Outcome::ExtraButton(label.to_string())),
                _ => Ok(Outcome::Cancelled),
            }
        }
        Some(5) => Err(DialogError::TimedOut),
        code => Err(DialogError::ExecutionFailed {
            code,
            stderr: String::from_utf8_lossy(&raw.stderr).trim().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer_is_a_value() {
        let raw = RawOutput::exited(0, "\n");
        assert_eq!(parse(&Text, &raw, None).unwrap(), Outcome::Value(String::new()));
        // only one terminator is stripped
        let raw = RawOutput::exited(0, "\n\n");
        assert_eq!(parse(&Text, &raw, None).unwrap(), Outcome::Value("\n".to_string()));
    }

    #[test]
    fn test_dismissal_and_extra_button() {
        let raw = RawOutput::exited(1, "");
        assert_eq!(parse(&Ack, &raw, Some("Later")).unwrap(), Outcome::Cancelled);

        let raw = RawOutput::exited(1, "Later\n");
        assert_eq!(
            parse(&Ack, &raw, Some("Later")).unwrap(),
            Outcome::ExtraButton("Later".to_string())
        );
        // a label the caller never configured is just a dismissal
        assert_eq!(parse(&Ack, &raw, None).unwrap(), Outcome::Cancelled);
        assert_eq!(parse(&Ack, &raw, Some("Later ")).unwrap(), Outcome::Cancelled);
    }

    #[test]
    fn test_extra_button_maps_to_error() {
        let err = Outcome::<()>::ExtraButton("Later".to_string()).into_result().unwrap_err();
        assert!(matches!(err, DialogError::ExtraButton(ref l) if l == "Later"));
        assert_eq!(Outcome::<()>::Cancelled.into_result().unwrap(), None);
    }

    #[test]
    fn test_timeout_and_failure_codes() {
        assert!(parse(&Text, &RawOutput::exited(5, ""), None).unwrap_err().is_timeout());

        let raw = RawOutput {
            code: Some(2),
            stdout: Vec::new(),
            stderr: b"execution error: boom\n".to_vec(),
        };
        match parse(&Text, &raw, None) {
            Err(DialogError::ExecutionFailed { code, stderr }) => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "execution error: boom");
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let killed = RawOutput { code: None, ..Default::default() };
        assert!(matches!(
            parse(&Ack, &killed, None),
            Err(DialogError::ExecutionFailed { code: None, .. })
        ));
    }

    #[test]
    fn test_items_round_trip() {
        let items = vec!["alpha".to_string(), "beta gamma".to_string(), "δ|ε".to_string()];
        let wire = format!("{}\n", items.join(SEPARATOR));
        let raw = RawOutput::exited(0, wire);
        assert_eq!(parse(&Items::default(), &raw, None).unwrap(), Outcome::Value(items));

        let raw = RawOutput::exited(0, "\n");
        assert_eq!(parse(&Items::default(), &raw, None).unwrap(), Outcome::Value(vec![]));

        let raw = RawOutput::exited(0, "a|b\n");
        assert_eq!(
            parse(&Items { separator: "|" }, &raw, None).unwrap(),
            Outcome::Value(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_credentials() {
        let raw = RawOutput::exited(0, "alice|pa|ss\n");
        assert_eq!(
            parse(&Secret { username: true }, &raw, None).unwrap(),
            Outcome::Value(Credentials {
                username: Some("alice".to_string()),
                password: "pa|ss".to_string(),
            })
        );

        let raw = RawOutput::exited(0, "pa|ss\n");
        let creds = parse(&Secret { username: false }, &raw, None).unwrap();
        assert_eq!(
            creds,
            Outcome::Value(Credentials { username: None, password: "pa|ss".to_string() })
        );

        let raw = RawOutput::exited(0, "nopipe\n");
        assert!(matches!(
            parse(&Secret { username: true }, &raw, None),
            Err(DialogError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_paths() {
        let raw = RawOutput::exited(0, "/tmp/a b.txt\n");
        assert_eq!(
            parse(&Paths { multiple: false }, &raw, None).unwrap(),
            Outcome::Value(vec![PathBuf::from("/tmp/a b.txt")])
        );

        let raw = RawOutput::exited(0, format!("/a{}/b\n", SEPARATOR));
        assert_eq!(
            parse(&Paths { multiple: true }, &raw, None).unwrap(),
            Outcome::Value(vec![PathBuf::from("/a"), PathBuf::from("/b")])
        );

        assert_eq!(
            parse(&Paths { multiple: false }, &RawOutput::exited(0, "\n"), None).unwrap(),
            Outcome::Value(vec![])
        );
    }

    #[test]
    fn test_color_and_bad_utf8() {
        let raw = RawOutput::exited(0, "rgb(10,20,30)\n");
        assert_eq!(
            parse(&ColorValue, &raw, None).unwrap(),
            Outcome::Value(Color::rgb(10, 20, 30))
        );
        assert!(matches!(
            parse(&ColorValue, &RawOutput::exited(0, "purple\n"), None),
            Err(DialogError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse(&Text, &RawOutput::exited(0, vec![0xff, 0xfe]), None),
            Err(DialogError::MalformedOutput(_))
        ));
    }
}
