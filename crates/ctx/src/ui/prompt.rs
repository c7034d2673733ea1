//! Interactive collaborator seam.
//!
//! Resolution logic talks to the user only through [`Prompter`], so it can be driven by a
//! terminal in production and by a scripted stub in tests.

use std::io;
use std::path::Path;

/// Capabilities the build and init flows need from an interactive frontend.
///
/// Selection methods return `Ok(None)` when the user cancels.
pub trait Prompter {
    /// Choose tags from `candidates`, with `preselected` checked initially.
    fn select_tags(
        &mut self,
        candidates: &[String],
        preselected: &[String],
    ) -> io::Result<Option<Vec<String>>>;

    /// Choose one or more output formats from `candidates`.
    fn select_formats(&mut self, candidates: &[String]) -> io::Result<Option<Vec<String>>>;

    /// Ask a yes/no question. Cancelling counts as "no".
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Read a line of text; `Ok(None)` when cancelled.
    fn input(&mut self, title: &str, placeholder: &str) -> io::Result<Option<String>>;

    /// Show the build summary and ask whether to proceed.
    fn confirm_build(&mut self, summary: &str) -> io::Result<bool> {
        self.confirm(&format!("{summary}\nProceed with build?"))
    }

    /// Ask before replacing an existing output file.
    fn confirm_overwrite(&mut self, path: &Path) -> io::Result<bool> {
        self.confirm(&format!("{} already exists. Overwrite it?", path.display()))
    }
}

/// Prompter used with `--non-interactive`: every prompt is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl NonInteractive {
    fn refuse(what: &str) -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot {what} in non-interactive mode"),
        )
    }
}

impl Prompter for NonInteractive {
    fn select_tags(
        &mut self,
        _candidates: &[String],
        _preselected: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        Err(Self::refuse("select tags"))
    }

    fn select_formats(&mut self, _candidates: &[String]) -> io::Result<Option<Vec<String>>> {
        Err(Self::refuse("select output formats"))
    }

    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Err(Self::refuse("ask for confirmation"))
    }

    fn input(&mut self, _title: &str, _placeholder: &str) -> io::Result<Option<String>> {
        Err(Self::refuse("read input"))
    }
}
