//! Prompter backed by the real terminal.

use std::io::{self, IsTerminal};

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use crate::domain::model::ExecutionMode;
use crate::ui::components::multi_select::{MultiSelect, MultiSelectState, SelectEvent};
use crate::ui::prompt::{NonInteractive, Prompter};

/// Whether both stdin and stderr are attached to a terminal.
pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Pick the prompter for the execution mode. Interactive mode needs a terminal.
pub fn prompter_for(mode: ExecutionMode) -> anyhow::Result<Box<dyn Prompter>> {
    if !mode.is_interactive() {
        return Ok(Box::new(NonInteractive));
    }
    if !is_interactive_terminal() {
        anyhow::bail!(
            "interactive mode requires a terminal; pass --non-interactive and explicit flags"
        );
    }
    Ok(Box::new(TerminalPrompter::default()))
}

/// Multi-selects are drawn with ratatui on stderr so stdout stays free for the document.
/// Text questions go through a reedline line editor.
#[derive(Default)]
pub struct TerminalPrompter {
    list: MultiSelect,
}

impl TerminalPrompter {
    fn multi_select(
        &self,
        title: &str,
        noun: &str,
        candidates: &[String],
        preselected: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        let mut state = MultiSelectState::new(title, noun, candidates, preselected);

        enable_raw_mode()?;
        let mut stderr = io::stderr();
        if let Err(err) = execute!(stderr, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err);
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stderr))?;
        terminal.hide_cursor().ok();

        let result = self.event_loop(&mut terminal, &mut state);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
        state: &mut MultiSelectState,
    ) -> io::Result<Option<Vec<String>>> {
        loop {
            terminal.draw(|frame| {
                let area = frame.size();
                self.list.render(frame, area, state);
            })?;
            if let Event::Key(key) = event::read()? {
                match state.handle_key(key) {
                    SelectEvent::Continue => {}
                    SelectEvent::Confirmed(selected) => return Ok(Some(selected)),
                    SelectEvent::Cancelled => return Ok(None),
                }
            }
        }
    }

    fn read_line(&self, label: String) -> io::Result<Option<String>> {
        let mut editor = Reedline::create();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(label),
            DefaultPromptSegment::Empty,
        );
        match editor.read_line(&prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            Signal::CtrlC | Signal::CtrlD => Ok(None),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select_tags(
        &mut self,
        candidates: &[String],
        preselected: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        self.multi_select("Select tags", "tag", candidates, preselected)
    }

    fn select_formats(&mut self, candidates: &[String]) -> io::Result<Option<Vec<String>>> {
        self.multi_select("Select output formats", "output format", candidates, &[])
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            let Some(answer) = self.read_line(format!("{question} [y/N] "))? else {
                return Ok(false);
            };
            match parse_yes_no(&answer) {
                Some(value) => return Ok(value),
                None => eprintln!("please answer 'y' or 'n'"),
            }
        }
    }

    fn confirm_build(&mut self, summary: &str) -> io::Result<bool> {
        eprintln!("{summary}");
        self.confirm("Proceed with build?")
    }

    fn input(&mut self, title: &str, placeholder: &str) -> io::Result<Option<String>> {
        let label = if placeholder.is_empty() {
            format!("{title} ")
        } else {
            format!("{title} [{placeholder}] ")
        };
        self.read_line(label)
    }
}

/// Blank answers mean "no".
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}
