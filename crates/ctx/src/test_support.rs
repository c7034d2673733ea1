//! Deterministic prompter for unit tests.

use std::collections::VecDeque;
use std::io;

use crate::ui::prompt::Prompter;

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub tag_choices: VecDeque<Option<Vec<String>>>,
    pub format_choices: VecDeque<Option<Vec<String>>>,
    pub confirmations: VecDeque<bool>,
    pub inputs: VecDeque<Option<String>>,
    pub tag_calls: Vec<(Vec<String>, Vec<String>)>,
    pub format_calls: Vec<Vec<String>>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, choice: Option<&[&str]>) -> Self {
        self.tag_choices.push_back(choice.map(to_strings));
        self
    }

    pub fn with_formats(mut self, choice: Option<&[&str]>) -> Self {
        self.format_choices.push_back(choice.map(to_strings));
        self
    }

    pub fn with_confirmation(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn with_input(mut self, value: Option<&str>) -> Self {
        self.inputs.push_back(value.map(str::to_owned));
        self
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn exhausted(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, format!("no scripted {what}"))
}

impl Prompter for ScriptedPrompter {
    fn select_tags(
        &mut self,
        candidates: &[String],
        preselected: &[String],
    ) -> io::Result<Option<Vec<String>>> {
        self.tag_calls
            .push((candidates.to_vec(), preselected.to_vec()));
        self.tag_choices
            .pop_front()
            .ok_or_else(|| exhausted("tag selection"))
    }

    fn select_formats(&mut self, candidates: &[String]) -> io::Result<Option<Vec<String>>> {
        self.format_calls.push(candidates.to_vec());
        self.format_choices
            .pop_front()
            .ok_or_else(|| exhausted("format selection"))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.questions.push(question.to_owned());
        self.confirmations
            .pop_front()
            .ok_or_else(|| exhausted("confirmation"))
    }

    fn input(&mut self, title: &str, _placeholder: &str) -> io::Result<Option<String>> {
        self.questions.push(title.to_owned());
        self.inputs.pop_front().ok_or_else(|| exhausted("input"))
    }
}
