//! Checkbox list used for tag and output-format selection.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

const HELP: &str = "↑/↓ move · space toggle · a all · enter confirm · esc cancel";

/// What a key press did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    Continue,
    Confirmed(Vec<String>),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MultiSelectState {
    title: String,
    /// Singular noun used in validation messages, e.g. "tag".
    noun: String,
    items: Vec<String>,
    checked: Vec<bool>,
    cursor: usize,
    error: Option<String>,
}

impl MultiSelectState {
    pub fn new(
        title: impl Into<String>,
        noun: impl Into<String>,
        items: &[String],
        preselected: &[String],
    ) -> Self {
        let checked = items
            .iter()
            .map(|item| preselected.contains(item))
            .collect();
        Self {
            title: title.into(),
            noun: noun.into(),
            items: items.to_vec(),
            checked,
            cursor: 0,
            error: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn toggle(&mut self) {
        if let Some(checked) = self.checked.get_mut(self.cursor) {
            *checked = !*checked;
            self.error = None;
        }
    }

    /// Check everything, or clear everything when all items are already checked.
    pub fn toggle_all(&mut self) {
        let target = !self.checked.iter().all(|checked| *checked);
        self.checked.iter_mut().for_each(|checked| *checked = target);
        self.error = None;
    }

    /// Checked items in display order.
    pub fn selected(&self) -> Vec<String> {
        self.items
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(item, _)| item.clone())
            .collect()
    }

    /// Finish the selection. An empty choice is rejected and keeps the list open.
    pub fn confirm(&mut self) -> Option<Vec<String>> {
        let selected = self.selected();
        if selected.is_empty() {
            self.error = Some(format!("select at least one {}", self.noun));
            return None;
        }
        Some(selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectEvent {
        if key.kind != KeyEventKind::Press {
            return SelectEvent::Continue;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SelectEvent::Cancelled
            }
            KeyCode::Esc | KeyCode::Char('q') => SelectEvent::Cancelled,
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                SelectEvent::Continue
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                SelectEvent::Continue
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                self.toggle();
                SelectEvent::Continue
            }
            KeyCode::Char('a') => {
                self.toggle_all();
                SelectEvent::Continue
            }
            KeyCode::Enter => match self.confirm() {
                Some(selected) => SelectEvent::Confirmed(selected),
                None => SelectEvent::Continue,
            },
            _ => SelectEvent::Continue,
        }
    }
}

#[derive(Debug, Default)]
pub struct MultiSelect;

impl MultiSelect {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &MultiSelectState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(state.title.clone())
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let items: Vec<ListItem> = state
            .items
            .iter()
            .zip(&state.checked)
            .map(|(item, checked)| {
                let (mark, style) = if *checked {
                    (
                        "[x] ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )
                } else {
                    ("[ ] ", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::styled(item.clone(), style),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(state.cursor));
        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::Rgb(40, 40, 40)))
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, layout[0], &mut list_state);

        let footer = match &state.error {
            Some(error) => Paragraph::new(error.clone())
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            None => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer, layout[1]);
    }
}
