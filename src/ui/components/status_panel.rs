use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::controller::EmptyReason;
use crate::session::params::SessionParameters;
use crate::source::opentdb::describe_response_code;
use crate::ui::theme::Theme;

/// What the quiz screen shows when there is no question to render.
pub enum QuizStatus<'a> {
    Loading,
    Empty {
        reason: Option<&'a EmptyReason>,
        params: Option<SessionParameters>,
    },
    Finished,
}

pub struct StatusPanel<'a> {
    status: QuizStatus<'a>,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    pub fn new(status: QuizStatus<'a>, theme: &'a Theme) -> Self {
        Self { status, theme }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let heading = |text: &str| {
            Line::from(Span::styled(
                text.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ))
        };
        let muted = |text: String| Line::from(Span::styled(text, Style::default().fg(colors.muted())));

        match &self.status {
            QuizStatus::Loading => vec![Line::from(""), heading("Loading\u{2026}")],
            QuizStatus::Finished => vec![Line::from(""), heading("Quiz complete")],
            QuizStatus::Empty { reason, params } => {
                let mut lines = vec![Line::from(""), heading("No questions found")];
                let detail = match reason {
                    Some(EmptyReason::SourceUnavailable(msg)) => {
                        format!("The question provider could not be reached: {msg}")
                    }
                    Some(EmptyReason::ProviderRejected(code)) => format!(
                        "The question provider rejected the request (code {code}: {}).",
                        describe_response_code(*code)
                    ),
                    _ => "Try a different category or difficulty.".to_string(),
                };
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    detail,
                    Style::default().fg(colors.fg()),
                )));
                if let Some(p) = params {
                    let query = p
                        .difficulty
                        .map(|d| format!("?difficulty={d}"))
                        .unwrap_or_default();
                    lines.push(Line::from(""));
                    lines.push(muted(format!("/quiz/{}{query}", p.category)));
                }
                lines
            }
        }
    }
}

impl Widget for StatusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let lines = self.lines();
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
