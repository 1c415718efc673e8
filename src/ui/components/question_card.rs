use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::question::Question;
use crate::ui::entities::decode;
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    question: &'a Question,
    number: usize,
    picked: Option<usize>,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(question: &'a Question, number: usize, picked: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            question,
            number,
            picked,
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Question {} ", self.number))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let text = decode(self.question.text());
        let text_height = wrapped_line_count(&text, inner.width.saturating_sub(2) as usize) as u16;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(text_height + 1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true })
        .render(layout[0].inner(Margin::new(1, 0)), buf);

        let option_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.question
                    .options()
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, option) in self.question.options().iter().enumerate() {
            if i >= option_rows.len() {
                break;
            }
            let is_picked = self.picked == Some(i);
            let marker = if is_picked { "(*)" } else { "( )" };
            let label = format!(" {} {marker} {} ", i + 1, decode(option));
            let style = if is_picked {
                Style::default()
                    .fg(colors.option_selected_fg())
                    .bg(colors.option_selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            Paragraph::new(Line::from(Span::styled(label, style))).render(option_rows[i], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::question::{RawQuestionRecord, normalize};

    fn buffer_text(buf: &Buffer, area: Rect) -> String {
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_renders_decoded_question_and_options() {
        let rec = RawQuestionRecord {
            text: "What does &quot;CPU&quot; stand for?".to_string(),
            correct_answer: "Central Processing Unit".to_string(),
            incorrect_answers: vec!["Computer Personal Unit".to_string()],
        };
        let question = normalize(&rec, 1);
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        QuestionCard::new(&question, 1, Some(1), &theme).render(area, &mut buf);

        let text = buffer_text(&buf, area);
        assert!(text.contains("What does \"CPU\" stand for?"));
        assert!(text.contains("1 ( ) Computer Personal Unit"));
        assert!(text.contains("2 (*) Central Processing Unit"));
    }
}
