use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::{FeedbackField, FeedbackForm};
use crate::ui::theme::Theme;

pub struct FeedbackPanel<'a> {
    pub form: &'a FeedbackForm,
    pub category_name: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> FeedbackPanel<'a> {
    pub fn new(form: &'a FeedbackForm, category_name: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            form,
            category_name,
            theme,
        }
    }
}

impl Widget for FeedbackPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            "Results",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let ratio = if self.form.total > 0 {
            self.form.score as f64 / self.form.total as f64
        } else {
            0.0
        };
        let score_color = if ratio >= 0.8 {
            colors.success()
        } else if ratio >= 0.5 {
            colors.warning()
        } else {
            colors.error()
        };
        let score_text = format!("{} / {}", self.form.score, self.form.total);
        let score_line = Line::from(vec![
            Span::styled("  Score:    ", Style::default().fg(colors.fg())),
            Span::styled(
                score_text,
                Style::default().fg(score_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let mut detail = self
            .category_name
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown category".to_string());
        if let Some(d) = self.form.params.and_then(|p| p.difficulty) {
            detail.push_str(&format!(" | {d}"));
        }
        let detail_line = Line::from(vec![
            Span::styled("  Quiz:     ", Style::default().fg(colors.fg())),
            Span::styled(detail, Style::default().fg(colors.muted())),
        ]);
        Paragraph::new(detail_line).render(layout[2], buf);

        let focus_style = |field: FeedbackField| {
            if self.form.focus == field {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            }
        };

        let stars: String = (1..=5u8)
            .map(|n| if self.form.rating.is_some_and(|r| n <= r) { '*' } else { '.' })
            .collect();
        let rating_line = Line::from(vec![
            Span::styled("  Rating:   ", focus_style(FeedbackField::Rating)),
            Span::styled(stars, Style::default().fg(colors.warning())),
            Span::styled("  [1-5] or arrows", Style::default().fg(colors.muted())),
        ]);
        Paragraph::new(rating_line).render(layout[3], buf);

        let (before, cursor, after) = self.form.comment.render_parts();
        let mut comment_spans = vec![
            Span::styled("  Comment:  ", focus_style(FeedbackField::Comment)),
            Span::styled(before, Style::default().fg(colors.fg())),
        ];
        if self.form.focus == FeedbackField::Comment {
            let cursor_text = cursor.map_or(" ".to_string(), |c| c.to_string());
            comment_spans.push(Span::styled(
                cursor_text,
                Style::default().fg(colors.bg()).bg(colors.fg()),
            ));
        } else if let Some(c) = cursor {
            comment_spans.push(Span::styled(c.to_string(), Style::default().fg(colors.fg())));
        }
        comment_spans.push(Span::styled(after, Style::default().fg(colors.fg())));
        Paragraph::new(Line::from(comment_spans)).render(layout[4], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [Tab] Switch field  ", Style::default().fg(colors.accent())),
            Span::styled("[Enter] Submit  ", Style::default().fg(colors.accent())),
            Span::styled("[r] Retry  ", Style::default().fg(colors.accent())),
            Span::styled("[Esc] Menu", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[6], buf);
    }
}
