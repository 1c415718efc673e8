use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Bordered bar showing how far through the batch the session is.
pub struct ProgressBar<'a> {
    pub position: usize,
    pub total: usize,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(position: usize, total: usize, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            position,
            total,
            ratio: ratio.clamp(0.0, 1.0),
            theme,
        }
    }

    fn label(&self) -> String {
        format!("{}/{} answered", self.position, self.total)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        let label = self.label();

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_clamped() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new(0, 5, -0.5, &theme).ratio, 0.0);
        assert_eq!(ProgressBar::new(5, 5, 1.5, &theme).ratio, 1.0);
    }

    #[test]
    fn test_renders_label() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new(2, 5, 0.4, &theme).render(area, &mut buf);
        let row: String = (0..30).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("2/5 answered"));
    }
}
