use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::params::Difficulty;
use crate::source::Category;
use crate::ui::theme::Theme;

/// Start screen state: a difficulty and a category list. Nothing is chosen
/// until the user moves onto a category.
pub struct Menu {
    pub categories: Vec<Category>,
    pub selected: Option<usize>,
    pub difficulty: Option<Difficulty>,
    pub live_categories: bool,
}

impl Menu {
    pub fn new(categories: Vec<Category>, difficulty: Option<Difficulty>) -> Self {
        Self {
            categories,
            selected: None,
            difficulty,
            live_categories: false,
        }
    }

    /// Keeps the selection on the same category id when the list is replaced.
    pub fn set_categories(&mut self, categories: Vec<Category>, live: bool) {
        let previous = self.chosen().map(|c| c.id);
        self.categories = categories;
        self.live_categories = live;
        self.selected = previous.and_then(|id| self.categories.iter().position(|c| c.id == id));
    }

    pub fn chosen(&self) -> Option<&Category> {
        self.selected.and_then(|i| self.categories.get(i))
    }

    pub fn next(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.categories.len(),
            None => 0,
        });
    }

    pub fn prev(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.categories.len() - 1,
            Some(i) => i - 1,
        });
    }
}

pub struct MenuWidget<'a> {
    menu: &'a Menu,
    theme: &'a Theme,
}

impl<'a> MenuWidget<'a> {
    pub fn new(menu: &'a Menu, theme: &'a Theme) -> Self {
        Self { menu, theme }
    }
}

impl Widget for MenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Start Your Quiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Questions from the Open Trivia Database",
                Style::default().fg(colors.muted()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let difficulty = self.menu.difficulty.map_or("any", |d| d.as_str());
        let diff_line = Line::from(vec![
            Span::styled("  Difficulty: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("< {difficulty} >"),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(diff_line).render(layout[1], buf);

        let source_note = if self.menu.live_categories {
            "  Category:"
        } else {
            "  Category: (offline list)"
        };
        Paragraph::new(Line::from(Span::styled(
            source_note,
            Style::default().fg(colors.fg()),
        )))
        .render(layout[2], buf);

        let list_area = layout[3];
        let visible = list_area.height as usize;
        if visible == 0 {
            return;
        }
        // Keep the selection inside the visible window
        let selected = self.menu.selected.unwrap_or(0);
        let offset = selected.saturating_sub(visible.saturating_sub(1));

        for (row, (i, cat)) in self
            .menu
            .categories
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .enumerate()
        {
            let is_selected = self.menu.selected == Some(i);
            let indicator = if is_selected { ">" } else { " " };
            let text = format!("   {indicator} {}", cat.name);
            let style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let y = list_area.y + row as u16;
            buf.set_stringn(list_area.x, y, &text, list_area.width as usize, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::categories::builtin_categories;

    #[test]
    fn test_nothing_chosen_initially() {
        let menu = Menu::new(builtin_categories(), None);
        assert!(menu.chosen().is_none());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = Menu::new(builtin_categories(), None);
        menu.prev();
        assert_eq!(menu.selected, Some(menu.categories.len() - 1));
        menu.next();
        assert_eq!(menu.selected, Some(0));
    }

    #[test]
    fn test_replacing_categories_keeps_choice() {
        let mut menu = Menu::new(builtin_categories(), None);
        while menu.chosen().map(|c| c.id) != Some(18) {
            menu.next();
        }
        let live = vec![
            Category {
                id: 18,
                name: "Science: Computers".to_string(),
            },
            Category {
                id: 9,
                name: "General Knowledge".to_string(),
            },
        ];
        menu.set_categories(live, true);
        assert_eq!(menu.selected, Some(0));
        assert!(menu.live_categories);
    }

    #[test]
    fn test_empty_list_never_selects() {
        let mut menu = Menu::new(Vec::new(), None);
        menu.next();
        menu.prev();
        assert!(menu.chosen().is_none());
    }
}
