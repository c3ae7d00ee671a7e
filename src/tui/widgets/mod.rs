//! TUI Widgets - rendering helpers
//!
//! Stateless functions turning element handles into Ratatui primitives.
//! Screens compose them; no element is mutated while drawing.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
};

use super::theme::{icons, ConsoleTheme};
use crate::element::{AsyncLabel, Button, Entry, HintEntry, Label, List};
use crate::focus::Focusable;

/// `caption  value` line for a label
pub fn label_line<'a>(theme: &ConsoleTheme, caption: &'a str, label: &Label) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{caption:<10}"), theme.dimmed()),
        Span::styled(label.text(), theme.label(label.style())),
    ])
}

pub fn async_label_line<'a>(theme: &ConsoleTheme, caption: &'a str, cell: &AsyncLabel) -> Line<'a> {
    label_line(theme, caption, cell.label())
}

/// Caption label (highlighted by its screen) followed by the entry text
pub fn entry_line<'a>(theme: &ConsoleTheme, caption: &Label, entry: &Entry) -> Line<'a> {
    let cursor = if entry.is_focused() { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<16}", caption.text()), theme.label(caption.style())),
        Span::styled(format!("{}{cursor}", entry.display_text()), field_style(theme, entry.is_focused())),
    ])
}

/// Hint entry line plus its visible suggestions
pub fn hint_lines<'a>(theme: &ConsoleTheme, caption: &Label, entry: &HintEntry) -> Vec<Line<'a>> {
    let cursor = if entry.is_focused() { "_" } else { "" };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:<16}", caption.text()), theme.label(caption.style())),
        Span::styled(format!("{}{cursor}", entry.text()), field_style(theme, entry.is_focused())),
    ])];

    if entry.is_choosing() {
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(16)),
            Span::styled(format!("filter: {}", entry.filter()), theme.accent()),
        ]));
    }

    let chosen = entry.chosen();
    for (i, suggestion) in entry.visible_suggestions().into_iter().enumerate() {
        let style = if chosen == Some(i) {
            theme.focused()
        } else {
            theme.dimmed()
        };
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(16)),
            Span::styled(suggestion, style),
        ]));
    }
    lines
}

pub fn button_span<'a>(theme: &ConsoleTheme, button: &Button) -> Span<'a> {
    let style = if button.is_focused() {
        theme.focused()
    } else {
        theme.accent()
    };
    Span::styled(button.caption().to_string(), style)
}

/// One line per item, the selected one marked
pub fn list_lines<'a>(theme: &ConsoleTheme, list: &List) -> Vec<Line<'a>> {
    let selected = list.selected();
    list.items()
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if selected == Some(i) {
                Line::from(vec![
                    Span::styled(format!("{} ", icons::CURSOR), theme.highlight()),
                    Span::styled(item, theme.focused()),
                ])
            } else {
                Line::from(vec![Span::raw("  "), Span::styled(item, theme.text())])
            }
        })
        .collect()
}

fn field_style(theme: &ConsoleTheme, focused: bool) -> Style {
    if focused {
        theme.highlight()
    } else {
        theme.text()
    }
}

/// A `width` x `height` rectangle centred in `area`, clamped to it
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width.min(area.width)),
            Constraint::Fill(1),
        ])
        .split(vertical[1])[1]
}

/// Common widget utilities
pub mod utils {
    /// Truncate string with ellipsis
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            s.chars().take(max_len).collect()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{head}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 2), "hi");
    }

    #[test]
    fn test_centered_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let inner = centered(area, 20, 4);
        assert_eq!((inner.width, inner.height), (20, 4));
        assert_eq!((inner.x, inner.y), (10, 3));

        let clamped = centered(area, 100, 100);
        assert_eq!(clamped, area);
    }

    #[test]
    fn test_list_lines_mark_selection() {
        let theme = ConsoleTheme::new();
        let list = List::with_items(["Workers", "Exit"]);
        list.select(1);
        let lines = list_lines(&theme, &list);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].to_string().contains(icons::CURSOR));
        assert!(!lines[0].to_string().contains(icons::CURSOR));
    }
}
