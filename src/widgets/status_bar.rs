use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::AppState;

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let mut spans: Vec<Span> = Vec::new();
    if let Some(t) = &state.toast {
        let color = state.theme.toast_color(t.level);
        let tag = match t.level {
            crate::ui::ToastLevel::Success => "[OK]",
            crate::ui::ToastLevel::Error => "[ERROR]",
            crate::ui::ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    if state.editor.editing() {
        spans.push(Span::styled(
            "editing  |  ",
            Style::default().fg(Color::Magenta),
        ));
    }
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}
