use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::AppState;

/// Title line plus the config source, separated from the form by a rule.
pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border_unfocused());
    let line = Line::from(vec![
        Span::styled(state.editor.title.clone(), theme.title_style()),
        Span::styled(
            format!("  ({})", state.config_source),
            theme.text_muted(),
        ),
    ]);
    let p = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(border);
    f.render_widget(p, area);
}
