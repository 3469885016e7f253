use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub frame: Color,
    pub selected: Color,
    pub success: Color,
    pub error: Color,
    pub muted: Color,
}

impl Theme {
    pub fn synthwave_dark() -> Self {
        Self {
            bg: Color::Rgb(24, 24, 26),
            fg: Color::White,
            accent: Color::Rgb(64, 160, 255),
            frame: Color::Rgb(90, 90, 100),
            selected: Color::Rgb(255, 120, 0),
            success: Color::Green,
            error: Color::Red,
            muted: Color::DarkGray,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::synthwave_dark()
    }
}

// Style helpers that use the theme
impl Theme {
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.selected)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn text_active_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_editing_bold(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn list_cursor_style(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn toast_color(&self, level: crate::ui::ToastLevel) -> Color {
        match level {
            crate::ui::ToastLevel::Success => self.success,
            crate::ui::ToastLevel::Error => self.error,
            crate::ui::ToastLevel::Info => self.accent,
        }
    }
}

// Free helpers backed by the default theme
pub fn border_focused() -> Style {
    Theme::default().border_focused()
}

pub fn border_unfocused() -> Style {
    Theme::default().border_unfocused()
}

pub fn text_active_bold() -> Style {
    Theme::default().text_active_bold()
}

pub fn text_editing_bold() -> Style {
    Theme::default().text_editing_bold()
}

pub fn text_muted() -> Style {
    Theme::default().text_muted()
}

pub fn list_cursor_style() -> Style {
    Theme::default().list_cursor_style()
}
