use crate::app::{update, AppMsg, Effect};
use crate::model::{validate_config, EditorConfig, Model};
use crate::widgets::editor_widget::ParamEditorWidget;
use crate::widgets::header::draw_header;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const CONFIG_FILE: &str = "param-editor.yaml";

#[derive(Default)]
pub(crate) struct AppState {
    // Created once from the loaded config and kept for the whole session
    pub(crate) editor: ParamEditorWidget,
    pub(crate) config_source: String,
    pub(crate) last_saved: Option<Model>,
    pub(crate) tick: u64,
    pub(crate) toast: Option<Toast>,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) headless: bool,
    pub(crate) should_quit: bool,
    // Debug log (rendered in bottom debug pane)
    pub(crate) debug_log: VecDeque<String>,
}

impl AppState {
    pub fn from_config(cfg: EditorConfig, source: impl Into<String>) -> Self {
        let warnings = cfg.warnings();
        let mut state = AppState {
            editor: ParamEditorWidget::new(cfg.title, cfg.params, &cfg.model),
            config_source: source.into(),
            theme: crate::theme::Theme::synthwave_dark(),
            ..Default::default()
        };
        state.dbg(format!("config: {}", state.config_source));
        for w in warnings {
            state.dbg(format!("warning: {w}"));
        }
        state
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn show_toast(state: &mut AppState, text: String, level: ToastLevel, seconds: u64) {
    let ticks = seconds.saturating_mul(5); // ~200ms tick
    state.toast = Some(Toast {
        text,
        level,
        expires_at_tick: state.tick.saturating_add(ticks),
    });
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Save => {
                let effs = update(state, AppMsg::Save);
                run_effects(state, effs);
            }
            Effect::CopyToClipboard { text } => {
                if state.headless {
                    state.dbg("clipboard skipped in headless mode");
                    continue;
                }
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
                    Ok(()) => {
                        state.dbg("copied saved model to clipboard");
                        show_toast(state, "Copied to clipboard!".into(), ToastLevel::Success, 2);
                    }
                    Err(e) => {
                        state.dbg(format!("clipboard error: {e}"));
                        show_toast(state, format!("Clipboard error: {e}"), ToastLevel::Error, 3);
                    }
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => show_toast(state, text, level, seconds),
            Effect::Quit => state.should_quit = true,
        }
    }
}

pub fn run() -> Result<()> {
    let (cfg, source) = load_config()?;
    let mut state = AppState::from_config(cfg, source);
    let tick_rate = Duration::from_millis(200);

    // Headless smoke mode
    if env_flag("PARAM_EDITOR_HEADLESS") {
        state.headless = true;
        let ticks: u64 = std::env::var("PARAM_EDITOR_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3);
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        for _ in 0..ticks {
            terminal.draw(|f| ui(f, &mut state))?;
            state.tick = state.tick.wrapping_add(1);
        }
        run_effects(&mut state, vec![Effect::Save]);
        print_saved(&state)?;
        return Ok(());
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state, tick_rate);
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res?;
    print_saved(&state)
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();
    while !state.should_quit {
        terminal.draw(|f| ui(f, state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(msg) = key_to_msg(key) {
                        let effects = update(state, msg);
                        run_effects(state, effects);
                    }
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
    Ok(())
}

// Ctrl+C copies; other Ctrl/Alt chords are dropped so they neither type nor trigger shortcuts.
fn key_to_msg(key: KeyEvent) -> Option<AppMsg> {
    let chord = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppMsg::CopyModel)
        }
        KeyCode::Char(_) if chord => None,
        code => Some(AppMsg::Key(code)),
    }
}

fn print_saved(state: &AppState) -> Result<()> {
    if let Some(model) = &state.last_saved {
        println!("{}", serde_json::to_string_pretty(model)?);
    }
    Ok(())
}

pub(crate) fn parse_config(src: &str) -> Result<EditorConfig> {
    let cfg: EditorConfig = serde_yaml::from_str(src)?;
    validate_config(&cfg).map_err(anyhow::Error::msg)?;
    Ok(cfg)
}

pub(crate) fn load_config_from_path(path: &Path) -> Result<EditorConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading config: {path:?}"))?;
    parse_config(&s).with_context(|| format!("parsing config: {path:?}"))
}

/// Resolve the config: explicit file, then config dir, then CWD discovery,
/// falling back to the built-in demo. Returns the config and where it came from.
fn load_config() -> Result<(EditorConfig, String)> {
    if let Ok(path) = std::env::var("PARAM_EDITOR_CONFIG") {
        let p = PathBuf::from(path);
        let cfg = load_config_from_path(&p)?;
        return Ok((cfg, p.display().to_string()));
    }
    if let Ok(dir) = std::env::var("PARAM_EDITOR_CONFIG_DIR") {
        let p = PathBuf::from(dir).join(CONFIG_FILE);
        let cfg = load_config_from_path(&p)?;
        return Ok((cfg, p.display().to_string()));
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    for p in &candidates {
        if p.exists() {
            let cfg = load_config_from_path(p)?;
            return Ok((cfg, p.display().to_string()));
        }
    }
    Ok((EditorConfig::demo(), "built-in demo".to_string()))
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base_style()), screen);

    const DEBUG_H: u16 = 6;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(DEBUG_H),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_header(f, chunks[0], state);
    let tick = state.tick;
    state.editor.render(f, chunks[1], true, tick);
    draw_debug(f, chunks[2], state);
    let help = state.editor.help_text();
    draw_footer(f, chunks[3], state, help);
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    // Take last lines that fit below the top border
    let h = area.height.saturating_sub(1) as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
