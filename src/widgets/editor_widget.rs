use crate::app::Effect;
use crate::model::{Model, Param, ParamKind};
use crate::widgets::editor::{
    draw_editor, select_choices, EditorCursor, ParamEditor, OPTIONS_VISIBLE,
};
use crossterm::event::KeyCode;
use ratatui::prelude::*;

/// Keyboard-driven wrapper around [`ParamEditor`].
#[derive(Default)]
pub struct ParamEditorWidget {
    pub title: String,
    pub editor: ParamEditor,
    pub cursor: EditorCursor,
}

impl ParamEditorWidget {
    pub fn new(title: impl Into<String>, params: Vec<Param>, model: &Model) -> Self {
        Self {
            title: title.into(),
            editor: ParamEditor::new(params, model),
            cursor: EditorCursor::default(),
        }
    }

    pub fn get_model(&self) -> Model {
        self.editor.get_model()
    }

    pub fn editing(&self) -> bool {
        self.cursor.editing
    }

    fn save_idx(&self) -> usize {
        self.editor.params().len()
    }

    fn selected_param(&self) -> Option<Param> {
        self.editor.params().get(self.cursor.selected).cloned()
    }

    /// Key hints for the footer, depending on what the cursor sits on.
    pub fn help_text(&self) -> &'static str {
        let Some(param) = self.editor.params().get(self.cursor.selected) else {
            return "↑/↓ select  Enter save  s save  Ctrl+C copy  q quit";
        };
        match (&param.kind, self.cursor.editing) {
            (ParamKind::Select, true) => "↑/↓ move  Enter choose  esc close",
            (ParamKind::Number, true) => "Type  ↑/↓ step  Enter/esc done",
            (_, true) => "Type  Backspace delete  Enter/esc done",
            (ParamKind::Select, false) => "↑/↓ select field  Enter open  ←/→ change  s save  q quit",
            (ParamKind::Other(_), false) => "↑/↓ select field  s save  q quit",
            (_, false) => "↑/↓ select field  Enter edit  s save  q quit",
        }
    }

    fn begin_edit(&mut self, param: &Param) {
        match param.kind {
            ParamKind::String | ParamKind::Number => self.cursor.editing = true,
            ParamKind::Select => {
                let choices = select_choices(param);
                let current = self.editor.value(param.id);
                self.cursor.choice = choices.iter().position(|c| c == current).unwrap_or(0);
                self.cursor.choice_offset =
                    (self.cursor.choice + 1).saturating_sub(OPTIONS_VISIBLE);
                self.cursor.editing = true;
            }
            ParamKind::Other(_) => {}
        }
    }

    // Mirrors an HTML select: choosing the already-current value is not a change.
    fn commit_choice(&mut self, param: &Param, choice: &str) {
        if self.editor.value(param.id) != choice {
            self.editor.set_value(param.id, choice);
        }
    }

    fn cycle_select(&mut self, param: &Param, forward: bool) {
        let choices = select_choices(param);
        let len = choices.len();
        let cur = choices
            .iter()
            .position(|c| c == self.editor.value(param.id))
            .unwrap_or(0);
        let next = if forward {
            (cur + 1) % len
        } else {
            (cur + len - 1) % len
        };
        self.commit_choice(param, &choices[next]);
    }

    fn on_key_browsing(&mut self, key: KeyCode) -> Vec<Effect> {
        let mut effects = Vec::new();
        match key {
            KeyCode::Up => {
                if self.cursor.selected > 0 {
                    self.cursor.selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.cursor.selected < self.save_idx() {
                    self.cursor.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Right => {
                if let Some(param) = self.selected_param() {
                    if param.kind == ParamKind::Select {
                        self.cycle_select(&param, key == KeyCode::Right);
                    }
                }
            }
            KeyCode::Enter => {
                if self.cursor.selected == self.save_idx() {
                    effects.push(Effect::Save);
                } else if let Some(param) = self.selected_param() {
                    self.begin_edit(&param);
                }
            }
            KeyCode::Char('s') => effects.push(Effect::Save),
            _ => {}
        }
        if self.cursor.selected != self.save_idx() {
            self.cursor.message = None;
        }
        effects
    }

    fn on_key_editing(&mut self, param: &Param, key: KeyCode) {
        match &param.kind {
            ParamKind::Select => match key {
                KeyCode::Up => {
                    if self.cursor.choice > 0 {
                        self.cursor.choice -= 1;
                    }
                    if self.cursor.choice < self.cursor.choice_offset {
                        self.cursor.choice_offset = self.cursor.choice;
                    }
                }
                KeyCode::Down => {
                    if self.cursor.choice + 1 < param.options.len() + 1 {
                        self.cursor.choice += 1;
                    }
                    if self.cursor.choice >= self.cursor.choice_offset + OPTIONS_VISIBLE {
                        self.cursor.choice_offset = self.cursor.choice + 1 - OPTIONS_VISIBLE;
                    }
                }
                KeyCode::Enter => {
                    let choices = select_choices(param);
                    if let Some(choice) = choices.get(self.cursor.choice) {
                        self.commit_choice(param, choice);
                    }
                    self.cursor.editing = false;
                }
                KeyCode::Esc => self.cursor.editing = false,
                _ => {}
            },
            ParamKind::String | ParamKind::Number => {
                let is_number = param.kind == ParamKind::Number;
                match key {
                    KeyCode::Char(c) => {
                        if !is_number || accepts_number_char(c) {
                            let mut s = self.editor.value(param.id).to_string();
                            s.push(c);
                            self.editor.set_value(param.id, s);
                        }
                    }
                    KeyCode::Backspace => {
                        let mut s = self.editor.value(param.id).to_string();
                        if s.pop().is_some() {
                            self.editor.set_value(param.id, s);
                        }
                    }
                    KeyCode::Up | KeyCode::Down if is_number => {
                        let dir = if key == KeyCode::Up { 1.0 } else { -1.0 };
                        let next = step_number(self.editor.value(param.id), dir);
                        self.editor.set_value(param.id, next);
                    }
                    KeyCode::Enter | KeyCode::Esc => self.cursor.editing = false,
                    _ => {}
                }
            }
            ParamKind::Other(_) => self.cursor.editing = false,
        }
    }
}

impl crate::widgets::Widget for ParamEditorWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64) {
        let cursor_on = tick % 2 == 0;
        draw_editor(
            f,
            area,
            &self.title,
            &self.editor,
            &self.cursor,
            focused,
            cursor_on,
        );
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        if !self.cursor.editing {
            return self.on_key_browsing(key);
        }
        if let Some(param) = self.selected_param() {
            self.on_key_editing(&param, key);
        } else {
            self.cursor.editing = false;
        }
        Vec::new()
    }
}

// Characters an HTML number input lets through; the value itself stays a raw string.
fn accepts_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

// Steps like a number spinner: a non-numeric or non-finite value counts as 0,
// and the result keeps as many decimals as the typed value had.
fn step_number(raw: &str, dir: f64) -> String {
    let raw = raw.trim();
    let cur = raw.parse::<f64>().ok().filter(|v| v.is_finite());
    let decimals = cur.map_or(0, |_| decimal_places(raw));
    let next = cur.unwrap_or(0.0) + dir;
    let next = if next == 0.0 { 0.0 } else { next };
    format!("{next:.decimals$}")
}

// Digits after the point once the exponent is applied: "1.25" -> 2, "15e-3" -> 3.
fn decimal_places(raw: &str) -> usize {
    let (mantissa, exp) = match raw.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&raw[..at], raw[at + 1..].parse::<i64>().unwrap_or(0)),
        None => (raw, 0),
    };
    let frac = mantissa
        .split_once('.')
        .map_or(0, |(_, f)| f.len() as i64);
    (frac - exp).clamp(0, MAX_STEP_DECIMALS) as usize
}

const MAX_STEP_DECIMALS: i64 = 17;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamValue;
    use crate::widgets::Widget;

    fn demo_widget() -> ParamEditorWidget {
        let cfg = crate::model::EditorConfig::demo();
        ParamEditorWidget::new(cfg.title, cfg.params, &cfg.model)
    }

    fn pv(param_id: i64, value: &str) -> ParamValue {
        ParamValue {
            param_id,
            value: value.into(),
        }
    }

    fn type_str(w: &mut ParamEditorWidget, s: &str) {
        for c in s.chars() {
            w.on_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_into_string_field_updates_model() {
        let mut w = demo_widget();
        w.on_key(KeyCode::Enter);
        assert!(w.editing());
        type_str(&mut w, "!!");
        w.on_key(KeyCode::Backspace);
        w.on_key(KeyCode::Enter);
        assert!(!w.editing());
        assert_eq!(w.editor.value(1), "casual!");
        assert_eq!(w.editor.value(2), "maxi");
    }

    #[test]
    fn number_field_filters_keys_but_keeps_raw_text() {
        let mut w = demo_widget();
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Enter);
        for _ in 0..4 {
            w.on_key(KeyCode::Backspace);
        }
        type_str(&mut w, "1x.5e-");
        assert_eq!(w.editor.value(3), "1.5e-");
        w.on_key(KeyCode::Esc);
        assert!(!w.editing());
    }

    #[test]
    fn arrows_step_number_while_editing() {
        let mut w = demo_widget();
        w.cursor.selected = 2;
        w.on_key(KeyCode::Enter);
        w.on_key(KeyCode::Up);
        assert_eq!(w.editor.value(3), "1001");
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        assert_eq!(w.editor.value(3), "999");
    }

    fn step_up_from(initial: &str) -> String {
        let params = vec![Param {
            id: 1,
            name: "N".into(),
            kind: ParamKind::Number,
            options: vec![],
        }];
        let model = Model {
            param_values: vec![pv(1, initial)],
        };
        let mut w = ParamEditorWidget::new("T", params, &model);
        w.on_key(KeyCode::Enter);
        w.on_key(KeyCode::Up);
        w.editor.value(1).to_string()
    }

    #[test]
    fn stepping_keeps_typed_precision_and_ignores_non_finite() {
        assert_eq!(step_up_from("1.0000001"), "2.0000001");
        assert_eq!(step_up_from("0.12345678"), "1.12345678");
        assert_eq!(step_up_from("-1.5"), "-0.5");
        assert_eq!(step_up_from("-1"), "0");
        assert_eq!(step_up_from("NaN"), "1");
        assert_eq!(step_up_from("inf"), "1");
        assert_eq!(step_up_from("1e400"), "1");
        assert_eq!(step_up_from("abc"), "1");
        assert_eq!(step_up_from(""), "1");
    }

    #[test]
    fn select_list_commits_chosen_option() {
        let params = vec![Param {
            id: 7,
            name: "Color".into(),
            kind: ParamKind::Select,
            options: vec!["Red".into(), "Green".into()],
        }];
        let mut w = ParamEditorWidget::new("T", params, &Model::default());
        w.on_key(KeyCode::Enter);
        assert!(w.editing());
        assert_eq!(w.cursor.choice, 0);
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        assert_eq!(w.cursor.choice, 2);
        w.on_key(KeyCode::Enter);
        assert!(!w.editing());
        assert_eq!(w.get_model().param_values, vec![pv(7, "Green")]);
    }

    #[test]
    fn choosing_blank_on_untouched_select_is_not_an_edit() {
        let params = vec![Param {
            id: 7,
            name: "Color".into(),
            kind: ParamKind::Select,
            options: vec!["Red".into()],
        }];
        let mut w = ParamEditorWidget::new("T", params, &Model::default());
        w.on_key(KeyCode::Enter);
        w.on_key(KeyCode::Enter);
        assert!(w.get_model().param_values.is_empty());
    }

    #[test]
    fn left_right_cycle_select_through_blank() {
        let mut w = demo_widget();
        w.cursor.selected = 3;
        w.on_key(KeyCode::Right);
        assert_eq!(w.editor.value(4), "Green");
        w.on_key(KeyCode::Left);
        w.on_key(KeyCode::Left);
        assert_eq!(w.editor.value(4), "");
        w.on_key(KeyCode::Left);
        assert_eq!(w.editor.value(4), "Blue");
    }

    #[test]
    fn esc_closes_select_without_change() {
        let mut w = demo_widget();
        w.cursor.selected = 3;
        w.on_key(KeyCode::Enter);
        assert_eq!(w.cursor.choice, 1);
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Esc);
        assert!(!w.editing());
        assert_eq!(w.editor.value(4), "Red");
    }

    #[test]
    fn unknown_kind_rows_cannot_be_edited() {
        let params = vec![Param {
            id: 1,
            name: "Odd".into(),
            kind: ParamKind::Other("date".into()),
            options: vec![],
        }];
        let mut w = ParamEditorWidget::new("T", params, &Model::default());
        w.on_key(KeyCode::Enter);
        assert!(!w.editing());
        w.on_key(KeyCode::Char('x'));
        assert!(w.get_model().param_values.is_empty());
    }

    #[test]
    fn save_row_and_shortcut_emit_save() {
        let mut w = demo_widget();
        let effs = w.on_key(KeyCode::Char('s'));
        assert!(matches!(effs.as_slice(), [Effect::Save]));
        for _ in 0..10 {
            w.on_key(KeyCode::Down);
        }
        assert_eq!(w.cursor.selected, 4);
        let effs = w.on_key(KeyCode::Enter);
        assert!(matches!(effs.as_slice(), [Effect::Save]));
    }

    #[test]
    fn s_while_editing_text_is_typed_not_saved() {
        let mut w = demo_widget();
        w.on_key(KeyCode::Enter);
        let effs = w.on_key(KeyCode::Char('s'));
        assert!(effs.is_empty());
        assert_eq!(w.editor.value(1), "casuals");
    }

    #[test]
    fn decimal_places_follow_typed_text() {
        assert_eq!(decimal_places("1000"), 0);
        assert_eq!(decimal_places("1.50"), 2);
        assert_eq!(decimal_places("15e-3"), 3);
        assert_eq!(decimal_places("1.5e2"), 0);
    }
}
