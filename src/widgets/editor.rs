use crate::model::{Model, Param, ParamKind, ParamValue};
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::BTreeMap;

pub const OPTIONS_VISIBLE: usize = 8;
/// Display text for the blank first choice of a select.
pub const SELECT_PLACEHOLDER: &str = "Choose";

/// Live edit state: the param definitions plus the current value of every
/// param that was present in the initial model or has been edited since.
#[derive(Clone, Debug, Default)]
pub struct ParamEditor {
    params: Vec<Param>,
    values: BTreeMap<i64, String>,
}

impl ParamEditor {
    pub fn new(params: Vec<Param>, model: &Model) -> Self {
        let mut values = BTreeMap::new();
        for pv in &model.param_values {
            values.insert(pv.param_id, pv.value.clone());
        }
        Self { params, values }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Current value for `param_id`, or "" when the param was never set.
    pub fn value(&self, param_id: i64) -> &str {
        self.values.get(&param_id).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, param_id: i64, value: impl Into<String>) {
        self.values.insert(param_id, value.into());
    }

    pub fn get_model(&self) -> Model {
        Model {
            param_values: self
                .values
                .iter()
                .map(|(id, v)| ParamValue {
                    param_id: *id,
                    value: v.clone(),
                })
                .collect(),
        }
    }
}

/// What a single row shows for its input, decided from the param kind alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputView {
    Text {
        value: String,
    },
    Number {
        value: String,
    },
    Select {
        // Blank first, then the param's options in order
        choices: Vec<String>,
        selected: Option<usize>,
    },
}

pub fn input_view(param: &Param, current: &str) -> Option<InputView> {
    match &param.kind {
        ParamKind::String => Some(InputView::Text {
            value: current.to_string(),
        }),
        ParamKind::Number => Some(InputView::Number {
            value: current.to_string(),
        }),
        ParamKind::Select => {
            let choices = select_choices(param);
            let selected = choices.iter().position(|c| c == current);
            Some(InputView::Select { choices, selected })
        }
        ParamKind::Other(_) => None,
    }
}

pub fn select_choices(param: &Param) -> Vec<String> {
    let mut choices = Vec::with_capacity(param.options.len() + 1);
    choices.push(String::new());
    choices.extend(param.options.iter().cloned());
    choices
}

/// Cursor and edit-mode state of the form; rows are the params followed by
/// the Save button.
#[derive(Clone, Debug, Default)]
pub struct EditorCursor {
    pub selected: usize,
    pub editing: bool,
    // Open select list: highlighted choice and scroll offset
    pub choice: usize,
    pub choice_offset: usize,
    pub message: Option<String>,
}

fn value_style(is_selected: bool, editing: bool) -> Style {
    if is_selected {
        if editing {
            crate::theme::text_editing_bold()
        } else {
            crate::theme::text_active_bold()
        }
    } else {
        Style::default()
    }
}

fn choice_label(choice: &str) -> String {
    if choice.is_empty() {
        SELECT_PLACEHOLDER.to_string()
    } else {
        choice.to_string()
    }
}

pub fn draw_editor(
    f: &mut Frame,
    area: Rect,
    title: &str,
    editor: &ParamEditor,
    cursor: &EditorCursor,
    highlight: bool,
    cursor_on: bool,
) {
    let mut lines: Vec<Line> = Vec::new();
    // Line range of the focused row, open option list included.
    let mut focus = (0, 0);
    for (i, param) in editor.params().iter().enumerate() {
        let is_sel = i == cursor.selected;
        let first = lines.len();
        let sel = if is_sel { '›' } else { ' ' };
        let label = Span::raw(format!("{sel} {}: ", param.name));
        let editing_here = cursor.editing && is_sel;
        match input_view(param, editor.value(param.id)) {
            Some(InputView::Text { mut value }) => {
                if editing_here && cursor_on {
                    value.push('▏');
                }
                lines.push(Line::from(vec![
                    label,
                    Span::styled(value, value_style(is_sel, cursor.editing)),
                ]));
            }
            Some(InputView::Number { mut value }) => {
                if editing_here && cursor_on {
                    value.push('▏');
                }
                lines.push(Line::from(vec![
                    label,
                    Span::styled(value, value_style(is_sel, cursor.editing)),
                    Span::styled(" #", crate::theme::text_muted()),
                ]));
            }
            Some(InputView::Select { choices, selected }) => {
                let summary = selected
                    .and_then(|idx| choices.get(idx))
                    .map(|c| choice_label(c))
                    .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string());
                let summary_style = if selected.unwrap_or(0) == 0 && !is_sel {
                    crate::theme::text_muted()
                } else {
                    value_style(is_sel, cursor.editing)
                };
                lines.push(Line::from(vec![
                    label,
                    Span::styled(format!("{summary} ▾"), summary_style),
                ]));
                if editing_here {
                    let start = cursor.choice_offset.min(choices.len());
                    let end = (start + OPTIONS_VISIBLE).min(choices.len());
                    for (ci, choice) in choices.iter().enumerate().take(end).skip(start) {
                        let mark = if Some(ci) == selected { "(•)" } else { "( )" };
                        let cur = if ci == cursor.choice { '›' } else { ' ' };
                        let st = if ci == cursor.choice {
                            crate::theme::list_cursor_style()
                        } else {
                            crate::theme::text_muted()
                        };
                        lines.push(Line::from(vec![Span::styled(
                            format!("  {cur} {mark} {}", choice_label(choice)),
                            st,
                        )]));
                    }
                }
            }
            None => lines.push(Line::from(vec![label])),
        }
        if is_sel {
            focus = (first, lines.len());
        }
    }
    if !editor.params().is_empty() {
        lines.push(Line::from(""));
    }
    let save_style = if cursor.selected == editor.params().len() {
        crate::theme::list_cursor_style()
    } else {
        crate::theme::text_active_bold()
    };
    if cursor.selected >= editor.params().len() {
        focus = (lines.len(), lines.len() + 1);
    }
    lines.push(Line::from(vec![Span::styled("  [ Save ]", save_style)]));
    if let Some(msg) = &cursor.message {
        lines.push(Line::from(Span::styled(
            msg.clone(),
            crate::theme::text_muted(),
        )));
    }
    let title = if cursor.editing {
        format!("{title} (editing)")
    } else {
        title.to_string()
    };
    let block = panel_block(&title, highlight);
    let offset = scroll_offset(focus, area.height.saturating_sub(2) as usize);
    let p = Paragraph::new(lines)
        .block(block)
        .scroll((offset as u16, 0));
    f.render_widget(p, area);
}

// Smallest offset that shows the end of the focused range without hiding its first line.
fn scroll_offset((first, end): (usize, usize), visible: usize) -> usize {
    if visible == 0 {
        return first;
    }
    end.saturating_sub(visible).min(first)
}
