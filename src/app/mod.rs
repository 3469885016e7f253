use crate::ui::{AppState, ToastLevel};
use crate::widgets::Widget;
use crossterm::event::KeyCode;

pub enum AppMsg {
    Key(KeyCode),
    Save,
    CopyModel,
}

#[derive(Debug)]
pub enum Effect {
    Save,
    CopyToClipboard {
        text: String,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    Quit,
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        Key(code) => {
            // 'q' is text while an input is being edited
            if !state.editor.editing() && code == KeyCode::Char('q') {
                effects.push(Effect::Quit);
            } else {
                effects.extend(state.editor.on_key(code));
            }
        }
        Save => {
            let model = state.editor.get_model();
            match serde_json::to_string(&model) {
                Ok(json) => state.dbg(format!("saved model: {json}")),
                Err(e) => state.dbg(format!("saved model (not serializable: {e})")),
            }
            state.editor.cursor.message =
                Some(format!("Saved {} value(s)", model.param_values.len()));
            state.last_saved = Some(model);
            effects.push(Effect::ShowToast {
                text: "Model saved".into(),
                level: ToastLevel::Success,
                seconds: 2,
            });
        }
        CopyModel => match &state.last_saved {
            Some(model) => match serde_json::to_string_pretty(model) {
                Ok(text) => effects.push(Effect::CopyToClipboard { text }),
                Err(e) => effects.push(Effect::ShowToast {
                    text: format!("Copy failed: {e}"),
                    level: ToastLevel::Error,
                    seconds: 3,
                }),
            },
            None => effects.push(Effect::ShowToast {
                text: "Nothing saved yet (press s)".into(),
                level: ToastLevel::Info,
                seconds: 2,
            }),
        },
    }
    effects
}
