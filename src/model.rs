use serde::{Deserialize, Serialize};

/// Input kind declared by a parameter's `type` tag.
///
/// Unrecognized tags are kept verbatim in `Other` so a config carrying them
/// still loads; such rows render without a control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamKind {
    String,
    Number,
    Select,
    Other(String),
}

impl From<String> for ParamKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "string" => ParamKind::String,
            "number" => ParamKind::Number,
            "select" => ParamKind::Select,
            _ => ParamKind::Other(tag),
        }
    }
}

impl From<ParamKind> for String {
    fn from(kind: ParamKind) -> Self {
        match kind {
            ParamKind::String => "string".to_string(),
            ParamKind::Number => "number".to_string(),
            ParamKind::Select => "select".to_string(),
            ParamKind::Other(tag) => tag,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    // Only meaningful for select params
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamValue {
    pub param_id: i64,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub param_values: Vec<ParamValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "default_title")]
    pub title: String,
    pub params: Vec<Param>,
    #[serde(default)]
    pub model: Model,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            params: vec![],
            model: Model::default(),
        }
    }
}

fn default_title() -> String {
    "Parameter editor".to_string()
}

impl EditorConfig {
    /// Built-in config used when no YAML file is found.
    pub fn demo() -> Self {
        let param = |id: i64, name: &str, kind: ParamKind, options: &[&str]| Param {
            id,
            name: name.to_string(),
            kind,
            options: options.iter().map(|s| s.to_string()).collect(),
        };
        let value = |param_id: i64, value: &str| ParamValue {
            param_id,
            value: value.to_string(),
        };
        Self {
            title: default_title(),
            params: vec![
                param(1, "Purpose", ParamKind::String, &[]),
                param(2, "Length", ParamKind::String, &[]),
                param(3, "Price", ParamKind::Number, &[]),
                param(4, "Color", ParamKind::Select, &["Red", "Green", "Blue"]),
            ],
            model: Model {
                param_values: vec![
                    value(1, "casual"),
                    value(2, "maxi"),
                    value(3, "1000"),
                    value(4, "Red"),
                ],
            },
        }
    }

    /// Non-fatal oddities worth surfacing in the debug log.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for p in &self.params {
            if p.kind == ParamKind::Select && p.options.is_empty() {
                out.push(format!("select param {} '{}' has no options", p.id, p.name));
            }
            if let ParamKind::Other(tag) = &p.kind {
                out.push(format!("param {} '{}' has unknown type '{tag}'", p.id, p.name));
            }
        }
        for pv in &self.model.param_values {
            if !self.params.iter().any(|p| p.id == pv.param_id) {
                out.push(format!("value for paramId {} has no matching param", pv.param_id));
            }
        }
        out
    }
}

pub(crate) fn validate_config(cfg: &EditorConfig) -> Result<(), String> {
    use std::collections::HashSet;
    let mut ids = HashSet::new();
    for (i, p) in cfg.params.iter().enumerate() {
        if !ids.insert(p.id) {
            return Err(format!("duplicate param id: {} at index {}", p.id, i));
        }
    }
    let mut seen = HashSet::new();
    for (i, pv) in cfg.model.param_values.iter().enumerate() {
        if !seen.insert(pv.param_id) {
            return Err(format!(
                "duplicate paramId in model: {} at index {}",
                pv.param_id, i
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_kind_parses_known_and_unknown_tags() {
        let params: Vec<Param> = serde_json::from_value(json!([
            {"id": 1, "name": "A", "type": "string"},
            {"id": 2, "name": "B", "type": "number"},
            {"id": 3, "name": "C", "type": "select", "options": ["x", "y"]},
            {"id": 4, "name": "D", "type": "date"}
        ]))
        .unwrap();
        assert_eq!(params[0].kind, ParamKind::String);
        assert_eq!(params[1].kind, ParamKind::Number);
        assert_eq!(params[2].kind, ParamKind::Select);
        assert_eq!(params[2].options, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(params[3].kind, ParamKind::Other("date".into()));
        assert!(params[3].options.is_empty());
    }

    #[test]
    fn model_uses_camel_case_wire_names() {
        let m = Model {
            param_values: vec![ParamValue {
                param_id: 7,
                value: "v".into(),
            }],
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v, json!({"paramValues": [{"paramId": 7, "value": "v"}]}));
    }

    #[test]
    fn yaml_config_fills_defaults() {
        let src = "params:\n  - id: 1\n    name: X\n    type: string\n";
        let cfg: EditorConfig = serde_yaml::from_str(src).unwrap();
        assert_eq!(cfg.title, "Parameter editor");
        assert_eq!(cfg.params.len(), 1);
        assert!(cfg.model.param_values.is_empty());
    }

    #[test]
    fn unknown_kind_serializes_back_to_its_tag() {
        let p = Param {
            id: 9,
            name: "Z".into(),
            kind: ParamKind::Other("color-picker".into()),
            options: vec![],
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, json!({"id": 9, "name": "Z", "type": "color-picker"}));
    }

    #[test]
    fn validate_detects_duplicate_param_ids() {
        let mut cfg = EditorConfig::demo();
        cfg.params[1].id = 1;
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.contains("duplicate param id"));
    }

    #[test]
    fn validate_detects_duplicate_model_entries() {
        let mut cfg = EditorConfig::demo();
        cfg.model.param_values[2].param_id = 1;
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.contains("duplicate paramId"));
    }

    #[test]
    fn demo_config_is_valid_and_quiet() {
        let cfg = EditorConfig::demo();
        assert!(validate_config(&cfg).is_ok());
        assert!(cfg.warnings().is_empty());
    }

    #[test]
    fn warnings_report_orphan_values_and_empty_selects() {
        let cfg = EditorConfig {
            params: vec![Param {
                id: 1,
                name: "S".into(),
                kind: ParamKind::Select,
                options: vec![],
            }],
            model: Model {
                param_values: vec![ParamValue {
                    param_id: 5,
                    value: "x".into(),
                }],
            },
            ..Default::default()
        };
        let w = cfg.warnings();
        assert_eq!(w.len(), 2);
        assert!(w[0].contains("no options"));
        assert!(w[1].contains("paramId 5"));
    }
}
