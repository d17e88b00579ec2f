use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub family_fill: String,
    pub family_border: String,
    pub person_fill: String,
    pub person_border: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub highlight_color: String,
    pub collapse_badge_color: String,
    pub background: String,
}

impl Theme {
    pub fn default_light() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 13.0,
            family_fill: "#ECECFF".to_string(),
            family_border: "#9370DB".to_string(),
            person_fill: "#FFFFDE".to_string(),
            person_border: "#AAAA33".to_string(),
            text_color: "#333333".to_string(),
            muted_text_color: "#777777".to_string(),
            line_color: "#333333".to_string(),
            highlight_color: "#D9480F".to_string(),
            collapse_badge_color: "#5C7CFA".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            family_fill: "#F8FAFF".to_string(),
            family_border: "#C7D2E5".to_string(),
            person_fill: "#FFFFFF".to_string(),
            person_border: "#D7E0F0".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            highlight_color: "#E8590C".to_string(),
            collapse_badge_color: "#4C6EF5".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
