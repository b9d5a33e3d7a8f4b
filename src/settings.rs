use serde::{Deserialize, Serialize};

pub const MIN_STUDY_MIN: u32 = 1;
pub const MIN_BREAK_MIN: u32 = 1;
pub const MIN_GOAL_HRS: f64 = 0.1;

// Longest text a draft field accepts; keeps parsed minutes well inside u32.
const MAX_FIELD_LEN: usize = 6;

/// Committed timer settings, persisted under the `settings` key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub study_min: u32,
    pub break_min: u32,
    pub goal_hrs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            study_min: 50,
            break_min: 10,
            goal_hrs: 10.0,
        }
    }
}

impl Settings {
    /// Coerce every field to its minimum valid value.
    pub fn clamped(self) -> Self {
        let goal_hrs = if self.goal_hrs.is_finite() {
            self.goal_hrs.max(MIN_GOAL_HRS)
        } else {
            MIN_GOAL_HRS
        };
        Self {
            study_min: self.study_min.max(MIN_STUDY_MIN),
            break_min: self.break_min.max(MIN_BREAK_MIN),
            goal_hrs,
        }
    }

    pub fn study_secs(&self) -> u64 {
        u64::from(self.study_min) * 60
    }

    pub fn break_secs(&self) -> u64 {
        u64::from(self.break_min) * 60
    }

    pub fn goal_secs(&self) -> f64 {
        self.goal_hrs * 3600.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SettingsField {
    #[strum(serialize = "Study Duration (min)")]
    Study,
    #[strum(serialize = "Break Duration (min)")]
    Break,
    #[strum(serialize = "Daily Goal (hours)")]
    Goal,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [Self::Study, Self::Break, Self::Goal];

    pub fn next(self) -> Self {
        match self {
            Self::Study => Self::Break,
            Self::Break => Self::Goal,
            Self::Goal => Self::Study,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Study => Self::Goal,
            Self::Break => Self::Study,
            Self::Goal => Self::Break,
        }
    }
}

/// Uncommitted edits, kept as the text the user is typing.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    study: String,
    brk: String,
    goal: String,
}

impl From<&Settings> for SettingsDraft {
    fn from(s: &Settings) -> Self {
        Self {
            study: s.study_min.to_string(),
            brk: s.break_min.to_string(),
            goal: s.goal_hrs.to_string(),
        }
    }
}

impl SettingsDraft {
    pub fn text(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::Study => &self.study,
            SettingsField::Break => &self.brk,
            SettingsField::Goal => &self.goal,
        }
    }

    fn text_mut(&mut self, field: SettingsField) -> &mut String {
        match field {
            SettingsField::Study => &mut self.study,
            SettingsField::Break => &mut self.brk,
            SettingsField::Goal => &mut self.goal,
        }
    }

    /// Digits go into any field, a single '.' only into the goal.
    pub fn push(&mut self, field: SettingsField, c: char) {
        let text = self.text_mut(field);
        if text.chars().count() >= MAX_FIELD_LEN {
            return;
        }
        let accepted = c.is_ascii_digit()
            || (c == '.' && field == SettingsField::Goal && !text.contains('.'));
        if accepted {
            text.push(c);
        }
    }

    pub fn backspace(&mut self, field: SettingsField) {
        self.text_mut(field).pop();
    }

    /// Parse and clamp. Unparsable text counts as zero before clamping.
    pub fn to_settings(&self) -> Settings {
        Settings {
            study_min: parse_minutes(&self.study),
            break_min: parse_minutes(&self.brk),
            goal_hrs: self.goal.trim().parse::<f64>().unwrap_or(0.0),
        }
        .clamped()
    }
}

fn parse_minutes(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Holds the draft while the settings dialog is open.
#[derive(Debug)]
pub struct SettingsManager {
    draft: Option<SettingsDraft>,
    field: SettingsField,
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self {
            draft: None,
            field: SettingsField::Study,
        }
    }
}

impl SettingsManager {
    pub fn open(&mut self, current: &Settings) {
        self.draft = Some(SettingsDraft::from(current));
        self.field = SettingsField::Study;
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&SettingsDraft> {
        self.draft.as_ref()
    }

    pub fn field(&self) -> SettingsField {
        self.field
    }

    pub fn select_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn select_prev(&mut self) {
        self.field = self.field.prev();
    }

    pub fn type_char(&mut self, c: char) {
        let field = self.field;
        if let Some(draft) = self.draft.as_mut() {
            draft.push(field, c);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.field;
        if let Some(draft) = self.draft.as_mut() {
            draft.backspace(field);
        }
    }

    /// Close the dialog and hand back the clamped draft, if one was open.
    pub fn apply_and_close(&mut self) -> Option<Settings> {
        self.draft.take().map(|d| d.to_settings())
    }

    /// Close the dialog, dropping the draft.
    pub fn discard(&mut self) {
        self.draft = None;
    }
}
