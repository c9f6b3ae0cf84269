use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    Keyboard,
    Voice,
    Badge,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Keyboard => "keyboard",
            SelectionMethod::Voice => "voice",
            SelectionMethod::Badge => "badge",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "keyboard" => Some(SelectionMethod::Keyboard),
            "voice" => Some(SelectionMethod::Voice),
            "badge" => Some(SelectionMethod::Badge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub timestamp: DateTime<Utc>,
    pub element: String,
    /// At most 50 characters of the candidate text.
    pub text: String,
    pub method: SelectionMethod,
    pub time_to_select_ms: u64,
    pub is_risky: bool,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub started_at: DateTime<Utc>,
    pub selections: Vec<SelectionRecord>,
    pub misclicks: u64,
    pub voice_commands: u64,
    pub keyboard_commands: u64,
    pub badge_clicks: u64,
    pub total_pointer_distance: f64,
    pub session_duration_ms: u64,
}

impl SessionMetrics {
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            selections: Vec::new(),
            misclicks: 0,
            voice_commands: 0,
            keyboard_commands: 0,
            badge_clicks: 0,
            total_pointer_distance: 0.0,
            session_duration_ms: 0,
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::empty(Utc::now())
    }
}
