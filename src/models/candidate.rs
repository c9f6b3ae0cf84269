//! Candidate data models.
//!
//! `RawCandidate` is what the host-page candidate source hands us; `Candidate`
//! is the fully-populated record that flows through filtering, risk tagging
//! and ranking. Every stage builds a new `Candidate` value instead of
//! patching the previous one.

use serde::{Deserialize, Serialize};

/// Upper bound on candidates accepted from the source per update.
pub const MAX_CANDIDATES: usize = 200;

const MIN_PRIORITY: u8 = 5;
const MAX_PRIORITY: u8 = 10;

/// Opaque reference to a host-page element, stable for the element's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Button,
    Link,
    Input,
    Select,
    TextArea,
    MenuItem,
    Tab,
    #[default]
    Other,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Link => "link",
            ElementKind::Input => "input",
            ElementKind::Select => "select",
            ElementKind::TextArea => "textarea",
            ElementKind::MenuItem => "menuitem",
            ElementKind::Tab => "tab",
            ElementKind::Other => "other",
        }
    }

    /// Controls that receive focus instead of a synthesized activation.
    pub fn is_text_entry(&self) -> bool {
        matches!(
            self,
            ElementKind::Input | ElementKind::TextArea | ElementKind::Select
        )
    }

    /// Priority used when the candidate source does not supply one.
    pub fn default_priority(&self, input_type: Option<&str>) -> u8 {
        match self {
            ElementKind::Button => 10,
            ElementKind::Input if is_submit_type(input_type) => 10,
            ElementKind::Link => 9,
            ElementKind::MenuItem | ElementKind::Tab => 8,
            ElementKind::Input | ElementKind::Select => 7,
            ElementKind::TextArea | ElementKind::Other => 5,
        }
    }
}

pub(crate) fn is_submit_type(input_type: Option<&str>) -> bool {
    input_type
        .map(|value| value.eq_ignore_ascii_case("submit"))
        .unwrap_or(false)
}

/// Enclosing form of a control, as far as the source could resolve it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Candidate as delivered by the candidate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub handle: Handle,
    pub rect: Rect,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub form: Option<FormContext>,
}

impl RawCandidate {
    pub fn new(handle: u64, rect: Rect, kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            handle: Handle(handle),
            rect,
            text: text.into(),
            priority: None,
            kind,
            aria_label: None,
            title: None,
            value: None,
            input_type: None,
            form: None,
        }
    }
}

/// A candidate carrying geometry, risk and score annotations.
///
/// Fields not yet computed by the pipeline hold neutral defaults
/// (`distance = 0`, `alignment = 0`, `is_risky = false`, `score = 0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub handle: Handle,
    pub rect: Rect,
    pub center: Point,
    pub area: f64,
    pub priority: u8,
    pub text: String,
    pub kind: ElementKind,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub value: Option<String>,
    pub input_type: Option<String>,
    pub form: Option<FormContext>,
    pub distance: f64,
    pub alignment: f64,
    pub aheadness: f64,
    pub is_risky: bool,
    pub score: f64,
}

impl Candidate {
    pub fn from_raw(raw: RawCandidate) -> Self {
        let priority = raw
            .priority
            .unwrap_or_else(|| raw.kind.default_priority(raw.input_type.as_deref()))
            .clamp(MIN_PRIORITY, MAX_PRIORITY);

        Self {
            handle: raw.handle,
            center: raw.rect.center(),
            area: raw.rect.area(),
            rect: raw.rect,
            priority,
            text: raw.text.trim().to_string(),
            kind: raw.kind,
            aria_label: raw.aria_label,
            title: raw.title,
            value: raw.value,
            input_type: raw.input_type,
            form: raw.form,
            distance: 0.0,
            alignment: 0.0,
            aheadness: 0.0,
            is_risky: false,
            score: 0.0,
        }
    }

    pub fn with_geometry(self, distance: f64, alignment: f64) -> Self {
        Self {
            distance,
            alignment,
            aheadness: alignment * distance,
            ..self
        }
    }

    pub fn with_risk(self, is_risky: bool) -> Self {
        Self { is_risky, ..self }
    }

    pub fn with_score(self, score: f64) -> Self {
        Self { score, ..self }
    }

    /// Text shown to the user and recorded in metrics: visible text, falling
    /// back to the accessible label.
    pub fn display_text(&self) -> &str {
        if !self.text.is_empty() {
            return &self.text;
        }
        self.aria_label.as_deref().unwrap_or("")
    }
}

/// Convert a source snapshot into candidates: drops zero-area rects and
/// caps the list at [`MAX_CANDIDATES`].
pub fn intake_candidates(raw: Vec<RawCandidate>) -> Vec<Candidate> {
    raw.into_iter()
        .filter(|candidate| candidate.rect.width > 0.0 && candidate.rect.height > 0.0)
        .take(MAX_CANDIDATES)
        .map(Candidate::from_raw)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_computes_center_and_area() {
        let raw = RawCandidate::new(1, Rect::new(10.0, 20.0, 100.0, 40.0), ElementKind::Button, " Save ");
        let candidate = Candidate::from_raw(raw);

        assert_eq!(candidate.center, Point::new(60.0, 40.0));
        assert_eq!(candidate.area, 4000.0);
        assert_eq!(candidate.text, "Save");
        assert_eq!(candidate.priority, 10);
    }

    #[test]
    fn test_default_priority_by_kind() {
        assert_eq!(ElementKind::Link.default_priority(None), 9);
        assert_eq!(ElementKind::Input.default_priority(Some("submit")), 10);
        assert_eq!(ElementKind::Input.default_priority(Some("text")), 7);
        assert_eq!(ElementKind::Tab.default_priority(None), 8);
        assert_eq!(ElementKind::Other.default_priority(None), 5);
    }

    #[test]
    fn test_source_priority_is_clamped() {
        let mut raw = RawCandidate::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), ElementKind::Other, "x");
        raw.priority = Some(42);
        assert_eq!(Candidate::from_raw(raw.clone()).priority, 10);

        raw.priority = Some(1);
        assert_eq!(Candidate::from_raw(raw).priority, 5);
    }

    #[test]
    fn test_intake_drops_empty_rects_and_caps() {
        let mut raw: Vec<RawCandidate> = (0..250)
            .map(|i| RawCandidate::new(i, Rect::new(0.0, 0.0, 10.0, 10.0), ElementKind::Link, "a"))
            .collect();
        raw.insert(0, RawCandidate::new(999, Rect::new(0.0, 0.0, 0.0, 10.0), ElementKind::Link, "hidden"));

        let candidates = intake_candidates(raw);
        assert_eq!(candidates.len(), MAX_CANDIDATES);
        assert!(candidates.iter().all(|c| c.handle != Handle(999)));
    }

    #[test]
    fn test_with_geometry_sets_aheadness() {
        let raw = RawCandidate::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), ElementKind::Link, "a");
        let candidate = Candidate::from_raw(raw).with_geometry(200.0, 0.5);
        assert_eq!(candidate.aheadness, 100.0);
    }

    #[test]
    fn test_display_text_falls_back_to_label() {
        let mut raw = RawCandidate::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), ElementKind::Button, "");
        raw.aria_label = Some("Close dialog".into());
        assert_eq!(Candidate::from_raw(raw).display_text(), "Close dialog");
    }
}
