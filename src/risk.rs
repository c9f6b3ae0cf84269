//! High-consequence action detection.
//!
//! A candidate is risky when any of its user-facing strings mentions a
//! destructive, financial, irreversible, session or subscription action, or
//! when it submits a form whose action or id points at payment, checkout or
//! deletion. Risky candidates require an explicit confirmation before the
//! selection controller executes them.

use crate::models::{candidate::is_submit_type, Candidate, ElementKind};

const RISKY_KEYWORDS: &[&str] = &[
    // destructive
    "delete",
    "remove",
    "erase",
    "clear",
    // financial
    "pay",
    "purchase",
    "buy",
    "checkout",
    "confirm purchase",
    // irreversible
    "submit",
    "send",
    "post",
    // session
    "sign out",
    "sign-out",
    "signout",
    "log out",
    "log-out",
    "logout",
    // subscription
    "uninstall",
    "unsubscribe",
    "cancel subscription",
    "end membership",
];

const RISKY_FORM_MARKERS: &[&str] = &["payment", "checkout", "delete"];

#[derive(Debug, Clone)]
pub struct RiskClassifier {
    enabled: bool,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl RiskClassifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Always false while the classifier is disabled.
    pub fn is_risky(&self, candidate: &Candidate) -> bool {
        if !self.enabled {
            return false;
        }

        let fields = [
            Some(candidate.text.as_str()),
            candidate.aria_label.as_deref(),
            candidate.title.as_deref(),
            candidate.value.as_deref(),
        ];
        if fields.into_iter().flatten().any(mentions_risky_keyword) {
            return true;
        }

        is_submit_control(candidate) && submits_sensitive_form(candidate)
    }

    /// Produce risk-annotated copies of `candidates`.
    pub fn tag(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .map(|candidate| {
                let risky = self.is_risky(&candidate);
                candidate.with_risk(risky)
            })
            .collect()
    }
}

fn mentions_risky_keyword(field: &str) -> bool {
    let lower = field.to_lowercase();
    RISKY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn is_submit_control(candidate: &Candidate) -> bool {
    is_submit_type(candidate.input_type.as_deref())
        || (candidate.kind == ElementKind::Button && candidate.form.is_some())
}

fn submits_sensitive_form(candidate: &Candidate) -> bool {
    let Some(form) = &candidate.form else {
        return false;
    };

    [form.action.as_deref(), form.id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|value| RISKY_FORM_MARKERS.iter().any(|marker| value.contains(marker)))
}
