use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::SessionMetrics;

/// A finished hint session as stored in the `sessions` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub id: String,
    pub ended_at: DateTime<Utc>,
    pub metrics: SessionMetrics,
}
