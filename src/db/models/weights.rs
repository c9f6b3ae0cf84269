use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::WeightVector;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredWeights {
    pub weights: WeightVector,
    pub feedback_events: u64,
    pub updated_at: DateTime<Utc>,
}
