use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_i64, to_u64},
    models::StoredWeights,
};
use crate::models::WeightVector;

fn row_to_weights(row: &Row) -> Result<StoredWeights> {
    let feedback_events: i64 = row.get("feedback_events")?;
    let updated_at: String = row.get("updated_at")?;

    let weights = WeightVector {
        alignment: row.get("alignment")?,
        size: row.get("size")?,
        distance: row.get("distance")?,
        priority: row.get("priority")?,
        risk: row.get("risk")?,
    };

    Ok(StoredWeights {
        weights: weights.sanitized(),
        feedback_events: to_u64(feedback_events, "feedback_events")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn save_weights(&self, weights: WeightVector, feedback_events: u64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO learned_weights (id, alignment, size, distance, priority, risk, feedback_events, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     alignment = excluded.alignment,
                     size = excluded.size,
                     distance = excluded.distance,
                     priority = excluded.priority,
                     risk = excluded.risk,
                     feedback_events = excluded.feedback_events,
                     updated_at = excluded.updated_at",
                params![
                    weights.alignment,
                    weights.size,
                    weights.distance,
                    weights.priority,
                    weights.risk,
                    to_i64(feedback_events)?,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("failed to save learned weights")?;
            Ok(())
        })
        .await
    }

    /// `None` when nothing has been learned yet.
    pub async fn load_weights(&self) -> Result<Option<StoredWeights>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT alignment, size, distance, priority, risk, feedback_events, updated_at
                 FROM learned_weights
                 WHERE id = 1",
            )?;

            let stored = stmt
                .query_row([], |row| Ok(row_to_weights(row)))
                .optional()?
                .transpose()?;
            Ok(stored)
        })
        .await
    }

    pub async fn clear_weights(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM learned_weights", [])
                .context("failed to clear learned weights")?;
            Ok(())
        })
        .await
    }
}
