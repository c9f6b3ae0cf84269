use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_i64, to_u64},
    models::StoredSession,
};
use crate::metrics::{SelectionMethod, SelectionRecord, SessionMetrics};

/// Older sessions are pruned on insert.
pub const MAX_STORED_SESSIONS: usize = 100;

fn row_to_session(row: &Row) -> Result<StoredSession> {
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;
    let duration_ms: i64 = row.get("duration_ms")?;
    let misclicks: i64 = row.get("misclicks")?;
    let voice_commands: i64 = row.get("voice_commands")?;
    let keyboard_commands: i64 = row.get("keyboard_commands")?;
    let badge_clicks: i64 = row.get("badge_clicks")?;

    Ok(StoredSession {
        id: row.get("id")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
        metrics: SessionMetrics {
            started_at: parse_datetime(&started_at, "started_at")?,
            selections: Vec::new(),
            misclicks: to_u64(misclicks, "misclicks")?,
            voice_commands: to_u64(voice_commands, "voice_commands")?,
            keyboard_commands: to_u64(keyboard_commands, "keyboard_commands")?,
            badge_clicks: to_u64(badge_clicks, "badge_clicks")?,
            total_pointer_distance: row.get("total_pointer_distance")?,
            session_duration_ms: to_u64(duration_ms, "duration_ms")?,
        },
    })
}

fn row_to_selection(row: &Row) -> Result<SelectionRecord> {
    let timestamp: String = row.get("timestamp")?;
    let method: String = row.get("method")?;
    let time_to_select_ms: i64 = row.get("time_to_select_ms")?;

    Ok(SelectionRecord {
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        element: row.get("element")?,
        text: row.get("text")?,
        method: SelectionMethod::parse(&method)
            .with_context(|| format!("unknown selection method {method}"))?,
        time_to_select_ms: to_u64(time_to_select_ms, "time_to_select_ms")?,
        is_risky: row.get("is_risky")?,
        succeeded: row.get("succeeded")?,
    })
}

fn load_selections(conn: &Connection, session_id: &str) -> Result<Vec<SelectionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, element, text, method, time_to_select_ms, is_risky, succeeded
         FROM selections
         WHERE session_id = ?1
         ORDER BY id ASC",
    )?;

    let mut rows = stmt.query(params![session_id])?;
    let mut selections = Vec::new();
    while let Some(row) = rows.next()? {
        selections.push(row_to_selection(row)?);
    }
    Ok(selections)
}

impl Database {
    /// Store a finished session with its selections, then keep only the
    /// newest [`MAX_STORED_SESSIONS`].
    pub async fn insert_session_metrics(
        &self,
        session_id: &str,
        metrics: &SessionMetrics,
        ended_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        let record = metrics.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO sessions (id, started_at, ended_at, duration_ms, misclicks, voice_commands, keyboard_commands, badge_clicks, total_pointer_distance)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session_id,
                    record.started_at.to_rfc3339(),
                    ended_at.to_rfc3339(),
                    to_i64(record.session_duration_ms)?,
                    to_i64(record.misclicks)?,
                    to_i64(record.voice_commands)?,
                    to_i64(record.keyboard_commands)?,
                    to_i64(record.badge_clicks)?,
                    record.total_pointer_distance,
                ],
            )
            .context("failed to insert session")?;

            for selection in &record.selections {
                tx.execute(
                    "INSERT INTO selections (session_id, timestamp, element, text, method, time_to_select_ms, is_risky, succeeded)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        session_id,
                        selection.timestamp.to_rfc3339(),
                        selection.element,
                        selection.text,
                        selection.method.as_str(),
                        to_i64(selection.time_to_select_ms)?,
                        selection.is_risky,
                        selection.succeeded,
                    ],
                )
                .context("failed to insert selection")?;
            }

            // selections follow via ON DELETE CASCADE
            tx.execute(
                "DELETE FROM sessions
                 WHERE id NOT IN (
                     SELECT id FROM sessions ORDER BY started_at DESC, rowid DESC LIMIT ?1
                 )",
                params![to_i64(MAX_STORED_SESSIONS as u64)?],
            )
            .context("failed to prune old sessions")?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Newest first, each with its selections.
    pub async fn list_sessions(&self, limit: usize) -> Result<Vec<StoredSession>> {
        let limit = to_i64(limit as u64)?;
        self.execute(move |conn| {
            let mut sessions = {
                let mut stmt = conn.prepare(
                    "SELECT id, started_at, ended_at, duration_ms, misclicks, voice_commands, keyboard_commands, badge_clicks, total_pointer_distance
                     FROM sessions
                     ORDER BY started_at DESC, rowid DESC
                     LIMIT ?1",
                )?;

                let mut rows = stmt.query(params![limit])?;
                let mut sessions = Vec::new();
                while let Some(row) = rows.next()? {
                    sessions.push(row_to_session(row)?);
                }
                sessions
            };

            for session in &mut sessions {
                session.metrics.selections = load_selections(conn, &session.id)?;
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn count_sessions(&self) -> Result<usize> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
            Ok(to_u64(count, "count")? as usize)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::open_temp_db;
    use chrono::Duration;
    use uuid::Uuid;

    fn metrics(started_at: DateTime<Utc>) -> SessionMetrics {
        let mut metrics = SessionMetrics::empty(started_at);
        metrics.misclicks = 2;
        metrics.keyboard_commands = 1;
        metrics.total_pointer_distance = 812.5;
        metrics.session_duration_ms = 60_000;
        metrics.selections.push(SelectionRecord {
            timestamp: started_at,
            element: "button".into(),
            text: "Save".into(),
            method: SelectionMethod::Keyboard,
            time_to_select_ms: 1500,
            is_risky: false,
            succeeded: true,
        });
        metrics
    }

    #[tokio::test]
    async fn test_session_round_trip_with_selections() {
        let db = open_temp_db();
        let started = Utc::now() - Duration::minutes(1);
        let stored = metrics(started);

        db.insert_session_metrics("s1", &stored, Utc::now()).await.unwrap();

        let sessions = db.list_sessions(10).await.unwrap();
        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.id, "s1");
        assert_eq!(session.metrics.misclicks, 2);
        assert_eq!(session.metrics.session_duration_ms, 60_000);
        assert_eq!(session.metrics.selections.len(), 1);
        assert_eq!(session.metrics.selections[0].method, SelectionMethod::Keyboard);
        assert_eq!(session.metrics.selections[0].text, "Save");
    }

    #[tokio::test]
    async fn test_history_is_capped_and_newest_first() {
        let db = open_temp_db();
        let base = Utc::now() - Duration::days(1);

        for i in 0..(MAX_STORED_SESSIONS + 5) {
            let started = base + Duration::seconds(i as i64);
            db.insert_session_metrics(&Uuid::new_v4().to_string(), &metrics(started), started)
                .await
                .unwrap();
        }

        assert_eq!(db.count_sessions().await.unwrap(), MAX_STORED_SESSIONS);

        let newest = db.list_sessions(2).await.unwrap();
        assert_eq!(newest.len(), 2);
        assert!(newest[0].metrics.started_at > newest[1].metrics.started_at);
        let expected_newest = base + Duration::seconds((MAX_STORED_SESSIONS + 4) as i64);
        assert_eq!(newest[0].metrics.started_at, expected_newest);
    }
}
