use crate::entities::scores::ProcessHistoryRow;
use sqlx::MySqlExecutor;

const TABLE_NAME: &str = "score_process_history";

pub async fn fetch_one<'e, E: MySqlExecutor<'e>>(
    executor: E,
    score_id: u64,
) -> sqlx::Result<Option<ProcessHistoryRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT score_id, processed_version, processed_at FROM ",
        TABLE_NAME,
        " WHERE score_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(score_id)
        .fetch_optional(executor)
        .await
}

pub async fn upsert<'e, E: MySqlExecutor<'e>>(
    executor: E,
    score_id: u64,
    version: u32,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        r#" (score_id, processed_version, processed_at) VALUES (?, ?, NOW())
        ON DUPLICATE KEY UPDATE processed_version = VALUES(processed_version),
        processed_at = VALUES(processed_at)"#
    );
    sqlx::query(QUERY)
        .bind(score_id)
        .bind(version)
        .execute(executor)
        .await?;
    Ok(())
}

/// Scores that were never processed, or were processed by an older pipeline version.
pub async fn fetch_outdated_score_ids<'e, E: MySqlExecutor<'e>>(
    executor: E,
    version: u32,
    after_score_id: u64,
    limit: u32,
) -> sqlx::Result<Vec<u64>> {
    const QUERY: &str = const_str::concat!(
        r#"SELECT s.id FROM scores s
        LEFT JOIN "#,
        TABLE_NAME,
        r#" h ON h.score_id = s.id
        WHERE s.id > ? AND (h.score_id IS NULL OR h.processed_version < ?)
        ORDER BY s.id ASC
        LIMIT ?"#
    );
    sqlx::query_scalar(QUERY)
        .bind(after_score_id)
        .bind(version)
        .bind(limit)
        .fetch_all(executor)
        .await
}
