use crate::entities::scores::{PerformanceSampleRow, ScoreRow};
use crate::models::beatmaps::BeatmapPack;
use crate::models::rulesets::Ruleset;
use crate::models::scores::Score;
use sqlx::{MySqlConnection, MySqlExecutor};

const TABLE_NAME: &str = "scores";
const READ_FIELDS: &str = r#"
id, user_id, ruleset_id, beatmap_id, preserve, ranked, `rank`, passed,
accuracy, max_combo, total_score, data, pp, legacy_score_id,
legacy_total_score, started_at, ended_at"#;

/// Acronyms of difficulty reduction mods, as a JSON array for `JSON_OVERLAPS`.
const DIFFICULTY_REDUCTION_ACRONYMS: &str = r#"["EZ","NF","HT","DC"]"#;

pub async fn fetch_one<'e, E: MySqlExecutor<'e>>(
    executor: E,
    score_id: u64,
) -> sqlx::Result<Option<ScoreRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(score_id)
        .fetch_optional(executor)
        .await
}

/// The score ranked `offset` (zero based) among the user's ranked scores in the same
/// (beatmap, ruleset) group. Only scores already counted in the aggregate (preserved and
/// carrying a processing marker) compete, plus the reference score itself.
pub async fn fetch_best<'e, E: MySqlExecutor<'e>>(
    executor: E,
    score: &Score,
    offset: u32,
) -> sqlx::Result<Option<ScoreRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        r#" s WHERE s.user_id = ? AND s.beatmap_id = ? AND s.ruleset_id = ?
        AND s.ranked = 1
        AND (s.id = ? OR (s.preserve = 1 AND EXISTS (
            SELECT 1 FROM score_process_history h WHERE h.score_id = s.id
        )))
        ORDER BY s.total_score DESC, s.id DESC
        LIMIT 1 OFFSET ?"#
    );
    sqlx::query_as(QUERY)
        .bind(score.user_id)
        .bind(score.beatmap_id)
        .bind(score.ruleset as u8)
        .bind(score.score_id)
        .bind(offset)
        .fetch_optional(executor)
        .await
}

pub async fn update_performance<'e, E: MySqlExecutor<'e>>(
    executor: E,
    score_id: u64,
    pp: Option<f64>,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!("UPDATE ", TABLE_NAME, " SET pp = ? WHERE id = ?");
    sqlx::query(QUERY)
        .bind(pp.map(|pp| pp as f32))
        .bind(score_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Best pp per beatmap, highest first.
pub async fn fetch_performance_samples<'e, E: MySqlExecutor<'e>>(
    executor: E,
    user_id: u32,
    ruleset: Ruleset,
    include_score_id: Option<u64>,
    exclude_score_id: Option<u64>,
    limit: u32,
) -> sqlx::Result<Vec<PerformanceSampleRow>> {
    const QUERY: &str = r#"
        SELECT beatmap_id, pp, accuracy FROM (
            SELECT s.beatmap_id, s.pp, s.accuracy,
            ROW_NUMBER() OVER (PARTITION BY s.beatmap_id ORDER BY s.pp DESC, s.id DESC) AS n
            FROM scores s
            INNER JOIN osu_beatmaps b ON b.beatmap_id = s.beatmap_id
            WHERE s.user_id = ? AND s.ruleset_id = ?
            AND s.ranked = 1 AND s.pp IS NOT NULL
            AND (s.preserve = 1 OR s.id = ?) AND s.id != ?
            AND b.approved IN (1, 2)
        ) best
        WHERE n = 1
        ORDER BY pp DESC
        LIMIT ?
    "#;
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(ruleset as u8)
        .bind(include_score_id.unwrap_or(0))
        .bind(exclude_score_id.unwrap_or(0))
        .bind(limit)
        .fetch_all(executor)
        .await
}

/// Number of distinct beatmapsets of the pack with at least one passed score by the user.
pub async fn count_completed_pack_sets(
    conn: &mut MySqlConnection,
    user_id: u32,
    pack: &BeatmapPack,
) -> sqlx::Result<i64> {
    let mut query = String::from(
        r#"
            SELECT COUNT(DISTINCT b.beatmapset_id) FROM scores s
            INNER JOIN osu_beatmaps b ON b.beatmap_id = s.beatmap_id
            INNER JOIN osu_beatmappacks_items i ON i.beatmapset_id = b.beatmapset_id
            WHERE i.pack_id = ? AND s.user_id = ? AND s.passed = 1
        "#,
    );
    if pack.ruleset.is_some() {
        query.push_str(" AND s.ruleset_id = ?");
    }
    if pack.no_diff_reduction {
        query.push_str(
            " AND NOT JSON_OVERLAPS(JSON_EXTRACT(s.data, '$.mods[*].acronym'), CAST(? AS JSON))",
        );
    }

    let mut count = sqlx::query_scalar(&query).bind(pack.pack_id).bind(user_id);
    if let Some(ruleset) = pack.ruleset {
        count = count.bind(ruleset as u8);
    }
    if pack.no_diff_reduction {
        count = count.bind(DIFFICULTY_REDUCTION_ACRONYMS);
    }
    count.fetch_one(&mut *conn).await
}
