use crate::entities::stats::{DailyChallengeStatsRow, UserStatsRow, UserStatsVariantRow};
use crate::models::rulesets::Ruleset;
use crate::models::stats::{ManiaVariant, UserStats, UserStatsVariant};
use sqlx::{MySqlConnection, MySqlExecutor};

const READ_FIELDS: &str = r#"
user_id, playcount, count300, count100, count50, countMiss, total_score,
ranked_score, level, accuracy_new, rank_score, xh_rank_count, x_rank_count,
sh_rank_count, s_rank_count, a_rank_count, total_seconds_played, last_played"#;

const VARIANT_READ_FIELDS: &str = r#"
user_id, ranked_score, xh_rank_count, x_rank_count, sh_rank_count,
s_rank_count, a_rank_count"#;

fn variant_table(variant: ManiaVariant) -> String {
    format!("osu_user_stats_mania_{}", variant.as_str())
}

/// Locks the user's row for the ruleset, creating it with default values when absent.
pub async fn fetch_for_update(
    conn: &mut MySqlConnection,
    user_id: u32,
    ruleset: Ruleset,
) -> sqlx::Result<UserStatsRow> {
    let table = ruleset.stats_table();
    let select = format!("SELECT {READ_FIELDS} FROM {table} WHERE user_id = ? FOR UPDATE");

    let row: Option<UserStatsRow> = sqlx::query_as(&select)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(row) = row {
        return Ok(row);
    }

    let insert = format!("INSERT IGNORE INTO {table} (user_id, level) VALUES (?, 1)");
    sqlx::query(&insert)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query_as(&select)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn update<'e, E: MySqlExecutor<'e>>(executor: E, stats: &UserStats) -> sqlx::Result<()> {
    let query = format!(
        r#"UPDATE {} SET
        playcount = ?, count300 = ?, count100 = ?, count50 = ?, countMiss = ?,
        total_score = ?, ranked_score = ?, level = ?, accuracy_new = ?, rank_score = ?,
        xh_rank_count = ?, x_rank_count = ?, sh_rank_count = ?, s_rank_count = ?,
        a_rank_count = ?, total_seconds_played = ?, last_played = ?
        WHERE user_id = ?"#,
        stats.ruleset.stats_table()
    );
    sqlx::query(&query)
        .bind(stats.playcount)
        .bind(stats.count_300)
        .bind(stats.count_100)
        .bind(stats.count_50)
        .bind(stats.count_miss)
        .bind(stats.total_score)
        .bind(stats.ranked_score)
        .bind(stats.level as f32)
        .bind(stats.accuracy as f32)
        .bind(stats.pp as f32)
        .bind(stats.rank_counts.xh)
        .bind(stats.rank_counts.x)
        .bind(stats.rank_counts.sh)
        .bind(stats.rank_counts.s)
        .bind(stats.rank_counts.a)
        .bind(stats.total_seconds_played)
        .bind(stats.last_played)
        .bind(stats.user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn fetch_variant_for_update(
    conn: &mut MySqlConnection,
    user_id: u32,
    variant: ManiaVariant,
) -> sqlx::Result<UserStatsVariantRow> {
    let table = variant_table(variant);
    let select = format!("SELECT {VARIANT_READ_FIELDS} FROM {table} WHERE user_id = ? FOR UPDATE");

    let row: Option<UserStatsVariantRow> = sqlx::query_as(&select)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(row) = row {
        return Ok(row);
    }

    let insert = format!("INSERT IGNORE INTO {table} (user_id) VALUES (?)");
    sqlx::query(&insert)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query_as(&select)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn update_variant<'e, E: MySqlExecutor<'e>>(
    executor: E,
    stats: &UserStatsVariant,
) -> sqlx::Result<()> {
    let query = format!(
        r#"UPDATE {} SET
        ranked_score = ?, xh_rank_count = ?, x_rank_count = ?, sh_rank_count = ?,
        s_rank_count = ?, a_rank_count = ?
        WHERE user_id = ?"#,
        variant_table(stats.variant)
    );
    sqlx::query(&query)
        .bind(stats.ranked_score)
        .bind(stats.rank_counts.xh)
        .bind(stats.rank_counts.x)
        .bind(stats.rank_counts.sh)
        .bind(stats.rank_counts.s)
        .bind(stats.rank_counts.a)
        .bind(stats.user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// One based rank of `pp` among users of the ruleset, and the number of ranked users
/// counting the given user.
pub async fn fetch_performance_rank(
    conn: &mut MySqlConnection,
    user_id: u32,
    ruleset: Ruleset,
    pp: f64,
) -> sqlx::Result<(u64, u64)> {
    let table = ruleset.stats_table();
    let above_query =
        format!("SELECT COUNT(*) FROM {table} WHERE rank_score > ? AND user_id != ?");
    let others_query =
        format!("SELECT COUNT(*) FROM {table} WHERE rank_score > 0 AND user_id != ?");

    let above: i64 = sqlx::query_scalar(&above_query)
        .bind(pp as f32)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    let others: i64 = sqlx::query_scalar(&others_query)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok((above as u64 + 1, others as u64 + 1))
}

pub async fn fetch_daily_challenge<'e, E: MySqlExecutor<'e>>(
    executor: E,
    user_id: u32,
) -> sqlx::Result<Option<DailyChallengeStatsRow>> {
    const QUERY: &str = r#"
        SELECT user_id, daily_streak_current, daily_streak_best
        FROM daily_challenge_user_stats WHERE user_id = ?
    "#;
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}
