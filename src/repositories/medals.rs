use crate::entities::medals::MedalRow;
use crate::models::medals::MedalGrant;
use sqlx::MySqlExecutor;

const TABLE_NAME: &str = "osu_achievements";
const READ_FIELDS: &str = "achievement_id, slug, name, `grouping`, ordering, mode, enabled";

pub async fn fetch_all<'e, E: MySqlExecutor<'e>>(executor: E) -> sqlx::Result<Vec<MedalRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " ORDER BY `grouping`, ordering, achievement_id"
    );
    sqlx::query_as(QUERY).fetch_all(executor).await
}

pub async fn fetch_granted_ids<'e, E: MySqlExecutor<'e>>(
    executor: E,
    user_id: u32,
) -> sqlx::Result<Vec<u32>> {
    const QUERY: &str = "SELECT achievement_id FROM osu_user_achievements WHERE user_id = ?";
    sqlx::query_scalar(QUERY)
        .bind(user_id)
        .fetch_all(executor)
        .await
}

/// Returns whether a row was written. An existing grant is left untouched.
pub async fn insert_grant<'e, E: MySqlExecutor<'e>>(
    executor: E,
    grant: &MedalGrant,
) -> sqlx::Result<bool> {
    const QUERY: &str = r#"
        INSERT IGNORE INTO osu_user_achievements (user_id, achievement_id, beatmap_id, date)
        VALUES (?, ?, ?, ?)
    "#;
    let result = sqlx::query(QUERY)
        .bind(grant.user_id)
        .bind(grant.achievement_id)
        .bind(grant.beatmap_id)
        .bind(grant.achieved_at)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
