use crate::entities::beatmaps::{BeatmapPackRow, BeatmapRow};
use sqlx::{MySqlConnection, MySqlExecutor};

const TABLE_NAME: &str = "osu_beatmaps";
const READ_FIELDS: &str = r#"
beatmap_id, beatmapset_id, playmode, approved, total_length, hit_length,
countNormal, countSlider, countSpinner, max_combo, diff_size"#;

pub async fn fetch_by_id<'e, E: MySqlExecutor<'e>>(
    executor: E,
    beatmap_id: u32,
) -> sqlx::Result<Option<BeatmapRow>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE beatmap_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(beatmap_id)
        .fetch_optional(executor)
        .await
}

pub async fn fetch_pack_by_achievement(
    conn: &mut MySqlConnection,
    achievement_id: u32,
) -> sqlx::Result<Option<(BeatmapPackRow, Vec<u32>)>> {
    const PACK_QUERY: &str = r#"
        SELECT pack_id, tag, playmode, no_diff_reduction, achievement_id
        FROM osu_beatmappacks WHERE achievement_id = ?
    "#;
    const ITEMS_QUERY: &str =
        "SELECT beatmapset_id FROM osu_beatmappacks_items WHERE pack_id = ? ORDER BY beatmapset_id";

    let pack: Option<BeatmapPackRow> = sqlx::query_as(PACK_QUERY)
        .bind(achievement_id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(pack) = pack else {
        return Ok(None);
    };

    let beatmapset_ids = sqlx::query_scalar(ITEMS_QUERY)
        .bind(pack.pack_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(Some((pack, beatmapset_ids)))
}
