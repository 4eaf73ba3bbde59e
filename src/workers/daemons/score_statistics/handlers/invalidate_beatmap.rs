use crate::common::error::ServiceResult;
use crate::usecases::beatmaps::BeatmapLookup;
use redis::Msg;
use tracing::info;

pub async fn handle(beatmaps: &BeatmapLookup, msg: Msg) -> ServiceResult<()> {
    let beatmap_id: u32 = msg.get_payload()?;
    info!(beatmap_id, "Handling beatmap invalidation event");
    beatmaps.invalidate(beatmap_id);
    Ok(())
}
