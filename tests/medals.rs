mod common;

use common::{Harness, USER_ID, beatmap, medal, score};
use score_statistics_processor::models::beatmaps::{BeatmapPack, RankedStatus};
use score_statistics_processor::models::mods::ScoreMod;
use score_statistics_processor::models::notifications::NotificationEvent;
use score_statistics_processor::models::scores::{Score, ScoreRank};

const PACK_MEDAL_ID: u32 = 50;
const HIDDEN_INTRO_ID: u32 = 60;

fn medal_events(harness: &Harness) -> Vec<u32> {
    harness
        .notifier
        .events()
        .into_iter()
        .filter_map(|event| match event {
            NotificationEvent::MedalAwarded { achievement_id, .. } => Some(achievement_id),
            _ => None,
        })
        .collect()
}

fn pass_on(score_id: u64, beatmap_id: u32) -> Score {
    let mut pass = score(score_id, 300_000, ScoreRank::A);
    pass.beatmap_id = beatmap_id;
    pass
}

async fn pack_harness(no_diff_reduction: bool) -> Harness {
    let harness = Harness::new().await;
    for beatmap_id in [101, 102, 103] {
        harness.storage.insert_beatmap(beatmap(beatmap_id, 10)).await;
    }
    harness.storage.insert_beatmap(beatmap(201, 20)).await;
    harness
        .storage
        .insert_medal(medal(PACK_MEDAL_ID, "all-packs-anime-1"))
        .await;
    harness
        .storage
        .insert_pack(BeatmapPack {
            pack_id: 1,
            tag: "S1".to_owned(),
            beatmapset_ids: vec![10, 20],
            ruleset: None,
            no_diff_reduction,
            achievement_id: Some(PACK_MEDAL_ID),
        })
        .await;
    harness
}

#[tokio::test]
async fn pack_counts_each_beatmapset_once() {
    let harness = pack_harness(false).await;

    for (score_id, beatmap_id) in [(1, 101), (2, 102), (3, 103)] {
        harness.submit(pass_on(score_id, beatmap_id)).await;
    }
    assert!(harness.storage.grants(USER_ID).await.is_empty());

    harness.submit(pass_on(4, 201)).await;

    let grants = harness.storage.grants(USER_ID).await;
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].achievement_id, PACK_MEDAL_ID);
    assert_eq!(grants[0].beatmap_id, Some(201));
    assert_eq!(medal_events(&harness), vec![PACK_MEDAL_ID]);
}

#[tokio::test]
async fn challenge_packs_ignore_difficulty_reduction() {
    let harness = pack_harness(true).await;
    harness.submit(pass_on(1, 101)).await;

    let mut easy = pass_on(2, 201);
    easy.mods = vec![ScoreMod::new("EZ")];
    harness.submit(easy).await;
    assert!(harness.storage.grants(USER_ID).await.is_empty());

    harness.submit(pass_on(3, 201)).await;
    assert_eq!(harness.storage.grants(USER_ID).await.len(), 1);
}

#[tokio::test]
async fn mod_introduction_is_granted_once() {
    let harness = Harness::new().await;
    harness
        .storage
        .insert_medal(medal(HIDDEN_INTRO_ID, "all-intro-hidden"))
        .await;

    for score_id in [1, 2] {
        let mut hidden = score(score_id, 300_000, ScoreRank::SH);
        hidden.mods = vec![ScoreMod::new("HD")];
        harness.submit(hidden).await;
    }

    assert_eq!(harness.storage.grants(USER_ID).await.len(), 1);
    assert_eq!(medal_events(&harness), vec![HIDDEN_INTRO_ID]);
}

#[tokio::test]
async fn mod_combinations_do_not_introduce_a_mod() {
    let harness = Harness::new().await;
    harness
        .storage
        .insert_medal(medal(HIDDEN_INTRO_ID, "all-intro-hidden"))
        .await;

    let mut combined = score(1, 300_000, ScoreRank::SH);
    combined.mods = vec![ScoreMod::new("HD"), ScoreMod::new("HR")];
    harness.submit(combined).await;

    assert!(harness.storage.grants(USER_ID).await.is_empty());
}

#[tokio::test]
async fn restricted_users_earn_nothing() {
    let harness = Harness::new().await;
    harness.storage.restrict_user(USER_ID).await;
    harness
        .storage
        .insert_medal(medal(HIDDEN_INTRO_ID, "all-intro-hidden"))
        .await;

    let mut hidden = score(1, 300_000, ScoreRank::SH);
    hidden.mods = vec![ScoreMod::new("HD")];
    harness.submit(hidden).await;

    assert!(harness.storage.grants(USER_ID).await.is_empty());
    assert!(medal_events(&harness).is_empty());
}

#[tokio::test]
async fn unranked_beatmaps_award_nothing() {
    let harness = Harness::new().await;
    let mut loved = beatmap(300, 30);
    loved.ranked_status = RankedStatus::Loved;
    harness.storage.insert_beatmap(loved).await;
    harness
        .storage
        .insert_medal(medal(HIDDEN_INTRO_ID, "all-intro-hidden"))
        .await;

    let mut hidden = pass_on(1, 300);
    hidden.mods = vec![ScoreMod::new("HD")];
    harness.submit(hidden).await;

    assert!(harness.storage.grants(USER_ID).await.is_empty());
}
