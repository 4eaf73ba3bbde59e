use crate::common::error::ServiceResult;
use crate::models::medals::{MedalDefinition, MedalGrant};
use crate::models::notifications::NotificationEvent;
use crate::storage::{Storage, StorageTransaction};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Process-wide snapshot of the medal definitions, loaded on first use.
#[derive(Default)]
pub struct MedalDefinitionCache {
    definitions: RwLock<Option<Arc<[MedalDefinition]>>>,
}

impl MedalDefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch_all(
        &self,
        tx: &mut dyn StorageTransaction,
    ) -> ServiceResult<Arc<[MedalDefinition]>> {
        let cached = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(definitions) = cached {
            return Ok(definitions);
        }

        let definitions: Arc<[MedalDefinition]> =
            tx.fetch_medal_definitions().await?.into();
        *self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(definitions.clone());
        info!(count = definitions.len(), "Loaded medal definitions");
        Ok(definitions)
    }

    pub fn invalidate(&self) {
        *self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Writes the grant row. Returns the event to publish when the medal is new to the user.
pub async fn grant<S: Storage + ?Sized>(
    storage: &S,
    user_id: u32,
    medal: &MedalDefinition,
    beatmap_id: Option<u32>,
) -> ServiceResult<Option<NotificationEvent>> {
    let grant = MedalGrant {
        user_id,
        achievement_id: medal.achievement_id,
        beatmap_id,
        achieved_at: chrono::Utc::now(),
    };
    if !storage.grant_medal(&grant).await? {
        return Ok(None);
    }

    info!(
        user_id,
        achievement_id = medal.achievement_id,
        slug = %medal.slug,
        "Awarded medal"
    );
    Ok(Some(NotificationEvent::MedalAwarded {
        user_id,
        achievement_id: medal.achievement_id,
        slug: medal.slug.clone(),
        beatmap_id,
        awarded_at: grant.achieved_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn medal(achievement_id: u32, slug: &str) -> MedalDefinition {
        MedalDefinition {
            achievement_id,
            slug: slug.to_owned(),
            name: slug.to_owned(),
            grouping: "Skill".to_owned(),
            ordering: 0,
            ruleset: None,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn keeps_definitions_until_invalidated() {
        let storage = MemoryStorage::new();
        storage.insert_medal(medal(1, "osu-combo-500")).await;
        let cache = MedalDefinitionCache::new();

        let mut tx = storage.begin().await.unwrap();
        assert_eq!(cache.fetch_all(tx.as_mut()).await.unwrap().len(), 1);
        tx.rollback().await.unwrap();

        storage.insert_medal(medal(2, "osu-combo-750")).await;
        let mut tx = storage.begin().await.unwrap();
        assert_eq!(cache.fetch_all(tx.as_mut()).await.unwrap().len(), 1);

        cache.invalidate();
        assert_eq!(cache.fetch_all(tx.as_mut()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn grants_are_idempotent() {
        let storage = MemoryStorage::new();
        let medal = medal(1, "osu-combo-500");

        let first = grant(&storage, 2, &medal, Some(100)).await.unwrap();
        assert!(matches!(first, Some(NotificationEvent::MedalAwarded { achievement_id: 1, .. })));
        assert_eq!(grant(&storage, 2, &medal, Some(100)).await.unwrap(), None);
        assert_eq!(storage.grants(2).await.len(), 1);
    }
}
