use crate::models::medals::MedalDefinition;
use crate::models::rulesets::Ruleset;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct MedalRow {
    pub achievement_id: u32,
    pub slug: String,
    pub name: String,
    pub grouping: String,
    pub ordering: u32,
    #[sqlx(default)]
    pub mode: Option<i8>,
    pub enabled: bool,
}

impl TryFrom<MedalRow> for MedalDefinition {
    type Error = std::io::Error;

    fn try_from(row: MedalRow) -> Result<Self, Self::Error> {
        let ruleset = match row.mode {
            Some(mode) => Some(Ruleset::try_from(mode as u8)?),
            None => None,
        };
        Ok(MedalDefinition {
            achievement_id: row.achievement_id,
            slug: row.slug,
            name: row.name,
            grouping: row.grouping,
            ordering: row.ordering,
            ruleset,
            enabled: row.enabled,
        })
    }
}
