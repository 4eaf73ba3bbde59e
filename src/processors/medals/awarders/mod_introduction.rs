use crate::common::error::ServiceResult;
use crate::models::medals::MedalDefinition;
use crate::models::mods::ModTraits;
use crate::processors::medals::{MedalAwarder, MedalContext};
use async_trait::async_trait;

/// Awards the introduction medal of a mod the first time a beatmap is passed with it alone.
pub struct ModIntroductionAwarder;

fn intro_name(acronym: &str) -> Option<&'static str> {
    let name = match acronym {
        "SD" => "suddendeath",
        "PF" => "perfect",
        "HR" => "hardrock",
        "DT" => "doubletime",
        "NC" => "nightcore",
        "HD" => "hidden",
        "FL" => "flashlight",
        "EZ" => "easy",
        "NF" => "nofail",
        "HT" => "halftime",
        "SO" => "spunout",
        _ => return None,
    };
    Some(name)
}

#[async_trait]
impl MedalAwarder for ModIntroductionAwarder {
    fn name(&self) -> &'static str {
        "mod_introduction"
    }

    async fn award(
        &self,
        ctx: &mut MedalContext<'_>,
        candidates: &[MedalDefinition],
    ) -> ServiceResult<Vec<MedalDefinition>> {
        let mut played = ctx
            .score
            .mods
            .iter()
            .filter(|m| !m.traits().contains(ModTraits::System));
        let (Some(only), None) = (played.next(), played.next()) else {
            return Ok(vec![]);
        };
        if !only.is_default_configuration() {
            return Ok(vec![]);
        }
        let Some(name) = intro_name(&only.acronym) else {
            return Ok(vec![]);
        };

        let slug = format!("all-intro-{name}");
        Ok(candidates
            .iter()
            .filter(|medal| medal.slug == slug)
            .cloned()
            .collect())
    }
}
