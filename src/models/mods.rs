use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ModTraits: u32 {
        const None = 0;
        const DifficultyReduction = 1 << 0;
        const DifficultyIncrease = 1 << 1;
        const RateAdjust = 1 << 2;
        const Automation = 1 << 3;
        const Conversion = 1 << 4;
        const Fun = 1 << 5;
        /// Never shown to the player as a choice, e.g. touch device.
        const System = 1 << 6;
        const AffectsDifficulty = 1 << 7;
    }
}

impl ModTraits {
    pub fn of(acronym: &str) -> ModTraits {
        match acronym {
            "EZ" | "NF" => ModTraits::DifficultyReduction | ModTraits::AffectsDifficulty,
            "HT" | "DC" => {
                ModTraits::DifficultyReduction | ModTraits::RateAdjust | ModTraits::AffectsDifficulty
            }
            "HR" | "FL" => ModTraits::DifficultyIncrease | ModTraits::AffectsDifficulty,
            "HD" | "SD" | "PF" | "FI" => ModTraits::DifficultyIncrease,
            "DT" | "NC" => {
                ModTraits::DifficultyIncrease | ModTraits::RateAdjust | ModTraits::AffectsDifficulty
            }
            "AT" | "CN" | "RX" | "AP" | "SO" => ModTraits::Automation | ModTraits::AffectsDifficulty,
            "TD" => ModTraits::System | ModTraits::AffectsDifficulty,
            "SV2" | "CL" => ModTraits::System,
            "MR" | "RD" | "DS" | "IN" | "HO" => ModTraits::Conversion,
            key if key.ends_with('K') => ModTraits::Conversion,
            _ => ModTraits::Fun,
        }
    }

    pub fn is_difficulty_reduction(&self) -> bool {
        self.contains(ModTraits::DifficultyReduction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMod {
    pub acronym: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, serde_json::Value>,
}

impl ScoreMod {
    pub fn new(acronym: &str) -> Self {
        Self {
            acronym: acronym.to_owned(),
            settings: BTreeMap::new(),
        }
    }

    pub fn traits(&self) -> ModTraits {
        ModTraits::of(&self.acronym)
    }

    pub fn is_default_configuration(&self) -> bool {
        self.settings.is_empty()
    }

    /// Clock rate applied by this mod, if it adjusts one.
    pub fn clock_rate(&self) -> Option<f64> {
        let default = match self.acronym.as_str() {
            "DT" | "NC" => 1.5,
            "HT" | "DC" => 0.75,
            _ => return None,
        };
        let rate = self
            .settings
            .get("speed_change")
            .and_then(|value| value.as_f64())
            .unwrap_or(default);
        Some(rate)
    }
}

pub fn clock_rate(mods: &[ScoreMod]) -> f64 {
    mods.iter().filter_map(ScoreMod::clock_rate).product()
}

pub fn has_difficulty_reduction(mods: &[ScoreMod]) -> bool {
    mods.iter().any(|m| m.traits().is_difficulty_reduction())
}

/// A stable key for mods that change difficulty attributes.
pub fn difficulty_key(mods: &[ScoreMod]) -> String {
    let mut parts: Vec<String> = mods
        .iter()
        .filter(|m| m.traits().contains(ModTraits::AffectsDifficulty))
        .map(|m| match m.settings.is_empty() {
            true => m.acronym.clone(),
            false => format!(
                "{}{}",
                m.acronym,
                serde_json::Value::from(serde_json::Map::from_iter(m.settings.clone()))
            ),
        })
        .collect();
    parts.sort();
    parts.join(",")
}
