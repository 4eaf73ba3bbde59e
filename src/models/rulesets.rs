use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Ruleset {
    #[default]
    Osu = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
}

impl Ruleset {
    pub const fn all() -> [Ruleset; 4] {
        [Ruleset::Osu, Ruleset::Taiko, Ruleset::Catch, Ruleset::Mania]
    }

    pub const fn short_name(&self) -> &'static str {
        match self {
            Ruleset::Osu => "osu",
            Ruleset::Taiko => "taiko",
            Ruleset::Catch => "fruits",
            Ruleset::Mania => "mania",
        }
    }

    pub const fn stats_table(&self) -> &'static str {
        match self {
            Ruleset::Osu => "osu_user_stats",
            Ruleset::Taiko => "osu_user_stats_taiko",
            Ruleset::Catch => "osu_user_stats_fruits",
            Ruleset::Mania => "osu_user_stats_mania",
        }
    }

    /// Multiplier applied to the squared object count when converting to classic scoring.
    /// Mania displays standardised score as-is.
    pub const fn classic_multiplier(&self) -> Option<f64> {
        match self {
            Ruleset::Osu => Some(32.57),
            Ruleset::Taiko => Some(1.10),
            Ruleset::Catch => Some(0.06),
            Ruleset::Mania => None,
        }
    }
}

impl TryFrom<u8> for Ruleset {
    type Error = std::io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use std::io::{Error, ErrorKind};

        match value {
            0 => Ok(Ruleset::Osu),
            1 => Ok(Ruleset::Taiko),
            2 => Ok(Ruleset::Catch),
            3 => Ok(Ruleset::Mania),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid ruleset")),
        }
    }
}

impl From<Ruleset> for u8 {
    fn from(value: Ruleset) -> Self {
        value as u8
    }
}
