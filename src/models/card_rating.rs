use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::card::ColorSet;

pub const ALL_DECKS_KEY: &str = "All Decks";

/// Statistical context a record was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Archetype {
    AllDecks,
    Colors(ColorSet),
}

impl Archetype {
    pub fn pair(colors: ColorSet) -> Archetype {
        if colors.is_empty() {
            Archetype::AllDecks
        } else {
            Archetype::Colors(colors)
        }
    }
}

impl Display for Archetype {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Archetype::AllDecks => write!(f, "{}", ALL_DECKS_KEY),
            Archetype::Colors(colors) => write!(f, "{}", colors),
        }
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_DECKS_KEY) {
            return Ok(Archetype::AllDecks);
        }
        s.parse::<ColorSet>().map(Archetype::pair)
    }
}

/// Raw per-archetype fields as they come from the data provider. Win rates
/// are percentages. Zero means "not reported".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRating {
    #[serde(default)]
    pub gihwr: f64,
    #[serde(default)]
    pub ohwr: f64,
    #[serde(default)]
    pub alsa: f64,
    #[serde(default)]
    pub ata: f64,
    #[serde(default)]
    pub iwd: f64,
    /// Games-in-hand sample size.
    #[serde(default)]
    pub gih: u32,
}

/// A record whose sample size cleared the provider threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalRecord {
    pub gihwr: f64,
    pub ohwr: Option<f64>,
    pub alsa: Option<f64>,
    pub ata: Option<f64>,
    pub iwd: Option<f64>,
    pub sample_size: u32,
}

impl StatisticalRecord {
    /// Returns `None` when the sample is too small or no win rate was reported.
    pub fn from_raw(raw: &RawRating, min_sample_size: u32) -> Option<StatisticalRecord> {
        if raw.gih < min_sample_size || raw.gihwr <= 0.0 || !raw.gihwr.is_finite() {
            return None;
        }
        let present = |v: f64| if v > 0.0 && v.is_finite() { Some(v) } else { None };

        Some(StatisticalRecord {
            gihwr: raw.gihwr,
            ohwr: present(raw.ohwr),
            alsa: present(raw.alsa),
            ata: present(raw.ata),
            iwd: if raw.iwd.is_finite() && raw.gih > 0 && raw.iwd != 0.0 {
                Some(raw.iwd)
            } else {
                None
            },
            sample_size: raw.gih,
        })
    }
}

/// Outcome of a statistics lookup. Insufficient samples are kept distinct from
/// missing data and never collapse into a numeric zero.
#[derive(Debug, Clone, PartialEq)]
pub enum StatLookup {
    Known(StatisticalRecord),
    InsufficientSample { sample_size: u32 },
    Missing,
}

impl StatLookup {
    pub fn known(&self) -> Option<&StatisticalRecord> {
        match self {
            StatLookup::Known(record) => Some(record),
            _ => None,
        }
    }

    pub fn gihwr(&self) -> Option<f64> {
        self.known().map(|r| r.gihwr)
    }
}
