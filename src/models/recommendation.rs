use serde::Serialize;
use strum_macros::Display;

use super::card::CardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Stage {
    #[strum(serialize = "base")]
    BaseQuality,
    #[strum(serialize = "power")]
    PowerBonus,
    #[strum(serialize = "color")]
    Commitment,
    #[strum(serialize = "hunger")]
    Hunger,
    #[strum(serialize = "wheel")]
    Wheel,
}

/// One explained step of the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub stage: Stage,
    pub value: f64,
    pub note: Option<String>,
}

impl Factor {
    pub fn new(stage: Stage, value: f64) -> Self {
        Factor {
            stage,
            value,
            note: None,
        }
    }

    pub fn with_note(stage: Stage, value: f64, note: impl Into<String>) -> Self {
        Factor {
            stage,
            value,
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub card: CardId,
    pub name: String,
    /// Final score, always within 0..=100.
    pub score: f64,
    pub base_quality: f64,
    pub power_bonus: f64,
    pub commitment: f64,
    pub hunger: f64,
    pub wheel: f64,
    pub wheel_probability: f64,
    pub z_score: Option<f64>,
    pub insufficient_data: bool,
    pub factors: Vec<Factor>,
}

impl Recommendation {
    pub fn notes(&self) -> Vec<&str> {
        self.factors
            .iter()
            .filter_map(|f| f.note.as_deref())
            .collect()
    }
}
