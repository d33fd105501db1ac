use serde::Serialize;
use strum_macros::Display;

use super::card::{CardId, ColorMap, ColorSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum VariantKind {
    #[strum(serialize = "Consistent")]
    Consistency,
    #[strum(serialize = "Splash")]
    Power,
    #[strum(serialize = "Tempo")]
    LowCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckVariant {
    pub kind: VariantKind,
    /// The main color pair.
    pub pair: ColorSet,
    /// Pair plus any splash color.
    pub colors: ColorSet,
    pub spells: Vec<CardId>,
    pub nonbasic_lands: Vec<CardId>,
    pub basics: ColorMap<u8>,
    pub filler_count: usize,
    pub extra_basics: usize,
    pub rating: f64,
}

impl DeckVariant {
    pub fn label(&self) -> String {
        match self.kind {
            VariantKind::Power => format!(
                "{} {} {}",
                self.pair,
                self.kind,
                self.colors.difference(&self.pair)
            ),
            _ => format!("{} {}", self.pair, self.kind),
        }
    }

    pub fn land_count(&self) -> usize {
        self.nonbasic_lands.len() + self.basic_count()
    }

    pub fn basic_count(&self) -> usize {
        self.basics.0.iter().map(|n| *n as usize).sum()
    }

    pub fn card_count(&self) -> usize {
        self.spells.len() + self.land_count()
    }

    /// Expected event outcome for the rating band.
    pub fn projected_record(&self) -> &'static str {
        match self.rating {
            r if r >= 80.0 => "7-x (Trophy!)",
            r if r >= 65.0 => "5-6 wins",
            r if r >= 50.0 => "3-4 wins",
            r if r >= 35.0 => "1-2 wins",
            _ => "0-3",
        }
    }
}
