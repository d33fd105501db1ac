use serde::Serialize;

use super::card::{CardId, Color, ColorMap, ColorSet};
use super::draft_data::DraftPick;

/// Data-integrity faults found while applying events. They never abort a
/// replay, they are only recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Discrepancy {
    /// The pick was trusted and the card added to the pool anyway.
    PickNotInPack { at: DraftPick, card: CardId },
}

/// One observed pack and what the drafter took from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackRecord {
    pub at: DraftPick,
    pub cards: Vec<CardId>,
    pub picked: Option<CardId>,
}

/// Cards that vanished from a pack between two laps around the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCards {
    pub at: DraftPick,
    pub cards: Vec<CardId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftState {
    pub set_code: Option<String>,
    pub seats: u8,
    pub pack_number: u8,
    pub pick_number: u8,
    /// Cards currently offered to the drafter.
    pub pack: Vec<CardId>,
    /// Cards taken, in pick order. Repeated ids are separate copies.
    pub pool: Vec<CardId>,
    pub signals: ColorMap<f64>,
    /// Top colors by commitment weight, WUBRG order.
    pub established: ColorSet,
    pub history: Vec<PackRecord>,
    pub missing: Vec<MissingCards>,
    pub discrepancies: Vec<Discrepancy>,
    pub last_pack: Option<DraftPick>,
    pub last_pick: Option<DraftPick>,
}

impl Default for DraftState {
    fn default() -> Self {
        DraftState {
            set_code: None,
            seats: 8,
            pack_number: 1,
            pick_number: 1,
            pack: Vec::new(),
            pool: Vec::new(),
            signals: ColorMap::filled(0.0),
            established: ColorSet::empty(),
            history: Vec::new(),
            missing: Vec::new(),
            discrepancies: Vec::new(),
            last_pack: None,
            last_pick: None,
        }
    }
}

impl DraftState {
    pub fn position(&self) -> DraftPick {
        DraftPick::new(self.pack_number, self.pick_number)
    }

    pub fn picks_made(&self) -> u32 {
        self.pool.len() as u32
    }

    pub fn signal(&self, color: Color) -> f64 {
        self.signals[color]
    }

    /// Established two-color archetype, when two colors are established.
    pub fn archetype_colors(&self) -> Option<ColorSet> {
        if self.established.len() >= 2 {
            Some(self.established)
        } else {
            None
        }
    }
}
