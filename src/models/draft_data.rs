use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::card::CardId;

pub const PACKS_PER_DRAFT: u8 = 3;
pub const PICKS_PER_PACK: u8 = 15;

/// Draft position, always 1-indexed once stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DraftPick {
    pub pack: u8,
    pub pick: u8,
}

impl DraftPick {
    pub fn new(pack: u8, pick: u8) -> Self {
        DraftPick { pack, pick }
    }

    /// Normalizes a raw position; `None` when it falls outside the draft.
    pub fn normalize(pack: u8, pick: u8, indexing: Indexing) -> Option<DraftPick> {
        let offset = match indexing {
            Indexing::ZeroBased => 1,
            Indexing::OneBased => 0,
        };
        let pack = pack.checked_add(offset)?;
        let pick = pick.checked_add(offset)?;

        if pack == 0 || pack > PACKS_PER_DRAFT || pick == 0 || pick > PICKS_PER_PACK {
            return None;
        }
        Some(DraftPick { pack, pick })
    }

    /// 1-based pick across the whole draft (1..=45). An unnormalized pack 0
    /// counts as the first pack.
    pub fn overall(&self) -> u8 {
        self.pack
            .saturating_sub(1)
            .saturating_mul(PICKS_PER_PACK)
            .saturating_add(self.pick)
    }
}

impl Display for DraftPick {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "p{}p{}", self.pack, self.pick)
    }
}

/// How a source numbers packs and picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indexing {
    ZeroBased,
    #[default]
    OneBased,
}

fn default_seats() -> u8 {
    8
}

/// Typed draft events handed over by the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftEvent {
    EventStart {
        set_code: String,
        #[serde(default = "default_seats")]
        seats: u8,
    },
    PackObserved {
        pack: u8,
        pick: u8,
        cards: Vec<CardId>,
        #[serde(default)]
        indexing: Indexing,
    },
    PickMade {
        pack: u8,
        pick: u8,
        card: CardId,
        #[serde(default)]
        indexing: Indexing,
    },
    #[serde(other)]
    Unrecognized,
}

impl DraftEvent {
    /// Parses one JSON line; malformed input becomes `Unrecognized`.
    pub fn from_json_line(line: &str) -> DraftEvent {
        match serde_json::from_str(line) {
            Ok(event) => event,
            Err(err) => {
                log::debug!("Dropping malformed event line: {}", err);
                DraftEvent::Unrecognized
            }
        }
    }
}
