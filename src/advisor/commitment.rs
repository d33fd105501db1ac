use crate::classify::FixingMap;
use crate::config::CommitmentConfig;
use crate::models::card::{Card, ColorSet};

use super::phase::Phase;

#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentResult {
    pub multiplier: f64,
    pub note: Option<String>,
}

impl CommitmentResult {
    fn neutral() -> Self {
        CommitmentResult {
            multiplier: 1.0,
            note: None,
        }
    }

    fn with(multiplier: f64, note: impl Into<String>) -> Self {
        CommitmentResult {
            multiplier,
            note: Some(note.into()),
        }
    }
}

/// Color-commitment multiplier. `power_z` is the card's set-wide z-score,
/// used to recognise splashable bombs.
pub fn commitment_multiplier(
    card: &Card,
    established: ColorSet,
    phase: Phase,
    fixing: &FixingMap,
    power_z: Option<f64>,
    bomb_z: f64,
    config: &CommitmentConfig,
) -> CommitmentResult {
    if established.is_empty() || card.colors.is_empty() {
        return CommitmentResult::neutral();
    }
    // sharing any established color counts as on-color
    if card.colors.intersects(&established) {
        return CommitmentResult::neutral();
    }

    if card.colors.is_multicolor() && established.len() >= 2 {
        if fixing.total >= config.five_color_min_fixing {
            log::debug!(
                "{} treated as a five-color candidate with {} fixing sources",
                card.name,
                fixing.total
            );
        } else {
            return CommitmentResult::with(0.0, "Hard lock (no overlap)");
        }
    }

    let row = config.table.get(phase);
    let off_colors = card.colors.difference(&established);
    let splash_pips = card.pips_outside(&established);
    let is_bomb = power_z.map_or(false, |z| z >= bomb_z);

    if is_bomb && splash_pips <= 1 {
        if fixing.weakest(&off_colors) >= config.splash_min_fixing {
            return CommitmentResult::with(row.splash_bomb, format!("Splashable bomb ({})", off_colors));
        }
        return CommitmentResult::with(row.splash_bomb_unfixed, "Risky splash");
    }
    if splash_pips >= 2 {
        return CommitmentResult::with(row.heavy_pip, "Off-color (heavy pips)");
    }

    CommitmentResult::with(row.off_color, format!("Off-color ({})", off_colors))
}
