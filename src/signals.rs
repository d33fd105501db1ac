//! Open-lane detection from cards that arrive later than they usually do.

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::Display;

use crate::advisor::SetContext;
use crate::config::DraftConfig;
use crate::models::card::{CardId, Color, ColorMap};

/// Packs passed in the direction that shows what the feeding neighbor takes.
pub fn is_signal_pack(pack_number: u8, config: &DraftConfig) -> bool {
    config.signal_packs.contains(&pack_number)
}

/// Per-color signal contributed by `cards` seen at `pick_in_pack`.
///
/// Only cards above the set baseline count, weighted by how much later than
/// their average last-seen position they showed up.
pub fn pack_signals(ctx: &SetContext, cards: &[CardId], pick_in_pack: u8) -> ColorMap<f64> {
    let baseline = ctx.global_metrics().mean;
    let mut signals = ColorMap::filled(0.0);

    for id in cards {
        let lookup = ctx.stats.global(*id);
        let Some(record) = lookup.known() else {
            continue;
        };
        let Some(last_seen) = record.alsa.or(record.ata) else {
            continue;
        };
        if record.gihwr <= baseline {
            continue;
        }
        let lateness = pick_in_pack as f64 - last_seen;
        if lateness <= 0.0 {
            continue;
        }
        let Some(card) = ctx.card(*id) else {
            continue;
        };

        let contribution = lateness * (record.gihwr - baseline);
        for color in card.colors.iter() {
            signals[color] += contribution;
        }
    }

    signals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum LaneStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneSignal {
    pub color: Color,
    pub value: f64,
    pub status: LaneStatus,
}

/// Colors ordered from most to least open.
pub fn lane_report(signals: &ColorMap<f64>) -> Vec<LaneSignal> {
    let mut report = Color::iter()
        .map(|color| LaneSignal {
            color,
            value: signals[color],
            status: if signals[color] > 0.0 {
                LaneStatus::Open
            } else {
                LaneStatus::Closed
            },
        })
        .collect::<Vec<_>>();
    report.sort_by(|a, b| b.value.total_cmp(&a.value));
    report
}
