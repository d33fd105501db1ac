//! Land count and proportional basic land allocation.

use crate::classify::{self, Fixing};
use crate::config::DeckConfig;
use crate::models::card::{Card, Color, ColorMap, ColorSet};

/// `base + round(avg_cmc - 3)` clamped to the configured land range.
pub fn land_count(avg_cmc: f64, config: &DeckConfig) -> usize {
    let adjusted = config.base_lands + (avg_cmc - 3.0).round() as i32;
    (adjusted.max(0) as usize).clamp(config.land_min, config.land_max)
}

pub fn average_cmc<'a>(spells: impl IntoIterator<Item = &'a Card>) -> f64 {
    let (total, count) = spells
        .into_iter()
        .fold((0.0, 0usize), |(total, count), card| {
            (total + classify::functional_cmc(card), count + 1)
        });
    if count == 0 {
        3.0
    } else {
        total / count as f64
    }
}

/// Colored symbols per color over the spells.
pub fn pip_counts<'a>(spells: impl IntoIterator<Item = &'a Card>) -> ColorMap<u32> {
    let mut pips = ColorMap::filled(0u32);
    for card in spells {
        if card.mana_cost.total_pips() == 0 {
            for color in card.colors.iter() {
                pips[color] += 1;
            }
            continue;
        }
        for (color, n) in card.mana_cost.pips.iter() {
            pips[color] += n as u32;
        }
    }
    pips
}

/// Non-basic lands from the pool worth playing in a deck of `colors`.
pub fn useful_lands<'a>(pool: &[&'a Card], colors: ColorSet, cheap_artifact_cmc: f64) -> Vec<&'a Card> {
    pool.iter()
        .filter(|card| card.is_land() && !card.is_basic_land())
        .filter(|card| match classify::fixing_of(card, cheap_artifact_cmc) {
            Fixing::AnyColor => true,
            Fixing::Colors(produced) => produced.intersects(&colors),
            Fixing::None | Fixing::Generic => card.colors.intersects(&colors),
        })
        .copied()
        .collect()
}

/// Splits `total` basic lands across the deck colors.
///
/// Main colors get `primary_floor` sources and splash colors `splash_floor`,
/// each capped so the floors fit. What is left follows the pip share of each
/// color, rounding surplus onto the heaviest color and deficit off the
/// lightest. The result always sums to `total` when any color is given.
pub fn allocate_basics(
    total: usize,
    pips: &ColorMap<u32>,
    main: ColorSet,
    splash: ColorSet,
    config: &DeckConfig,
) -> ColorMap<u8> {
    let splash = splash.difference(&main);
    let colors = main.union(&splash);
    let mut counts = ColorMap::filled(0usize);
    if total == 0 || colors.is_empty() {
        return ColorMap::filled(0);
    }

    let fair_share = total / colors.len();
    for color in colors.iter() {
        let floor = if main.contains(color) {
            config.primary_floor
        } else {
            config.splash_floor
        };
        counts[color] = (floor as usize).min(fair_share);
    }

    let remaining = total - counts.0.iter().sum::<usize>();
    let total_pips: u32 = colors.iter().map(|c| pips[c]).sum();

    if total_pips == 0 {
        let receivers = if main.is_empty() { colors } else { main };
        let share = remaining / receivers.len();
        let mut extra = remaining % receivers.len();
        for color in receivers.iter() {
            counts[color] += share;
            if extra > 0 {
                counts[color] += 1;
                extra -= 1;
            }
        }
        return narrow(&counts);
    }

    for color in colors.iter() {
        let share = remaining as f64 * pips[color] as f64 / total_pips as f64;
        counts[color] += share.round() as usize;
    }

    let mut by_pips = colors.iter().collect::<Vec<Color>>();
    // heaviest first; WUBRG order among equals
    by_pips.sort_by(|a, b| pips[*b].cmp(&pips[*a]));

    let mut allocated: usize = counts.0.iter().sum();
    while allocated < total {
        counts[by_pips[0]] += 1;
        allocated += 1;
    }
    while allocated > total {
        let Some(lightest) = by_pips
            .iter()
            .rev()
            .find(|c| pips[**c] > 0 && counts[**c] > 0)
            .or_else(|| by_pips.iter().rev().find(|c| counts[**c] > 0))
            .copied()
        else {
            break;
        };
        counts[lightest] -= 1;
        allocated -= 1;
    }

    narrow(&counts)
}

fn narrow(counts: &ColorMap<usize>) -> ColorMap<u8> {
    let mut narrowed = ColorMap::filled(0u8);
    for (color, n) in counts.iter() {
        narrowed[color] = u8::try_from(n).unwrap_or(u8::MAX);
    }
    narrowed
}
