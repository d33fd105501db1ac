use serde::Serialize;

use crate::classify::{self, Fixing};
use crate::config::HungerConfig;
use crate::models::card::{Card, ColorSet};

use super::phase::Phase;

/// Structural counts of a pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolProfile {
    pub picks: u32,
    pub creatures: u32,
    pub early_plays: u32,
    pub interaction: u32,
    pub card_draw: u32,
    pub top_end: u32,
    pub combat_tricks: u32,
    /// Colors of off-color bombs already taken.
    pub splash_targets: ColorSet,
}

impl PoolProfile {
    /// `is_bomb` decides which pool cards are worth splashing for.
    pub fn build<'a, F>(cards: impl IntoIterator<Item = &'a Card>, established: ColorSet, is_bomb: F) -> Self
    where
        F: Fn(&Card) -> bool,
    {
        let mut profile = PoolProfile::default();
        for card in cards {
            profile.picks += 1;
            if card.is_land() {
                continue;
            }
            profile.creatures += card.is_creature() as u32;
            profile.early_plays += classify::is_early_play(card) as u32;
            profile.interaction += classify::is_removal(card) as u32;
            profile.card_draw += classify::is_card_draw(card) as u32;
            profile.top_end += classify::is_top_end(card) as u32;
            profile.combat_tricks += classify::is_combat_trick(card) as u32;

            if !established.is_empty() && !card.colors.is_subset(&established) && is_bomb(card) {
                profile.splash_targets = profile
                    .splash_targets
                    .union(&card.colors.difference(&established));
            }
        }
        profile
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    AtLeast(f64),
    Cap(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HungerResult {
    pub multiplier: f64,
    pub note: Option<String>,
}

impl HungerResult {
    fn neutral() -> Self {
        HungerResult {
            multiplier: 1.0,
            note: None,
        }
    }
}

pub fn projected(count: u32, picks_made: u32, total_picks: u32) -> Option<f64> {
    if picks_made == 0 {
        return None;
    }
    Some(count as f64 * total_picks as f64 / picks_made as f64)
}

fn category_factor(target: Target, projected: f64, intensity: f64, config: &HungerConfig) -> f64 {
    match target {
        Target::AtLeast(t) if t > 0.0 => {
            if projected < t {
                let deficit = (t - projected) / t;
                1.0 + deficit * config.max_bonus * intensity
            } else if projected > 2.0 * t {
                let excess = (projected - 2.0 * t) / t;
                1.0 - (excess * config.max_penalty).min(config.max_penalty) * intensity
            } else {
                1.0
            }
        }
        Target::Cap(cap) if cap > 0.0 => {
            if projected > cap {
                let excess = (projected - cap) / cap;
                1.0 - (excess * config.max_penalty).min(config.max_penalty) * intensity
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}

fn supplies_splash(card: &Card, targets: ColorSet, cheap_artifact_cmc: f64) -> bool {
    if targets.is_empty() {
        return false;
    }
    match classify::fixing_of(card, cheap_artifact_cmc) {
        Fixing::AnyColor => true,
        Fixing::Colors(colors) => colors.intersects(&targets),
        Fixing::None | Fixing::Generic => false,
    }
}

/// Structural hunger multiplier for taking `card` into a pool with `profile`.
pub fn hunger_multiplier(
    card: &Card,
    profile: &PoolProfile,
    phase: Phase,
    total_picks: u32,
    cheap_artifact_cmc: f64,
    config: &HungerConfig,
) -> HungerResult {
    if profile.picks == 0 {
        return HungerResult::neutral();
    }

    if supplies_splash(card, profile.splash_targets, cheap_artifact_cmc) {
        return HungerResult {
            multiplier: config.splash_fixing_bonus,
            note: Some(format!("Fixing for splash ({})", profile.splash_targets)),
        };
    }
    if card.is_land() {
        if phase == Phase::Speculation && card.colors.is_multicolor() {
            return HungerResult {
                multiplier: config.speculative_fixing_bonus,
                note: Some("Speculative fixing".to_string()),
            };
        }
        return HungerResult::neutral();
    }

    let intensity = config.intensity.get(phase);
    let categories = [
        ("Creatures", card.is_creature(), profile.creatures, Target::AtLeast(config.creatures)),
        (
            "Early plays",
            classify::is_early_play(card),
            profile.early_plays,
            Target::AtLeast(config.early_plays),
        ),
        (
            "Interaction",
            classify::is_removal(card),
            profile.interaction,
            Target::AtLeast(config.interaction),
        ),
        (
            "Card draw",
            classify::is_card_draw(card),
            profile.card_draw,
            Target::AtLeast(config.card_draw),
        ),
        ("Top end", classify::is_top_end(card), profile.top_end, Target::Cap(config.top_end_cap)),
        (
            "Combat tricks",
            classify::is_combat_trick(card),
            profile.combat_tricks,
            Target::Cap(config.combat_trick_cap),
        ),
    ];

    let mut multiplier = 1.0;
    let mut strongest: Option<(&str, f64)> = None;
    for (label, matches, count, target) in categories {
        if !matches {
            continue;
        }
        let Some(projected) = projected(count, profile.picks, total_picks) else {
            continue;
        };
        let factor = category_factor(target, projected, intensity, config);
        multiplier *= factor;
        if (factor - 1.0).abs() > strongest.map_or(1e-9, |(_, f)| (f - 1.0).abs()) {
            strongest = Some((label, factor));
        }
    }

    let multiplier = multiplier.clamp(1.0 - config.max_penalty, 1.0 + config.max_bonus);
    let note = strongest.map(|(label, factor)| {
        if factor > 1.0 {
            format!("Needs {}", label.to_lowercase())
        } else {
            format!("Enough {}", label.to_lowercase())
        }
    });

    HungerResult { multiplier, note }
}
