use std::collections::HashMap;

use crate::config::ScoringConfig;
use crate::models::card::{CardId, ColorSet};
use crate::models::card_rating::Archetype;
use crate::stats::ColorMetrics;

use super::SetContext;

pub fn draft_progress(picks_made: u32, total_picks: u32) -> f64 {
    if total_picks == 0 {
        return 1.0;
    }
    (picks_made as f64 / total_picks as f64).clamp(0.0, 1.0)
}

/// Early picks lean on the global rate, late picks on the archetype rate.
pub fn expected_win_rate(global: f64, archetype: f64, progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    global * (1.0 - p) + archetype * p
}

pub fn normalize_quality(win_rate: f64, floor: f64, ceiling: f64) -> f64 {
    if ceiling <= floor {
        return 50.0;
    }
    ((win_rate - floor) / (ceiling - floor) * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseQuality {
    pub global: Option<f64>,
    pub archetype: Option<f64>,
    pub expected: Option<f64>,
    pub quality: f64,
    pub iwd: Option<f64>,
}

impl BaseQuality {
    pub fn known(&self) -> bool {
        self.expected.is_some()
    }
}

pub fn base_quality(
    ctx: &SetContext,
    card: CardId,
    established: Option<ColorSet>,
    progress: f64,
) -> BaseQuality {
    let scoring = &ctx.config.scoring;
    let global_lookup = ctx.stats.global(card);
    let Some(global) = global_lookup.known() else {
        return BaseQuality {
            global: None,
            archetype: None,
            expected: None,
            quality: scoring.unknown_quality,
            iwd: None,
        };
    };

    let archetype = established
        .and_then(|colors| ctx.stats.lookup(card, Archetype::Colors(colors)).gihwr());
    let expected = expected_win_rate(global.gihwr, archetype.unwrap_or(global.gihwr), progress);

    BaseQuality {
        global: Some(global.gihwr),
        archetype,
        expected: Some(expected),
        quality: normalize_quality(expected, scoring.quality_floor, scoring.quality_ceiling),
        iwd: global.iwd,
    }
}

/// Quality distribution of the pack currently on offer.
#[derive(Debug, Clone, Default)]
pub struct PackContext {
    pub qualities: HashMap<CardId, BaseQuality>,
    pub metrics: Option<ColorMetrics>,
    /// 0-based rank by quality among cards with statistics.
    pub ranks: HashMap<CardId, usize>,
}

impl PackContext {
    pub fn build(
        ctx: &SetContext,
        pack: &[CardId],
        established: Option<ColorSet>,
        progress: f64,
    ) -> PackContext {
        let qualities: HashMap<CardId, BaseQuality> = pack
            .iter()
            .map(|id| (*id, base_quality(ctx, *id, established, progress)))
            .collect();

        let mut known = qualities
            .iter()
            .filter(|(_, q)| q.known())
            .map(|(id, q)| (*id, q.quality))
            .collect::<Vec<_>>();
        known.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let values = known.iter().map(|(_, q)| *q).collect::<Vec<_>>();
        let metrics = if values.len() >= 2 {
            population_metrics_exact(&values)
        } else {
            None
        };

        PackContext {
            qualities,
            metrics,
            ranks: known
                .iter()
                .enumerate()
                .map(|(rank, (id, _))| (*id, rank))
                .collect(),
        }
    }

    pub fn z_score(&self, card: CardId) -> Option<f64> {
        let quality = self.qualities.get(&card).filter(|q| q.known())?;
        self.metrics?.z_score(quality.quality)
    }
}

// pack statistics skip the two-digit rounding used for set metrics
fn population_metrics_exact(values: &[f64]) -> Option<ColorMetrics> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(ColorMetrics {
        mean,
        std: variance.sqrt(),
    })
}

/// Bonus for standing out from the rest of the pack. Returns the bonus and
/// whether the IWD premium applied.
pub fn power_bonus(z_score: Option<f64>, iwd: Option<f64>, config: &ScoringConfig) -> (f64, bool) {
    let Some(z) = z_score.filter(|z| z.is_finite()) else {
        return (0.0, false);
    };
    if z <= config.power_z_threshold {
        return (0.0, false);
    }

    let premium = iwd.map_or(false, |iwd| iwd > config.iwd_premium) && z > 1.0;
    let multiplier = if premium { config.iwd_multiplier } else { 1.0 };

    (z * config.power_bonus_per_z * multiplier, premium)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn test_expected_win_rate_bounds() {
        let (global, archetype) = (60.0, 50.0);
        assert_eq!(expected_win_rate(global, archetype, 0.0), global);
        assert_eq!(expected_win_rate(global, archetype, 1.0), archetype);

        for step in 0..=45 {
            let p = draft_progress(step, 45);
            let expected = expected_win_rate(global, archetype, p);
            assert!(expected <= global && expected >= archetype);

            let reversed = expected_win_rate(archetype, global, p);
            assert!(reversed >= archetype && reversed <= global);
        }
    }

    #[test]
    fn test_expected_win_rate_mid_draft() {
        let p = draft_progress(22, 45);
        let expected = expected_win_rate(60.0, 50.0, p);
        assert!((expected - 55.111).abs() < 1e-3);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(draft_progress(0, 45), 0.0);
        assert_eq!(draft_progress(90, 45), 1.0);
        assert_eq!(draft_progress(3, 0), 1.0);
    }

    #[test]
    fn test_normalize_quality() {
        assert_eq!(normalize_quality(45.0, 45.0, 65.0), 0.0);
        assert_eq!(normalize_quality(65.0, 45.0, 65.0), 100.0);
        assert_eq!(normalize_quality(55.0, 45.0, 65.0), 50.0);
        assert_eq!(normalize_quality(30.0, 45.0, 65.0), 0.0);
        assert_eq!(normalize_quality(90.0, 45.0, 65.0), 100.0);
        assert_eq!(normalize_quality(55.0, 60.0, 60.0), 50.0);
    }

    #[test]
    fn test_power_bonus() {
        let config = ScoringConfig::default();
        assert_eq!(power_bonus(None, None, &config), (0.0, false));
        assert_eq!(power_bonus(Some(0.4), None, &config), (0.0, false));

        let (bonus, premium) = power_bonus(Some(1.2), Some(1.0), &config);
        assert!((bonus - 12.0).abs() < 1e-9);
        assert!(!premium);

        let (bonus, premium) = power_bonus(Some(1.2), Some(6.0), &config);
        assert!((bonus - 13.8).abs() < 1e-9);
        assert!(premium);
    }

    #[test]
    fn test_pack_context_excludes_unknown_cards() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 55.0)
            .creature(2, "W", "{W}", 1.0, 65.0)
            .creature(3, "W", "{W}", 1.0, 45.0)
            .unrated_creature(4, "W", "{W}", 1.0)
            .build();
        let ctx = fx.context();

        let pack = vec![CardId(1), CardId(2), CardId(3), CardId(4)];
        let pack_ctx = PackContext::build(&ctx, &pack, None, 0.0);

        let metrics = pack_ctx.metrics.unwrap();
        assert!((metrics.mean - 50.0).abs() < 1e-9);
        assert_eq!(pack_ctx.ranks.get(&CardId(2)), Some(&0));
        assert_eq!(pack_ctx.ranks.get(&CardId(3)), Some(&2));
        assert_eq!(pack_ctx.ranks.get(&CardId(4)), None);
        assert!(pack_ctx.z_score(CardId(4)).is_none());
        assert!(pack_ctx.z_score(CardId(2)).unwrap() > 1.0);

        let unknown = pack_ctx.qualities[&CardId(4)];
        assert!(!unknown.known());
        assert_eq!(unknown.quality, ctx.config.scoring.unknown_quality);
    }

    #[test]
    fn test_flat_pack_has_no_deviation() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 55.0)
            .creature(2, "U", "{U}", 1.0, 55.0)
            .build();
        let ctx = fx.context();
        let pack_ctx = PackContext::build(&ctx, &[CardId(1), CardId(2)], None, 0.0);
        assert!(pack_ctx.z_score(CardId(1)).is_none());
    }
}
