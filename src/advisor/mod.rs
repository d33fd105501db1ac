//! Contextual pick scoring.
//!
//! Every card offered is run through five stages: base quality, power bonus,
//! color commitment, structural hunger and the wheel adjustment. The stages
//! only read the set context and the draft state handed to them.

pub mod commitment;
pub mod hunger;
pub mod lane;
pub mod phase;
pub mod quality;
pub mod wheel;

use std::cmp::Ordering;

use crate::catalog::{CardCatalog, Dataset};
use crate::classify::FixingMap;
use crate::config::AdvisorConfig;
use crate::models::card::{Card, CardId, ColorSet};
use crate::models::draft_state::DraftState;
use crate::models::recommendation::{Factor, Recommendation, Stage};
use crate::stats::{ColorMetrics, SetMetrics, StatisticsProvider};

use self::hunger::PoolProfile;
use self::phase::Phase;
use self::quality::PackContext;

/// Everything about the event that stays fixed while drafting.
pub struct SetContext {
    pub set_code: String,
    pub catalog: CardCatalog,
    pub stats: Box<dyn StatisticsProvider + Send + Sync>,
    pub metrics: SetMetrics,
    pub config: AdvisorConfig,
}

impl SetContext {
    pub fn new(
        set_code: impl Into<String>,
        catalog: CardCatalog,
        stats: Box<dyn StatisticsProvider + Send + Sync>,
        config: AdvisorConfig,
    ) -> Self {
        let metrics = SetMetrics::generate(&catalog, stats.as_ref());
        SetContext {
            set_code: set_code.into(),
            catalog,
            stats,
            metrics,
            config,
        }
    }

    pub fn from_dataset(dataset: Dataset, config: AdvisorConfig) -> Self {
        SetContext::new(
            dataset.meta.set_code,
            dataset.catalog,
            Box::new(dataset.stats),
            config,
        )
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.catalog.get(id)
    }

    pub fn cards<'a>(&'a self, ids: &'a [CardId]) -> impl Iterator<Item = &'a Card> + 'a {
        ids.iter().filter_map(move |id| self.catalog.get(*id))
    }

    pub fn global_metrics(&self) -> ColorMetrics {
        self.metrics.global_or(ColorMetrics {
            mean: self.config.stats.fallback_mean,
            std: self.config.stats.fallback_std,
        })
    }

    /// Set-wide z-score of the card's global win rate.
    pub fn power_z(&self, id: CardId) -> Option<f64> {
        let wr = self.stats.global(id).gihwr()?;
        self.global_metrics().z_score(wr)
    }

    pub fn is_bomb(&self, id: CardId) -> bool {
        self.power_z(id)
            .map_or(false, |z| z >= self.config.scoring.bomb_z)
    }
}

/// Values shared by every card of the pack being scored.
pub struct PickContext {
    pub phase: Phase,
    pub progress: f64,
    pub established: ColorSet,
    pub archetype: Option<ColorSet>,
    pub fixing: FixingMap,
    pub profile: PoolProfile,
    pub pack: PackContext,
}

impl PickContext {
    pub fn new(ctx: &SetContext, state: &DraftState, pack: &[CardId]) -> Self {
        let config = &ctx.config;
        let phase = phase::resolve(state.position().overall(), &config.phases);
        let progress = quality::draft_progress(state.picks_made(), config.draft.total_picks);
        let archetype = state.archetype_colors();
        let pool = ctx.cards(&state.pool).collect::<Vec<_>>();

        PickContext {
            phase,
            progress,
            established: state.established,
            archetype,
            fixing: FixingMap::from_cards(
                pool.iter().copied(),
                config.commitment.cheap_artifact_cmc,
            ),
            profile: PoolProfile::build(pool.iter().copied(), state.established, |card| {
                ctx.is_bomb(card.id)
            }),
            pack: PackContext::build(ctx, pack, archetype, progress),
        }
    }
}

/// Scores every card of the current pack, best first.
pub fn evaluate_pack(ctx: &SetContext, state: &DraftState) -> Vec<Recommendation> {
    let pick_ctx = PickContext::new(ctx, state, &state.pack);
    let mut recommendations = state
        .pack
        .iter()
        .map(|id| evaluate_card(ctx, state, &pick_ctx, *id))
        .collect::<Vec<_>>();

    recommendations.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.card.cmp(&b.card))
    });
    recommendations
}

pub fn evaluate_card(
    ctx: &SetContext,
    state: &DraftState,
    pick_ctx: &PickContext,
    id: CardId,
) -> Recommendation {
    let config = &ctx.config;
    let base = pick_ctx
        .pack
        .qualities
        .get(&id)
        .copied()
        .unwrap_or_else(|| quality::base_quality(ctx, id, pick_ctx.archetype, pick_ctx.progress));
    let mut factors = Vec::with_capacity(5);

    factors.push(if base.known() {
        Factor::new(Stage::BaseQuality, base.quality)
    } else {
        Factor::with_note(Stage::BaseQuality, base.quality, "Insufficient data")
    });

    let z_score = pick_ctx.pack.z_score(id);
    let (power_bonus, premium) = quality::power_bonus(z_score, base.iwd, &config.scoring);
    factors.push(match (power_bonus > 0.0, premium) {
        (true, true) => Factor::with_note(Stage::PowerBonus, power_bonus, "True bomb"),
        (true, false) => Factor::with_note(Stage::PowerBonus, power_bonus, "Pack standout"),
        _ => Factor::new(Stage::PowerBonus, power_bonus),
    });

    let card = ctx.card(id);
    let (commitment, hunger) = match card {
        Some(card) => {
            let commitment = commitment::commitment_multiplier(
                card,
                pick_ctx.established,
                pick_ctx.phase,
                &pick_ctx.fixing,
                ctx.power_z(id),
                config.scoring.bomb_z,
                &config.commitment,
            );
            let hunger = hunger::hunger_multiplier(
                card,
                &pick_ctx.profile,
                pick_ctx.phase,
                config.draft.total_picks,
                config.commitment.cheap_artifact_cmc,
                &config.hunger,
            );
            factors.push(Factor {
                stage: Stage::Commitment,
                value: commitment.multiplier,
                note: commitment.note,
            });
            factors.push(Factor {
                stage: Stage::Hunger,
                value: hunger.multiplier,
                note: hunger.note,
            });
            (commitment.multiplier, hunger.multiplier)
        }
        None => {
            log::debug!("Card {} is not in the catalog", id);
            factors.push(Factor::with_note(Stage::Commitment, 1.0, "Unknown card"));
            factors.push(Factor::new(Stage::Hunger, 1.0));
            (1.0, 1.0)
        }
    };

    let rank = pick_ctx.pack.ranks.get(&id).copied();
    let alsa = ctx.stats.global(id).known().and_then(|r| r.alsa);
    let wheel_probability =
        wheel::wheel_probability(state.pick_number, state.seats, rank, alsa, &config.wheel);
    let wheel = wheel::wheel_multiplier(wheel_probability, &config.wheel);
    factors.push(if wheel < 1.0 {
        Factor::with_note(
            Stage::Wheel,
            wheel,
            format!("Wheels ~{:.0}%", wheel_probability),
        )
    } else {
        Factor::new(Stage::Wheel, wheel)
    });

    let raw = (base.quality + power_bonus) * commitment * hunger * wheel;
    let score = if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    };

    Recommendation {
        card: id,
        name: ctx.catalog.name_of(id),
        score,
        base_quality: base.quality,
        power_bonus,
        commitment,
        hunger,
        wheel,
        wheel_probability,
        z_score,
        insufficient_data: !base.known(),
        factors,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::*;

    fn pack_state(pack: &[u32]) -> DraftState {
        DraftState {
            pack: pack.iter().map(|id| CardId(*id)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scores_stay_in_range() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 99.0)
            .creature(2, "U", "{U}", 1.0, 1.0)
            .creature(3, "B", "{B}", 1.0, 55.0)
            .iwd(1, 40.0)
            .alsa(1, 14.0)
            .unrated_creature(4, "R", "{R}", 1.0)
            .build();
        let ctx = fx.context();
        let state = pack_state(&[1, 2, 3, 4, 99]);

        let recommendations = evaluate_pack(&ctx, &state);
        assert_eq!(recommendations.len(), 5);
        for rec in &recommendations {
            assert!(rec.score >= 0.0 && rec.score <= 100.0, "{:?}", rec);
            assert_eq!(rec.factors.len(), 5);
        }
        assert_eq!(recommendations[0].card, CardId(1));
        assert!(recommendations
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn test_unknown_cards_are_flagged() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 60.0)
            .creature(2, "U", "{U}", 1.0, 50.0)
            .unrated_creature(3, "R", "{R}", 1.0)
            .build();
        let ctx = fx.context();
        let state = pack_state(&[1, 2, 3]);

        let recommendations = evaluate_pack(&ctx, &state);
        let unknown = recommendations
            .iter()
            .find(|r| r.card == CardId(3))
            .unwrap();
        assert!(unknown.insufficient_data);
        assert_eq!(unknown.power_bonus, 0.0);
        assert_eq!(unknown.base_quality, ctx.config.scoring.unknown_quality);
        assert!(unknown.notes().contains(&"Insufficient data"));
    }

    #[test]
    fn test_hard_locked_card_scores_zero() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 60.0)
            .creature(2, "R", "{R}", 1.0, 60.0)
            .card(card(3, "Sultai Charm", "Instant", "{B}{G}{U}", 3.0, ""))
            .rating(3, 64.0)
            .build();
        let ctx = fx.context();
        let mut state = pack_state(&[3]);
        state.pool = vec![CardId(1), CardId(2)];
        state.established = "WR".parse().unwrap();
        state.pick_number = 3;

        let recommendations = evaluate_pack(&ctx, &state);
        assert_eq!(recommendations[0].commitment, 0.0);
        assert_eq!(recommendations[0].score, 0.0);
        assert!(recommendations[0].notes().contains(&"Hard lock (no overlap)"));
    }

    #[test]
    fn test_phase_follows_configured_boundaries() {
        let mut config = AdvisorConfig::default();
        config.phases.establishment_pick = 4;
        config.phases.commitment_pick = 10;
        let custom = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 60.0)
            .config(config)
            .build()
            .context();
        let default = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 60.0)
            .build()
            .context();
        let mut state = pack_state(&[1]);
        state.pick_number = 4;

        assert_eq!(PickContext::new(&custom, &state, &state.pack).phase, Phase::Establishment);
        assert_eq!(PickContext::new(&default, &state, &state.pack).phase, Phase::Speculation);

        state.pick_number = 10;
        assert_eq!(PickContext::new(&custom, &state, &state.pack).phase, Phase::Commitment);
    }

    #[test]
    fn test_archetype_rate_takes_over_late() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{W}", 1.0, 60.0)
            .pair_rating(1, "WR", 50.0)
            .build();
        let ctx = fx.context();
        let mut state = pack_state(&[1]);
        state.established = "WR".parse().unwrap();
        state.pool = (100..122).map(CardId).collect();

        let pick_ctx = PickContext::new(&ctx, &state, &state.pack);
        let base = pick_ctx.pack.qualities[&CardId(1)];
        assert!((base.expected.unwrap() - 55.111).abs() < 1e-3);
    }
}
