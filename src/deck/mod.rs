//! Deck proposals from a finished (or partial) pool.
//!
//! Every color pair with enough castable playables gets three builds and
//! keeps the best rated one.

pub mod mana_base;
pub mod rating;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::advisor::quality::normalize_quality;
use crate::advisor::SetContext;
use crate::classify::{self, Fixing};
use crate::models::card::{Card, CardId, Color, ColorMap, ColorSet};
use crate::models::card_rating::Archetype;
use crate::models::deck::{DeckVariant, VariantKind};
use crate::stats::archetype_gihwr;

use self::rating::RatingInput;

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    card: &'a Card,
    win_rate: f64,
    playable: bool,
}

impl<'a> Candidate<'a> {
    fn quality(&self, ctx: &SetContext) -> f64 {
        let scoring = &ctx.config.scoring;
        normalize_quality(self.win_rate, scoring.quality_floor, scoring.quality_ceiling)
    }
}

/// Best variant per viable color pair, highest rating first.
pub fn synthesize_decks(ctx: &SetContext, pool: &[CardId]) -> Vec<DeckVariant> {
    let cards = ctx.cards(pool).collect::<Vec<_>>();
    if !cards.iter().any(|card| !card.is_land()) {
        log::info!("No spells in the pool, nothing to build");
        return Vec::new();
    }

    let mut decks = candidate_pairs(ctx, &cards)
        .into_iter()
        .filter_map(|pair| {
            [VariantKind::Consistency, VariantKind::Power, VariantKind::LowCurve]
                .into_iter()
                .filter_map(|kind| build_variant(ctx, kind, pair, &cards))
                .max_by(|a, b| a.rating.total_cmp(&b.rating))
        })
        .collect::<Vec<_>>();

    decks.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.label().cmp(&b.label()))
    });
    log::info!(
        "Built {} deck proposals from {} cards",
        decks.len(),
        cards.len()
    );
    decks
}

fn playable_threshold(ctx: &SetContext) -> f64 {
    let metrics = ctx.global_metrics();
    metrics.mean - metrics.std
}

fn candidate<'a>(ctx: &SetContext, card: &'a Card, archetype: Archetype) -> Candidate<'a> {
    let threshold = playable_threshold(ctx);
    match archetype_gihwr(ctx.stats.as_ref(), card.id, archetype) {
        Some(win_rate) => Candidate {
            card,
            win_rate,
            playable: win_rate >= threshold,
        },
        None => Candidate {
            card,
            win_rate: threshold,
            playable: false,
        },
    }
}

/// Castable non-land cards for `pair`, best first.
fn pair_candidates<'a>(ctx: &SetContext, cards: &[&'a Card], pair: ColorSet) -> Vec<Candidate<'a>> {
    cards
        .iter()
        .copied()
        .filter(|card| !card.is_land() && card.colors.is_subset(&pair))
        .map(|card| candidate(ctx, card, Archetype::Colors(pair)))
        .sorted_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| a.card.id.cmp(&b.card.id))
        })
        .collect()
}

fn candidate_pairs(ctx: &SetContext, cards: &[&Card]) -> Vec<ColorSet> {
    let min_playables = ctx.config.deck.min_playables;
    let pairs = Color::iter()
        .combinations(2)
        .map(|pair| pair.into_iter().collect::<ColorSet>())
        .filter(|pair| {
            pair_candidates(ctx, cards, *pair)
                .iter()
                .filter(|c| c.playable)
                .count()
                >= min_playables
        })
        .collect::<Vec<_>>();

    if pairs.is_empty() {
        let top = top_pair(ctx, cards);
        log::debug!("No pair has {} playables, falling back to {}", min_playables, top);
        vec![top]
    } else {
        pairs
    }
}

/// The two colors with the most above-average win rate in the pool.
fn top_pair(ctx: &SetContext, cards: &[&Card]) -> ColorSet {
    let mut points = ColorMap::filled(0.0);
    let mut counts = ColorMap::filled(0u32);
    let baseline = 50.0;
    for card in cards.iter().filter(|card| !card.is_land()) {
        let gihwr = ctx.stats.global(card.id).gihwr().unwrap_or(baseline);
        for color in card.colors.iter() {
            points[color] += (gihwr - baseline).max(0.0);
            counts[color] += 1;
        }
    }
    Color::iter()
        .sorted_by(|a, b| {
            points[*b]
                .total_cmp(&points[*a])
                .then_with(|| counts[*b].cmp(&counts[*a]))
        })
        .take(2)
        .collect()
}

/// Highest rated card that adds exactly one color to `pair`.
fn splash_candidate<'a>(ctx: &SetContext, cards: &[&'a Card], pair: ColorSet) -> Option<Candidate<'a>> {
    cards
        .iter()
        .copied()
        .filter(|card| !card.is_land() && card.colors.difference(&pair).len() == 1)
        .filter_map(|card| {
            ctx.stats.global(card.id).gihwr().map(|win_rate| Candidate {
                card,
                win_rate,
                playable: true,
            })
        })
        .max_by(|a, b| {
            a.win_rate
                .total_cmp(&b.win_rate)
                .then_with(|| b.card.id.cmp(&a.card.id))
        })
}

fn tempo_factor(card: &Card, ctx: &SetContext) -> f64 {
    let cmc = classify::functional_cmc(card);
    if cmc <= 2.0 {
        ctx.config.deck.low_curve_boost
    } else if cmc >= 5.0 {
        ctx.config.deck.low_curve_penalty
    } else {
        1.0
    }
}

/// One variant of `kind` for `pair`, or `None` when the pool cannot support it.
pub fn build_variant(
    ctx: &SetContext,
    kind: VariantKind,
    pair: ColorSet,
    cards: &[&Card],
) -> Option<DeckVariant> {
    let config = &ctx.config.deck;
    let mut ranked = pair_candidates(ctx, cards, pair);
    if ranked.is_empty() {
        return None;
    }

    let mut splash = None;
    let mut forced_lands = None;
    match kind {
        VariantKind::Consistency => {}
        VariantKind::Power => splash = Some(splash_candidate(ctx, cards, pair)?),
        VariantKind::LowCurve => {
            ranked.sort_by(|a, b| {
                let a_value = a.win_rate * tempo_factor(a.card, ctx);
                let b_value = b.win_rate * tempo_factor(b.card, ctx);
                b_value
                    .total_cmp(&a_value)
                    .then_with(|| a.card.id.cmp(&b.card.id))
            });
            forced_lands = Some(config.land_min);
        }
    }

    let splash_colors = splash.map_or(ColorSet::empty(), |s: Candidate| s.card.colors.difference(&pair));
    let colors = pair.union(&splash_colors);

    let (playables, fillers): (Vec<Candidate>, Vec<Candidate>) =
        ranked.into_iter().partition(|c| c.playable);
    let ordered = splash
        .into_iter()
        .chain(playables)
        .chain(fillers)
        .collect::<Vec<_>>();

    let lands = forced_lands.unwrap_or_else(|| {
        let baseline_slots = (config.deck_size as i32 - config.base_lands).max(0) as usize;
        let avg = mana_base::average_cmc(ordered.iter().take(baseline_slots).map(|c| c.card));
        mana_base::land_count(avg, config)
    });
    let slots = config.deck_size.saturating_sub(lands);

    let chosen = ordered.into_iter().take(slots).collect::<Vec<_>>();
    let filler_count = chosen.iter().filter(|c| !c.playable).count();
    let extra_basics = slots - chosen.len();

    let nonbasic = mana_base::useful_lands(cards, colors, ctx.config.commitment.cheap_artifact_cmc)
        .into_iter()
        .take(lands)
        .collect::<Vec<_>>();
    let basic_total = lands - nonbasic.len() + extra_basics;
    let pips = mana_base::pip_counts(chosen.iter().map(|c| c.card));
    let basics = mana_base::allocate_basics(basic_total, &pips, pair, splash_colors, config);

    let splash_sources = splash_colors
        .iter()
        .map(|color| {
            basics[color] as usize
                + nonbasic
                    .iter()
                    .filter(|land| produces(land, color, ctx.config.commitment.cheap_artifact_cmc))
                    .count()
        })
        .min()
        .unwrap_or(0);

    let spells = chosen
        .iter()
        .map(|c| (c.card, c.quality(ctx)))
        .collect::<Vec<_>>();
    let breakdown = rating::rate_deck(
        &RatingInput {
            spells: &spells,
            nonbasic_lands: &nonbasic,
            land_count: lands,
            splash: splash_colors,
            splash_sources,
            filler_count,
            extra_basics,
            cheap_artifact_cmc: ctx.config.commitment.cheap_artifact_cmc,
        },
        config,
    );

    let variant = DeckVariant {
        kind,
        pair,
        colors,
        spells: chosen.iter().map(|c| c.card.id).collect(),
        nonbasic_lands: nonbasic.iter().map(|c| c.id).collect(),
        basics,
        filler_count,
        extra_basics,
        rating: breakdown.total,
    };
    log::debug!(
        "{}: rating {:.1} (power {:.1}, synergy {:.1}, velocity -{:.1}, deficit -{:.1})",
        variant.label(),
        breakdown.total,
        breakdown.power,
        breakdown.synergy,
        breakdown.velocity,
        breakdown.deficit
    );
    Some(variant)
}

fn produces(card: &Card, color: Color, cheap_artifact_cmc: f64) -> bool {
    match classify::fixing_of(card, cheap_artifact_cmc) {
        Fixing::AnyColor => true,
        Fixing::Colors(colors) => colors.contains(color),
        Fixing::None | Fixing::Generic => false,
    }
}
