use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::models::card::{CardId, Color, ColorMap, ColorSet};

use super::SetContext;

/// Recency-weighted commitment points per color over the pool. Cards well
/// below the set average add nothing; later picks weigh more.
pub fn commitment_weights(
    ctx: &SetContext,
    pool: &[CardId],
    signals: &ColorMap<f64>,
) -> ColorMap<f64> {
    let lane = &ctx.config.lane;
    let metrics = ctx.global_metrics();
    let mut weights = ColorMap::filled(0.0);

    for (idx, id) in pool.iter().enumerate() {
        let Some(card) = ctx.catalog.get(*id) else {
            continue;
        };
        if card.colors.is_empty() {
            continue;
        }
        let Some(wr) = ctx.stats.global(*id).gihwr() else {
            continue;
        };
        if wr < metrics.mean - metrics.std {
            continue;
        }

        let z = metrics.z_score(wr).unwrap_or(0.0);
        let base = (1.0 + 2.0 * z).max(0.2);
        let recency = 1.0 + lane.recency * idx as f64 / pool.len() as f64;

        for color in card.colors.iter() {
            weights[color] += base * recency;
        }
    }

    for color in Color::iter() {
        weights[color] += lane.signal_share * signals[color].max(0.0);
    }

    weights
}

/// The top colors whose weight reaches the configured minimum.
pub fn established_colors(ctx: &SetContext, weights: &ColorMap<f64>) -> ColorSet {
    let lane = &ctx.config.lane;
    weights
        .iter()
        .filter(|(_, w)| *w >= lane.min_weight)
        // stable sort keeps WUBRG order among equal weights
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .take(lane.established_count)
        .map(|(color, _)| color)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::*;

    fn fixture() -> FixtureSet {
        FixtureSet::new()
            .creature(1, "W", "{1}{W}", 2.0, 60.0)
            .creature(2, "W", "{2}{W}", 3.0, 59.0)
            .creature(3, "R", "{R}", 1.0, 61.0)
            .creature(4, "R", "{1}{R}", 2.0, 58.0)
            .creature(5, "G", "{G}", 1.0, 45.0)
            .creature(6, "U", "{U}", 1.0, 55.0)
            .creature(7, "B", "{B}", 1.0, 54.0)
    }

    #[test]
    fn test_weak_cards_do_not_commit() {
        let fx = fixture().build();
        let ctx = fx.context();
        let weights = commitment_weights(&ctx, &[CardId(5)], &ColorMap::filled(0.0));
        assert_eq!(weights[Color::Green], 0.0);
    }

    #[test]
    fn test_established_pair() {
        let fx = fixture().build();
        let ctx = fx.context();
        let pool = vec![CardId(1), CardId(3), CardId(2), CardId(4), CardId(6)];
        let weights = commitment_weights(&ctx, &pool, &ColorMap::filled(0.0));

        assert!(weights[Color::White] > weights[Color::Blue]);
        assert!(weights[Color::Red] > weights[Color::Blue]);
        assert_eq!(
            established_colors(&ctx, &weights),
            "WR".parse::<ColorSet>().unwrap()
        );
    }

    #[test]
    fn test_single_pick_is_not_established() {
        let fx = fixture().build();
        let ctx = fx.context();
        let weights = commitment_weights(&ctx, &[CardId(6)], &ColorMap::filled(0.0));
        assert!(established_colors(&ctx, &weights).is_empty());
    }

    #[test]
    fn test_positive_signals_add_weight() {
        let fx = fixture().build();
        let ctx = fx.context();
        let mut signals = ColorMap::filled(0.0);
        signals[Color::Green] = 50.0;
        signals[Color::Black] = -50.0;
        let weights = commitment_weights(&ctx, &[], &signals);
        assert!((weights[Color::Green] - 1.0).abs() < 1e-9);
        assert_eq!(weights[Color::Black], 0.0);
    }
}
