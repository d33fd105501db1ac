use std::collections::HashMap;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::catalog::CardCatalog;
use crate::models::card::{CardId, Color, ColorSet};
use crate::models::card_rating::{Archetype, RawRating, StatLookup, StatisticalRecord};

/// Read-only statistics lookup supplied by the data provider.
pub trait StatisticsProvider {
    fn lookup(&self, card: CardId, archetype: Archetype) -> StatLookup;

    fn global(&self, card: CardId) -> StatLookup {
        self.lookup(card, Archetype::AllDecks)
    }
}

/// In-memory provider backed by a dataset file.
#[derive(Debug, Default)]
pub struct StatsTable {
    min_sample_size: u32,
    ratings: HashMap<(CardId, Archetype), RawRating>,
}

impl StatsTable {
    pub fn new(min_sample_size: u32) -> Self {
        StatsTable {
            min_sample_size,
            ratings: HashMap::new(),
        }
    }

    pub fn insert(&mut self, card: CardId, archetype: Archetype, rating: RawRating) {
        self.ratings.insert((card, archetype), rating);
    }
}

impl StatisticsProvider for StatsTable {
    fn lookup(&self, card: CardId, archetype: Archetype) -> StatLookup {
        match self.ratings.get(&(card, archetype)) {
            None => StatLookup::Missing,
            Some(raw) => match StatisticalRecord::from_raw(raw, self.min_sample_size) {
                Some(record) => StatLookup::Known(record),
                None if raw.gih < self.min_sample_size => StatLookup::InsufficientSample {
                    sample_size: raw.gih,
                },
                None => StatLookup::Missing,
            },
        }
    }
}

/// Best available win rate for a card in an archetype, falling back to the
/// global figure.
pub fn archetype_gihwr(
    stats: &dyn StatisticsProvider,
    card: CardId,
    archetype: Archetype,
) -> Option<f64> {
    stats
        .lookup(card, archetype)
        .gihwr()
        .or_else(|| stats.global(card).gihwr())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMetrics {
    pub mean: f64,
    pub std: f64,
}

impl ColorMetrics {
    pub fn z_score(&self, win_rate: f64) -> Option<f64> {
        if self.std > 0.0 {
            Some((win_rate - self.mean) / self.std)
        } else {
            None
        }
    }
}

const GRADE_LIMITS: [(&str, f64); 12] = [
    ("A+", 2.00),
    ("A", 1.67),
    ("A-", 1.33),
    ("B+", 1.00),
    ("B", 0.67),
    ("B-", 0.33),
    ("C+", 0.0),
    ("C", -0.33),
    ("C-", -0.67),
    ("D+", -1.00),
    ("D", -1.33),
    ("D-", -1.67),
];

/// Set-wide mean and standard deviation of GIHWR per archetype.
#[derive(Debug, Clone, Default)]
pub struct SetMetrics {
    metrics: HashMap<Archetype, ColorMetrics>,
}

impl SetMetrics {
    pub fn generate(catalog: &CardCatalog, stats: &dyn StatisticsProvider) -> Self {
        let pairs = Color::iter()
            .combinations(2)
            .map(|pair| Archetype::Colors(pair.into_iter().collect::<ColorSet>()));
        let archetypes = std::iter::once(Archetype::AllDecks).chain(pairs);

        let mut ids = catalog.ids().collect::<Vec<_>>();
        ids.sort();

        let metrics = archetypes
            .filter_map(|archetype| {
                let values = ids
                    .iter()
                    .filter_map(|id| stats.lookup(*id, archetype).gihwr())
                    .map(round2)
                    .collect::<Vec<f64>>();
                population_metrics(&values).map(|m| (archetype, m))
            })
            .collect();

        SetMetrics { metrics }
    }

    pub fn from_values(values: impl IntoIterator<Item = (Archetype, ColorMetrics)>) -> Self {
        SetMetrics {
            metrics: values.into_iter().collect(),
        }
    }

    pub fn get(&self, archetype: Archetype) -> Option<ColorMetrics> {
        self.metrics.get(&archetype).copied()
    }

    /// All-decks metrics, or the supplied fallback when the set has none.
    pub fn global_or(&self, fallback: ColorMetrics) -> ColorMetrics {
        match self.get(Archetype::AllDecks) {
            Some(m) if m.mean > 0.0 && m.std > 0.0 => m,
            _ => fallback,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn population_metrics(values: &[f64]) -> Option<ColorMetrics> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(ColorMetrics {
        mean: round2(mean),
        std: round2(variance.sqrt()),
    })
}

/// 0-5 rating with limits at -1.67 and +2.00 standard deviations.
pub fn rating_unrounded(win_rate: f64, metrics: ColorMetrics) -> f64 {
    let upper = metrics.mean + 2.0 * metrics.std;
    let lower = metrics.mean - 1.67 * metrics.std;
    if upper == lower {
        return 2.5;
    }
    ((win_rate - lower) / (upper - lower) * 5.0).clamp(0.0, 5.0)
}

pub fn rating(win_rate: f64, metrics: ColorMetrics) -> f64 {
    (rating_unrounded(win_rate, metrics) * 10.0).round() / 10.0
}

pub fn letter_grade(win_rate: f64, metrics: ColorMetrics) -> &'static str {
    let Some(z) = metrics.z_score(win_rate) else {
        return "C";
    };
    GRADE_LIMITS
        .iter()
        .find(|(_, limit)| z >= *limit)
        .map(|(grade, _)| *grade)
        .unwrap_or("F")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn test_rating_example() {
        let metrics = ColorMetrics {
            mean: 56.8,
            std: 4.68,
        };
        let value = rating_unrounded(62.0, metrics);
        // limits 48.98 and 66.16
        let expected = (62.0 - 48.98) / (66.16 - 48.98) * 5.0;
        assert!((value - expected).abs() < 1e-9);
        assert!((value - 3.70).abs() < 0.1);
        assert_eq!(rating(62.0, metrics), 3.8);
        assert_eq!(rating(40.0, metrics), 0.0);
        assert_eq!(rating(80.0, metrics), 5.0);
    }

    #[test]
    fn test_rating_degenerate() {
        let flat = ColorMetrics {
            mean: 55.0,
            std: 0.0,
        };
        assert_eq!(rating(60.0, flat), 2.5);
        assert_eq!(letter_grade(60.0, flat), "C");
    }

    #[test]
    fn test_letter_grade() {
        let metrics = ColorMetrics {
            mean: 55.0,
            std: 3.0,
        };
        assert_eq!(letter_grade(61.0, metrics), "A+");
        assert_eq!(letter_grade(55.0, metrics), "C+");
        assert_eq!(letter_grade(54.2, metrics), "C");
        assert_eq!(letter_grade(40.0, metrics), "F");
    }

    #[test]
    fn test_population_metrics() {
        let m = population_metrics(&[50.0, 60.0]).unwrap();
        assert_eq!(m.mean, 55.0);
        assert_eq!(m.std, 5.0);
        assert!(population_metrics(&[]).is_none());
    }

    #[test]
    fn test_lookup_states() {
        let mut table = StatsTable::new(100);
        table.insert(
            CardId(1),
            Archetype::AllDecks,
            RawRating {
                gihwr: 58.0,
                gih: 500,
                ..Default::default()
            },
        );
        table.insert(
            CardId(2),
            Archetype::AllDecks,
            RawRating {
                gihwr: 70.0,
                gih: 12,
                ..Default::default()
            },
        );
        assert_eq!(table.global(CardId(1)).gihwr(), Some(58.0));
        assert_eq!(
            table.global(CardId(2)),
            StatLookup::InsufficientSample { sample_size: 12 }
        );
        assert_eq!(table.global(CardId(3)), StatLookup::Missing);
    }

    #[test]
    fn test_set_metrics_and_archetype_fallback() {
        let fx = FixtureSet::new()
            .creature(1, "W", "{1}{W}", 2.0, 56.0)
            .creature(2, "R", "{1}{R}", 2.0, 60.0)
            .pair_rating(1, "WR", 62.0)
            .build();

        let metrics = SetMetrics::generate(&fx.catalog, &fx.stats);
        let global = metrics.get(Archetype::AllDecks).unwrap();
        assert_eq!(global.mean, 58.0);
        assert_eq!(global.std, 2.0);

        let wr = Archetype::Colors("WR".parse().unwrap());
        assert_eq!(archetype_gihwr(&fx.stats, CardId(1), wr), Some(62.0));
        assert_eq!(archetype_gihwr(&fx.stats, CardId(2), wr), Some(60.0));
    }
}
