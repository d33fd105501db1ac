use crate::config::WheelConfig;
use crate::models::draft_data::PICKS_PER_PACK;

/// Chance (0..=100) that a card is still in the pack when it comes back.
/// `rank` is the card's 0-based quality rank within the visible pack.
pub fn wheel_probability(
    pick_in_pack: u8,
    seats: u8,
    rank: Option<usize>,
    alsa: Option<f64>,
    config: &WheelConfig,
) -> f64 {
    if pick_in_pack == 0 || pick_in_pack as u32 + seats as u32 > PICKS_PER_PACK as u32 {
        return 0.0;
    }
    let Some(rank) = rank.filter(|r| *r >= config.min_rank) else {
        return 0.0;
    };
    let Some(alsa) = alsa.filter(|a| *a > pick_in_pack as f64) else {
        return 0.0;
    };
    let Some(coefficients) = config
        .coefficients
        .get(pick_in_pack as usize - 1)
        .or_else(|| config.coefficients.last())
    else {
        return 0.0;
    };

    let mut probability = polyval(coefficients, alsa);
    if rank >= config.deep_rank {
        probability *= config.deep_rank_boost;
    }
    if !probability.is_finite() {
        return 0.0;
    }
    probability.clamp(0.0, 100.0)
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Penalty multiplier for cards likely to wheel.
pub fn wheel_multiplier(probability: f64, config: &WheelConfig) -> f64 {
    if probability >= config.probability_threshold {
        config.penalty
    } else {
        1.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_polyval() {
        let config = WheelConfig::default();
        // -0.46*7.2^3 + 7.97*7.2^2 - 27.43*7.2 + 26.61
        let value = polyval(&config.coefficients[0], 7.2);
        assert!((value - 70.6).abs() < 0.1);
    }

    #[test]
    fn test_top_of_pack_never_wheels() {
        let config = WheelConfig::default();
        assert_eq!(wheel_probability(1, 8, Some(0), Some(9.0), &config), 0.0);
        assert_eq!(wheel_probability(1, 8, Some(2), Some(9.0), &config), 0.0);
        assert_eq!(wheel_probability(1, 8, None, Some(9.0), &config), 0.0);
    }

    #[test]
    fn test_no_return_lap() {
        let config = WheelConfig::default();
        assert_eq!(wheel_probability(8, 8, Some(6), Some(12.0), &config), 0.0);
        assert!(wheel_probability(2, 4, Some(6), Some(9.0), &config) > 0.0);
    }

    #[test]
    fn test_alsa_before_current_pick() {
        let config = WheelConfig::default();
        assert_eq!(wheel_probability(3, 8, Some(6), Some(2.5), &config), 0.0);
        assert_eq!(wheel_probability(3, 8, Some(6), None, &config), 0.0);
    }

    #[test]
    fn test_late_card_wheels_and_is_penalised() {
        let config = WheelConfig::default();
        let probability = wheel_probability(1, 8, Some(9), Some(9.0), &config);
        assert!(probability >= 75.0);
        assert!(probability <= 100.0);
        assert_eq!(wheel_multiplier(probability, &config), config.penalty);
        assert_eq!(wheel_multiplier(20.0, &config), 1.0);
    }
}
