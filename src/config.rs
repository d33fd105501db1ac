use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::advisor::phase::Phase;
use crate::error::{AdvisorError, Res};

/// Environment variables that override single configuration values.
#[derive(Display, EnumIter, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum ConfigKey {
    #[strum(serialize = "DRAFT_ADVISOR_MIN_SAMPLE")]
    MinSample,
    #[strum(serialize = "DRAFT_ADVISOR_ESTABLISHMENT_PICK")]
    EstablishmentPick,
    #[strum(serialize = "DRAFT_ADVISOR_COMMITMENT_PICK")]
    CommitmentPick,
    #[strum(serialize = "DRAFT_ADVISOR_SEATS")]
    Seats,
}

/// A value per draft phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTable<T> {
    pub speculation: T,
    pub establishment: T,
    pub commitment: T,
}

impl<T: Copy> PhaseTable<T> {
    pub fn get(&self, phase: Phase) -> T {
        match phase {
            Phase::Speculation => self.speculation,
            Phase::Establishment => self.establishment,
            Phase::Commitment => self.commitment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub draft: DraftConfig,
    pub stats: StatsConfig,
    pub phases: PhaseConfig,
    pub scoring: ScoringConfig,
    pub lane: LaneConfig,
    pub commitment: CommitmentConfig,
    pub hunger: HungerConfig,
    pub wheel: WheelConfig,
    pub deck: DeckConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            draft: DraftConfig::default(),
            stats: StatsConfig::default(),
            phases: PhaseConfig::default(),
            scoring: ScoringConfig::default(),
            lane: LaneConfig::default(),
            commitment: CommitmentConfig::default(),
            hunger: HungerConfig::default(),
            wheel: WheelConfig::default(),
            deck: DeckConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub seats: u8,
    pub total_picks: u32,
    /// Packs whose passing direction reflects the neighbor feeding us.
    pub signal_packs: Vec<u8>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            seats: 8,
            total_picks: 45,
            signal_packs: vec![1, 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub min_sample_size: u32,
    /// Used when the dataset cannot produce set-wide metrics.
    pub fallback_mean: f64,
    pub fallback_std: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            min_sample_size: 200,
            fallback_mean: 54.0,
            fallback_std: 4.0,
        }
    }
}

/// First overall pick (1..=45) of each later phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    pub establishment_pick: u8,
    pub commitment_pick: u8,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        PhaseConfig {
            establishment_pick: 7,
            commitment_pick: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Win rate mapped to quality 0.
    pub quality_floor: f64,
    /// Win rate mapped to quality 100.
    pub quality_ceiling: f64,
    pub unknown_quality: f64,
    pub power_z_threshold: f64,
    pub power_bonus_per_z: f64,
    pub iwd_premium: f64,
    pub iwd_multiplier: f64,
    pub bomb_z: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            quality_floor: 45.0,
            quality_ceiling: 65.0,
            unknown_quality: 50.0,
            power_z_threshold: 0.5,
            power_bonus_per_z: 10.0,
            iwd_premium: 4.5,
            iwd_multiplier: 1.15,
            bomb_z: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub established_count: usize,
    pub min_weight: f64,
    /// Extra weight of the latest pick relative to the first.
    pub recency: f64,
    /// Share of positive signal accumulation added to a color's weight.
    pub signal_share: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        LaneConfig {
            established_count: 2,
            min_weight: 2.5,
            recency: 1.5,
            signal_share: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitmentRow {
    pub off_color: f64,
    pub heavy_pip: f64,
    pub splash_bomb: f64,
    pub splash_bomb_unfixed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    pub table: PhaseTable<CommitmentRow>,
    pub five_color_min_fixing: u32,
    pub splash_min_fixing: u32,
    pub cheap_artifact_cmc: f64,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        CommitmentConfig {
            table: PhaseTable {
                speculation: CommitmentRow {
                    off_color: 0.9,
                    heavy_pip: 0.8,
                    splash_bomb: 1.0,
                    splash_bomb_unfixed: 0.9,
                },
                establishment: CommitmentRow {
                    off_color: 0.6,
                    heavy_pip: 0.4,
                    splash_bomb: 0.9,
                    splash_bomb_unfixed: 0.7,
                },
                commitment: CommitmentRow {
                    off_color: 0.2,
                    heavy_pip: 0.1,
                    splash_bomb: 0.85,
                    splash_bomb_unfixed: 0.5,
                },
            },
            five_color_min_fixing: 4,
            splash_min_fixing: 2,
            cheap_artifact_cmc: 2.0,
        }
    }
}

/// Targets are counts expected in a finished 45-card pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    pub creatures: f64,
    pub early_plays: f64,
    pub interaction: f64,
    pub card_draw: f64,
    pub top_end_cap: f64,
    pub combat_trick_cap: f64,
    pub intensity: PhaseTable<f64>,
    pub max_bonus: f64,
    pub max_penalty: f64,
    pub splash_fixing_bonus: f64,
    pub speculative_fixing_bonus: f64,
}

impl Default for HungerConfig {
    fn default() -> Self {
        HungerConfig {
            creatures: 15.0,
            early_plays: 7.0,
            interaction: 4.0,
            card_draw: 2.0,
            top_end_cap: 5.0,
            combat_trick_cap: 3.0,
            intensity: PhaseTable {
                speculation: 0.25,
                establishment: 0.6,
                commitment: 1.0,
            },
            max_bonus: 0.3,
            max_penalty: 0.3,
            splash_fixing_bonus: 1.3,
            speculative_fixing_bonus: 1.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Cubic coefficients in ALSA, highest degree first, one row per pick.
    /// Picks past the last row reuse it.
    pub coefficients: Vec<[f64; 4]>,
    /// Pack ranks (0-based) below this never wheel.
    pub min_rank: usize,
    pub deep_rank: usize,
    pub deep_rank_boost: f64,
    pub probability_threshold: f64,
    pub penalty: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            coefficients: vec![
                [-0.46, 7.97, -27.43, 26.61],
                [-0.33, 6.31, -23.12, 23.86],
                [-0.19, 4.39, -17.06, 17.71],
                [-0.06, 2.27, -9.22, 9.43],
                [0.08, 0.15, -1.88, 2.36],
                [0.25, -2.65, 9.76, -11.21],
            ],
            min_rank: 3,
            deep_rank: 8,
            deep_rank_boost: 1.25,
            probability_threshold: 75.0,
            penalty: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub deck_size: usize,
    pub base_lands: i32,
    pub land_min: usize,
    pub land_max: usize,
    pub primary_floor: u8,
    pub splash_floor: u8,
    /// Castable playables a pair needs before it is built.
    pub min_playables: usize,
    pub low_curve_boost: f64,
    pub low_curve_penalty: f64,
    pub velocity_penalty: f64,
    pub splash_source_penalty: f64,
    pub filler_penalty: f64,
    pub extra_basic_penalty: f64,
    pub synergy_cap: f64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig {
            deck_size: 40,
            base_lands: 17,
            land_min: 15,
            land_max: 18,
            primary_floor: 6,
            splash_floor: 3,
            min_playables: 14,
            low_curve_boost: 1.1,
            low_curve_penalty: 0.7,
            velocity_penalty: 10.0,
            splash_source_penalty: 2.0,
            filler_penalty: 3.0,
            extra_basic_penalty: 4.0,
            synergy_cap: 15.0,
        }
    }
}

impl AdvisorConfig {
    /// Defaults, then the JSON file if it exists, then environment overrides.
    pub fn load(path: Option<&Path>) -> Res<AdvisorConfig> {
        let mut config = match path {
            Some(path) if path.exists() => {
                log::info!("Loading configuration from {}", path.display());
                let contents = std::fs::read_to_string(path)?;
                serde_json::from_str(&contents)?
            }
            _ => AdvisorConfig::default(),
        };

        config.apply_env(|key| env::var(key.to_string()).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Res<()>
    where
        F: Fn(ConfigKey) -> Option<String>,
    {
        for key in ConfigKey::iter() {
            let Some(value) = lookup(key) else {
                continue;
            };
            log::debug!("Config override {}={}", key, value);
            match key {
                ConfigKey::MinSample => self.stats.min_sample_size = parse_value(key, &value)?,
                ConfigKey::EstablishmentPick => {
                    self.phases.establishment_pick = parse_value(key, &value)?
                }
                ConfigKey::CommitmentPick => self.phases.commitment_pick = parse_value(key, &value)?,
                ConfigKey::Seats => self.draft.seats = parse_value(key, &value)?,
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Res<()> {
        let phases = &self.phases;
        if phases.establishment_pick < 1
            || phases.establishment_pick >= phases.commitment_pick
            || phases.commitment_pick as u32 > self.draft.total_picks
        {
            return Err(AdvisorError::Config(format!(
                "phase picks must satisfy 1 <= {} < {} <= {}",
                phases.establishment_pick, phases.commitment_pick, self.draft.total_picks
            )));
        }
        if self.draft.total_picks == 0 || self.draft.seats == 0 {
            return Err(AdvisorError::Config(
                "seats and total picks must be positive".to_string(),
            ));
        }
        if self.scoring.quality_floor >= self.scoring.quality_ceiling {
            return Err(AdvisorError::Config(
                "quality floor must be below the ceiling".to_string(),
            ));
        }
        if self.wheel.coefficients.is_empty() {
            return Err(AdvisorError::Config(
                "wheel coefficients cannot be empty".to_string(),
            ));
        }
        let deck = &self.deck;
        if deck.land_min > deck.land_max || deck.land_max >= deck.deck_size {
            return Err(AdvisorError::Config(format!(
                "land range {}..={} does not fit a {} card deck",
                deck.land_min, deck.land_max, deck.deck_size
            )));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: ConfigKey, value: &str) -> Res<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| AdvisorError::Config(format!("{} has an invalid value '{}'", key, value)))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AdvisorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            (ConfigKey::MinSample, "500"),
            (ConfigKey::CommitmentPick, "20"),
        ]);
        let mut config = AdvisorConfig::default();
        config
            .apply_env(|key| env.get(&key).map(|s| s.to_string()))
            .unwrap();

        assert_eq!(config.stats.min_sample_size, 500);
        assert_eq!(config.phases.commitment_pick, 20);
        assert_eq!(config.phases.establishment_pick, 7);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = AdvisorConfig::default();
        let result = config.apply_env(|key| match key {
            ConfigKey::Seats => Some("eight".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }

    #[test]
    fn test_invalid_phase_order() {
        let mut config = AdvisorConfig::default();
        config.phases.establishment_pick = 20;
        config.phases.commitment_pick = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().expect("Failed to create a temp file");
        write!(
            file,
            r#"{{ "phases": {{ "establishment_pick": 5 }}, "deck": {{ "primary_floor": 7 }} }}"#
        )
        .unwrap();

        let config = AdvisorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.phases.establishment_pick, 5);
        assert_eq!(config.phases.commitment_pick, 16);
        assert_eq!(config.deck.primary_floor, 7);
        assert_eq!(config.deck.splash_floor, 3);
    }
}
