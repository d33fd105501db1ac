use serde::Serialize;
use strum_macros::Display;

use crate::config::PhaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Phase {
    Speculation,
    Establishment,
    Commitment,
}

/// Phase for a 1-based overall pick number.
pub fn resolve(overall_pick: u8, config: &PhaseConfig) -> Phase {
    if overall_pick >= config.commitment_pick {
        Phase::Commitment
    } else if overall_pick >= config.establishment_pick {
        Phase::Establishment
    } else {
        Phase::Speculation
    }
}
