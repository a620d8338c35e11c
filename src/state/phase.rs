use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::Side;

/// Step of a combat round. Each phase fires for one side, then the sides swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Phase {
    AaAttacker,
    AaDefender,
    SubAttacker,
    SubDefender,
    Attacker,
    Defender,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::AaAttacker,
        Phase::AaDefender,
        Phase::SubAttacker,
        Phase::SubDefender,
        Phase::Attacker,
        Phase::Defender,
    ];

    pub fn next(self) -> Phase {
        match self {
            Phase::AaAttacker => Phase::AaDefender,
            Phase::AaDefender => Phase::SubAttacker,
            Phase::SubAttacker => Phase::SubDefender,
            Phase::SubDefender => Phase::Attacker,
            Phase::Attacker => Phase::Defender,
            Phase::Defender => Phase::AaAttacker,
        }
    }

    /// Side whose units fire in this phase
    pub fn firing_side(self) -> Side {
        match self {
            Phase::AaAttacker | Phase::SubAttacker | Phase::Attacker => Side::Attacker,
            Phase::AaDefender | Phase::SubDefender | Phase::Defender => Side::Defender,
        }
    }

    pub fn is_aa(self) -> bool {
        matches!(self, Phase::AaAttacker | Phase::AaDefender)
    }

    pub fn is_first_strike(self) -> bool {
        matches!(self, Phase::SubAttacker | Phase::SubDefender)
    }

    /// A new round starts once the attacker's regular fire has been resolved
    pub fn ends_round(self) -> bool {
        self == Phase::Attacker
    }
}
