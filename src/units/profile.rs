//! Per-type combat attributes
//!
//! A profile is plain data. Everything the tree needs to decide who fires at
//! whom, with how many dice and at what power, is read from here.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::Side;

/// Combat attributes shared by every unit of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitProfile {
    pub type_name: String,
    pub attack: i32,
    pub defense: i32,
    pub attack_rolls: u32,
    pub defense_rolls: u32,
    /// Hits absorbed before the unit dies
    pub hit_points: u32,

    /// Never targeted by regular fire and does not keep a battle going
    pub is_infrastructure: bool,
    /// Fires in the sub phases instead of the regular ones
    pub is_first_strike: bool,
    /// Consumed for every hit it scores
    pub is_suicide_on_hit: bool,
    pub is_suicide_on_attack: bool,
    pub is_suicide_on_defense: bool,
    /// May submerge when only air units oppose it
    pub can_evade: bool,
    pub is_air: bool,
    pub is_sea: bool,
    /// Cancels the enemy's first-strike and targeting restrictions
    pub is_destroyer: bool,
    pub is_transport: bool,
    /// Transport that is allowed to take part in combat
    pub is_combat_transport: bool,
    /// Counts as an air unit for AA that targets airborne forces
    pub is_airborne: bool,
    /// Treated as infrastructure when bombing damages rather than destroys
    pub can_be_damaged: bool,

    /// Type names this unit may not fire at
    pub can_not_target: AHashSet<String>,
    /// Type names that may not fire at this unit unless they field a destroyer
    pub can_not_be_targeted_by: AHashSet<String>,

    pub aa: Option<AaProfile>,
    pub support: Option<SupportProfile>,
}

impl Default for UnitProfile {
    fn default() -> Self {
        Self {
            type_name: String::new(),
            attack: 0,
            defense: 0,
            attack_rolls: 1,
            defense_rolls: 1,
            hit_points: 1,
            is_infrastructure: false,
            is_first_strike: false,
            is_suicide_on_hit: false,
            is_suicide_on_attack: false,
            is_suicide_on_defense: false,
            can_evade: false,
            is_air: false,
            is_sea: false,
            is_destroyer: false,
            is_transport: false,
            is_combat_transport: false,
            is_airborne: false,
            can_be_damaged: false,
            can_not_target: AHashSet::new(),
            can_not_be_targeted_by: AHashSet::new(),
            aa: None,
            support: None,
        }
    }
}

impl UnitProfile {
    pub fn new(type_name: impl Into<String>, attack: i32, defense: i32) -> Self {
        Self {
            type_name: type_name.into(),
            attack,
            defense,
            ..Default::default()
        }
    }

    /// Base power when fighting for `side`
    pub fn power(&self, side: Side) -> i32 {
        match side {
            Side::Attacker => self.attack,
            Side::Defender => self.defense,
        }
    }

    /// Dice rolled per unit when fighting for `side`
    pub fn rolls(&self, side: Side) -> u32 {
        match side {
            Side::Attacker => self.attack_rolls,
            Side::Defender => self.defense_rolls,
        }
    }

    pub fn is_land(&self) -> bool {
        !self.is_sea && !self.is_air
    }

    pub fn is_aa(&self) -> bool {
        self.aa.is_some()
    }

    /// Transport that cannot defend itself
    pub fn is_non_combat_transport(&self) -> bool {
        self.is_transport && !self.is_combat_transport
    }

    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = hit_points;
        self
    }

    pub fn with_rolls(mut self, attack_rolls: u32, defense_rolls: u32) -> Self {
        self.attack_rolls = attack_rolls;
        self.defense_rolls = defense_rolls;
        self
    }

    pub fn first_strike(mut self) -> Self {
        self.is_first_strike = true;
        self
    }

    pub fn evasive(mut self) -> Self {
        self.can_evade = true;
        self
    }

    pub fn air(mut self) -> Self {
        self.is_air = true;
        self
    }

    pub fn sea(mut self) -> Self {
        self.is_sea = true;
        self
    }

    pub fn destroyer(mut self) -> Self {
        self.is_destroyer = true;
        self
    }

    pub fn infrastructure(mut self) -> Self {
        self.is_infrastructure = true;
        self
    }

    pub fn transport(mut self) -> Self {
        self.is_transport = true;
        self
    }

    pub fn airborne(mut self) -> Self {
        self.is_airborne = true;
        self
    }

    pub fn damageable(mut self) -> Self {
        self.can_be_damaged = true;
        self
    }

    pub fn suicide_on_hit(mut self) -> Self {
        self.is_suicide_on_hit = true;
        self
    }

    pub fn cannot_target<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.can_not_target.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn cannot_be_targeted_by<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.can_not_be_targeted_by
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_aa(mut self, aa: AaProfile) -> Self {
        self.aa = Some(aa);
        self
    }

    pub fn with_support(mut self, support: SupportProfile) -> Self {
        self.support = Some(support);
        self
    }
}

/// Anti-air capability of a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AaProfile {
    /// Units sharing an AA type fire as one group
    pub aa_type: String,
    pub attack: i32,
    pub defense: i32,
    /// Overrides the game's dice sides for this AA
    pub dice_sides: Option<u32>,
    /// Shots per unit; negative means one per eligible target
    pub max_attacks: i32,
    /// Rounds in which this AA fires; negative means every round
    pub max_rounds: i32,
    pub fires_on_offense: bool,
    pub fires_on_defense: bool,
    /// Enemy type names this AA fires at
    pub targets: AHashSet<String>,
}

impl Default for AaProfile {
    fn default() -> Self {
        Self {
            aa_type: "AA".to_string(),
            attack: 0,
            defense: 0,
            dice_sides: None,
            max_attacks: 1,
            max_rounds: 1,
            fires_on_offense: false,
            fires_on_defense: true,
            targets: AHashSet::new(),
        }
    }
}

impl AaProfile {
    pub fn new<I, S>(aa_type: impl Into<String>, defense: i32, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aa_type: aa_type.into(),
            defense,
            targets: targets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn power(&self, side: Side) -> i32 {
        match side {
            Side::Attacker => self.attack,
            Side::Defender => self.defense,
        }
    }

    pub fn fires_for(&self, side: Side) -> bool {
        match side {
            Side::Attacker => self.fires_on_offense,
            Side::Defender => self.fires_on_defense,
        }
    }

    /// Whether the AA still fires after `completed_rounds` full rounds
    pub fn fires_in_round(&self, completed_rounds: u32) -> bool {
        self.max_rounds < 0 || (completed_rounds as i64) < self.max_rounds as i64
    }

    /// Rounds with a finite limit, used to keep round-limited states apart
    pub fn round_limit(&self) -> Option<u32> {
        u32::try_from(self.max_rounds).ok()
    }
}

/// Bonus a unit lends to other units fighting alongside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportProfile {
    pub bonus: i32,
    /// Number of supported units that receive the bonus
    pub count: u32,
    pub supports: AHashSet<String>,
    pub offense: bool,
    pub defense: bool,
}

impl Default for SupportProfile {
    fn default() -> Self {
        Self {
            bonus: 1,
            count: 1,
            supports: AHashSet::new(),
            offense: true,
            defense: false,
        }
    }
}

impl SupportProfile {
    pub fn new<I, S>(bonus: i32, count: u32, supports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bonus,
            count,
            supports: supports.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn applies_to(&self, side: Side, type_name: &str) -> bool {
        let active = match side {
            Side::Attacker => self.offense,
            Side::Defender => self.defense,
        };
        active && self.supports.contains(type_name)
    }
}
