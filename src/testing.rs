//! Battle fixtures shared by unit tests

use crate::context::BattleContext;
use crate::core::config::CalculatorConfig;
use crate::core::types::{PlayerId, UnitId};
use crate::rules::{BattleSite, GameRules};
use crate::units::{UnitProfile, UnitRoster};

pub(crate) struct Fixture {
    pub roster: UnitRoster,
    pub rules: GameRules,
    pub config: CalculatorConfig,
    pub site: BattleSite,
    pub attackers: Vec<UnitId>,
    pub defenders: Vec<UnitId>,
}

impl Fixture {
    pub fn land() -> Self {
        Self {
            roster: UnitRoster::new(),
            rules: GameRules::default(),
            config: CalculatorConfig::default(),
            site: BattleSite::land("Karelia"),
            attackers: Vec::new(),
            defenders: Vec::new(),
        }
    }

    pub fn water() -> Self {
        Self {
            site: BattleSite::water("Sea Zone 5"),
            ..Self::land()
        }
    }

    pub fn unit_type(mut self, profile: UnitProfile) -> Self {
        self.roster.add_type(profile);
        self
    }

    pub fn attack(mut self, type_name: &str, count: usize) -> Self {
        let units = self.roster.spawn_many(type_name, count).unwrap();
        self.attackers.extend(units);
        self
    }

    pub fn defend(mut self, type_name: &str, count: usize) -> Self {
        let units = self.roster.spawn_many(type_name, count).unwrap();
        self.defenders.extend(units);
        self
    }

    pub fn rules(mut self, update: impl FnOnce(&mut GameRules)) -> Self {
        update(&mut self.rules);
        self
    }

    pub fn context(&self) -> BattleContext<'_> {
        BattleContext::new(
            &self.roster,
            &self.rules,
            &self.config,
            PlayerId::new("Russians"),
            PlayerId::new("Germans"),
            self.site.clone(),
            &self.attackers,
            &self.defenders,
            &[],
        )
        .unwrap()
    }
}

pub(crate) fn infantry() -> UnitProfile {
    UnitProfile::new("infantry", 1, 2)
}

pub(crate) fn armour() -> UnitProfile {
    UnitProfile::new("armour", 3, 3)
}

pub(crate) fn fighter() -> UnitProfile {
    UnitProfile::new("fighter", 3, 4).air()
}

pub(crate) fn submarine() -> UnitProfile {
    UnitProfile::new("submarine", 2, 1)
        .sea()
        .first_strike()
        .evasive()
        .cannot_target(["fighter", "bomber"])
        .cannot_be_targeted_by(["fighter", "bomber"])
}

pub(crate) fn destroyer() -> UnitProfile {
    UnitProfile::new("destroyer", 2, 2).sea().destroyer()
}

pub(crate) fn battleship() -> UnitProfile {
    UnitProfile::new("battleship", 4, 4).sea().with_hit_points(2)
}

pub(crate) fn transport() -> UnitProfile {
    UnitProfile::new("transport", 0, 0).sea().transport()
}
