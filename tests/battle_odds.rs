//! End-to-end odds for small battles with known closed-form answers
//!
//! Each battle here reduces to a few absorbing states per round, so the
//! share of decided mass going to each outcome can be worked out by hand.

use approx::assert_abs_diff_eq;
use battle_tree::{
    AaProfile, AggregateResults, BattleCalculator, BattleRequest, BattleSite, BattleTreeCalculator,
    CalculatorConfig, GameRules, PlayerId, Side, UnitId, UnitProfile, UnitRoster,
};

struct Battle {
    roster: UnitRoster,
    rules: GameRules,
    config: CalculatorConfig,
    site: BattleSite,
    attackers: Vec<UnitId>,
    defenders: Vec<UnitId>,
}

impl Battle {
    fn land() -> Self {
        Self {
            roster: UnitRoster::new(),
            rules: GameRules::default(),
            config: CalculatorConfig::default(),
            site: BattleSite::land("Karelia"),
            attackers: Vec::new(),
            defenders: Vec::new(),
        }
    }

    fn water() -> Self {
        Self {
            site: BattleSite::water("Sea Zone 5"),
            ..Self::land()
        }
    }

    fn unit_type(mut self, profile: UnitProfile) -> Self {
        self.roster.add_type(profile);
        self
    }

    fn attack(mut self, type_name: &str, count: usize) -> Self {
        let units = self.roster.spawn_many(type_name, count).unwrap();
        self.attackers.extend(units);
        self
    }

    fn defend(mut self, type_name: &str, count: usize) -> Self {
        let units = self.roster.spawn_many(type_name, count).unwrap();
        self.defenders.extend(units);
        self
    }

    fn request(&self) -> BattleRequest {
        BattleRequest::new(
            PlayerId::new("Russians"),
            PlayerId::new("Germans"),
            self.site.clone(),
            self.attackers.clone(),
            self.defenders.clone(),
        )
    }

    fn run(self) -> AggregateResults {
        let request = self.request();
        let calculator = BattleTreeCalculator::with_config(self.roster, self.rules, self.config).unwrap();
        calculator.calculate_request(&request).unwrap()
    }
}

fn infantry() -> UnitProfile {
    UnitProfile::new("infantry", 1, 2)
}

fn armour() -> UnitProfile {
    UnitProfile::new("armour", 3, 3)
}

fn fighter() -> UnitProfile {
    UnitProfile::new("fighter", 3, 4).air()
}

fn submarine() -> UnitProfile {
    UnitProfile::new("submarine", 2, 1)
        .sea()
        .first_strike()
        .evasive()
        .cannot_target(["fighter"])
        .cannot_be_targeted_by(["fighter"])
}

fn total(results: &AggregateResults) -> f64 {
    results.attacker_win + results.defender_win + results.draw + results.indeterminate
}

#[test]
fn test_infantry_duel() {
    let results = Battle::land()
        .unit_type(infantry())
        .attack("infantry", 1)
        .defend("infantry", 1)
        .run();

    // per round: win 4/36, lose 10/36, tie 2/36, nothing 20/36
    let repeat: f64 = 20.0 / 36.0;
    assert_abs_diff_eq!(results.attacker_win, 0.25 * (1.0 - repeat.powi(7)), epsilon = 1e-12);
    assert_abs_diff_eq!(results.indeterminate, repeat.powi(7), epsilon = 1e-12);
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.625, epsilon = 1e-12);
    assert_abs_diff_eq!(results.draw_percent(), 0.125, epsilon = 1e-12);
    assert_abs_diff_eq!(total(&results), 1.0, epsilon = 1e-12);
    assert_eq!(results.roll_count, 1);
}

#[test]
fn test_certain_hits_destroy_both_sides() {
    let results = Battle::land()
        .unit_type(UnitProfile::new("artillery", 6, 6))
        .attack("artillery", 1)
        .defend("artillery", 1)
        .run();

    assert_abs_diff_eq!(results.draw, 1.0, epsilon = 1e-12);
    assert_eq!(results.attacking_units[0].chance, 0.0);
    assert_eq!(results.defending_units[0].chance, 0.0);
    assert_abs_diff_eq!(results.average_rounds, 1.0, epsilon = 1e-12);
}

#[test]
fn test_units_without_power_never_finish() {
    let results = Battle::land()
        .unit_type(UnitProfile::new("militia", 0, 0))
        .attack("militia", 1)
        .defend("militia", 1)
        .run();

    assert_abs_diff_eq!(results.indeterminate, 1.0, epsilon = 1e-12);
    assert_eq!(results.decided(), 0.0);
    assert_eq!(results.stats.loops_closed, 1);
}

#[test]
fn test_attack_with_nothing_is_lost() {
    let results = Battle::land()
        .unit_type(infantry())
        .defend("infantry", 2)
        .run();

    assert_eq!(results.defender_win, 1.0);
    assert!(results.attacking_units.is_empty());
    assert!(results.defending_units.iter().all(|unit| unit.chance == 1.0));
}

#[test]
fn test_armour_against_infantry() {
    let results = Battle::land()
        .unit_type(infantry())
        .unit_type(armour())
        .attack("armour", 1)
        .defend("infantry", 1)
        .run();

    // win 1/3, tie 1/6, lose 1/6, nothing 1/3
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(results.draw_percent(), 0.25, epsilon = 1e-9);
}

#[test]
fn test_two_hit_battleship_against_cruiser() {
    let results = Battle::water()
        .unit_type(UnitProfile::new("battleship", 4, 4).sea().with_hit_points(2))
        .unit_type(UnitProfile::new("cruiser", 3, 3).sea())
        .attack("battleship", 1)
        .defend("cruiser", 1)
        .run();

    // the first cruiser hit only costs the battleship a hit point
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.88, epsilon = 1e-4);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.04, epsilon = 1e-4);
    assert_abs_diff_eq!(results.draw_percent(), 0.08, epsilon = 1e-4);
}

#[test]
fn test_sub_duel_without_defender_sneak_attack() {
    let results = Battle::water()
        .unit_type(submarine())
        .attack("submarine", 1)
        .defend("submarine", 1)
        .run();

    // the attacker's hits sink the defending sub before it can fire back
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.75, epsilon = 1e-9);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(results.draw, 0.0, epsilon = 1e-12);
}

#[test]
fn test_sub_duel_with_defender_sneak_attack() {
    let mut battle = Battle::water()
        .unit_type(submarine())
        .attack("submarine", 1)
        .defend("submarine", 1);
    battle.rules.defending_subs_sneak_attack = true;
    let results = battle.run();

    // both sneak, so hit subs still return fire
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.625, epsilon = 1e-9);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(results.draw_percent(), 0.125, epsilon = 1e-9);
}

#[test]
fn test_sub_duel_under_ww2v2() {
    let mut battle = Battle::water()
        .unit_type(submarine())
        .attack("submarine", 1)
        .defend("submarine", 1);
    battle.rules.ww2v2 = true;
    let results = battle.run();

    // no destroyers, so hit subs on both sides fire back
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.625, epsilon = 1e-9);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(results.draw_percent(), 0.125, epsilon = 1e-9);
}

#[test]
fn test_sub_submerges_from_aircraft() {
    let results = Battle::water()
        .unit_type(submarine())
        .unit_type(fighter())
        .attack("fighter", 1)
        .defend("submarine", 1)
        .run();

    assert_eq!(results.attacker_win, 1.0);
    // the submerged sub survives the lost battle
    assert_eq!(results.defending_units[0].chance, 1.0);
    assert_eq!(results.attacking_units[0].chance, 1.0);
}

#[test]
fn test_lone_anti_aircraft_gun_concedes() {
    let results = Battle::land()
        .unit_type(fighter())
        .unit_type(
            UnitProfile::new("aa_gun", 0, 0)
                .infrastructure()
                .with_aa(AaProfile::new("AA", 1, ["fighter"])),
        )
        .attack("fighter", 1)
        .defend("aa_gun", 1)
        .run();

    assert_eq!(results.attacker_win, 1.0);
    assert_eq!(results.stats.terminals, 1);
    assert_eq!(results.average_rounds, 0.0);
}

#[test]
fn test_repeat_calculation_is_identical() {
    let battle = Battle::land()
        .unit_type(infantry())
        .unit_type(armour())
        .attack("infantry", 3)
        .attack("armour", 2)
        .defend("infantry", 4);
    let request = battle.request();
    let calculator = BattleTreeCalculator::new(battle.roster, battle.rules);

    let first = calculator.calculate_request(&request).unwrap();
    let second = calculator.calculate_request(&request).unwrap();
    assert_eq!(first.attacker_win.to_bits(), second.attacker_win.to_bits());
    assert_eq!(first.defender_win.to_bits(), second.defender_win.to_bits());
    assert_eq!(first.draw.to_bits(), second.draw.to_bits());
    assert_eq!(first.indeterminate.to_bits(), second.indeterminate.to_bits());
    assert_eq!(first.attacking_units, second.attacking_units);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn test_pruning_moves_mass_to_indeterminate() {
    let battle = |threshold: f64| {
        let mut battle = Battle::land()
            .unit_type(infantry())
            .unit_type(armour())
            .attack("infantry", 2)
            .attack("armour", 2)
            .defend("infantry", 3);
        battle.config = battle.config.with_prune_threshold(threshold);
        battle.run()
    };
    let exact = battle(0.0);
    let coarse = battle(0.6);

    assert_eq!(exact.stats.pruned, 0);
    assert!(coarse.stats.pruned > 0);
    assert!(coarse.indeterminate > exact.indeterminate);
    assert_abs_diff_eq!(total(&exact), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(total(&coarse), 1.0, epsilon = 1e-9);
    assert_outcomes_within_discarded_mass(&exact, &coarse);
}

/// Every decided outcome moves by no more than the mass pruning discarded
fn assert_outcomes_within_discarded_mass(exact: &AggregateResults, pruned: &AggregateResults) {
    let discarded = pruned.indeterminate - exact.indeterminate + 1e-9;
    assert!((exact.attacker_win - pruned.attacker_win).abs() <= discarded);
    assert!((exact.defender_win - pruned.defender_win).abs() <= discarded);
    assert!((exact.draw - pruned.draw).abs() <= discarded);
}

#[test]
fn test_default_pruning_stays_within_discarded_mass() {
    let battle = |threshold: f64| {
        let mut battle = Battle::land()
            .unit_type(infantry())
            .attack("infantry", 5)
            .defend("infantry", 5);
        battle.config = battle.config.with_prune_threshold(threshold);
        battle.run()
    };
    let exact = battle(0.0);
    let pruned = battle(0.005);

    assert!(pruned.stats.pruned > 0);
    assert!(pruned.indeterminate >= exact.indeterminate);
    assert_outcomes_within_discarded_mass(&exact, &pruned);
}

#[test]
fn test_transport_survivor_takes_emptied_sea_zone() {
    let mut battle = Battle::water()
        .unit_type(UnitProfile::new("dreadnought", 6, 6).sea())
        .unit_type(UnitProfile::new("transport", 0, 0).sea().transport())
        .attack("dreadnought", 1)
        .attack("transport", 1)
        .defend("dreadnought", 1);
    battle.rules.transport_casualties_restricted = true;
    let results = battle.run();

    // both warships sink in the first exchange, the transport holds the zone
    assert_eq!(results.attacker_win, 1.0);
    assert_eq!(results.defender_win, 0.0);
    assert_eq!(results.attacking_units[0].chance, 0.0);
    assert_eq!(results.attacking_units[1].chance, 1.0);
    assert_eq!(results.defending_units[0].chance, 0.0);
}

#[test]
fn test_escorted_transport_wins_mutual_kills() {
    let mut battle = Battle::water()
        .unit_type(UnitProfile::new("cruiser", 2, 2).sea())
        .unit_type(UnitProfile::new("transport", 0, 0).sea().transport())
        .attack("cruiser", 1)
        .attack("transport", 1)
        .defend("cruiser", 1);
    battle.rules.transport_casualties_restricted = true;
    let results = battle.run();

    // mutual kills leave the transport standing, so they count for the attacker
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.6, epsilon = 1e-9);
    assert_abs_diff_eq!(results.defender_win_percent(), 0.4, epsilon = 1e-9);
    assert_eq!(results.draw, 0.0);
}

#[test]
fn test_mixed_battle_sums_to_one() {
    let results = Battle::land()
        .unit_type(infantry())
        .unit_type(armour())
        .unit_type(fighter())
        .attack("infantry", 3)
        .attack("armour", 2)
        .attack("fighter", 1)
        .defend("infantry", 5)
        .run();

    assert_abs_diff_eq!(total(&results), 1.0, epsilon = 1e-9);
    for side in Side::BOTH {
        for unit in results.units(side) {
            assert!((0.0..=1.0 + 1e-9).contains(&unit.chance), "{unit:?}");
        }
    }
    // casualties are taken in list order, so the fighter outlives the infantry
    let chances: Vec<f64> = results.attacking_units.iter().map(|unit| unit.chance).collect();
    assert!(chances[5] >= chances[0]);
}

#[test]
fn test_batch_keeps_request_order() {
    let mut roster = UnitRoster::new().with_type(infantry()).with_type(armour());
    let infantry_a = roster.spawn("infantry").unwrap();
    let armour_a = roster.spawn("armour").unwrap();
    let infantry_d = roster.spawn("infantry").unwrap();
    let site = BattleSite::land("Karelia");

    let requests = vec![
        BattleRequest::new(
            PlayerId::new("a"),
            PlayerId::new("d"),
            site.clone(),
            vec![infantry_a],
            vec![infantry_d],
        ),
        BattleRequest::new(
            PlayerId::new("a"),
            PlayerId::new("d"),
            site.clone(),
            vec![armour_a],
            vec![infantry_d],
        ),
        BattleRequest::new(PlayerId::new("a"), PlayerId::new("d"), site, vec![UnitId(99)], vec![]),
    ];
    let calculator = BattleTreeCalculator::new(roster, GameRules::default());
    let batch = calculator.calculate_batch(&requests);

    assert_eq!(batch.len(), 3);
    for (request, result) in requests.iter().zip(&batch).take(2) {
        let single = calculator.calculate_request(request).unwrap();
        assert_eq!(result.as_ref().unwrap().attacker_win, single.attacker_win);
    }
    assert!(batch[2].is_err());
}

#[test]
fn test_trait_object_call() {
    let battle = Battle::land()
        .unit_type(infantry())
        .attack("infantry", 1)
        .defend("infantry", 1);
    let request = battle.request();
    let calculator: Box<dyn BattleCalculator> =
        Box::new(BattleTreeCalculator::new(battle.roster, battle.rules));

    let results = calculator
        .calculate(
            &request.attacker,
            &request.defender,
            &request.location,
            &request.attacking_units,
            &request.defending_units,
            &[],
            &[],
            false,
            1,
        )
        .unwrap();
    assert_abs_diff_eq!(results.attacker_win_percent(), 0.25, epsilon = 1e-12);
}
