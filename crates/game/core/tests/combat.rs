mod common;

use common::{ARCHER, COWARD, HEROES, KEEPER, KNIGHT, Sim, TROLL, at_slab};
use lair_core::env::{Obstacle, ObstacleKind};
use lair_core::state::CombatFlags;
use lair_core::{
    AttackType, BattleId, CombatError, CombatState, CreatureId, EngineError, GameConfig, LinkError,
    PlayerId, PlayerState, StanceInputs, StateId, StateReturn, TransitionError, choose_combat_state,
};

fn gang_up(sim: &mut Sim, attackers: usize) -> (CreatureId, Vec<CreatureId>) {
    let victim = sim.spawn(KNIGHT, HEROES, at_slab(5, 5));
    let trolls: Vec<CreatureId> = (0..attackers)
        .map(|i| sim.spawn(TROLL, KEEPER, at_slab(4, 3 + i as i32)))
        .collect();
    let mut engine = sim.engine();
    for troll in &trolls {
        engine
            .set_creature_in_combat(*troll, victim, AttackType::Melee)
            .expect("troll can fight");
    }
    (victim, trolls)
}

#[test]
fn opponent_slots_never_exceed_four() {
    let mut sim = Sim::new();
    let (victim, trolls) = gang_up(&mut sim, 7);

    let control = sim.world.control(victim);
    assert_eq!(control.opponents_melee.count(), GameConfig::MAX_OPPONENTS);
    assert!(control.opponents_ranged.count() <= GameConfig::MAX_OPPONENTS);

    let waiting = trolls
        .iter()
        .filter(|troll| sim.world.control(**troll).combat.state == CombatState::Waiting)
        .count();
    assert_eq!(waiting, 3);
    assert_eq!(sim.world.player(KEEPER).fights_num, 7);
}

#[test]
fn leaving_frees_only_the_occupied_slot() {
    let mut sim = Sim::new();
    let (victim, trolls) = gang_up(&mut sim, 6);
    let melee: Vec<CreatureId> = trolls
        .iter()
        .copied()
        .filter(|troll| sim.world.control(victim).opponents_melee.contains(*troll))
        .collect();
    let waiting: Vec<CreatureId> = trolls
        .iter()
        .copied()
        .filter(|troll| !melee.contains(troll))
        .collect();
    assert_eq!(melee.len(), 4);

    sim.engine().set_start_state(waiting[0]);
    assert_eq!(sim.world.control(victim).opponents_melee.count(), 4);
    assert!(sim.world.control(waiting[0]).combat_flags.is_empty());

    let leaver = melee[1];
    sim.engine().set_start_state(leaver);
    let slots = &sim.world.control(victim).opponents_melee;
    assert_eq!(slots.count(), 3);
    assert!(!slots.contains(leaver));
    for stayer in melee.iter().filter(|troll| **troll != leaver) {
        assert!(slots.contains(*stayer));
    }
    assert_eq!(sim.world.player(KEEPER).fights_num, 4);
}

#[test]
fn joining_then_leaving_restores_the_battle() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));

    sim.engine()
        .set_creature_in_combat(troll, knight, AttackType::Melee)
        .unwrap();
    let battle = sim.world.control(troll).battle_id;
    assert!(battle.is_some());
    assert_eq!(sim.world.control(knight).battle_id, battle);
    assert_eq!(sim.world.battles.get(battle).fighters_num, 2);
    assert_eq!(sim.world.battle_members(battle).unwrap().len(), 2);

    sim.engine().set_start_state(troll);
    assert_eq!(sim.world.battles.get(battle).fighters_num, 0);
    assert!(sim.world.battles.get(battle).first_creatr.is_none());
    for creature in [troll, knight] {
        let control = sim.world.control(creature);
        assert_eq!(control.battle_id, BattleId::NONE);
        assert!(control.battle_prev.is_none());
        assert!(control.battle_next.is_none());
    }
}

#[test]
fn second_fighter_joins_the_existing_battle() {
    let mut sim = Sim::new();
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(6, 6));
    let first = sim.spawn(TROLL, KEEPER, at_slab(6, 5));
    let second = sim.spawn(TROLL, KEEPER, at_slab(5, 6));
    let mut engine = sim.engine();
    engine.set_creature_in_combat(first, knight, AttackType::Melee).unwrap();
    engine.set_creature_in_combat(second, knight, AttackType::Melee).unwrap();

    let battle = sim.world.control(first).battle_id;
    assert_eq!(sim.world.control(second).battle_id, battle);
    assert_eq!(sim.world.battles.get(battle).fighters_num, 3);
}

#[test]
fn already_fighting_creature_is_rejected() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));
    let other = sim.spawn(KNIGHT, HEROES, at_slab(4, 4));
    let mut engine = sim.engine();
    engine.set_creature_in_combat(troll, knight, AttackType::Melee).unwrap();

    let again = engine.set_creature_in_combat(troll, other, AttackType::Melee);
    assert!(again.is_err());
    assert_eq!(sim.world.control(troll).combat.battle_enemy, knight);
    assert!(sim.world.control(other).opponents_melee.is_empty());
}

#[test]
fn stance_rule_examples() {
    let inputs = |preferred, has_ranged_weapon, melee_slot_free, ranged_slot_free| StanceInputs {
        preferred,
        model_prefers_ranged: false,
        has_ranged_weapon,
        melee_slot_free,
        ranged_slot_free,
    };
    assert_eq!(
        choose_combat_state(inputs(AttackType::Ranged, true, true, true)),
        CombatState::Ranged
    );
    assert_eq!(
        choose_combat_state(inputs(AttackType::Melee, true, false, true)),
        CombatState::Ranged
    );
    for ranged_slot_free in [true, false] {
        assert_eq!(
            choose_combat_state(inputs(AttackType::Melee, false, false, ranged_slot_free)),
            CombatState::Waiting
        );
    }
    assert_eq!(
        choose_combat_state(inputs(AttackType::Melee, true, true, true)),
        CombatState::Melee
    );
}

#[test]
fn archer_takes_a_ranged_slot() {
    let mut sim = Sim::new();
    let archer = sim.spawn(ARCHER, KEEPER, at_slab(2, 2));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(2, 4));
    sim.engine()
        .set_creature_in_combat(archer, knight, AttackType::Melee)
        .unwrap();

    let control = sim.world.control(archer);
    assert_eq!(control.combat.state, CombatState::Ranged);
    assert!(control.combat_flags.contains(CombatFlags::RANGED));
    assert!(sim.world.control(knight).opponents_ranged.contains(archer));
}

#[test]
fn max_fear_scares_of_other_models() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(8, 8));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(8, 9));
    sim.engine()
        .set_creature_in_combat(knight, coward, AttackType::Melee)
        .unwrap();

    assert!(sim.engine().creature_scared(coward, knight));
}

#[test]
fn max_fear_stands_against_its_own_kind() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(8, 8));
    let kin: Vec<CreatureId> = (0..3)
        .map(|i| sim.spawn(COWARD, HEROES, at_slab(9, 7 + i)))
        .collect();
    let mut engine = sim.engine();
    engine.set_creature_in_combat(kin[0], coward, AttackType::Melee).unwrap();
    engine.set_creature_in_combat(kin[1], coward, AttackType::Melee).unwrap();

    assert!(!engine.creature_scared(coward, kin[2]));
}

#[test]
fn fight_to_the_death_ignores_fear() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(8, 8));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(8, 9));
    let mut engine = sim.engine();
    engine
        .set_creature_in_combat_to_the_death(coward, knight, AttackType::Melee)
        .unwrap();

    assert!(engine.creature_is_actually_scared(coward, knight));
    assert!(!engine.creature_scared(coward, knight));
}

#[test]
fn scared_creature_flees_when_its_state_allows() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(12, 12));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(13, 12));

    assert!(sim.engine().creature_scared(coward, knight));
    assert!(!sim.engine().creature_in_flee_zone(coward));

    assert!(sim.engine().creature_look_for_combat(coward).unwrap());
    assert_eq!(sim.state_of(coward), StateId::CreatureCombatFlee);
}

#[test]
fn scared_creature_inside_its_flee_zone_fights() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(12, 12));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(13, 12));
    let here = sim.world.creature(coward).position;
    sim.world.control_mut(coward).unwrap().flee_pos = here;

    let mut engine = sim.engine();
    assert!(engine.creature_scared(coward, knight));
    assert!(engine.creature_in_flee_zone(coward));
    assert!(!engine.creature_too_scared_for_combat(coward, knight));

    assert!(engine.creature_look_for_combat(coward).unwrap());
    assert_eq!(sim.state_of(coward), StateId::CreatureInCombat);
    assert_eq!(sim.world.control(coward).combat.battle_enemy, knight);
}

#[test]
fn state_without_escape_override_blocks_flight() {
    let mut sim = Sim::new();
    let coward = sim.spawn(COWARD, KEEPER, at_slab(12, 12));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(13, 12));
    let mut engine = sim.engine();
    engine.set_state(coward, StateId::CreatureLeaves).unwrap();
    assert!(engine.creature_scared(coward, knight));

    assert!(!engine.creature_look_for_combat(coward).unwrap());
    assert_eq!(sim.state_of(coward), StateId::CreatureLeaves);
}

#[test]
fn refused_combat_leaves_creature_untouched() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));
    let mut engine = sim.engine();
    engine.knock_out_creature(troll, 20).unwrap();

    let refused = engine.set_creature_in_combat(troll, knight, AttackType::Melee);
    assert!(matches!(
        refused,
        Err(lair_core::EngineError::Transition(TransitionError::Refused { .. }))
    ));
    assert_eq!(sim.state_of(troll), StateId::CreatureUnconscious);
    assert!(sim.world.control(troll).combat_flags.is_empty());
    assert!(sim.world.control(knight).opponents_melee.is_empty());
}

#[test]
fn destroying_a_victim_releases_its_attackers() {
    let mut sim = Sim::new();
    let (victim, trolls) = gang_up(&mut sim, 2);
    let battle = sim.world.control(victim).battle_id;

    sim.engine().destroy_creature(victim).unwrap();
    assert!(!sim.world.creature_exists(victim));
    for troll in trolls {
        assert!(sim.world.control(troll).opponents_melee.is_empty());
    }
    assert!(sim.world.battle_members(battle).is_ok());
}

#[test]
fn corrupted_battle_list_is_reported() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));
    sim.engine()
        .set_creature_in_combat(troll, knight, AttackType::Melee)
        .unwrap();
    let battle = sim.world.control(troll).battle_id;
    let head = sim.world.battles.get(battle).first_creatr;
    sim.world.control_mut(head).unwrap().battle_next = head;

    assert!(matches!(
        sim.world.battle_members(battle),
        Err(LinkError::BattleOverrun { .. })
    ));
    assert!(sim.engine().count_creatures_really_in_combat(battle).is_err());
}

#[test]
fn battle_window_shows_distinct_live_battles() {
    let mut sim = Sim::new();
    let mut pairs = Vec::new();
    for i in 0..5 {
        let troll = sim.spawn(TROLL, KEEPER, at_slab(2 * i, 1));
        let knight = sim.spawn(KNIGHT, HEROES, at_slab(2 * i, 2));
        sim.engine()
            .set_creature_in_combat(troll, knight, AttackType::Melee)
            .unwrap();
        pairs.push(troll);
    }
    sim.engine().set_start_state(pairs[1]);

    let mut engine = sim.engine();
    engine.maintain_my_battle_list(KEEPER);
    let window = sim.world.player(KEEPER).visible_battles;
    for (i, battle) in window.iter().enumerate() {
        assert!(battle.is_some());
        assert!(sim.world.battles.get(*battle).fighters_num > 0);
        assert!(!window[i + 1..].contains(battle));
    }
    let sides = &sim.world.player(KEEPER).battlers[0];
    assert_eq!((sides.friendly.len(), sides.enemy.len()), (1, 1));
}

#[test]
fn pending_door_fight_does_not_block_a_fight_to_the_death() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(2, 4));
    let door = Obstacle {
        kind: ObstacleKind::Door,
        id: 3,
        owner: HEROES,
        position: at_slab(2, 3),
    };
    let mut engine = sim.engine();
    engine.set_creature_in_obstacle_combat(troll, door).unwrap();
    engine
        .set_creature_in_combat_to_the_death(troll, knight, AttackType::Melee)
        .unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureInCombat);
    assert!(sim.world.control(troll).fight_til_death);

    let again = sim
        .engine()
        .set_creature_in_combat_to_the_death(troll, knight, AttackType::Melee);
    assert!(matches!(
        again,
        Err(EngineError::Combat(CombatError::AlreadyInCombat(creature))) if creature == troll
    ));
}

#[test]
fn closer_fighter_takes_over_the_weakest_slot() {
    let mut sim = Sim::new();
    let (victim, trolls) = gang_up(&mut sim, 4);
    let fighter = sim.spawn(TROLL, KEEPER, at_slab(5, 4));
    sim.engine()
        .set_creature_in_combat(fighter, victim, AttackType::Melee)
        .unwrap();
    assert_eq!(sim.world.control(fighter).combat.state, CombatState::Waiting);

    sim.engine()
        .change_creature_with_existing_attacker(fighter, victim, AttackType::Melee);

    // The farthest attacker lost its slot to the newcomer.
    let slots = &sim.world.control(victim).opponents_melee;
    assert_eq!(slots.count(), 4);
    assert!(slots.contains(fighter));
    assert!(!slots.contains(trolls[0]));
    assert_eq!(sim.state_of(trolls[0]), StateId::CreatureDoingNothing);
    assert_eq!(sim.state_of(fighter), StateId::CreatureInCombat);
    assert_eq!(sim.world.control(fighter).combat.state, CombatState::Melee);
    assert!(sim.world.control(fighter).combat_flags.contains(CombatFlags::MELEE));
}

#[test]
fn abandoned_fight_reports_a_reset() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));
    let mut engine = sim.engine();
    engine.set_creature_in_combat(troll, knight, AttackType::Melee).unwrap();
    engine.knock_out_creature(knight, 50).unwrap();

    assert_eq!(engine.run_creature_tick(troll).unwrap(), StateReturn::ResetFail);
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert!(sim.world.control(knight).opponents_melee.is_empty());
}

#[test]
fn attacker_without_battle_link_still_leaves_cleanly() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 3));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 4));
    sim.engine()
        .set_creature_in_combat(troll, knight, AttackType::Melee)
        .unwrap();
    sim.world.control_mut(troll).unwrap().battle_id = BattleId::NONE;

    sim.engine().set_start_state(troll);
    assert!(sim.world.control(troll).combat_flags.is_empty());
    assert!(sim.world.control(knight).opponents_melee.is_empty());
    assert_eq!(sim.world.player(KEEPER).fights_num, 0);
}

fn assert_window_is_live_and_distinct(sim: &Sim, player: PlayerId) {
    let window = sim.world.player(player).visible_battles;
    for (i, battle) in window.iter().enumerate() {
        if battle.is_none() {
            continue;
        }
        assert!(sim.world.battles.get(*battle).fighters_num > 0, "{battle} is finished");
        assert!(!window[i + 1..].contains(battle), "{battle} shown twice");
    }
}

#[test]
fn scrolling_the_window_survives_a_dissolving_battle() {
    let mut sim = Sim::new();
    let mut trolls = Vec::new();
    for i in 0..5 {
        let troll = sim.spawn(TROLL, KEEPER, at_slab(3 * i, 1));
        let knight = sim.spawn(KNIGHT, HEROES, at_slab(3 * i, 2));
        sim.engine()
            .set_creature_in_combat(troll, knight, AttackType::Melee)
            .unwrap();
        trolls.push(troll);
    }
    let battles: Vec<BattleId> = trolls
        .iter()
        .map(|troll| sim.world.control(*troll).battle_id)
        .collect();
    let visible = |sim: &Sim| sim.world.player(KEEPER).visible_battles;

    sim.engine().maintain_my_battle_list(KEEPER);
    assert_eq!(visible(&sim), [battles[0], battles[1], battles[2]]);

    assert!(sim.engine().step_battles_forward(KEEPER));
    assert_eq!(visible(&sim), [battles[1], battles[2], battles[3]]);
    assert_window_is_live_and_distinct(&sim, KEEPER);

    sim.engine().set_start_state(trolls[3]);
    assert!(!sim.world.battles.get(battles[3]).is_active());
    sim.engine().maintain_my_battle_list(KEEPER);
    assert_eq!(visible(&sim), [battles[1], battles[2], battles[4]]);
    assert_window_is_live_and_distinct(&sim, KEEPER);

    assert!(sim.engine().step_battles_backward(KEEPER));
    assert_eq!(visible(&sim), [battles[0], battles[1], battles[2]]);
    assert_window_is_live_and_distinct(&sim, KEEPER);

    assert!(sim.engine().step_battles_forward(KEEPER));
    assert_eq!(visible(&sim), [battles[1], battles[2], battles[4]]);
    assert_window_is_live_and_distinct(&sim, KEEPER);
}

#[test]
fn neutral_creature_without_flee_position_stays_put() {
    let mut sim = Sim::new();
    let neutral = PlayerId(2);
    sim.world.players.set(neutral, PlayerState::neutral());
    let troll = sim.spawn(TROLL, neutral, at_slab(6, 6));

    assert!(!sim.engine().setup_combat_flee_position(troll));
    assert_eq!(sim.world.control(troll).flee_pos, at_slab(6, 6));

    let keeper_troll = sim.spawn(TROLL, KEEPER, at_slab(7, 7));
    assert!(sim.engine().setup_combat_flee_position(keeper_troll));
    assert_eq!(sim.world.control(keeper_troll).flee_pos, common::HEART);
}
