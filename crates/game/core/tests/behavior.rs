mod common;

use common::{HEROES, KEEPER, KNIGHT, Sim, TROLL, at_slab};
use lair_core::env::{Obstacle, ObstacleKind};
use lair_core::{
    AnnoyReason, CreatureId, GameTurn, JobData, RoomId, RoomKind, StateId, StateReturn,
};

const LAIR: RoomId = RoomId(1);
const TREASURY: RoomId = RoomId(2);
const GYM: RoomId = RoomId(3);

/// Ticks `creature` until `done` holds, at most `limit` times.
fn tick_until(sim: &mut Sim, creature: CreatureId, limit: usize, done: impl Fn(&Sim) -> bool) -> bool {
    for _ in 0..limit {
        if done(sim) {
            return true;
        }
        let mut engine = sim.engine();
        let next = engine.turn() + 1;
        engine.world_mut().turn = next;
        if engine.run_creature_tick(creature).unwrap() == StateReturn::Deleted {
            return done(sim);
        }
    }
    done(sim)
}

#[test]
fn sweep_ticks_every_creature_once() {
    let mut sim = Sim::new();
    for i in 0..3 {
        sim.spawn(TROLL, KEEPER, at_slab(i, 0));
    }
    sim.spawn(KNIGHT, HEROES, at_slab(40, 40));

    let summary = sim.engine().process_turn();
    assert_eq!(summary.turn, GameTurn(1));
    assert_eq!(summary.ticks(), 4);
    assert_eq!(summary.errors, 0);
    assert_eq!(sim.world.turn, GameTurn(1));
}

#[test]
fn creature_walks_home_and_sleeps() {
    let mut sim = Sim::new();
    sim.rooms.add(LAIR, RoomKind::Lair, KEEPER, at_slab(3, 3));
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 6));
    sim.engine().set_state(troll, StateId::CreatureGoingHomeToSleep).unwrap();

    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::MoveToPosition);
    assert_eq!(sim.world.creature(troll).continue_state, StateId::AtLairToSleep);
    assert_eq!(sim.world.control(troll).lair_room, LAIR);

    assert!(tick_until(&mut sim, troll, 100, |sim| sim.state_of(troll) == StateId::CreatureSleep));
    assert_eq!(sim.world.creature(troll).position, at_slab(3, 3));
    assert_eq!(sim.world.control(troll).work_room, LAIR);
    assert_eq!(sim.world.rooms.get(LAIR).workers_num, 1);

    // Losing the lair wakes the creature and empties the room list.
    sim.rooms.rooms.remove(&LAIR);
    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert_eq!(sim.world.rooms.get(LAIR).workers_num, 0);
    assert!(sim.world.control(troll).work_room.is_none());
}

#[test]
fn lair_lost_on_the_way_resets_the_move() {
    let mut sim = Sim::new();
    sim.rooms.add(LAIR, RoomKind::Lair, KEEPER, at_slab(3, 3));
    let troll = sim.spawn(TROLL, KEEPER, at_slab(3, 9));
    sim.engine().set_state(troll, StateId::CreatureGoingHomeToSleep).unwrap();
    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::MoveToPosition);

    sim.rooms.rooms.remove(&LAIR);
    assert_eq!(sim.engine().run_creature_tick(troll).unwrap(), StateReturn::ResetOk);
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert!(sim.world.control(troll).lair_room.is_none());
}

#[test]
fn idle_creature_collects_its_pay() {
    let mut sim = Sim::new();
    sim.config.salary_interval = 10;
    sim.rooms.add(TREASURY, RoomKind::Treasury, KEEPER, at_slab(2, 4));
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    sim.world.turn = GameTurn(20);

    assert!(tick_until(&mut sim, troll, 200, |sim| sim.world.control(troll).last_paid != GameTurn::ZERO));
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert_eq!(sim.world.control(troll).annoyance_of(AnnoyReason::NotPaid), 0);
}

#[test]
fn missing_treasury_angers_unpaid_creature() {
    let mut sim = Sim::new();
    sim.config.salary_interval = 10;
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    sim.world.turn = GameTurn(20);

    let mut engine = sim.engine();
    assert!(engine.creature_is_due_salary(troll).unwrap());
    engine.run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureWantsSalary);

    let mut engine = sim.engine();
    assert_eq!(engine.run_creature_tick(troll).unwrap(), StateReturn::ResetFail);
    assert!(!engine.creature_is_due_salary(troll).unwrap());
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert_eq!(sim.world.control(troll).annoyance_of(AnnoyReason::NotPaid), 60);
}

#[test]
fn livid_creature_sulks_until_calm() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    sim.engine().anger_set_creature_anger(troll, 250, AnnoyReason::NotPaid);
    assert!(sim.engine().anger_is_creature_livid(troll));
    assert_eq!(sim.world.player(KEEPER).creatures_annoyed, 1);

    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::PersonSulkHeadForLair);

    assert!(tick_until(&mut sim, troll, 50, |sim| sim.state_of(troll) == StateId::CreatureDoingNothing));
    assert!(!sim.engine().anger_is_creature_angry(troll));
    assert_eq!(sim.world.player(KEEPER).creatures_annoyed, 0);
}

#[test]
fn creature_at_anger_cap_leaves_the_dungeon() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    sim.engine().anger_set_creature_anger(troll, 10_000, AnnoyReason::NoLair);

    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureLeaves);
    assert_eq!(sim.engine().run_creature_tick(troll).unwrap(), StateReturn::Deleted);
    assert!(!sim.world.creature_exists(troll));
}

#[test]
fn training_raises_the_level() {
    let mut sim = Sim::new();
    sim.rooms.add(GYM, RoomKind::Training, KEEPER, at_slab(5, 2));
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));

    assert!(tick_until(&mut sim, troll, 100, |sim| sim.state_of(troll) == StateId::Training));
    assert_eq!(sim.world.rooms.get(GYM).workers_num, 1);
    assert!(matches!(sim.world.control(troll).job, JobData::Training { .. }));

    assert!(tick_until(&mut sim, troll, 400, |sim| sim.world.creature(troll).level == 2));
    assert_eq!(sim.world.rooms.get(GYM).workers_num, 0);
}

#[test]
fn unconscious_creature_wakes_up() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    sim.world.creature_mut(troll).unwrap().health = 1;
    sim.engine().knock_out_creature(troll, 3).unwrap();

    for _ in 0..3 {
        assert_eq!(sim.engine().run_creature_tick(troll).unwrap(), StateReturn::Unchanged);
    }
    assert_eq!(sim.engine().run_creature_tick(troll).unwrap(), StateReturn::ResetOk);
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
    assert_eq!(sim.world.creature(troll).health, 25);
}

#[test]
fn call_to_arms_gathers_at_the_rally_point() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    let rally = at_slab(2, 6);
    sim.engine().creature_answer_call_to_arms(troll, rally).unwrap();
    assert_eq!(sim.engine().get_creature_state_besides_move(troll), StateId::ArriveAtCallToArms);

    assert!(tick_until(&mut sim, troll, 100, |sim| sim.state_of(troll) == StateId::ArriveAtCallToArms));
    assert_eq!(sim.world.creature(troll).position, rally);
    assert_eq!(sim.engine().run_creature_tick(troll).unwrap(), StateReturn::Unchanged);

    sim.engine().end_call_to_arms(troll);
    assert_eq!(sim.state_of(troll), StateId::CreatureDoingNothing);
}

#[test]
fn door_is_battered_until_it_breaks() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    let door = Obstacle {
        kind: ObstacleKind::Door,
        id: 7,
        owner: HEROES,
        position: at_slab(2, 3),
    };
    sim.engine().set_creature_in_obstacle_combat(troll, door).unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureDoorCombat);

    assert!(tick_until(&mut sim, troll, 100, |sim| sim.state_of(troll) == StateId::CreatureDoingNothing));
    assert_eq!(*sim.effects.strikes.lock().unwrap(), 3);
    assert!(sim.world.control(troll).combat_flags.is_empty());
}

#[test]
fn idle_keeper_creature_attacks_visible_hero() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(3, 2));

    sim.engine().run_creature_tick(troll).unwrap();
    assert_eq!(sim.state_of(troll), StateId::CreatureInCombat);
    assert_eq!(sim.world.control(troll).combat.battle_enemy, knight);
    assert!(sim.world.control(knight).opponents_melee.contains(troll));
}

#[test]
fn melee_fight_ends_with_the_loser_destroyed() {
    let mut sim = Sim::new();
    let troll = sim.spawn(TROLL, KEEPER, at_slab(2, 2));
    let knight = sim.spawn(KNIGHT, HEROES, at_slab(2, 3));
    sim.world.creature_mut(knight).unwrap().health = 15;

    for _ in 0..60 {
        if !sim.world.creature_exists(knight) {
            break;
        }
        sim.engine().process_turn();
    }
    assert!(!sim.world.creature_exists(knight));
    assert!(sim.world.creature_exists(troll));
    assert!(sim.world.control(troll).opponents_melee.is_empty());
}
