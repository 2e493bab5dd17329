//! Per-turn callbacks of the fighting states.
//!
//! `CreatureInCombat` dispatches on the stance picked when the fight was set
//! up; each stance moves the fighter into position and starts at most one
//! instance per turn.

use crate::behavior::{StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::{MoveStep, Obstacle, ObstacleKind};
use crate::state::{CombatFlags, CombatState, CreatureId, Position};

use super::targeting::FLEE_FIGHT_DISTANCE;

/// Waiting fighters back off inside this distance.
const WAIT_RETREAT_DISTANCE: u32 = 768;
/// Waiting fighters close in beyond this distance.
const WAIT_APPROACH_DISTANCE: u32 = 2048;
const RANGED_RETREAT_DISTANCE: u32 = 768;
const RANGED_ATTACK_RANGE: u32 = 2048;
/// Melee fighters this close step back to get room for a swing.
const MELEE_RETREAT_DISTANCE: u32 = 156;
const MELEE_STRIKE_DISTANCE: u32 = 284;
/// A fleeing creature farther than this from its destination keeps running.
const FLEE_FAR_DISTANCE: u32 = 1536;
/// Minimum turns spent running straight for the flee destination.
const MIN_ESCAPE_TURNS: u64 = 50;
/// Turns of flight before a cornered creature turns around to fight.
const FLEE_TURNS_BEFORE_STAND: u64 = 8;

impl<'a> GameEngine<'a> {
    pub(crate) fn creature_in_combat(&mut self, creature: CreatureId) -> StateResult {
        let combat = self.world.control(creature).combat;
        let enemy = combat.battle_enemy;
        if !self.combat_enemy_exists(creature, enemy) {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        if self.creature_too_scared_for_combat(creature, enemy) {
            if !self.enter_combat_flee(creature) {
                tracing::error!(%creature, "cannot get into flee");
            }
            return Ok(StateReturn::Unchanged);
        }
        match combat.state {
            CombatState::Waiting => self.creature_in_combat_wait(creature)?,
            CombatState::Ranged => self.creature_in_ranged_combat(creature, enemy)?,
            CombatState::Melee => self.creature_in_melee_combat(creature, enemy)?,
            CombatState::None => {
                tracing::error!(%creature, "no valid fight state");
                self.set_start_state(creature);
                return Ok(StateReturn::ResetFail);
            }
        }
        if !self.world.creature_exists(creature) {
            return Ok(StateReturn::Deleted);
        }
        // The stance handler gave up on the fight.
        if self.world.creature(creature).active_state != StateId::CreatureInCombat {
            return Ok(StateReturn::ResetFail);
        }
        Ok(StateReturn::Modified)
    }

    fn creature_in_combat_wait(&mut self, creature: CreatureId) -> Result<(), EngineError> {
        if self.check_for_better_combat(creature)? {
            return Ok(());
        }
        let enemy = self.world.control(creature).combat.battle_enemy;
        if !self.combat_enemy_exists(creature, enemy) {
            return Ok(());
        }
        if !self.creature_is_most_suitable_for_combat(creature, enemy) {
            self.creature_change_to_most_suitable_combat(creature);
            return Ok(());
        }
        let attack_type = self.check_for_valid_combat(creature, enemy);
        if !self.combat_type_is_choice_of_creature(creature, attack_type) {
            self.set_start_state(creature);
            return Ok(());
        }
        let distance = self.fight_distance(creature, enemy);
        self.waiting_combat_move(creature, enemy, distance)
    }

    fn waiting_combat_move(
        &mut self,
        creature: CreatureId,
        enemy: CreatureId,
        distance: u32,
    ) -> Result<(), EngineError> {
        if self.creature_instance_is_active(creature) {
            return Ok(());
        }
        let target = self.world.creature(enemy).position;
        if distance < WAIT_RETREAT_DISTANCE {
            self.creature_retreat_from(creature, target)?;
            return Ok(());
        }
        if distance > WAIT_APPROACH_DISTANCE {
            self.creature_move_to(creature, target)?;
            return Ok(());
        }
        if self.cast_self_buff(creature)? {
            return Ok(());
        }
        if self.creature_has_ranged_weapon(creature) {
            if self.has_line_of_sight(creature, enemy)? {
                if let Some(weapon) = self.get_best_ranged_offensive_weapon(creature, distance) {
                    self.set_creature_instance(creature, weapon, enemy, target)?;
                }
            } else {
                self.creature_move_to(creature, target)?;
            }
        }
        Ok(())
    }

    fn creature_in_ranged_combat(&mut self, creature: CreatureId, enemy: CreatureId) -> Result<(), EngineError> {
        if !self.creature_is_most_suitable_for_combat(creature, enemy) {
            self.creature_change_to_most_suitable_combat(creature);
            return Ok(());
        }
        let attack_type = self.check_for_valid_combat(creature, enemy);
        if !self.combat_type_is_choice_of_creature(creature, attack_type) {
            self.set_start_state(creature);
            return Ok(());
        }
        let distance = self.fight_distance(creature, enemy);
        if !self.creature_has_ranged_weapon(creature) {
            tracing::debug!(%creature, "cannot choose ranged weapon");
            self.set_start_state(creature);
            return Ok(());
        }
        let buff = self.get_self_buff(creature);
        // None while every ranged instance is cooling down.
        let weapon = match buff {
            Some(_) => None,
            None => self.get_best_ranged_offensive_weapon(creature, distance),
        };
        if !self.ranged_combat_move(creature, enemy, distance)? {
            return Ok(());
        }
        if let Some(buff) = buff {
            let here = self.world.creature(creature).position;
            self.set_creature_instance(creature, buff, creature, here)?;
        } else if let Some(weapon) = weapon {
            let target = self.world.creature(enemy).position;
            self.set_creature_instance(creature, weapon, enemy, target)?;
        }
        Ok(())
    }

    /// Positions a ranged fighter. Returns whether it may shoot this turn.
    fn ranged_combat_move(
        &mut self,
        creature: CreatureId,
        enemy: CreatureId,
        distance: u32,
    ) -> Result<bool, EngineError> {
        if self.creature_instance_is_active(creature) {
            return Ok(false);
        }
        let target = self.world.creature(enemy).position;
        if !self.has_line_of_sight(creature, enemy)? {
            if self.creature_move_to(creature, target)? == MoveStep::Blocked {
                self.set_start_state(creature);
            }
            return Ok(false);
        }
        if distance < RANGED_RETREAT_DISTANCE {
            self.creature_retreat_from(creature, target)?;
        } else if distance > RANGED_ATTACK_RANGE {
            self.creature_move_to(creature, target)?;
        }
        Ok(true)
    }

    fn creature_in_melee_combat(&mut self, creature: CreatureId, enemy: CreatureId) -> Result<(), EngineError> {
        if !self.creature_is_most_suitable_for_combat(creature, enemy) {
            self.creature_change_to_most_suitable_combat(creature);
            return Ok(());
        }
        let attack_type = self.check_for_valid_combat(creature, enemy);
        if !self.combat_type_is_choice_of_creature(creature, attack_type) {
            self.set_start_state(creature);
            return Ok(());
        }
        let distance = self.fight_distance(creature, enemy);
        if !self.creature_has_melee_weapon(creature) {
            tracing::debug!(%creature, "cannot choose melee weapon");
            self.set_start_state(creature);
            return Ok(());
        }
        if !self.melee_combat_move(creature, enemy, distance)? {
            return Ok(());
        }
        if let Some(weapon) = self.get_best_melee_offensive_weapon(creature, distance) {
            let target = self.world.creature(enemy).position;
            self.set_creature_instance(creature, weapon, enemy, target)?;
        }
        Ok(())
    }

    /// Positions a melee fighter. Returns whether it may swing this turn.
    fn melee_combat_move(
        &mut self,
        creature: CreatureId,
        enemy: CreatureId,
        distance: u32,
    ) -> Result<bool, EngineError> {
        if self.creature_instance_is_active(creature) {
            return Ok(false);
        }
        let target = self.world.creature(enemy).position;
        if distance < MELEE_RETREAT_DISTANCE {
            self.creature_retreat_from(creature, target)?;
            return Ok(true);
        }
        if distance <= MELEE_STRIKE_DISTANCE {
            return Ok(true);
        }
        if self.has_line_of_sight(creature, enemy)? {
            if self.cast_self_buff(creature)? {
                return Ok(false);
            }
            let obstacle_fight = self
                .world
                .control(creature)
                .combat_flags
                .intersects(CombatFlags::OBSTACLE_FIGHT);
            if !obstacle_fight {
                if let Some(weapon) = self.get_best_ranged_offensive_weapon(creature, distance) {
                    self.set_creature_instance(creature, weapon, enemy, target)?;
                    return Ok(false);
                }
            }
        }
        if self.creature_move_to(creature, target)? == MoveStep::Blocked
            && !self.creature_has_ranged_weapon(creature)
            && !self.cast_self_buff(creature)?
            && self.creature_retreat_from(creature, target)? == MoveStep::Blocked
        {
            self.set_start_state(creature);
        }
        Ok(false)
    }

    pub(crate) fn creature_combat_flee(&mut self, creature: CreatureId) -> StateResult {
        let rules = self.rules()?;
        let turn = self.world.turn;
        let control = self.world.control(creature);
        let flee_pos = control.flee_pos;
        let turns_in_flee = control.flee_start_turn.map_or(0, |start| turn.since(start));
        let under_attack = control.has_attackers();
        let here = self.world.creature(creature).position;

        if here.distance_to(flee_pos) >= FLEE_FAR_DISTANCE {
            if under_attack {
                self.run_to_flee_position(creature, flee_pos)?;
                if let Some(control) = self.world.control_mut(creature) {
                    control.flee_start_turn = Some(turn);
                }
            } else if turns_in_flee <= rules.game_turns_in_flee {
                let escape_turns = (rules.game_turns_in_flee >> 2).max(MIN_ESCAPE_TURNS);
                if turns_in_flee <= escape_turns {
                    self.run_to_flee_position(creature, flee_pos)?;
                } else {
                    self.creature_choose_random_destination_nearby(creature, StateId::CreatureCombatFlee)?;
                }
            } else {
                self.set_start_state(creature);
                return Ok(StateReturn::ResetOk);
            }
            return Ok(StateReturn::Modified);
        }

        if turns_in_flee > FLEE_TURNS_BEFORE_STAND {
            if let Some(candidate) = self.check_for_possible_combat_within_distance(creature, FLEE_FIGHT_DISTANCE) {
                tracing::debug!(%creature, enemy = %candidate.enemy, "cornered, fighting to the death");
                self.set_creature_in_combat_to_the_death(creature, candidate.enemy, candidate.attack_type)?;
                return Ok(StateReturn::Modified);
            }
        }
        if turns_in_flee <= rules.game_turns_in_flee {
            self.creature_choose_random_destination_nearby(creature, StateId::CreatureCombatFlee)?;
            Ok(StateReturn::Modified)
        } else {
            self.set_start_state(creature);
            Ok(StateReturn::ResetOk)
        }
    }

    /// One step toward the flee destination. A blocked route makes the
    /// current spot the new destination.
    fn run_to_flee_position(&mut self, creature: CreatureId, flee_pos: Position) -> Result<(), EngineError> {
        if self.creature_move_to(creature, flee_pos)? == MoveStep::Blocked {
            let here = self.world.creature(creature).position;
            if let Some(control) = self.world.control_mut(creature) {
                control.flee_pos = here;
            }
        }
        Ok(())
    }

    /// Sends `creature` to attack a door or object.
    ///
    /// # Errors
    ///
    /// Refused like any need-driven transition when the current state does not
    /// allow obstacle fights.
    pub fn set_creature_in_obstacle_combat(
        &mut self,
        creature: CreatureId,
        obstacle: Obstacle,
    ) -> Result<(), EngineError> {
        let (state, flag) = match obstacle.kind {
            ObstacleKind::Door => (StateId::CreatureDoorCombat, CombatFlags::DOOR_FIGHT),
            ObstacleKind::Object => (StateId::CreatureObjectCombat, CombatFlags::OBJECT_FIGHT),
        };
        self.external_set_thing_state(creature, state)?;
        if let Some(control) = self.world.control_mut(creature) {
            control.combat_flags.insert(flag);
            control.combat.obstacle = Some(obstacle);
        }
        tracing::debug!(%creature, kind = %obstacle.kind, id = obstacle.id, "attacking obstacle");
        Ok(())
    }

    pub(crate) fn creature_object_combat(&mut self, creature: CreatureId) -> StateResult {
        self.creature_obstacle_combat(creature, ObstacleKind::Object)
    }

    pub(crate) fn creature_door_combat(&mut self, creature: CreatureId) -> StateResult {
        self.creature_obstacle_combat(creature, ObstacleKind::Door)
    }

    fn creature_obstacle_combat(&mut self, creature: CreatureId, kind: ObstacleKind) -> StateResult {
        let flag = match kind {
            ObstacleKind::Door => CombatFlags::DOOR_FIGHT,
            ObstacleKind::Object => CombatFlags::OBJECT_FIGHT,
        };
        let control = self.world.control(creature);
        if !control.combat_flags.contains(flag) {
            tracing::error!(%creature, %kind, "not in obstacle combat but should be");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        }
        let Some(obstacle) = control.combat.obstacle.filter(|obstacle| obstacle.kind == kind) else {
            tracing::error!(%creature, %kind, "obstacle combat without a target");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetFail);
        };
        let effects = self.env.effects()?;
        if !effects.obstacle_intact(&obstacle) {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetOk);
        }
        let owner = self.world.creature(creature).owner;
        let hostile = match kind {
            ObstacleKind::Door => !self.world.players.players_are_allies(owner, obstacle.owner),
            ObstacleKind::Object => self.world.players.players_are_enemies(owner, obstacle.owner),
        };
        if !hostile {
            self.set_start_state(creature);
            return Ok(StateReturn::ResetOk);
        }
        if self.creature_instance_is_active(creature) {
            return Ok(StateReturn::Unchanged);
        }

        let here = self.world.creature(creature).position;
        let distance = here.distance_to(obstacle.position);
        if distance > MELEE_STRIKE_DISTANCE {
            if self.creature_move_to(creature, obstacle.position)? == MoveStep::Blocked {
                self.set_start_state(creature);
                return Ok(StateReturn::ResetFail);
            }
            return Ok(StateReturn::Modified);
        }
        let Some(weapon) = self.get_best_melee_offensive_weapon(creature, distance) else {
            // Cooling down.
            return Ok(StateReturn::Unchanged);
        };
        let info = self.env.instance_info(weapon)?;
        let turn = self.world.turn;
        if let Some(control) = self.world.control_mut(creature) {
            control.set_cooldown(weapon, turn + u64::from(info.reset_turns));
        }
        effects.strike_obstacle(creature, &obstacle, weapon);
        tracing::trace!(%creature, %kind, id = obstacle.id, instance = %weapon, "obstacle struck");
        Ok(StateReturn::Modified)
    }

    fn fight_distance(&self, creature: CreatureId, enemy: CreatureId) -> u32 {
        self.world
            .creature(creature)
            .position
            .distance_to(self.world.creature(enemy).position)
    }

    fn has_line_of_sight(&self, creature: CreatureId, enemy: CreatureId) -> Result<bool, EngineError> {
        let navigation = self.env.navigation()?;
        let sight = self.model_of(creature)?.sight_range;
        Ok(navigation.can_see(
            self.world.creature(creature).position,
            self.world.creature(enemy).position,
            sight,
        ))
    }

    /// Starts a ready self buff. Returns whether one was cast.
    fn cast_self_buff(&mut self, creature: CreatureId) -> Result<bool, EngineError> {
        let Some(buff) = self.get_self_buff(creature) else {
            return Ok(false);
        };
        let here = self.world.creature(creature).position;
        self.set_creature_instance(creature, buff, creature, here)
    }
}
