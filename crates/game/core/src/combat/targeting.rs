//! Target selection and opponent switching.
//!
//! Every candidate fight gets a score: free opponent slots on the enemy and
//! a match with the fighter's preferred attack style count most, distance
//! breaks the rest. Creatures already attacking the fighter are considered
//! before any new enemy.

use arrayvec::ArrayVec;

use crate::behavior::{MoveCheck, StateId};
use crate::config::GameConfig;
use crate::engine::{EngineError, GameEngine};
use crate::env::{compute_seed, seed_context};
use crate::state::{AttackType, CombatFlags, CombatState, CreatureId};

/// Weight of one free opponent slot.
const SLOT_SCORE: i64 = 258;
/// Bonus when the attack style matches the fighter's preference.
const PREFERENCE_SCORE: i64 = 128;
/// Distances beyond this earn no proximity bonus.
const MAX_SCORED_DISTANCE: u32 = 5376;
/// Penalty that makes a scared attacker the first to be displaced.
const SCARED_PENALTY: i64 = 512;
/// Search radius when a fleeing creature turns around to fight.
pub(crate) const FLEE_FIGHT_DISTANCE: u32 = 2304;

/// A fight the fighter could take up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatCandidate {
    pub enemy: CreatureId,
    pub attack_type: AttackType,
    pub score: i64,
}

impl<'a> GameEngine<'a> {
    pub fn get_combat_score(
        &self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
        distance: u32,
    ) -> i64 {
        let victim = self.world.control(enemy);
        let free = |count: usize| GameConfig::MAX_OPPONENTS.saturating_sub(count) as i64;
        let melee_free = free(victim.opponents_melee.count());
        let ranged_free = free(victim.opponents_ranged.count());
        let prefers_ranged = self
            .model_of(fighter)
            .is_ok_and(|model| model.prefers_ranged());

        let slot_score = if prefers_ranged {
            if attack_type == AttackType::Ranged || self.creature_has_ranged_weapon(fighter) {
                SLOT_SCORE * ranged_free + SLOT_SCORE
            } else {
                SLOT_SCORE * melee_free + 1 + PREFERENCE_SCORE
            }
        } else if attack_type == AttackType::Ranged {
            SLOT_SCORE * ranged_free + 1
        } else {
            SLOT_SCORE * melee_free + SLOT_SCORE + PREFERENCE_SCORE
        };
        let closeness = i64::from(MAX_SCORED_DISTANCE - distance.min(MAX_SCORED_DISTANCE));
        slot_score + (closeness << 8) / i64::from(MAX_SCORED_DISTANCE)
    }

    fn combat_distance(&self, fighter: CreatureId, enemy: CreatureId) -> u32 {
        self.world
            .creature(fighter)
            .position
            .distance_to(self.world.creature(enemy).position)
    }

    /// Whether `fighter` is willing and able to attack `enemy` at all.
    pub fn creature_can_fight(&self, fighter: CreatureId, enemy: CreatureId) -> bool {
        if fighter == enemy || !self.world.creature_exists(enemy) {
            return false;
        }
        let (me, them) = (self.world.creature(fighter), self.world.creature(enemy));
        if !me.is_alive() || !them.is_alive() {
            return false;
        }
        if !self.world.players.players_are_enemies(me.owner, them.owner) {
            return false;
        }
        self.get_creature_state_besides_move(enemy) != StateId::CreatureUnconscious
            && self.get_creature_state_besides_move(fighter) != StateId::CreatureUnconscious
    }

    /// How `fighter` could reach `enemy`: melee when it can walk there,
    /// ranged when it can see it.
    pub fn creature_can_have_combat_with_creature(&self, fighter: CreatureId, enemy: CreatureId) -> AttackType {
        let Ok(navigation) = self.env.navigation() else {
            return AttackType::Unset;
        };
        let from = self.world.creature(fighter).position;
        let to = self.world.creature(enemy).position;
        if self.creature_has_melee_weapon(fighter) && navigation.can_navigate_to(fighter, from, to) {
            return AttackType::Melee;
        }
        let sight = self.model_of(fighter).map_or(0, |model| model.sight_range);
        if self.creature_has_ranged_weapon(fighter) && navigation.can_see(from, to, sight) {
            return AttackType::Ranged;
        }
        AttackType::Unset
    }

    /// Best-scoring creature among those already attacking `fighter`, melee
    /// attackers first. Only scores above `min_score` count.
    pub fn check_for_possible_combat_with_attacker_within_distance(
        &self,
        fighter: CreatureId,
        max_distance: Option<u32>,
        min_score: i64,
    ) -> Option<CombatCandidate> {
        let control = self.world.control(fighter);
        for attack_type in [AttackType::Melee, AttackType::Ranged] {
            let slots = control.opponents(attack_type);
            if slots.is_empty() {
                continue;
            }
            let mut best: Option<CombatCandidate> = None;
            for attacker in slots.occupied() {
                if !self.creature_can_fight(fighter, attacker) {
                    continue;
                }
                let distance = self.combat_distance(fighter, attacker);
                if max_distance.is_some_and(|max| distance >= max) {
                    continue;
                }
                let attack = self.creature_can_have_combat_with_creature(fighter, attacker);
                if attack == AttackType::Unset {
                    continue;
                }
                let score = self.get_combat_score(fighter, attacker, attack, distance);
                let threshold = best.map_or(min_score, |candidate| candidate.score);
                if score > threshold {
                    best = Some(CombatCandidate {
                        enemy: attacker,
                        attack_type: attack,
                        score,
                    });
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }

    /// Highest-scoring enemy within `max_distance` and sight. Ties are broken
    /// with a turn-seeded draw.
    pub fn get_highest_score_enemy_creature(
        &self,
        fighter: CreatureId,
        max_distance: Option<u32>,
    ) -> Option<CombatCandidate> {
        let sight = self.model_of(fighter).map_or(0, |model| model.sight_range);
        let limit = max_distance.map_or(sight, |max| max.min(sight));
        let mut best: ArrayVec<CombatCandidate, { GameConfig::MAX_CREATURES }> = ArrayVec::new();
        for enemy in self.world.creature_ids() {
            if !self.creature_can_fight(fighter, enemy) {
                continue;
            }
            let distance = self.combat_distance(fighter, enemy);
            if distance > limit {
                continue;
            }
            let attack_type = self.creature_can_have_combat_with_creature(fighter, enemy);
            if attack_type == AttackType::Unset {
                continue;
            }
            let candidate = CombatCandidate {
                enemy,
                attack_type,
                score: self.get_combat_score(fighter, enemy, attack_type, distance),
            };
            match best.first().map(|top| top.score) {
                Some(top) if candidate.score < top => {}
                Some(top) if candidate.score == top => {
                    let _ = best.try_push(candidate);
                }
                _ => {
                    best.clear();
                    best.push(candidate);
                }
            }
        }
        if best.len() <= 1 {
            return best.first().copied();
        }
        let index = self.env.rng().map_or(0, |rng| {
            let seed = compute_seed(
                self.world.game_seed,
                self.world.turn.0,
                u32::from(fighter.0),
                seed_context::TARGET_TIE_BREAK,
            );
            rng.pick_index(seed, best.len())
        });
        best.get(index).copied()
    }

    /// A fight worth taking: an attacker first, else any visible enemy.
    pub fn check_for_possible_combat(&self, fighter: CreatureId) -> Option<CombatCandidate> {
        self.check_for_possible_combat_within(fighter, None)
    }

    pub fn check_for_possible_combat_within_distance(
        &self,
        fighter: CreatureId,
        distance: u32,
    ) -> Option<CombatCandidate> {
        self.check_for_possible_combat_within(fighter, Some(distance))
    }

    fn check_for_possible_combat_within(&self, fighter: CreatureId, distance: Option<u32>) -> Option<CombatCandidate> {
        let found = self
            .check_for_possible_combat_with_attacker_within_distance(fighter, distance, 0)
            .or_else(|| self.get_highest_score_enemy_creature(fighter, distance));
        if let Some(candidate) = found {
            tracing::trace!(%fighter, enemy = %candidate.enemy, attack = %candidate.attack_type, "possible combat");
        }
        found
    }

    /// False when another attacker offers a clearly better fight.
    pub fn creature_is_most_suitable_for_combat(&self, fighter: CreatureId, enemy: CreatureId) -> bool {
        let control = self.world.control(fighter);
        if self.creature_has_creature_in_combat(fighter, enemy) {
            let enemy_in_melee = self
                .world
                .control(enemy)
                .combat_flags
                .contains(CombatFlags::MELEE);
            if enemy_in_melee || control.opponents_melee.is_empty() {
                return true;
            }
        }
        let distance = self.combat_distance(fighter, enemy);
        let current = self.get_combat_score(fighter, enemy, control.combat.attack_type, distance);
        match self.check_for_possible_combat_with_attacker_within_distance(fighter, None, current) {
            None => true,
            Some(other) => other.enemy == enemy || other.score <= current + SLOT_SCORE,
        }
    }

    /// Attack style to keep using against `enemy`, or `Unset` when the fight
    /// is no longer possible. Reachability is re-evaluated every eighth turn.
    pub fn check_for_valid_combat(&self, fighter: CreatureId, enemy: CreatureId) -> AttackType {
        if !self.creature_can_fight(fighter, enemy) {
            return AttackType::Unset;
        }
        if (self.world.turn.0 + u64::from(fighter.0)) & 7 == 0 {
            return self.creature_can_have_combat_with_creature(fighter, enemy);
        }
        self.world.control(fighter).combat.attack_type
    }

    pub fn combat_type_is_choice_of_creature(&self, fighter: CreatureId, attack_type: AttackType) -> bool {
        let current = self.world.control(fighter).combat.attack_type;
        match attack_type {
            AttackType::Unset => false,
            AttackType::Ranged => current == AttackType::Ranged,
            AttackType::Melee => {
                if current != AttackType::Ranged {
                    return true;
                }
                self.model_of(fighter).is_ok_and(|model| model.prefers_ranged())
                    && self.creature_has_ranged_weapon(fighter)
            }
        }
    }

    /// Switches to the best attacker, if that is someone else.
    pub(crate) fn creature_change_to_most_suitable_combat(&mut self, fighter: CreatureId) -> bool {
        let Some(best) = self.check_for_possible_combat_with_attacker_within_distance(fighter, None, 0)
        else {
            return false;
        };
        if self.world.control(fighter).combat.battle_enemy == best.enemy {
            return false;
        }
        self.change_current_combat(fighter, best.enemy, best.attack_type)
    }

    pub fn creature_has_spare_slot_for_combat(
        &self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) -> bool {
        if attack_type == AttackType::Ranged {
            return self.can_add_ranged_combat_attacker(enemy);
        }
        let prefers_ranged = self
            .model_of(fighter)
            .is_ok_and(|model| model.prefers_ranged());
        if prefers_ranged
            && self.creature_has_ranged_weapon(fighter)
            && self.can_add_ranged_combat_attacker(enemy)
        {
            return true;
        }
        self.can_add_melee_combat_attacker(enemy)
    }

    /// Periodic re-evaluation for waiting fighters. Returns true when the
    /// caller should not continue its turn.
    pub(crate) fn check_for_better_combat(&mut self, fighter: CreatureId) -> Result<bool, EngineError> {
        let rules = self.rules()?;
        if (self.world.turn.0 + u64::from(fighter.0)) % rules.battle_check_interval != 0 {
            return Ok(false);
        }
        let Some(candidate) = self.check_for_possible_combat(fighter) else {
            return Ok(true);
        };
        let combat = self.world.control(fighter).combat;
        if combat.battle_enemy == candidate.enemy
            && self.combat_type_is_choice_of_creature(fighter, candidate.attack_type)
        {
            return Ok(self.change_current_combat(fighter, candidate.enemy, candidate.attack_type));
        }
        if combat.state != CombatState::Waiting {
            return Ok(false);
        }
        if self.creature_has_spare_slot_for_combat(fighter, candidate.enemy, candidate.attack_type) {
            return Ok(self.change_current_combat(fighter, candidate.enemy, candidate.attack_type));
        }
        self.change_creature_with_existing_attacker(fighter, candidate.enemy, candidate.attack_type);
        Ok(false)
    }

    /// Displaces the enemy's weakest attacker of `attack_type` if `fighter`
    /// would do better in its slot.
    pub fn change_creature_with_existing_attacker(
        &mut self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) {
        let distance = self.combat_distance(fighter, enemy);
        let own_score = self.get_combat_score(fighter, enemy, attack_type, distance);
        let slots = *self.world.control(enemy).opponents(attack_type);
        if slots.is_empty() {
            tracing::error!(%enemy, %attack_type, "no attackers to displace");
        }
        let mut worst = (fighter, own_score);
        for attacker in slots.occupied() {
            let distance = self.combat_distance(attacker, enemy);
            let their_type = self.world.control(attacker).combat.attack_type;
            let mut score = self.get_combat_score(attacker, enemy, their_type, distance);
            if self.creature_is_actually_scared(attacker, enemy) {
                score -= SCARED_PENALTY;
            }
            if score < worst.1 {
                worst = (attacker, score);
            }
        }
        if worst.1 == own_score {
            return;
        }
        let (displaced, _) = worst;
        tracing::debug!(%fighter, %enemy, %displaced, "taking over attacker slot");
        self.set_start_state(displaced);
        let previous = self.world.control(fighter).combat.battle_enemy;
        self.remove_attacker(fighter, previous);
        if !self.set_creature_combat_state(fighter, enemy, attack_type) {
            tracing::warn!(%fighter, %enemy, "couldn't take over attacker slot");
            self.set_start_state(fighter);
        }
    }

    /// Need evaluator run by idle and work states.
    ///
    /// Starts a fight with the best candidate, or, when too scared, requests
    /// the flee state through the `Escape` need. Returns true when the
    /// creature's state changed.
    pub fn creature_look_for_combat(&mut self, creature: CreatureId) -> Result<bool, EngineError> {
        let control = self.world.control(creature);
        let (under_attack, engaged, dropped_turn) = (
            control.has_attackers(),
            !control.combat_flags.is_empty(),
            control.dropped_turn,
        );
        let Some(candidate) = self.check_for_possible_combat(creature) else {
            if !under_attack {
                return Ok(false);
            }
            if let Some(buff) = self.get_self_buff(creature) {
                let here = self.world.creature(creature).position;
                self.set_creature_instance(creature, buff, creature, here)?;
                return Ok(false);
            }
            return Ok(self.start_combat_flee(creature));
        };

        if engaged
            && self.get_combat_state_for_combat(creature, candidate.enemy, candidate.attack_type)
                == CombatState::Waiting
        {
            return Ok(false);
        }

        let rules = self.rules()?;
        let dropped_recently = dropped_turn.is_some_and(|dropped| dropped + rules.fight_fear_delay >= self.world.turn);
        if !self.creature_too_scared_for_combat(creature, candidate.enemy) || dropped_recently {
            self.set_creature_in_combat(creature, candidate.enemy, candidate.attack_type)?;
            return Ok(true);
        }
        if !self.start_combat_flee(creature) {
            tracing::error!(%creature, "creature is scared but cannot flee");
            return Ok(false);
        }
        Ok(true)
    }

    /// Requests the flee state and picks a fresh flee destination.
    pub(crate) fn start_combat_flee(&mut self, creature: CreatureId) -> bool {
        if !self.enter_combat_flee(creature) {
            return false;
        }
        self.setup_combat_flee_position(creature);
        true
    }

    /// Requests the flee state and stamps the flee start turn. The cached
    /// flee destination is kept.
    pub(crate) fn enter_combat_flee(&mut self, creature: CreatureId) -> bool {
        if self
            .external_set_thing_state(creature, StateId::CreatureCombatFlee)
            .is_err()
        {
            return false;
        }
        let turn = self.world.turn;
        if let Some(control) = self.world.control_mut(creature) {
            control.flee_start_turn = Some(turn);
        }
        true
    }

    /// Move check for states that keep scanning for enemies while walking.
    pub(crate) fn move_check_attack_any_creature(&mut self, creature: CreatureId) -> Result<MoveCheck, EngineError> {
        if self.creature_look_for_combat(creature)? {
            Ok(MoveCheck::Continue)
        } else {
            Ok(MoveCheck::Available)
        }
    }
}
