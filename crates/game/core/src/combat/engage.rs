//! Entering and leaving creature fights.
//!
//! An attacker holds exactly one of the `MELEE`, `RANGED` or `WAITING` flags
//! while engaged. Melee and ranged attackers also occupy a slot in their
//! victim's opponent array; waiting attackers only join the battle. Every
//! path out of a fight releases the victim's slot before the attacker's own
//! flags are cleared.

use crate::behavior::StateId;
use crate::engine::{EngineError, GameEngine};
use crate::state::{AttackType, CombatFlags, CombatState, CreatureId, GameTurn, PlayerId};

use super::CombatError;

impl<'a> GameEngine<'a> {
    // ===== queries =====

    /// Whether the creature's recorded enemy is still the creature it started
    /// fighting, not a recycled slot.
    pub fn combat_enemy_exists(&self, fighter: CreatureId, enemy: CreatureId) -> bool {
        if !self.world.creature_exists(enemy) {
            return false;
        }
        let combat = &self.world.control(fighter).combat;
        combat.battle_enemy_created == self.world.creature(enemy).created
    }

    /// Whether `enemy` is engaged and fighting `fighter`.
    pub fn creature_has_creature_in_combat(&self, fighter: CreatureId, enemy: CreatureId) -> bool {
        let control = self.world.control(enemy);
        !control.combat_flags.is_empty() && control.combat.battle_enemy == fighter
    }

    // ===== joining =====

    pub(crate) fn add_melee_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) -> bool {
        self.add_slot_attacker(fighter, enemy, AttackType::Melee)
    }

    pub(crate) fn add_ranged_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) -> bool {
        self.add_slot_attacker(fighter, enemy, AttackType::Ranged)
    }

    fn add_slot_attacker(&mut self, fighter: CreatureId, enemy: CreatureId, attack_type: AttackType) -> bool {
        let flag = match attack_type {
            AttackType::Ranged => CombatFlags::RANGED,
            _ => CombatFlags::MELEE,
        };
        if self.world.control(fighter).in_creature_fight() {
            tracing::debug!(%fighter, %attack_type, "already engaged; nothing added");
            return false;
        }
        if !self.can_add_combat_attacker(enemy, attack_type) {
            tracing::debug!(%fighter, %enemy, %attack_type, "opponents limit reached");
            return false;
        }
        self.mark_engaged(fighter, enemy, flag);

        let admitted = match attack_type {
            AttackType::Ranged => self.add_ranged_combat_attacker(enemy, fighter),
            _ => self.add_melee_combat_attacker(enemy, fighter),
        };
        if !admitted {
            tracing::error!(%fighter, %enemy, %attack_type, "slot was free but attacker not admitted");
            self.clear_engagement(fighter, flag);
            return false;
        }
        if self.battle_add(fighter, enemy).is_err() {
            match attack_type {
                AttackType::Ranged => self.remove_ranged_combat_attacker(enemy, fighter),
                _ => self.remove_melee_combat_attacker(enemy, fighter),
            };
            self.clear_engagement(fighter, flag);
            return false;
        }
        true
    }

    pub(crate) fn add_waiting_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) -> bool {
        if self.world.control(fighter).in_creature_fight() {
            tracing::debug!(%fighter, "already engaged; waiting anyway");
        }
        self.mark_engaged(fighter, enemy, CombatFlags::WAITING);
        if self.battle_add(fighter, enemy).is_err() {
            self.clear_engagement(fighter, CombatFlags::WAITING);
            return false;
        }
        true
    }

    fn mark_engaged(&mut self, fighter: CreatureId, enemy: CreatureId, flag: CombatFlags) {
        let created = self.world.creature(enemy).created;
        if let Some(control) = self.world.control_mut(fighter) {
            control.combat_flags |= flag;
            control.combat.battle_enemy = enemy;
            control.combat.battle_enemy_created = created;
        }
    }

    fn clear_engagement(&mut self, fighter: CreatureId, flag: CombatFlags) {
        if let Some(control) = self.world.control_mut(fighter) {
            control.combat_flags.remove(flag);
            control.combat.battle_enemy = CreatureId::NONE;
            control.combat.battle_enemy_created = GameTurn::ZERO;
            control.fight_til_death = false;
        }
    }

    /// Assigns a stance against `enemy` and takes the matching slot. Falls
    /// back to waiting when the chosen slot cannot be taken.
    pub(crate) fn set_creature_combat_state(
        &mut self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) -> bool {
        if let Some(control) = self.world.control_mut(fighter) {
            control.combat.attack_type = attack_type;
        }
        let wanted = self.get_combat_state_for_combat(fighter, enemy, attack_type);
        let state = match wanted {
            CombatState::Melee if self.add_melee_attacker(fighter, enemy) => CombatState::Melee,
            CombatState::Ranged if self.add_ranged_attacker(fighter, enemy) => CombatState::Ranged,
            _ if self.add_waiting_attacker(fighter, enemy) => CombatState::Waiting,
            _ => return false,
        };
        let owner = self.world.creature(fighter).owner;
        if let Some(control) = self.world.control_mut(fighter) {
            control.combat.state = state;
        }
        if let Some(player) = self.world.player_mut(owner) {
            player.fights_num += 1;
        }
        tracing::debug!(%fighter, %enemy, %state, "combat state set");
        true
    }

    /// Entry guard shared by both ways into a creature fight. A pending
    /// obstacle fight does not block.
    fn check_combat_entry(&self, fighter: CreatureId, enemy: CreatureId) -> Result<(), CombatError> {
        if self.world.control(fighter).in_creature_fight() {
            let current = self.get_creature_state_besides_move(fighter);
            tracing::error!(%fighter, %current, "creature in combat already");
            return Err(CombatError::AlreadyInCombat(fighter));
        }
        if fighter == enemy
            || !self.world.creature_exists(enemy)
            || !self.world.creature(enemy).is_alive()
        {
            tracing::error!(%fighter, %enemy, "invalid combat enemy");
            return Err(CombatError::InvalidEnemy { fighter, enemy });
        }
        Ok(())
    }

    /// Puts `fighter` into `CreatureInCombat` against `enemy`.
    ///
    /// # Errors
    ///
    /// `CombatError::AlreadyInCombat` when the fighter is in a creature fight
    /// already (obstacle fights may be pending), `CombatError::InvalidEnemy`
    /// for a dead or missing enemy, and `TransitionError::Refused` when the
    /// current state does not let a fight interrupt it. The creature is left
    /// untouched in all three cases.
    pub fn set_creature_in_combat(
        &mut self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) -> Result<(), EngineError> {
        self.check_combat_entry(fighter, enemy)?;
        self.external_set_thing_state(fighter, StateId::CreatureInCombat)?;
        if let Some(control) = self.world.control_mut(fighter) {
            control.fight_til_death = false;
        }
        if !self.set_creature_combat_state(fighter, enemy, attack_type) {
            tracing::warn!(%fighter, %enemy, "couldn't set up combat state");
            self.set_start_state(fighter);
            return Ok(());
        }
        self.setup_combat_flee_position(fighter);
        Ok(())
    }

    /// Like [`Self::set_creature_in_combat`], but with fear switched off for
    /// this fight.
    pub fn set_creature_in_combat_to_the_death(
        &mut self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) -> Result<(), EngineError> {
        self.check_combat_entry(fighter, enemy)?;
        self.external_set_thing_state(fighter, StateId::CreatureInCombat)?;
        if !self.set_creature_combat_state(fighter, enemy, attack_type) {
            tracing::warn!(%fighter, %enemy, "couldn't set up combat state");
            self.set_start_state(fighter);
            return Ok(());
        }
        if let Some(control) = self.world.control_mut(fighter) {
            control.fight_til_death = true;
        }
        Ok(())
    }

    // ===== leaving =====

    fn decrease_fights_num(&mut self, fighter: CreatureId) {
        let owner: PlayerId = self.world.creature(fighter).owner;
        match self.world.player_mut(owner) {
            Some(player) if player.fights_num > 0 => player.fights_num -= 1,
            _ => tracing::warn!(%fighter, %owner, "fight count incorrect while removing attacker"),
        }
    }

    pub(crate) fn remove_melee_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) {
        self.remove_slot_attacker(fighter, enemy, AttackType::Melee);
    }

    pub(crate) fn remove_ranged_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) {
        self.remove_slot_attacker(fighter, enemy, AttackType::Ranged);
    }

    fn remove_slot_attacker(&mut self, fighter: CreatureId, enemy: CreatureId, attack_type: AttackType) {
        self.decrease_fights_num(fighter);
        let (flag, occupied) = match attack_type {
            AttackType::Ranged => (CombatFlags::RANGED, self.has_ranged_combat_attackers(enemy)),
            _ => (CombatFlags::MELEE, self.has_melee_combat_attackers(enemy)),
        };
        if occupied {
            let removed = match attack_type {
                AttackType::Ranged => self.remove_ranged_combat_attacker(enemy, fighter),
                _ => self.remove_melee_combat_attacker(enemy, fighter),
            };
            if !removed {
                tracing::error!(%fighter, %enemy, %attack_type, "cannot remove attacker; not in opponents");
            }
        } else {
            tracing::warn!(%fighter, %enemy, %attack_type, "cannot remove attacker; victim has no opponents");
        }
        self.clear_engagement(fighter, flag);
        self.reset_combat_state(fighter);
        if let Err(error) = self.battle_remove(fighter) {
            tracing::warn!(%fighter, %error, "attacker left combat outside any battle");
        }
    }

    pub(crate) fn remove_waiting_attacker(&mut self, fighter: CreatureId) {
        self.decrease_fights_num(fighter);
        self.clear_engagement(fighter, CombatFlags::WAITING);
        self.reset_combat_state(fighter);
        if let Err(error) = self.battle_remove(fighter) {
            tracing::warn!(%fighter, %error, "attacker left combat outside any battle");
        }
    }

    fn reset_combat_state(&mut self, fighter: CreatureId) {
        if let Some(control) = self.world.control_mut(fighter) {
            if !control.in_creature_fight() {
                control.combat.state = CombatState::None;
            }
        }
    }

    /// Ends whichever engagement `fighter` holds against `enemy`.
    pub(crate) fn remove_attacker(&mut self, fighter: CreatureId, enemy: CreatureId) {
        let flags = self.world.control(fighter).combat_flags;
        if flags.contains(CombatFlags::MELEE) {
            self.remove_melee_attacker(fighter, enemy);
        } else if flags.contains(CombatFlags::RANGED) {
            self.remove_ranged_attacker(fighter, enemy);
        } else if flags.contains(CombatFlags::WAITING) {
            self.remove_waiting_attacker(fighter);
        }
    }

    /// Disengages every melee attacker of `victim`. Returns how many left.
    pub(crate) fn remove_all_melee_combat_attackers(&mut self, victim: CreatureId) -> usize {
        self.remove_all_slot_attackers(victim, AttackType::Melee)
    }

    pub(crate) fn remove_all_ranged_combat_attackers(&mut self, victim: CreatureId) -> usize {
        self.remove_all_slot_attackers(victim, AttackType::Ranged)
    }

    fn remove_all_slot_attackers(&mut self, victim: CreatureId, attack_type: AttackType) -> usize {
        let attackers = *self.world.control(victim).opponents(attack_type).slots();
        let mut removed = 0;
        for attacker in attackers.into_iter().filter(|id| id.is_some()) {
            if self.world.creature_exists(attacker) {
                self.remove_slot_attacker(attacker, victim, attack_type);
                removed += 1;
            } else {
                tracing::warn!(%victim, %attacker, "dropping dead attacker from opponents");
                match attack_type {
                    AttackType::Ranged => self.remove_ranged_combat_attacker(victim, attacker),
                    _ => self.remove_melee_combat_attacker(victim, attacker),
                };
            }
        }
        if let Some(control) = self.world.control_mut(victim) {
            let slots = match attack_type {
                AttackType::Ranged => &mut control.opponents_ranged,
                _ => &mut control.opponents_melee,
            };
            if !slots.is_empty() {
                tracing::error!(%victim, %attack_type, count = slots.count(), "removed all opponents, but count is not zero");
                slots.clear();
            }
        }
        tracing::debug!(%victim, %attack_type, removed, "attackers removed");
        removed
    }

    /// Drops the creature from every fight: as attacker, as victim and as
    /// battle member.
    pub fn remove_all_traces_of_combat(&mut self, creature: CreatureId) {
        let control = self.world.control(creature);
        let enemy = control.combat.battle_enemy;
        if !control.combat_flags.is_empty() && enemy.is_some() {
            self.remove_attacker(creature, enemy);
        }
        self.remove_all_ranged_combat_attackers(creature);
        self.remove_all_melee_combat_attackers(creature);
        self.cleanup_battle_leftovers(creature);
    }

    pub(crate) fn cleanup_combat(&mut self, creature: CreatureId) {
        self.remove_all_traces_of_combat(creature);
    }

    pub(crate) fn cleanup_object_combat(&mut self, creature: CreatureId) {
        self.clear_obstacle_fight(creature, CombatFlags::OBJECT_FIGHT);
    }

    pub(crate) fn cleanup_door_combat(&mut self, creature: CreatureId) {
        self.clear_obstacle_fight(creature, CombatFlags::DOOR_FIGHT);
    }

    fn clear_obstacle_fight(&mut self, creature: CreatureId, flag: CombatFlags) {
        if let Some(control) = self.world.control_mut(creature) {
            control.combat_flags.remove(flag);
            control.combat.obstacle = None;
        }
    }

    /// Swaps the current opponent for `enemy`.
    pub(crate) fn change_current_combat(
        &mut self,
        fighter: CreatureId,
        enemy: CreatureId,
        attack_type: AttackType,
    ) -> bool {
        let old_enemy = self.world.control(fighter).combat.battle_enemy;
        if old_enemy.is_some() {
            self.remove_attacker(fighter, old_enemy);
        }
        if !self.set_creature_combat_state(fighter, enemy, attack_type) {
            tracing::warn!(%fighter, %enemy, "couldn't change combat state");
            self.set_start_state(fighter);
            return false;
        }
        true
    }
}
