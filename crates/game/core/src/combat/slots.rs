//! Opponent slot admission.
//!
//! Each creature accepts a bounded number of melee and ranged attackers. The
//! victim's slot arrays are the single source of truth for "who is attacking
//! me"; the attacker's combat flags say which array it sits in.

use crate::engine::GameEngine;
use crate::state::{AttackType, CreatureId, ModelId, SlotAdmission};

impl<'a> GameEngine<'a> {
    pub fn can_add_melee_combat_attacker(&self, victim: CreatureId) -> bool {
        let limit = self.rules().map(|rules| rules.melee_limit).unwrap_or(0);
        self.world.control(victim).opponents_melee.has_capacity(limit)
    }

    pub fn can_add_ranged_combat_attacker(&self, victim: CreatureId) -> bool {
        let limit = self.rules().map(|rules| rules.ranged_limit).unwrap_or(0);
        self.world.control(victim).opponents_ranged.has_capacity(limit)
    }

    pub fn can_add_combat_attacker(&self, victim: CreatureId, attack_type: AttackType) -> bool {
        match attack_type {
            AttackType::Ranged => self.can_add_ranged_combat_attacker(victim),
            _ => self.can_add_melee_combat_attacker(victim),
        }
    }

    pub fn has_melee_combat_attackers(&self, victim: CreatureId) -> bool {
        !self.world.control(victim).opponents_melee.is_empty()
    }

    pub fn has_ranged_combat_attackers(&self, victim: CreatureId) -> bool {
        !self.world.control(victim).opponents_ranged.is_empty()
    }

    /// Whether `fighter` is engaged by any live attacker whose model differs
    /// from `model`.
    pub fn creature_has_other_attackers(&self, fighter: CreatureId, model: ModelId) -> bool {
        let control = self.world.control(fighter);
        control
            .opponents_melee
            .occupied()
            .chain(control.opponents_ranged.occupied())
            .filter(|attacker| self.world.creature_exists(*attacker))
            .any(|attacker| self.world.creature(attacker).model != model)
    }

    pub(crate) fn add_melee_combat_attacker(&mut self, victim: CreatureId, attacker: CreatureId) -> bool {
        let Some(control) = self.world.control_mut(victim) else {
            return false;
        };
        admit(control.opponents_melee.add(attacker), victim, attacker)
    }

    pub(crate) fn add_ranged_combat_attacker(&mut self, victim: CreatureId, attacker: CreatureId) -> bool {
        let Some(control) = self.world.control_mut(victim) else {
            return false;
        };
        admit(control.opponents_ranged.add(attacker), victim, attacker)
    }

    pub(crate) fn remove_melee_combat_attacker(&mut self, victim: CreatureId, attacker: CreatureId) -> bool {
        self.world
            .control_mut(victim)
            .is_some_and(|control| control.opponents_melee.remove(attacker))
    }

    pub(crate) fn remove_ranged_combat_attacker(&mut self, victim: CreatureId, attacker: CreatureId) -> bool {
        self.world
            .control_mut(victim)
            .is_some_and(|control| control.opponents_ranged.remove(attacker))
    }
}

fn admit(admission: SlotAdmission, victim: CreatureId, attacker: CreatureId) -> bool {
    match admission {
        SlotAdmission::Added => true,
        SlotAdmission::AlreadyPresent => {
            tracing::warn!(%victim, %attacker, "attacker already in opponent slots");
            true
        }
        SlotAdmission::Full => false,
    }
}
