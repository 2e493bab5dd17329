//! Stance selection.

use crate::engine::GameEngine;
use crate::env::InstanceKind;
use crate::state::{AttackType, CombatState, CreatureId};

/// Facts the stance rule depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StanceInputs {
    /// Attack type requested by the caller.
    pub preferred: AttackType,
    pub model_prefers_ranged: bool,
    pub has_ranged_weapon: bool,
    pub melee_slot_free: bool,
    pub ranged_slot_free: bool,
}

/// Picks a stance; the first matching rule wins.
///
/// Melee is preferred whenever the enemy has room for another melee
/// attacker. Ranged is the fallback, and neither slot array is ever
/// over-subscribed.
pub fn choose_combat_state(inputs: StanceInputs) -> CombatState {
    if inputs.preferred == AttackType::Ranged {
        return if inputs.ranged_slot_free {
            CombatState::Ranged
        } else {
            CombatState::Waiting
        };
    }
    if inputs.model_prefers_ranged && inputs.has_ranged_weapon && inputs.ranged_slot_free {
        return CombatState::Ranged;
    }
    if inputs.melee_slot_free {
        return CombatState::Melee;
    }
    if !inputs.has_ranged_weapon {
        return CombatState::Waiting;
    }
    if inputs.ranged_slot_free {
        return CombatState::Ranged;
    }
    CombatState::Waiting
}

impl<'a> GameEngine<'a> {
    /// Whether the creature's model has any ranged instance.
    pub fn creature_has_ranged_weapon(&self, creature: CreatureId) -> bool {
        !self
            .model_instances_of_kind(creature, InstanceKind::Ranged)
            .is_empty()
    }

    pub fn get_combat_state_for_combat(
        &self,
        fighter: CreatureId,
        enemy: CreatureId,
        preferred: AttackType,
    ) -> CombatState {
        let model_prefers_ranged = self
            .model_of(fighter)
            .is_ok_and(|model| model.prefers_ranged());
        let state = choose_combat_state(StanceInputs {
            preferred,
            model_prefers_ranged,
            has_ranged_weapon: self.creature_has_ranged_weapon(fighter),
            melee_slot_free: self.can_add_melee_combat_attacker(enemy),
            ranged_slot_free: self.can_add_ranged_combat_attacker(enemy),
        });
        tracing::debug!(%fighter, %enemy, %preferred, %state, "combat stance chosen");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(preferred: AttackType, ranged: bool, melee_free: bool, ranged_free: bool) -> StanceInputs {
        StanceInputs {
            preferred,
            model_prefers_ranged: false,
            has_ranged_weapon: ranged,
            melee_slot_free: melee_free,
            ranged_slot_free: ranged_free,
        }
    }

    #[test]
    fn ranged_request_uses_ranged_slot_or_waits() {
        assert_eq!(
            choose_combat_state(inputs(AttackType::Ranged, true, true, true)),
            CombatState::Ranged
        );
        assert_eq!(
            choose_combat_state(inputs(AttackType::Ranged, true, true, false)),
            CombatState::Waiting
        );
    }

    #[test]
    fn melee_full_falls_back_to_ranged() {
        assert_eq!(
            choose_combat_state(inputs(AttackType::Melee, true, false, true)),
            CombatState::Ranged
        );
    }

    #[test]
    fn melee_full_without_ranged_weapon_waits() {
        for ranged_free in [false, true] {
            assert_eq!(
                choose_combat_state(inputs(AttackType::Melee, false, false, ranged_free)),
                CombatState::Waiting
            );
        }
    }

    #[test]
    fn melee_is_preferred_when_available() {
        assert_eq!(
            choose_combat_state(inputs(AttackType::Melee, true, true, true)),
            CombatState::Melee
        );
        let archer = StanceInputs {
            model_prefers_ranged: true,
            ..inputs(AttackType::Melee, true, true, true)
        };
        assert_eq!(choose_combat_state(archer), CombatState::Ranged);
        let disarmed_archer = StanceInputs {
            model_prefers_ranged: true,
            ..inputs(AttackType::Melee, false, true, true)
        };
        assert_eq!(choose_combat_state(disarmed_archer), CombatState::Melee);
    }

    #[test]
    fn both_full_waits() {
        assert_eq!(
            choose_combat_state(inputs(AttackType::Unset, true, false, false)),
            CombatState::Waiting
        );
    }
}
