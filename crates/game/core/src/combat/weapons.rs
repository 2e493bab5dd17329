//! Instance selection for fights.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::env::{InstanceInfo, InstanceKind, compute_seed, seed_context};
use crate::state::{CreatureId, InstanceId};

/// Instances of one model, with their definitions.
pub type InstanceList<'a> = ArrayVec<(InstanceId, &'a InstanceInfo), { GameConfig::MAX_MODEL_INSTANCES }>;

impl<'a> GameEngine<'a> {
    /// Instances of `kind` the creature's model knows. Unknown models and
    /// instances are skipped.
    pub fn model_instances_of_kind(&self, creature: CreatureId, kind: InstanceKind) -> InstanceList<'a> {
        let Ok(model) = self.model_of(creature) else {
            return InstanceList::new();
        };
        model
            .instances
            .iter()
            .filter_map(|id| self.env.instance_info(*id).ok().map(|info| (*id, info)))
            .filter(|(_, info)| info.kind == kind)
            .collect()
    }

    pub fn creature_has_melee_weapon(&self, creature: CreatureId) -> bool {
        !self
            .model_instances_of_kind(creature, InstanceKind::Melee)
            .is_empty()
    }

    pub fn get_best_ranged_offensive_weapon(&self, creature: CreatureId, distance: u32) -> Option<InstanceId> {
        self.pick_usable_instance(creature, InstanceKind::Ranged, Some(distance))
    }

    pub fn get_best_melee_offensive_weapon(&self, creature: CreatureId, distance: u32) -> Option<InstanceId> {
        self.pick_usable_instance(creature, InstanceKind::Melee, Some(distance))
    }

    /// A self buff ready to cast, unless one is already running.
    pub fn get_self_buff(&self, creature: CreatureId) -> Option<InstanceId> {
        if self.creature_buff_active(creature) {
            return None;
        }
        self.pick_usable_instance(creature, InstanceKind::SelfBuff, None)
    }

    /// Among the instances off cooldown (and in range, when a distance is
    /// given), picks one with a turn-seeded draw.
    fn pick_usable_instance(
        &self,
        creature: CreatureId,
        kind: InstanceKind,
        distance: Option<u32>,
    ) -> Option<InstanceId> {
        let turn = self.world.turn;
        let control = self.world.control(creature);
        let usable: ArrayVec<InstanceId, { GameConfig::MAX_MODEL_INSTANCES }> = self
            .model_instances_of_kind(creature, kind)
            .into_iter()
            .filter(|(id, info)| {
                control.cooldown_ready(*id, turn) && distance.is_none_or(|d| info.in_range(d))
            })
            .map(|(id, _)| id)
            .collect();
        if usable.len() <= 1 {
            return usable.first().copied();
        }
        let index = match self.env.rng() {
            Ok(rng) => {
                let seed = compute_seed(
                    self.world.game_seed,
                    turn.0,
                    u32::from(creature.0),
                    seed_context::INSTANCE_CHOICE,
                );
                rng.pick_index(seed, usable.len())
            }
            Err(_) => 0,
        };
        usable.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::InstanceInfo;

    use super::InstanceKind;

    #[test]
    fn range_window_is_inclusive() {
        let bolt = InstanceInfo {
            kind: InstanceKind::Ranged,
            range_min: 256,
            range_max: 2048,
            action_turns: 4,
            reset_turns: 20,
        };
        assert!(!bolt.in_range(255));
        assert!(bolt.in_range(256));
        assert!(bolt.in_range(2048));
        assert!(!bolt.in_range(2049));
    }
}
