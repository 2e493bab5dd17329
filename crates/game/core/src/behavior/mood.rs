//! Anger bookkeeping and the sulking states.

use crate::behavior::{StateId, StateReturn};
use crate::engine::{EngineError, GameEngine, StateResult};
use crate::env::RoomJob;
use crate::state::{AnnoyReason, CreatureId, JobData, MoodFlags, MoveFlags, PlayerId};

/// Anger never exceeds this many multiples of the model's annoy level.
const ANGER_CAP_FACTOR: i32 = 3;
const ANGER_ABSOLUTE_CAP: i32 = 65534;

impl<'a> GameEngine<'a> {
    /// Sets one anger level and recomputes mood. Models with a zero annoy
    /// level never get angry.
    pub fn anger_set_creature_anger(&mut self, creature: CreatureId, level: i32, reason: AnnoyReason) {
        let Ok(model) = self.model_of(creature) else {
            return;
        };
        if model.annoy_level <= 0 || reason == AnnoyReason::None {
            return;
        }
        let cap = model
            .annoy_level
            .saturating_mul(ANGER_CAP_FACTOR)
            .min(ANGER_ABSOLUTE_CAP);
        let annoy_level = model.annoy_level;
        let owner = self.world.creature(creature).owner;
        let Some(control) = self.world.control_mut(creature) else {
            return;
        };
        control.annoyance[reason.index()] = level.clamp(0, cap);

        let was_angry = control.mood_flags.contains(MoodFlags::ANGRY);
        let peak = AnnoyReason::MOODY
            .iter()
            .map(|reason| control.annoyance[reason.index()])
            .max()
            .unwrap_or(0);
        control.mood_flags.set(MoodFlags::ANGRY, peak >= annoy_level);
        control
            .mood_flags
            .set(MoodFlags::LIVID, peak >= annoy_level.saturating_mul(2));
        let is_angry = control.mood_flags.contains(MoodFlags::ANGRY);
        if was_angry != is_angry {
            tracing::debug!(%creature, angry = is_angry, "mood changed");
            self.update_annoyed_count(owner, is_angry);
        }
    }

    fn update_annoyed_count(&mut self, owner: PlayerId, became_angry: bool) {
        let Some(player) = self.world.player_mut(owner) else {
            return;
        };
        if !player.has_dungeon() {
            return;
        }
        if became_angry {
            player.creatures_annoyed += 1;
        } else if player.creatures_annoyed > 0 {
            player.creatures_annoyed -= 1;
        } else {
            tracing::warn!(player = %owner, "annoyed creature count already zero");
        }
    }

    /// Adds anger for `reason`. Creatures in a fight don't get angrier.
    pub fn anger_increase_creature_anger(&mut self, creature: CreatureId, amount: i32, reason: AnnoyReason) {
        if self.creature_is_doing_combat(creature) {
            return;
        }
        let current = self.world.control(creature).annoyance_of(reason);
        self.anger_set_creature_anger(creature, current.saturating_add(amount), reason);
    }

    /// Removes anger for `reason`, or for every reason when `reason` is `None`.
    pub fn anger_reduce_creature_anger(&mut self, creature: CreatureId, amount: i32, reason: AnnoyReason) {
        if reason == AnnoyReason::None {
            for reason in AnnoyReason::MOODY {
                let current = self.world.control(creature).annoyance_of(reason);
                self.anger_set_creature_anger(creature, current.saturating_sub(amount), reason);
            }
            return;
        }
        let current = self.world.control(creature).annoyance_of(reason);
        self.anger_set_creature_anger(creature, current.saturating_sub(amount), reason);
    }

    /// Strongest reason at or above the annoy level, or `None`.
    pub fn anger_get_creature_anger_type(&self, creature: CreatureId) -> AnnoyReason {
        let Ok(model) = self.model_of(creature) else {
            return AnnoyReason::None;
        };
        if model.annoy_level <= 0 {
            return AnnoyReason::None;
        }
        let control = self.world.control(creature);
        AnnoyReason::MOODY
            .into_iter()
            .map(|reason| (reason, control.annoyance_of(reason)))
            .filter(|(_, level)| *level >= model.annoy_level)
            .max_by_key(|(_, level)| *level)
            .map_or(AnnoyReason::None, |(reason, _)| reason)
    }

    pub fn anger_is_creature_angry(&self, creature: CreatureId) -> bool {
        self.world.control(creature).mood_flags.contains(MoodFlags::ANGRY)
    }

    pub fn anger_is_creature_livid(&self, creature: CreatureId) -> bool {
        self.world.control(creature).mood_flags.contains(MoodFlags::LIVID)
    }

    /// Anger at the cap for some reason; such a creature quits.
    pub(crate) fn anger_is_maxed(&self, creature: CreatureId) -> bool {
        let Ok(model) = self.model_of(creature) else {
            return false;
        };
        if model.annoy_level <= 0 {
            return false;
        }
        let cap = model
            .annoy_level
            .saturating_mul(ANGER_CAP_FACTOR)
            .min(ANGER_ABSOLUTE_CAP);
        let control = self.world.control(creature);
        AnnoyReason::MOODY
            .into_iter()
            .any(|reason| control.annoyance_of(reason) >= cap)
    }

    pub(crate) fn person_sulk_head_for_lair(&mut self, creature: CreatureId) -> StateResult {
        let lair = self.world.control(creature).lair_room;
        let center = self.creature_room_center(creature, lair, RoomJob::Sleep)?;
        match center {
            Some(center) => {
                if let Err(error) =
                    self.setup_move_to_position(creature, center, MoveFlags::empty(), StateId::PersonSulking)
                {
                    tracing::debug!(%creature, %error, "cannot reach lair, sulking here");
                    self.internal_set_thing_state(creature, StateId::PersonSulking);
                }
            }
            None => self.internal_set_thing_state(creature, StateId::PersonSulking),
        }
        Ok(StateReturn::Modified)
    }

    pub(crate) fn person_sulking(&mut self, creature: CreatureId) -> StateResult {
        let turns_sulked = match self.world.control(creature).job {
            JobData::Sulking { turns_sulked } => turns_sulked,
            _ => {
                self.start_sulking(creature);
                0
            }
        };
        if let Some(control) = self.world.control_mut(creature) {
            control.job = JobData::Sulking {
                turns_sulked: turns_sulked.saturating_add(1),
            };
        }
        let change = self.model_of(creature)?.annoy_sulking;
        if change != 0 {
            for reason in AnnoyReason::MOODY {
                let current = self.world.control(creature).annoyance_of(reason);
                if current > 0 {
                    self.anger_set_creature_anger(creature, current.saturating_add(change), reason);
                }
            }
        }
        if !self.anger_is_creature_angry(creature) {
            tracing::debug!(%creature, turns_sulked, "done sulking");
            self.set_start_state(creature);
            return Ok(StateReturn::ResetOk);
        }
        Ok(StateReturn::Modified)
    }

    /// Sulks inside the lair when the creature stands in one.
    fn start_sulking(&mut self, creature: CreatureId) {
        let lair = self.world.control(creature).lair_room;
        if lair.is_some() && !self.world.add_creature_to_work_room(creature, lair) {
            tracing::debug!(%creature, room = %lair, "sulking outside the lair");
        }
    }

    pub(crate) fn cleanup_sulking(&mut self, creature: CreatureId) {
        self.world.remove_creature_from_work_room(creature);
    }

    /// Whether anger should interrupt what the creature is doing: a livid
    /// creature sulks, one at its anger cap leaves for good.
    pub(crate) fn process_anger_need(&mut self, creature: CreatureId) -> Result<bool, EngineError> {
        if self.anger_is_maxed(creature) && self.can_change_to_state(creature, StateId::CreatureLeaves) {
            tracing::debug!(%creature, reason = %self.anger_get_creature_anger_type(creature), "leaving the dungeon");
            self.set_state(creature, StateId::CreatureLeaves)?;
            return Ok(true);
        }
        if !self.anger_is_creature_livid(creature) {
            return Ok(false);
        }
        Ok(self
            .external_set_thing_state(creature, StateId::PersonSulkHeadForLair)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use crate::env::{CreatureModel, GameEnv, InstanceInfo, ModelOracle};
    use crate::state::{
        AnnoyReason, CreatureSpawn, InstanceId, ModelId, PlayerId, PlayerState, Position, World,
    };

    use super::GameEngine;

    struct Models(CreatureModel);

    impl ModelOracle for Models {
        fn model(&self, _: ModelId) -> Option<&CreatureModel> {
            Some(&self.0)
        }

        fn instance(&self, _: InstanceId) -> Option<&InstanceInfo> {
            None
        }
    }

    fn grumpy() -> Models {
        let mut model = CreatureModel::new("troll");
        model.annoy_level = 100;
        Models(model)
    }

    #[test]
    fn anger_is_clamped_and_drives_mood() {
        let models = grumpy();
        let env = GameEnv::new(None, None, None, Some(&models), None, None);
        let mut world = World::new(1).with_player(PlayerId(0), PlayerState::keeper());
        let creature = world
            .allocate_creature(CreatureSpawn::new(ModelId(1), PlayerId(0), Position::ORIGIN))
            .unwrap();
        let mut engine = GameEngine::new(&mut world, env);

        engine.anger_set_creature_anger(creature, 150, AnnoyReason::NotPaid);
        assert!(engine.anger_is_creature_angry(creature));
        assert!(!engine.anger_is_creature_livid(creature));
        assert_eq!(engine.world().player(PlayerId(0)).creatures_annoyed, 1);
        assert_eq!(engine.anger_get_creature_anger_type(creature), AnnoyReason::NotPaid);

        engine.anger_set_creature_anger(creature, 10_000, AnnoyReason::NoLair);
        assert_eq!(engine.world().control(creature).annoyance_of(AnnoyReason::NoLair), 300);
        assert!(engine.anger_is_creature_livid(creature));
        assert!(engine.anger_is_maxed(creature));
        assert_eq!(engine.anger_get_creature_anger_type(creature), AnnoyReason::NoLair);

        engine.anger_reduce_creature_anger(creature, 1000, AnnoyReason::None);
        assert!(!engine.anger_is_creature_angry(creature));
        assert_eq!(engine.world().player(PlayerId(0)).creatures_annoyed, 0);
    }

    #[test]
    fn zero_annoy_level_never_angers() {
        let models = Models(CreatureModel::new("imp"));
        let env = GameEnv::new(None, None, None, Some(&models), None, None);
        let mut world = World::new(1).with_player(PlayerId(0), PlayerState::keeper());
        let creature = world
            .allocate_creature(CreatureSpawn::new(ModelId(1), PlayerId(0), Position::ORIGIN))
            .unwrap();
        let mut engine = GameEngine::new(&mut world, env);
        engine.anger_increase_creature_anger(creature, 500, AnnoyReason::Hungry);
        assert_eq!(engine.world().control(creature).annoyance_of(AnnoyReason::Hungry), 0);
        assert_eq!(engine.anger_get_creature_anger_type(creature), AnnoyReason::None);
    }
}
