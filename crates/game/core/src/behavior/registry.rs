//! Static state table.
//!
//! Every [`StateId`] maps to exactly one [`StateInfo`]: its classification and
//! the set of needs allowed to interrupt it. Behavior callbacks are resolved by
//! exhaustive `match` in the engine's dispatcher, so adding a state without
//! wiring its callbacks fails to compile.

use bitflags::bitflags;

/// Identifier of a behavior state.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateId {
    /// No state assigned.
    #[default]
    Unused,
    MoveToPosition,
    CreatureDoingNothing,
    GoodDoingNothing,
    CreatureDormant,
    CreatureGoingHomeToSleep,
    AtLairToSleep,
    CreatureSleep,
    AtTrainingRoom,
    Training,
    CreatureWantsSalary,
    CreatureTakeSalary,
    PersonSulkHeadForLair,
    PersonSulking,
    ArriveAtCallToArms,
    CreatureInCombat,
    CreatureCombatFlee,
    CreatureObjectCombat,
    CreatureDoorCombat,
    CreatureLeaves,
    CreatureUnconscious,
}

/// Coarse classification of a state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateType {
    Idle,
    Work,
    OwnNeeds,
    Sleep,
    Feed,
    FightCreature,
    Move,
    GetsSalary,
    Escape,
    Unconscious,
    AngerJob,
    FightDoor,
    FightObject,
    CalledToArms,
    Follow,
}

/// Need categories that may interrupt a running state.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeedCategory {
    Feed,
    OwnNeeds,
    Sleep,
    FightCreature,
    GetsSalary,
    Escape,
    Unconscious,
    AngerJob,
    FightObject,
    FightDoor,
    CalledToArms,
    Follow,
}

impl NeedCategory {
    pub const fn flag(self) -> OverrideFlags {
        match self {
            NeedCategory::Feed => OverrideFlags::FEED,
            NeedCategory::OwnNeeds => OverrideFlags::OWN_NEEDS,
            NeedCategory::Sleep => OverrideFlags::SLEEP,
            NeedCategory::FightCreature => OverrideFlags::FIGHT_CREATURE,
            NeedCategory::GetsSalary => OverrideFlags::GETS_SALARY,
            NeedCategory::Escape => OverrideFlags::ESCAPE,
            NeedCategory::Unconscious => OverrideFlags::UNCONSCIOUS,
            NeedCategory::AngerJob => OverrideFlags::ANGER_JOB,
            NeedCategory::FightObject => OverrideFlags::FIGHT_OBJECT,
            NeedCategory::FightDoor => OverrideFlags::FIGHT_DOOR,
            NeedCategory::CalledToArms => OverrideFlags::CALLED_TO_ARMS,
            NeedCategory::Follow => OverrideFlags::FOLLOW,
        }
    }
}

impl StateType {
    /// Need a request for a state of this type competes as. Plain activity
    /// (idle, work, movement) is not a need and is never refused.
    pub const fn need(self) -> Option<NeedCategory> {
        match self {
            StateType::Idle | StateType::Work | StateType::Move => None,
            StateType::OwnNeeds => Some(NeedCategory::OwnNeeds),
            StateType::Sleep => Some(NeedCategory::Sleep),
            StateType::Feed => Some(NeedCategory::Feed),
            StateType::FightCreature => Some(NeedCategory::FightCreature),
            StateType::GetsSalary => Some(NeedCategory::GetsSalary),
            StateType::Escape => Some(NeedCategory::Escape),
            StateType::Unconscious => Some(NeedCategory::Unconscious),
            StateType::AngerJob => Some(NeedCategory::AngerJob),
            StateType::FightDoor => Some(NeedCategory::FightDoor),
            StateType::FightObject => Some(NeedCategory::FightObject),
            StateType::CalledToArms => Some(NeedCategory::CalledToArms),
            StateType::Follow => Some(NeedCategory::Follow),
        }
    }

    /// Types that temporarily interrupt a job rather than replace it.
    pub const fn is_interruption(self) -> bool {
        matches!(self, StateType::FightCreature | StateType::Escape)
    }
}

bitflags! {
    /// Per-state permission bits, one per [`NeedCategory`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OverrideFlags: u16 {
        const FEED           = 1 << 0;
        const OWN_NEEDS      = 1 << 1;
        const SLEEP          = 1 << 2;
        const FIGHT_CREATURE = 1 << 3;
        const GETS_SALARY    = 1 << 4;
        const ESCAPE         = 1 << 5;
        const UNCONSCIOUS    = 1 << 6;
        const ANGER_JOB      = 1 << 7;
        const FIGHT_OBJECT   = 1 << 8;
        const FIGHT_DOOR     = 1 << 9;
        const CALLED_TO_ARMS = 1 << 10;
        const FOLLOW         = 1 << 11;
    }
}

impl OverrideFlags {
    /// Emergencies that may cut into any ordinary task.
    pub const EMERGENCIES: Self = Self::FIGHT_CREATURE
        .union(Self::ESCAPE)
        .union(Self::UNCONSCIOUS)
        .union(Self::FIGHT_OBJECT)
        .union(Self::FIGHT_DOOR)
        .union(Self::CALLED_TO_ARMS)
        .union(Self::FOLLOW);

    pub fn allows(self, need: NeedCategory) -> bool {
        self.contains(need.flag())
    }
}

/// Registry entry of one state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateInfo {
    pub id: StateId,
    pub state_type: StateType,
    pub overrides: OverrideFlags,
}

impl StateInfo {
    const fn new(id: StateId, state_type: StateType, overrides: OverrideFlags) -> Self {
        Self {
            id,
            state_type,
            overrides,
        }
    }

    pub fn allows(&self, need: NeedCategory) -> bool {
        self.overrides.allows(need)
    }
}

/// Looks up the registry entry of `id`.
pub const fn state_info(id: StateId) -> StateInfo {
    use OverrideFlags as F;
    use StateType as T;

    let all = F::all();
    let emergencies = F::EMERGENCIES;
    match id {
        StateId::Unused => StateInfo::new(id, T::Idle, all),
        StateId::MoveToPosition => StateInfo::new(id, T::Move, all),
        StateId::CreatureDoingNothing => StateInfo::new(id, T::Idle, all),
        StateId::GoodDoingNothing => StateInfo::new(id, T::Idle, all),
        StateId::CreatureDormant => StateInfo::new(id, T::Idle, all),
        StateId::CreatureGoingHomeToSleep => {
            StateInfo::new(id, T::OwnNeeds, emergencies.union(F::FEED))
        }
        StateId::AtLairToSleep => StateInfo::new(id, T::Sleep, emergencies),
        StateId::CreatureSleep => StateInfo::new(
            id,
            T::Sleep,
            emergencies
                .union(F::FEED)
                .union(F::GETS_SALARY)
                .union(F::ANGER_JOB),
        ),
        StateId::AtTrainingRoom => StateInfo::new(id, T::Work, all),
        StateId::Training => StateInfo::new(id, T::Work, all),
        StateId::CreatureWantsSalary => {
            StateInfo::new(id, T::GetsSalary, emergencies.union(F::FEED))
        }
        StateId::CreatureTakeSalary => StateInfo::new(id, T::GetsSalary, emergencies),
        StateId::PersonSulkHeadForLair => {
            StateInfo::new(id, T::AngerJob, emergencies.union(F::GETS_SALARY))
        }
        StateId::PersonSulking => {
            StateInfo::new(id, T::AngerJob, emergencies.union(F::GETS_SALARY))
        }
        StateId::ArriveAtCallToArms => StateInfo::new(
            id,
            T::CalledToArms,
            emergencies.difference(F::CALLED_TO_ARMS),
        ),
        StateId::CreatureInCombat => StateInfo::new(
            id,
            T::FightCreature,
            F::ESCAPE.union(F::UNCONSCIOUS).union(F::CALLED_TO_ARMS),
        ),
        StateId::CreatureCombatFlee => {
            StateInfo::new(id, T::Escape, F::FIGHT_CREATURE.union(F::UNCONSCIOUS))
        }
        StateId::CreatureObjectCombat => StateInfo::new(
            id,
            T::FightObject,
            F::FIGHT_CREATURE.union(F::ESCAPE).union(F::UNCONSCIOUS),
        ),
        StateId::CreatureDoorCombat => StateInfo::new(
            id,
            T::FightDoor,
            F::FIGHT_CREATURE.union(F::ESCAPE).union(F::UNCONSCIOUS),
        ),
        StateId::CreatureLeaves => StateInfo::new(id, T::AngerJob, F::empty()),
        StateId::CreatureUnconscious => StateInfo::new(id, T::Unconscious, F::empty()),
    }
}

/// Disposition returned by a state's process callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateReturn {
    /// The creature no longer exists; stop touching it.
    Deleted,
    Unchanged,
    Modified,
    /// Task ended and the creature was sent back to its start state.
    ResetOk,
    /// Task abandoned and the creature was sent back to its start state.
    ResetFail,
}

/// Verdict of a continue state on arrival of a move composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveCheck {
    /// Resume the continue state.
    Available,
    /// The check already redirected the creature.
    Continue,
    Deleted,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn registry_entry_matches_its_id() {
        for id in StateId::iter() {
            assert_eq!(state_info(id).id, id);
        }
    }

    #[test]
    fn flee_may_turn_into_a_fight_to_the_death() {
        assert!(state_info(StateId::CreatureCombatFlee).allows(NeedCategory::FightCreature));
        assert!(!state_info(StateId::CreatureCombatFlee).allows(NeedCategory::Escape));
    }

    #[test]
    fn obstacle_fights_yield_to_creatures() {
        for id in [StateId::CreatureObjectCombat, StateId::CreatureDoorCombat] {
            assert!(state_info(id).allows(NeedCategory::FightCreature));
        }
        assert!(state_info(StateId::CreatureInCombat).allows(NeedCategory::Escape));
        assert!(!state_info(StateId::CreatureInCombat).allows(NeedCategory::FightCreature));
    }

    #[test]
    fn terminal_states_refuse_every_need() {
        for id in [StateId::CreatureUnconscious, StateId::CreatureLeaves] {
            for need in NeedCategory::iter() {
                assert!(!state_info(id).allows(need), "{id} allowed {need}");
            }
        }
    }

    #[test]
    fn plain_activity_is_not_a_need() {
        assert_eq!(StateType::Idle.need(), None);
        assert_eq!(StateType::Move.need(), None);
        assert_eq!(StateType::Escape.need(), Some(NeedCategory::Escape));
        assert_eq!(NeedCategory::Escape.flag(), OverrideFlags::ESCAPE);
    }
}
