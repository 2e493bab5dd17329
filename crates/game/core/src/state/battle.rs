//! Battle roster and the intrusive "who fights in battle N" lists.
//!
//! The roster is a fixed array of [`CreatureBattle`] records; slot 0 is the
//! sentinel. A battle is active while `fighters_num > 0` and is recycled
//! lazily once its list empties. Each member's [`super::CreatureControl`]
//! carries the `battle_prev`/`battle_next` links; new fighters are inserted at
//! the head.

use arrayvec::ArrayVec;

use crate::config::GameConfig;

use super::{BattleId, CreatureId, LinkError, World};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureBattle {
    pub first_creatr: CreatureId,
    pub fighters_num: u16,
}

impl CreatureBattle {
    pub fn is_active(&self) -> bool {
        self.fighters_num > 0
    }
}

/// Members of one battle in list order.
pub type BattleMembers = ArrayVec<CreatureId, { GameConfig::MAX_CREATURES }>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleRoster {
    battles: Vec<CreatureBattle>,
}

impl BattleRoster {
    pub fn new() -> Self {
        Self {
            battles: vec![CreatureBattle::default(); GameConfig::MAX_BATTLES],
        }
    }

    pub fn capacity(&self) -> usize {
        self.battles.len()
    }

    /// Bounds-checked lookup; id 0 and out-of-range ids yield the sentinel.
    pub fn get(&self, id: BattleId) -> &CreatureBattle {
        if self.is_valid(id) {
            &self.battles[id.index()]
        } else {
            &self.battles[0]
        }
    }

    pub fn get_mut(&mut self, id: BattleId) -> Option<&mut CreatureBattle> {
        if self.is_valid(id) {
            self.battles.get_mut(id.index())
        } else {
            None
        }
    }

    pub fn is_valid(&self, id: BattleId) -> bool {
        id.is_some() && id.index() < self.battles.len()
    }

    pub fn exists(&self, id: BattleId) -> bool {
        self.is_valid(id) && self.battles[id.index()].is_active()
    }

    /// Valid battle ids in ascending order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = BattleId> {
        (1..self.battles.len()).map(|index| BattleId(index as u8))
    }

    /// Bulk-clears the roster at level start.
    pub fn initialise(&mut self) {
        self.battles.fill(CreatureBattle::default());
    }
}

impl Default for BattleRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Links `creature` at the head of `battle`'s list.
    pub(crate) fn insert_thing_in_battle_list(&mut self, creature: CreatureId, battle: BattleId) {
        let old_head = self.battles.get(battle).first_creatr;
        let Some(record) = self.battles.get_mut(battle) else {
            tracing::error!(%creature, %battle, "insert into invalid battle");
            return;
        };
        record.first_creatr = creature;
        record.fighters_num += 1;

        if let Some(control) = self.control_mut(creature) {
            control.battle_id = battle;
            control.battle_prev = CreatureId::NONE;
            control.battle_next = old_head;
        }
        if old_head.is_some() {
            if let Some(head) = self.control_mut(old_head) {
                head.battle_prev = creature;
            }
        }
    }

    /// Unlinks `creature` from its battle and zeroes its links.
    pub(crate) fn remove_thing_from_battle_list(&mut self, creature: CreatureId) {
        let control = self.control(creature);
        if !control.exists() {
            tracing::error!(%creature, "creature should have been already removed from battle");
            return;
        }
        let battle = control.battle_id;
        let prev = control.battle_prev;
        let next = control.battle_next;

        // Predecessor's forward link, or the head when unlinking the first member.
        if prev.is_some() {
            match self.control_mut(prev) {
                Some(prev_control) => prev_control.battle_next = next,
                None => {
                    tracing::warn!(%creature, partner = %prev, "invalid previous in battle; truncating");
                    if let Some(record) = self.battles.get_mut(battle) {
                        record.first_creatr = next;
                    }
                }
            }
        } else if let Some(record) = self.battles.get_mut(battle) {
            record.first_creatr = next;
        }
        if next.is_some() {
            match self.control_mut(next) {
                Some(next_control) => next_control.battle_prev = prev,
                None => tracing::warn!(%creature, partner = %next, "invalid next in battle"),
            }
        }

        if let Some(control) = self.control_mut(creature) {
            control.battle_id = BattleId::NONE;
            control.battle_prev = CreatureId::NONE;
            control.battle_next = CreatureId::NONE;
        }

        let Some(record) = self.battles.get_mut(battle) else {
            tracing::error!(%creature, %battle, "creature was in invalid battle");
            return;
        };
        if record.fighters_num > 0 {
            record.fighters_num -= 1;
        } else {
            tracing::error!(%creature, %battle, "removing from battle, but counter is 0");
        }
    }

    /// Walks `battle`'s list from the head.
    ///
    /// The walk is budgeted at the creature pool size. On overrun or a link to
    /// a missing creature it logs the inconsistency and aborts.
    pub fn battle_members(&self, battle: BattleId) -> Result<BattleMembers, LinkError> {
        let mut members = BattleMembers::new();
        if !self.battles.is_valid(battle) {
            return Ok(members);
        }
        let budget = GameConfig::MAX_CREATURES;
        let mut cursor = self.battles.get(battle).first_creatr;
        while cursor.is_some() {
            if !self.creature_exists(cursor) {
                tracing::error!(%battle, creature = %cursor, "jump to invalid creature in battle list");
                return Err(LinkError::BattleBroken {
                    battle,
                    creature: cursor,
                });
            }
            if members.try_push(cursor).is_err() {
                tracing::error!(%battle, budget, "infinite loop detected when sweeping battle list");
                return Err(LinkError::BattleOverrun { battle, budget });
            }
            cursor = self.control(cursor).battle_next;
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_for_out_of_range_ids() {
        let mut roster = BattleRoster::new();
        assert!(!roster.is_valid(BattleId(0)));
        assert!(!roster.is_valid(BattleId(48)));
        assert!(roster.is_valid(BattleId(47)));
        assert!(roster.get_mut(BattleId(48)).is_none());
        assert_eq!(*roster.get(BattleId(200)), CreatureBattle::default());
        assert_eq!(roster.ids().count(), GameConfig::MAX_BATTLES - 1);
    }

    #[test]
    fn initialise_clears_every_battle() {
        let mut roster = BattleRoster::new();
        if let Some(battle) = roster.get_mut(BattleId(3)) {
            battle.first_creatr = CreatureId(9);
            battle.fighters_num = 1;
        }
        assert!(roster.exists(BattleId(3)));
        roster.initialise();
        assert!(!roster.exists(BattleId(3)));
    }
}
