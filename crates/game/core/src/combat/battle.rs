//! Battle join and leave.
//!
//! A fighter joins the battle its enemy is already in, or one where either of
//! them is already somebody's target, or else the first free battle. After
//! every join and leave the battle is checked: once no member has combat
//! flags left, the remaining bystanders are unlinked and the slot goes idle.

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::state::{BattleId, CreatureId, LinkError, PlayerId, Position};

use super::CombatError;

impl<'a> GameEngine<'a> {
    /// Members of `battle` with any combat flag set.
    pub fn count_creatures_really_in_combat(&self, battle: BattleId) -> Result<usize, LinkError> {
        let members = self.world.battle_members(battle)?;
        Ok(members
            .iter()
            .filter(|member| !self.world.control(**member).combat_flags.is_empty())
            .count())
    }

    /// Dissolves `battle` if nobody in it is really fighting. Returns whether
    /// the battle is over.
    pub(crate) fn cleanup_battle(&mut self, battle: BattleId) -> bool {
        if !self.world.battles.is_valid(battle) {
            return true;
        }
        match self.count_creatures_really_in_combat(battle) {
            Ok(0) => {}
            Ok(count) => {
                tracing::debug!(%battle, count, "battle still has participants");
                return false;
            }
            Err(_) => return false,
        }
        let mut removed = 0usize;
        loop {
            let head = self.world.battles.get(battle).first_creatr;
            if head.is_none() {
                break;
            }
            if removed >= GameConfig::MAX_CREATURES {
                tracing::error!(%battle, "infinite loop detected when dissolving battle");
                break;
            }
            self.world.remove_thing_from_battle_list(head);
            removed += 1;
        }
        tracing::debug!(%battle, removed, "battle dissolved");
        true
    }

    /// Whether any member of `battle` is currently targeting `first` or `second`.
    fn battle_any_of_things_in_specific_battle(
        &self,
        battle: BattleId,
        first: CreatureId,
        second: CreatureId,
    ) -> bool {
        let Ok(members) = self.world.battle_members(battle) else {
            return false;
        };
        members.iter().any(|member| {
            let control = self.world.control(*member);
            let enemy = control.combat.battle_enemy;
            !control.combat_flags.is_empty()
                && self.world.creature_exists(enemy)
                && (enemy == first || enemy == second)
        })
    }

    /// Battle to put a new fight between `fighter` and `enemy` into.
    pub fn find_battle_for_thing(
        &self,
        fighter: CreatureId,
        enemy: CreatureId,
    ) -> Result<BattleId, CombatError> {
        let mut free = None;
        for battle in self.world.battles.ids() {
            if self.world.battles.exists(battle) {
                if self.battle_any_of_things_in_specific_battle(battle, fighter, enemy) {
                    return Ok(battle);
                }
            } else if free.is_none() {
                free = Some(battle);
            }
        }
        free.ok_or_else(|| {
            tracing::error!(%fighter, %enemy, "no free battle structures");
            CombatError::NoFreeBattle
        })
    }

    /// Links `fighter` (and `enemy`, if it is not fighting yet) into a battle.
    pub(crate) fn battle_add(&mut self, fighter: CreatureId, enemy: CreatureId) -> Result<(), CombatError> {
        if !self.world.creature_exists(fighter) || !self.world.creature_exists(enemy) {
            tracing::error!(%fighter, %enemy, "attempt to create battle with invalid creature");
            return Err(CombatError::InvalidEnemy { fighter, enemy });
        }
        let previous = self.world.control(fighter).battle_id;
        if previous.is_some() {
            self.world.remove_thing_from_battle_list(fighter);
            self.cleanup_battle(previous);
        }
        let stuck = self.world.control(fighter).battle_id;
        if stuck.is_some() {
            tracing::error!(%fighter, battle = %stuck, "removing from battle had no effect");
            return Err(CombatError::StillInBattle {
                creature: fighter,
                battle: stuck,
            });
        }

        let enemy_battle = self.world.control(enemy).battle_id;
        let battle = if enemy_battle.is_some() {
            enemy_battle
        } else {
            self.find_battle_for_thing(fighter, enemy)?
        };
        self.world.insert_thing_in_battle_list(fighter, battle);
        if enemy_battle.is_none() {
            self.world.insert_thing_in_battle_list(enemy, battle);
        }
        tracing::debug!(%fighter, %enemy, %battle, "joined battle");
        self.update_battle_location(battle);
        self.cleanup_battle(battle);
        Ok(())
    }

    /// Unlinks `fighter` from its battle. Returns whether the battle is over.
    pub(crate) fn battle_remove(&mut self, fighter: CreatureId) -> Result<bool, CombatError> {
        let battle = self.world.control(fighter).battle_id;
        if battle.is_none() {
            tracing::error!(%fighter, "attempt to remove creature from battle when it isn't in one");
            return Err(CombatError::NotInBattle(fighter));
        }
        self.world.remove_thing_from_battle_list(fighter);
        let over = self.cleanup_battle(battle);
        tracing::debug!(%fighter, %battle, over, "left battle");
        Ok(over)
    }

    /// Drops a battle link left behind by an interrupted fight.
    pub(crate) fn cleanup_battle_leftovers(&mut self, creature: CreatureId) {
        if self.world.control(creature).battle_id.is_some() {
            if let Err(error) = self.battle_remove(creature) {
                tracing::warn!(%creature, %error, "stale battle link not removed");
            }
        }
    }

    /// Records where the fight is for every keeper taking part.
    fn update_battle_location(&mut self, battle: BattleId) {
        let Ok(members) = self.world.battle_members(battle) else {
            return;
        };
        let Some(location) = members.last().map(|member| self.world.creature(*member).position)
        else {
            return;
        };
        let owners: Vec<PlayerId> = members
            .iter()
            .map(|member| self.world.creature(*member).owner)
            .collect();
        for owner in owners {
            if let Some(player) = self.world.player_mut(owner) {
                if player.has_dungeon() {
                    player.last_combat_location = Some(location);
                }
            }
        }
    }

    /// Whether any creature of `player` fights in `battle`.
    pub fn battle_with_creature_of_player(&self, player: PlayerId, battle: BattleId) -> bool {
        self.world.battle_members(battle).is_ok_and(|members| {
            members
                .iter()
                .any(|member| self.world.creature(*member).owner == player)
        })
    }

    /// Position of the battle's head fighter, for cameras that jump to a fight.
    pub fn battle_location(&self, battle: BattleId) -> Option<Position> {
        let head = self.world.battles.get(battle).first_creatr;
        if !self.world.creature_exists(head) {
            tracing::error!(%battle, creature = %head, "jump to invalid creature in battle");
            return None;
        }
        Some(self.world.creature(head).position)
    }

    /// Clears the roster and every player's battle window at level start.
    pub fn battle_initialise(&mut self) {
        self.world.battles.initialise();
        let players: Vec<PlayerId> = self.world.players.ids().collect();
        for id in players {
            if let Some(player) = self.world.player_mut(id) {
                player.visible_battles = Default::default();
                player.battlers = Default::default();
            }
        }
    }
}
