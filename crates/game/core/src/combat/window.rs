//! Per-player window of visible battles.
//!
//! A keeper watches up to [`GameConfig::VISIBLE_BATTLES`] battles its
//! creatures take part in. The window keeps active battles in their slots,
//! packs them to the front and fills the tail by searching the roster
//! forward from the last battle still shown, wrapping around.

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::state::{BattleId, BattleSides, PlayerId};

impl<'a> GameEngine<'a> {
    fn battle_of_mine(&self, player: PlayerId, battle: BattleId) -> bool {
        self.world.battles.exists(battle) && self.battle_with_creature_of_player(player, battle)
    }

    pub fn find_first_battle_of_mine(&self, player: PlayerId) -> BattleId {
        self.world
            .battles
            .ids()
            .find(|battle| self.battle_of_mine(player, *battle))
            .unwrap_or(BattleId::NONE)
    }

    pub fn find_last_battle_of_mine(&self, player: PlayerId) -> BattleId {
        self.world
            .battles
            .ids()
            .rev()
            .find(|battle| self.battle_of_mine(player, *battle))
            .unwrap_or(BattleId::NONE)
    }

    /// Next battle of `player` after `from`, wrapping to the first one.
    pub fn find_next_battle_of_mine(&self, player: PlayerId, from: BattleId) -> BattleId {
        self.world
            .battles
            .ids()
            .filter(|battle| battle.0 > from.0)
            .find(|battle| self.battle_of_mine(player, *battle))
            .unwrap_or_else(|| self.find_first_battle_of_mine(player))
    }

    /// Previous battle of `player` before `from`, wrapping to the last one.
    pub fn find_previous_battle_of_mine(&self, player: PlayerId, from: BattleId) -> BattleId {
        self.world
            .battles
            .ids()
            .rev()
            .filter(|battle| battle.0 < from.0)
            .find(|battle| self.battle_of_mine(player, *battle))
            .unwrap_or_else(|| self.find_last_battle_of_mine(player))
    }

    /// Whether `battle` already occupies a slot of the player's window.
    pub fn battle_in_list(&self, player: PlayerId, battle: BattleId) -> bool {
        battle.is_some() && self.world.player(player).visible_battles.contains(&battle)
    }

    pub fn find_next_battle_of_mine_excluding_current_list(&self, player: PlayerId, from: BattleId) -> BattleId {
        self.step_excluding_current_list(player, from, Self::find_next_battle_of_mine)
    }

    pub fn find_previous_battle_of_mine_excluding_current_list(
        &self,
        player: PlayerId,
        from: BattleId,
    ) -> BattleId {
        self.step_excluding_current_list(player, from, Self::find_previous_battle_of_mine)
    }

    /// Repeats `step` until it lands on a battle not shown yet. A full wrap
    /// without a match yields no battle.
    fn step_excluding_current_list(
        &self,
        player: PlayerId,
        from: BattleId,
        step: fn(&Self, PlayerId, BattleId) -> BattleId,
    ) -> BattleId {
        let mut battle = step(self, player, from);
        let start = battle;
        let mut steps = 0usize;
        while self.battle_in_list(player, battle) {
            battle = step(self, player, battle);
            steps += 1;
            if battle == start || steps > GameConfig::MAX_BATTLES {
                return BattleId::NONE;
            }
        }
        battle
    }

    /// Scrolls the window one battle forward. Returns whether any battle is
    /// shown afterwards.
    pub fn step_battles_forward(&mut self, player: PlayerId) -> bool {
        if !self.world.player(player).has_dungeon() {
            tracing::error!(%player, "cannot step battles; player has no dungeon");
            return false;
        }
        let last = GameConfig::VISIBLE_BATTLES - 1;
        let tail = self.world.player(player).visible_battles[last];
        if tail.is_some() {
            let next = self.find_next_battle_of_mine_excluding_current_list(player, tail);
            if next.is_some() {
                self.set_visible_battle(player, last, next);
                let mut cursor = next;
                for slot in (0..last).rev() {
                    cursor = self.find_previous_battle_of_mine_excluding_current_list(player, cursor);
                    self.set_visible_battle(player, slot, cursor);
                }
            }
        }
        self.active_battle_exists(player)
    }

    /// Scrolls the window one battle back.
    pub fn step_battles_backward(&mut self, player: PlayerId) -> bool {
        if !self.world.player(player).has_dungeon() {
            tracing::error!(%player, "cannot step battles; player has no dungeon");
            return false;
        }
        let head = self.world.player(player).visible_battles[0];
        if head.is_some() {
            let previous = self.find_previous_battle_of_mine_excluding_current_list(player, head);
            if previous.is_some() {
                self.set_visible_battle(player, 0, previous);
                let mut cursor = previous;
                for slot in 1..GameConfig::VISIBLE_BATTLES {
                    cursor = self.find_next_battle_of_mine_excluding_current_list(player, cursor);
                    self.set_visible_battle(player, slot, cursor);
                }
            }
        }
        self.active_battle_exists(player)
    }

    pub fn active_battle_exists(&self, player: PlayerId) -> bool {
        self.world.player(player).visible_battles[0].is_some()
    }

    fn set_visible_battle(&mut self, player: PlayerId, slot: usize, battle: BattleId) {
        if let Some(state) = self.world.player_mut(player) {
            state.visible_battles[slot] = battle;
        }
    }

    /// Refreshes the player's window: drops finished battles, compacts the
    /// rest to the front, fills free slots and rebuilds the battler lists.
    pub fn maintain_my_battle_list(&mut self, player: PlayerId) {
        let mut window = self.world.player(player).visible_battles;
        let mut last_shown = BattleId::NONE;
        for slot in window.iter_mut() {
            if self.world.battles.get(*slot).is_active() {
                last_shown = *slot;
            } else {
                *slot = BattleId::NONE;
            }
        }
        let mut packed = [BattleId::NONE; GameConfig::VISIBLE_BATTLES];
        for (target, battle) in packed.iter_mut().zip(window.into_iter().filter(|battle| battle.is_some())) {
            *target = battle;
        }
        if let Some(state) = self.world.player_mut(player) {
            state.visible_battles = packed;
        }

        for slot in 0..GameConfig::VISIBLE_BATTLES {
            if self.world.player(player).visible_battles[slot].is_some() {
                continue;
            }
            last_shown = self.find_next_battle_of_mine_excluding_current_list(player, last_shown);
            if last_shown.is_some() {
                self.set_visible_battle(player, slot, last_shown);
            }
        }

        for slot in 0..GameConfig::VISIBLE_BATTLES {
            let battle = self.world.player(player).visible_battles[slot];
            let sides = if battle.is_some() {
                self.setup_player_battlers(player, battle)
            } else {
                BattleSides::default()
            };
            if let Some(state) = self.world.player_mut(player) {
                state.battlers[slot] = sides;
            }
        }
    }

    /// Splits the members of `battle` into the player's side and the enemy
    /// side, keeping at most [`GameConfig::BATTLERS_PER_SIDE`] of each.
    pub fn setup_player_battlers(&self, player: PlayerId, battle: BattleId) -> BattleSides {
        let mut sides = BattleSides::default();
        let members = match self.world.battle_members(battle) {
            Ok(members) => members,
            Err(error) => {
                tracing::error!(%player, %battle, %error, "cannot list battlers");
                return sides;
            }
        };
        for member in members {
            let owner = self.world.creature(member).owner;
            let list = if self.world.players.players_are_allies(player, owner) {
                &mut sides.friendly
            } else {
                &mut sides.enemy
            };
            let _ = list.try_push(member);
        }
        sides
    }
}

#[cfg(test)]
mod tests {
    use crate::env::GameEnv;
    use crate::state::{BattleId, CreatureSpawn, ModelId, PlayerId, PlayerState, Position, World};

    use super::GameEngine;

    const KEEPER: PlayerId = PlayerId(0);
    const RIVAL: PlayerId = PlayerId(1);

    fn world_with_battles(battles: &[u8]) -> World {
        let mut world = World::new(3)
            .with_player(KEEPER, PlayerState::keeper().with_heart(Position::new(768, 768)))
            .with_player(RIVAL, PlayerState::keeper());
        for battle in battles {
            let ours = world
                .allocate_creature(CreatureSpawn::new(ModelId(1), KEEPER, Position::ORIGIN))
                .unwrap();
            let theirs = world
                .allocate_creature(CreatureSpawn::new(ModelId(1), RIVAL, Position::ORIGIN))
                .unwrap();
            world.insert_thing_in_battle_list(ours, BattleId(*battle));
            world.insert_thing_in_battle_list(theirs, BattleId(*battle));
        }
        world
    }

    #[test]
    fn window_fills_with_distinct_active_battles() {
        let mut world = world_with_battles(&[2, 5, 9, 11]);
        let mut engine = GameEngine::new(&mut world, GameEnv::empty());
        engine.maintain_my_battle_list(KEEPER);

        let window = engine.world().player(KEEPER).visible_battles;
        assert_eq!(window, [BattleId(2), BattleId(5), BattleId(9)]);
        let sides = &engine.world().player(KEEPER).battlers[0];
        assert_eq!(sides.friendly.len(), 1);
        assert_eq!(sides.enemy.len(), 1);
    }

    #[test]
    fn finished_battles_are_replaced_in_order() {
        let mut world = world_with_battles(&[2, 5, 9, 11]);
        {
            let mut engine = GameEngine::new(&mut world, GameEnv::empty());
            engine.maintain_my_battle_list(KEEPER);
        }
        let members = world.battle_members(BattleId(5)).unwrap();
        for member in members {
            world.remove_thing_from_battle_list(member);
        }
        let mut engine = GameEngine::new(&mut world, GameEnv::empty());
        engine.maintain_my_battle_list(KEEPER);
        assert_eq!(
            engine.world().player(KEEPER).visible_battles,
            [BattleId(2), BattleId(9), BattleId(11)]
        );
    }

    #[test]
    fn fewer_battles_than_slots_leaves_tail_empty() {
        let mut world = world_with_battles(&[4]);
        let mut engine = GameEngine::new(&mut world, GameEnv::empty());
        engine.maintain_my_battle_list(KEEPER);
        assert_eq!(
            engine.world().player(KEEPER).visible_battles,
            [BattleId(4), BattleId::NONE, BattleId::NONE]
        );
        assert!(engine.active_battle_exists(KEEPER));
        assert_eq!(engine.find_next_battle_of_mine(KEEPER, BattleId(4)), BattleId(4));
        assert_eq!(
            engine.find_next_battle_of_mine_excluding_current_list(KEEPER, BattleId(4)),
            BattleId::NONE
        );
    }

    #[test]
    fn stepping_forward_scrolls_the_window() {
        let mut world = world_with_battles(&[2, 5, 9, 11]);
        let mut engine = GameEngine::new(&mut world, GameEnv::empty());
        engine.maintain_my_battle_list(KEEPER);
        assert!(engine.step_battles_forward(KEEPER));

        let window = engine.world().player(KEEPER).visible_battles;
        assert_eq!(window[2], BattleId(11));
        assert!(window.iter().all(|battle| battle.is_some()));
        assert_ne!(window[0], window[1]);
        assert_ne!(window[1], window[2]);
    }
}
