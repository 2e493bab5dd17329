//! Per-player data the behavior engine reads and writes.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::GameConfig;

use super::{BattleId, CreatureId, PlayerId, Position};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerKind {
    /// Dungeon keeper with a heart and rooms.
    #[default]
    Keeper,
    /// Invading heroes; flee toward hero gates.
    Hero,
    /// Unowned creatures. Never anyone's enemy.
    Neutral,
}

bitflags! {
    /// Keeper-wide standing orders.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PlayerTendencies: u8 {
        /// Wounded creatures flee once health drops under their fear rating.
        const FLEE     = 1 << 0;
        const IMPRISON = 1 << 1;
    }
}

pub type BattlerList = ArrayVec<CreatureId, { GameConfig::BATTLERS_PER_SIDE }>;

/// Fighters shown for one visible battle, split by allegiance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleSides {
    pub friendly: BattlerList,
    pub enemy: BattlerList,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub kind: PlayerKind,
    pub active: bool,
    pub tendencies: PlayerTendencies,
    pub heart: Option<Position>,
    /// Creatures of this player currently engaged as attackers.
    pub fights_num: u32,
    pub creatures_annoyed: u32,
    /// Battle window; 0 marks an empty slot.
    pub visible_battles: [BattleId; GameConfig::VISIBLE_BATTLES],
    pub battlers: [BattleSides; GameConfig::VISIBLE_BATTLES],
    pub last_combat_location: Option<Position>,
    /// Bit `n` set means allied with player `n`.
    allies: u8,
}

impl PlayerState {
    pub fn keeper() -> Self {
        Self {
            kind: PlayerKind::Keeper,
            active: true,
            ..Self::default()
        }
    }

    pub fn heroes() -> Self {
        Self {
            kind: PlayerKind::Hero,
            active: true,
            ..Self::default()
        }
    }

    pub fn neutral() -> Self {
        Self {
            kind: PlayerKind::Neutral,
            active: true,
            ..Self::default()
        }
    }

    pub fn with_heart(mut self, heart: Position) -> Self {
        self.heart = Some(heart);
        self
    }

    pub fn with_tendencies(mut self, tendencies: PlayerTendencies) -> Self {
        self.tendencies = tendencies;
        self
    }

    /// Only keepers own a dungeon (rooms, lairs, heart).
    pub fn has_dungeon(&self) -> bool {
        self.kind == PlayerKind::Keeper && self.active
    }

    pub fn is_allied_with(&self, other: PlayerId) -> bool {
        other.index() < 8 && self.allies & (1 << other.index()) != 0
    }
}

/// Fixed table of player slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Players {
    slots: [PlayerState; GameConfig::MAX_PLAYERS],
    sentinel: PlayerState,
}

impl Players {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
            sentinel: PlayerState::default(),
        }
    }

    /// Player record, or an inactive placeholder for unknown ids.
    pub fn get(&self, id: PlayerId) -> &PlayerState {
        self.slots.get(id.index()).unwrap_or(&self.sentinel)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.slots.get_mut(id.index())
    }

    pub fn set(&mut self, id: PlayerId, state: PlayerState) {
        match self.slots.get_mut(id.index()) {
            Some(slot) => *slot = state,
            None => tracing::error!(player = %id, "player slot out of range"),
        }
    }

    pub fn exists(&self, id: PlayerId) -> bool {
        self.get(id).active
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..GameConfig::MAX_PLAYERS).map(|index| PlayerId(index as u8))
    }

    /// Makes two players mutual allies.
    pub fn ally(&mut self, a: PlayerId, b: PlayerId) {
        if a.index() >= GameConfig::MAX_PLAYERS || b.index() >= GameConfig::MAX_PLAYERS {
            tracing::error!(%a, %b, "alliance with unknown player");
            return;
        }
        if let Some(player) = self.get_mut(a) {
            player.allies |= 1 << b.index();
        }
        if let Some(player) = self.get_mut(b) {
            player.allies |= 1 << a.index();
        }
    }

    pub fn players_are_allies(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b || (self.get(a).is_allied_with(b) && self.get(b).is_allied_with(a))
    }

    /// Distinct, non-allied players where neither side is neutral.
    pub fn players_are_enemies(&self, a: PlayerId, b: PlayerId) -> bool {
        if self.get(a).kind == PlayerKind::Neutral || self.get(b).kind == PlayerKind::Neutral {
            return false;
        }
        !self.players_are_allies(a, b)
    }
}

impl Default for Players {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_nobodys_enemy() {
        let mut players = Players::new();
        players.set(PlayerId(0), PlayerState::keeper());
        players.set(PlayerId(1), PlayerState::keeper());
        players.set(PlayerId(4), PlayerState::neutral());

        assert!(players.players_are_enemies(PlayerId(0), PlayerId(1)));
        assert!(!players.players_are_enemies(PlayerId(0), PlayerId(0)));
        assert!(!players.players_are_enemies(PlayerId(0), PlayerId(4)));
    }

    #[test]
    fn alliances_are_mutual() {
        let mut players = Players::new();
        players.set(PlayerId(0), PlayerState::keeper());
        players.set(PlayerId(2), PlayerState::heroes());
        players.ally(PlayerId(0), PlayerId(2));

        assert!(players.players_are_allies(PlayerId(2), PlayerId(0)));
        assert!(!players.players_are_enemies(PlayerId(0), PlayerId(2)));
    }

    #[test]
    fn unknown_player_is_inactive() {
        let players = Players::new();
        assert!(!players.exists(PlayerId(9)));
        assert!(!players.get(PlayerId(9)).has_dungeon());
    }
}
