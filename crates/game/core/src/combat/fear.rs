//! Fear and the cached flee destination.

use crate::engine::GameEngine;
use crate::state::{CreatureId, PlayerKind, PlayerTendencies, Position};

/// Fear ratings and health are compared on a 1/256 scale.
const FEAR_SCALE: u64 = 256;

impl<'a> GameEngine<'a> {
    /// Fear check that ignores `fight_til_death`.
    pub fn creature_is_actually_scared(&self, creature: CreatureId, enemy: CreatureId) -> bool {
        let record = self.world.creature(creature);
        let owner = self.world.player(record.owner);
        if owner.kind == PlayerKind::Neutral {
            return false;
        }
        let (Ok(model), Ok(rules)) = (self.model_of(creature), self.rules()) else {
            return false;
        };
        if model.fear_wounded >= rules.fear_sentinel {
            if self.world.creature(enemy).model != record.model {
                return true;
            }
            // Facing only its own kind, it stands its ground.
            return self.creature_has_other_attackers(creature, record.model);
        }
        if !owner.tendencies.contains(PlayerTendencies::FLEE) {
            return false;
        }
        let threshold = u64::from(model.fear_wounded) * u64::from(record.max_health) / FEAR_SCALE;
        let scared = u64::from(record.health) < threshold;
        if scared {
            tracing::debug!(%creature, health = record.health, max = record.max_health, "scared due to low health");
        }
        scared
    }

    pub fn creature_scared(&self, creature: CreatureId, enemy: CreatureId) -> bool {
        if !self.world.creature_exists(enemy) {
            tracing::error!(%creature, %enemy, "scare check against invalid enemy");
            return false;
        }
        if self.world.control(creature).fight_til_death {
            return false;
        }
        self.creature_is_actually_scared(creature, enemy)
    }

    /// Whether the creature is already close enough to its flee destination.
    pub fn creature_in_flee_zone(&self, creature: CreatureId) -> bool {
        let control = self.world.control(creature);
        if !control.exists() {
            tracing::error!(%creature, "flee zone check without control record");
            return false;
        }
        let Ok(rules) = self.rules() else {
            return false;
        };
        self.world.creature(creature).position.distance_to(control.flee_pos) < rules.flee_zone_radius
    }

    pub fn creature_too_scared_for_combat(&self, creature: CreatureId, enemy: CreatureId) -> bool {
        self.creature_scared(creature, enemy) && !self.creature_in_flee_zone(creature)
    }

    /// Where the creature should run to.
    ///
    /// Heroes head for a reachable gate. Neutral creatures and creatures
    /// without a dungeon can only reuse an earlier flee position. Keeper
    /// creatures prefer their lair, then their heart.
    pub fn get_flee_position(&self, creature: CreatureId) -> Option<Position> {
        let record = self.world.creature(creature);
        let control = self.world.control(creature);
        let player = self.world.player(record.owner);
        let navigation = match self.env.navigation() {
            Ok(navigation) => navigation,
            Err(error) => {
                tracing::error!(%creature, %error, "no navigation to find a flee position");
                return None;
            }
        };

        if player.kind == PlayerKind::Hero {
            if let Some(gate) = navigation.find_hero_gate(creature, record.position) {
                return Some(gate);
            }
        }
        if player.kind == PlayerKind::Neutral || !player.has_dungeon() {
            return (!control.flee_pos.is_origin()).then_some(control.flee_pos);
        }

        let lair = self
            .env
            .rooms()
            .ok()
            .filter(|_| control.lair_room.is_some())
            .and_then(|rooms| rooms.room(control.lair_room))
            .map(|room| room.center)
            .filter(|center| navigation.can_navigate_to(creature, record.position, *center));
        if lair.is_some() {
            return lair;
        }
        if let Some(heart) = player.heart {
            if navigation.can_navigate_to(creature, record.position, heart) {
                return Some(heart);
            }
        }
        tracing::error!(%creature, "no dungeon heart or lair to flee to");
        None
    }

    /// Caches the flee destination. Falls back to the current position when
    /// none can be found.
    pub fn setup_combat_flee_position(&mut self, creature: CreatureId) -> bool {
        if !self.world.control(creature).exists() {
            tracing::error!(%creature, "invalid creature control");
            return false;
        }
        let found = self.get_flee_position(creature);
        let here = self.world.creature(creature).position;
        if found.is_none() {
            let player = self.world.player(self.world.creature(creature).owner);
            // Keeper creatures were already reported by the lookup.
            if player.kind == PlayerKind::Neutral || !player.has_dungeon() {
                tracing::debug!(%creature, "no flee position; staying put");
            }
        }
        if let Some(control) = self.world.control_mut(creature) {
            control.flee_pos = found.unwrap_or(here);
        }
        found.is_some()
    }

    pub(crate) fn cleanup_combat_flee(&mut self, creature: CreatureId) {
        if let Some(control) = self.world.control_mut(creature) {
            control.flee_start_turn = None;
        }
    }
}
