//! Configuration oracle exposing game-balance thresholds to the engine.

use crate::config::GameConfig;

/// Provides access to runtime balance values.
///
/// The combat thresholds (fear sentinel, flee zone radius, opponent slot
/// limits) belong to the surrounding game rules; the engine never hard-codes
/// them.
pub trait ConfigOracle: Send + Sync {
    fn flee_zone_radius(&self) -> u32;
    fn fear_sentinel(&self) -> u8;
    fn melee_opponents_limit(&self) -> usize;
    fn ranged_opponents_limit(&self) -> usize;
    fn game_turns_in_flee(&self) -> u64;
    fn battle_check_interval(&self) -> u64;
    fn fight_fear_delay(&self) -> u64;
    fn salary_interval(&self) -> u64;
}

impl ConfigOracle for GameConfig {
    fn flee_zone_radius(&self) -> u32 {
        self.flee_zone_radius
    }

    fn fear_sentinel(&self) -> u8 {
        self.fear_sentinel
    }

    fn melee_opponents_limit(&self) -> usize {
        usize::from(self.melee_opponents_limit).min(GameConfig::MAX_OPPONENTS)
    }

    fn ranged_opponents_limit(&self) -> usize {
        usize::from(self.ranged_opponents_limit).min(GameConfig::MAX_OPPONENTS)
    }

    fn game_turns_in_flee(&self) -> u64 {
        self.game_turns_in_flee
    }

    fn battle_check_interval(&self) -> u64 {
        self.battle_check_interval.max(1)
    }

    fn fight_fear_delay(&self) -> u64 {
        self.fight_fear_delay
    }

    fn salary_interval(&self) -> u64 {
        self.salary_interval.max(1)
    }
}

/// Copy of the thresholds taken once per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatRules {
    pub flee_zone_radius: u32,
    pub fear_sentinel: u8,
    pub melee_limit: usize,
    pub ranged_limit: usize,
    pub game_turns_in_flee: u64,
    pub battle_check_interval: u64,
    pub fight_fear_delay: u64,
}

impl CombatRules {
    pub fn from_oracle(config: &(impl ConfigOracle + ?Sized)) -> Self {
        Self {
            flee_zone_radius: config.flee_zone_radius(),
            fear_sentinel: config.fear_sentinel(),
            melee_limit: config.melee_opponents_limit().min(GameConfig::MAX_OPPONENTS),
            ranged_limit: config.ranged_opponents_limit().min(GameConfig::MAX_OPPONENTS),
            game_turns_in_flee: config.game_turns_in_flee(),
            battle_check_interval: config.battle_check_interval().max(1),
            fight_fear_delay: config.fight_fear_delay(),
        }
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self::from_oracle(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped_to_slot_capacity() {
        let config = GameConfig::new().with_opponents_limits(9, 2);
        let rules = CombatRules::from_oracle(&config);
        assert_eq!(rules.melee_limit, GameConfig::MAX_OPPONENTS);
        assert_eq!(rules.ranged_limit, 2);
    }

    #[test]
    fn zero_check_interval_is_treated_as_every_turn() {
        let config = GameConfig {
            battle_check_interval: 0,
            ..GameConfig::new()
        };
        assert_eq!(config.battle_check_interval(), 1);
    }
}
