/// Game configuration constants and tunable balance parameters.
///
/// Capacities are compile-time constants because the pools, slot arrays and
/// battle windows are sized from them. The remaining fields are game-balance
/// values supplied by the rules collaborator; the engine only reads them through
/// [`crate::env::ConfigOracle`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Radius (map units) around the cached flee destination inside which a
    /// creature no longer re-triggers a flee decision.
    pub flee_zone_radius: u32,

    /// Fear rating meaning "scared of every other model".
    pub fear_sentinel: u8,

    /// Melee attackers a single victim accepts. Clamped to [`Self::MAX_OPPONENTS`].
    pub melee_opponents_limit: u8,

    /// Ranged attackers a single victim accepts. Clamped to [`Self::MAX_OPPONENTS`].
    pub ranged_opponents_limit: u8,

    /// Turns a fleeing creature keeps running before giving up.
    pub game_turns_in_flee: u64,

    /// A fighter re-evaluates its opponent once per this many turns.
    pub battle_check_interval: u64,

    /// Turns after being dropped during which a creature ignores fear.
    pub fight_fear_delay: u64,

    /// Turns between paydays.
    pub salary_interval: u64,
}

impl GameConfig {
    // ===== compile-time capacities =====
    /// Creature and control pool capacity, including the sentinel slot 0.
    pub const MAX_CREATURES: usize = 256;
    /// Battle roster capacity, including the sentinel slot 0.
    pub const MAX_BATTLES: usize = 48;
    /// Size of the melee and ranged opponent slot arrays.
    pub const MAX_OPPONENTS: usize = 4;
    /// Number of battles a player can observe at once.
    pub const VISIBLE_BATTLES: usize = 3;
    /// Fighters listed per side for each visible battle.
    pub const BATTLERS_PER_SIDE: usize = 8;
    pub const MAX_PLAYERS: usize = 5;
    /// Room roster capacity, including the sentinel slot 0.
    pub const MAX_ROOMS: usize = 150;
    pub const MAX_MODEL_INSTANCES: usize = 10;
    pub const MAX_LEVEL: u8 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FLEE_ZONE_RADIUS: u32 = 2048;
    pub const DEFAULT_FEAR_SENTINEL: u8 = 255;
    pub const DEFAULT_OPPONENTS_LIMIT: u8 = 4;
    pub const DEFAULT_GAME_TURNS_IN_FLEE: u64 = 200;
    pub const DEFAULT_BATTLE_CHECK_INTERVAL: u64 = 8;
    pub const DEFAULT_FIGHT_FEAR_DELAY: u64 = 160;
    pub const DEFAULT_SALARY_INTERVAL: u64 = 1200;

    pub fn new() -> Self {
        Self {
            flee_zone_radius: Self::DEFAULT_FLEE_ZONE_RADIUS,
            fear_sentinel: Self::DEFAULT_FEAR_SENTINEL,
            melee_opponents_limit: Self::DEFAULT_OPPONENTS_LIMIT,
            ranged_opponents_limit: Self::DEFAULT_OPPONENTS_LIMIT,
            game_turns_in_flee: Self::DEFAULT_GAME_TURNS_IN_FLEE,
            battle_check_interval: Self::DEFAULT_BATTLE_CHECK_INTERVAL,
            fight_fear_delay: Self::DEFAULT_FIGHT_FEAR_DELAY,
            salary_interval: Self::DEFAULT_SALARY_INTERVAL,
        }
    }

    pub fn with_flee_zone_radius(mut self, radius: u32) -> Self {
        self.flee_zone_radius = radius;
        self
    }

    pub fn with_opponents_limits(mut self, melee: u8, ranged: u8) -> Self {
        self.melee_opponents_limit = melee;
        self.ranged_opponents_limit = ranged;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
