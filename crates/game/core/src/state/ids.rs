use std::fmt;

macro_rules! pool_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $repr);

        impl $name {
            /// Reserved sentinel index; never refers to a live record.
            pub const NONE: Self = Self(0);

            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }

            #[inline]
            pub const fn is_some(self) -> bool {
                self.0 != 0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

pool_id!(
    /// Index of a creature entity in the creature arena.
    CreatureId(u16)
);
pool_id!(
    /// Index of a creature's AI record in the control pool.
    ControlIndex(u16)
);
pool_id!(
    /// Index into the battle roster.
    BattleId(u8)
);
pool_id!(
    /// Index into the room roster.
    RoomId(u16)
);
pool_id!(ModelId(u16));
pool_id!(InstanceId(u16));

/// Owning player slot. Unlike pool ids, every value is a real player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Map position in map units (256 per subtile, 768 per slab).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };
    pub const UNITS_PER_SUBTILE: u32 = 256;
    pub const UNITS_PER_SLAB: u32 = 768;

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Chessboard distance (max of the axis deltas).
    pub fn distance_to(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Straight-line distance, rounded down.
    pub fn distance_2d(self, other: Position) -> u32 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        (dx * dx + dy * dy).isqrt() as u32
    }

    /// Point `step` units from `self` in the direction away from `from`.
    pub fn away_from(self, from: Position, step: i32) -> Position {
        let dx = (self.x - from.x).signum();
        let dy = (self.y - from.y).signum();
        let (dx, dy) = if dx == 0 && dy == 0 { (1, 0) } else { (dx, dy) };
        Position::new(self.x + dx * step, self.y + dy * step)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Simulation turn counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTurn(pub u64);

impl GameTurn {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Turns elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: GameTurn) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for GameTurn {
    type Output = GameTurn;
    fn add(self, rhs: u64) -> GameTurn {
        GameTurn(self.0 + rhs)
    }
}

impl std::ops::Sub<u64> for GameTurn {
    type Output = GameTurn;
    fn sub(self, rhs: u64) -> GameTurn {
        GameTurn(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for GameTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Position::new(0, 0);
        let b = Position::new(300, -400);
        assert_eq!(a.distance_to(b), 400);
        assert_eq!(a.distance_2d(b), 500);
    }

    #[test]
    fn away_from_same_point_still_moves() {
        let p = Position::new(10, 10);
        assert_ne!(p.away_from(p, 5), p);
        assert_eq!(Position::new(0, 0).away_from(Position::new(5, -5), 10), Position::new(-10, 10));
    }
}
