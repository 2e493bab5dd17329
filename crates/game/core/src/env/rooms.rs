//! Room and job collaborator.
use crate::state::{PlayerId, Position, RoomId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomKind {
    Lair,
    Training,
    Treasury,
    Library,
    Workshop,
    Prison,
    Other,
}

/// Jobs a creature can hold inside a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomJob {
    Sleep,
    Train,
    TakeSalary,
}

impl RoomJob {
    pub const fn room_kind(self) -> RoomKind {
        match self {
            RoomJob::Sleep => RoomKind::Lair,
            RoomJob::Train => RoomKind::Training,
            RoomJob::TakeSalary => RoomKind::Treasury,
        }
    }
}

/// Static facts about a room, as seen by the behavior engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomInfo {
    pub kind: RoomKind,
    pub owner: PlayerId,
    pub center: Position,
    /// Maximum number of simultaneous workers.
    pub capacity: u16,
}

/// Room lookup and job assignment service.
///
/// Rooms can be sold or captured at any time, so every tick of a room-bound
/// job re-validates through [`RoomOracle::still_valid_for_job`].
pub trait RoomOracle: Send + Sync {
    fn room(&self, id: RoomId) -> Option<RoomInfo>;

    /// Picks a room of `owner` suitable for `job`, preferring ones near `near`.
    fn find_room_for_job(&self, owner: PlayerId, job: RoomJob, near: Position) -> Option<RoomId>;

    fn still_valid_for_job(&self, id: RoomId, owner: PlayerId, job: RoomJob) -> bool {
        self.room(id)
            .is_some_and(|room| room.owner == owner && room.kind == job.room_kind())
    }
}
