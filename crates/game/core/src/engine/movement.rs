//! Move-then-continue composition.
//!
//! A behavior that needs to walk somewhere first calls
//! [`GameEngine::setup_move_to_position`] with the state to resume. The
//! creature then sits in `MoveToPosition` until navigation reports arrival or
//! a blocked route, and the continue state's move check gets the final say.

use crate::behavior::{MoveCheck, StateId, StateReturn};
use crate::env::{MoveStep, compute_seed, seed_context};
use crate::state::{CreatureId, MoveFlags, Position};

use super::{EngineError, GameEngine, StateResult, TransitionError};

impl<'a> GameEngine<'a> {
    /// Starts walking to `destination`, resuming `continue_state` on arrival.
    ///
    /// # Errors
    ///
    /// `TransitionError::Unreachable` when navigation has no route; the
    /// creature's state is left unchanged.
    pub fn setup_move_to_position(
        &mut self,
        creature: CreatureId,
        destination: Position,
        flags: MoveFlags,
        continue_state: StateId,
    ) -> Result<(), EngineError> {
        let navigation = self.env.navigation()?;
        let from = self.world.creature(creature).position;
        if !navigation.can_navigate_to(creature, from, destination) {
            tracing::debug!(%creature, ?destination, "move destination not navigable");
            return Err(TransitionError::Unreachable {
                creature,
                destination,
            }
            .into());
        }
        if let Some(control) = self.world.control_mut(creature) {
            control.move_flags = flags;
        }
        self.internal_set_thing_state(creature, StateId::MoveToPosition);
        let Some((record, control)) = self.world.creature_and_control_mut(creature) else {
            return Err(TransitionError::NoSuchCreature(creature).into());
        };
        control.moveto_pos = destination;
        record.continue_state = continue_state;
        Ok(())
    }

    /// Process callback of `MoveToPosition`.
    pub(crate) fn move_to_position(&mut self, creature: CreatureId) -> StateResult {
        let navigation = self.env.navigation()?;
        let record = self.world.creature(creature);
        let control = self.world.control(creature);
        let from = record.position;
        let destination = control.moveto_pos;
        let continue_state = record.continue_state;

        if !control.move_flags.contains(MoveFlags::NO_TELEPORT)
            && navigation.teleport(creature, from, destination)
        {
            self.place_creature(creature, destination);
            return Ok(StateReturn::Modified);
        }

        let step = self.creature_move_to(creature, destination)?;
        match self.move_check(continue_state, creature)? {
            MoveCheck::Deleted => Ok(StateReturn::Deleted),
            MoveCheck::Continue => Ok(StateReturn::ResetOk),
            MoveCheck::Available => match step {
                MoveStep::Arrived => {
                    self.internal_set_thing_state(creature, continue_state);
                    Ok(StateReturn::Modified)
                }
                MoveStep::Blocked => {
                    tracing::debug!(%creature, ?destination, "route blocked");
                    self.internal_set_thing_state(creature, continue_state);
                    self.set_start_state(creature);
                    Ok(StateReturn::ResetOk)
                }
                MoveStep::Progressing(_) => Ok(StateReturn::Modified),
            },
        }
    }

    /// Takes one navigation step toward `destination` at the model's speed.
    pub(crate) fn creature_move_to(
        &mut self,
        creature: CreatureId,
        destination: Position,
    ) -> Result<MoveStep, EngineError> {
        let navigation = self.env.navigation()?;
        let speed = self.model_of(creature)?.base_speed;
        let from = self.world.creature(creature).position;
        let step = navigation.move_toward(creature, from, destination, speed);
        match step {
            MoveStep::Arrived => self.place_creature(creature, destination),
            MoveStep::Progressing(position) => self.place_creature(creature, position),
            MoveStep::Blocked => {}
        }
        Ok(step)
    }

    /// Backs away from `threat` by one step.
    pub(crate) fn creature_retreat_from(
        &mut self,
        creature: CreatureId,
        threat: Position,
    ) -> Result<MoveStep, EngineError> {
        let speed = self.model_of(creature)?.base_speed;
        let here = self.world.creature(creature).position;
        let step = i32::try_from(speed.max(1)).unwrap_or(i32::MAX);
        self.creature_move_to(creature, here.away_from(threat, step))
    }

    /// Walks to a random navigable spot on an adjacent slab, then resumes
    /// `continue_state`. Returns false when no such spot was found.
    pub(crate) fn creature_choose_random_destination_nearby(
        &mut self,
        creature: CreatureId,
        continue_state: StateId,
    ) -> Result<bool, EngineError> {
        let rng = self.env.rng()?;
        let navigation = self.env.navigation()?;
        let here = self.world.creature(creature).position;
        let slab = Position::UNITS_PER_SLAB as i32;
        let seed = compute_seed(
            self.world.game_seed,
            self.world.turn.0,
            u32::from(creature.0),
            seed_context::WANDER,
        );
        let first = rng.range(seed, 0, 7);
        for attempt in 0..8 {
            let (dx, dy) = ADJACENT_SLABS[((first + attempt) % 8) as usize];
            let destination = Position::new(here.x + dx * slab, here.y + dy * slab);
            if navigation.can_navigate_to(creature, here, destination) {
                self.setup_move_to_position(creature, destination, MoveFlags::empty(), continue_state)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn place_creature(&mut self, creature: CreatureId, position: Position) {
        if let Some(record) = self.world.creature_mut(creature) {
            record.position = position;
        }
    }
}

const ADJACENT_SLABS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];
