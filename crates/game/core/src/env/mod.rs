//! Traits describing the engine's external collaborators.
//!
//! Oracles expose navigation, rooms, effects, creature models, balance
//! thresholds and random draws. The [`Env`] aggregate bundles them so the
//! engine can reach everything it needs without hard coupling to concrete
//! implementations.
mod config;
mod effects;
mod error;
mod models;
mod navigation;
mod rng;
mod rooms;

pub use config::{CombatRules, ConfigOracle};
pub use effects::{EffectOracle, EffectRequest, Impact, Obstacle, ObstacleKind};
pub use error::OracleError;
pub use models::{CreatureModel, InstanceInfo, InstanceKind, ModelOracle};
pub use navigation::{MoveStep, NavigationOracle};
pub use rng::{PcgRng, RngOracle, compute_seed, seed_context};
pub use rooms::{RoomInfo, RoomJob, RoomKind, RoomOracle};

use crate::state::{InstanceId, ModelId};

/// Aggregates the collaborators required by the state machine and combat engine.
pub struct Env<'a, N, W, E, M, C, R>
where
    N: NavigationOracle + ?Sized,
    W: RoomOracle + ?Sized,
    E: EffectOracle + ?Sized,
    M: ModelOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    navigation: Option<&'a N>,
    rooms: Option<&'a W>,
    effects: Option<&'a E>,
    models: Option<&'a M>,
    config: Option<&'a C>,
    rng: Option<&'a R>,
}

pub type GameEnv<'a> = Env<
    'a,
    dyn NavigationOracle + 'a,
    dyn RoomOracle + 'a,
    dyn EffectOracle + 'a,
    dyn ModelOracle + 'a,
    dyn ConfigOracle + 'a,
    dyn RngOracle + 'a,
>;

// Manual impls: the derives would demand `Clone` of the unsized oracle types.
impl<N, W, E, M, C, R> Clone for Env<'_, N, W, E, M, C, R>
where
    N: NavigationOracle + ?Sized,
    W: RoomOracle + ?Sized,
    E: EffectOracle + ?Sized,
    M: ModelOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, W, E, M, C, R> Copy for Env<'_, N, W, E, M, C, R>
where
    N: NavigationOracle + ?Sized,
    W: RoomOracle + ?Sized,
    E: EffectOracle + ?Sized,
    M: ModelOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

impl<'a, N, W, E, M, C, R> Env<'a, N, W, E, M, C, R>
where
    N: NavigationOracle + ?Sized,
    W: RoomOracle + ?Sized,
    E: EffectOracle + ?Sized,
    M: ModelOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        navigation: Option<&'a N>,
        rooms: Option<&'a W>,
        effects: Option<&'a E>,
        models: Option<&'a M>,
        config: Option<&'a C>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            navigation,
            rooms,
            effects,
            models,
            config,
            rng,
        }
    }

    pub fn with_all(
        navigation: &'a N,
        rooms: &'a W,
        effects: &'a E,
        models: &'a M,
        config: &'a C,
        rng: &'a R,
    ) -> Self {
        Self::new(
            Some(navigation),
            Some(rooms),
            Some(effects),
            Some(models),
            Some(config),
            Some(rng),
        )
    }

    pub fn empty() -> Self {
        Self {
            navigation: None,
            rooms: None,
            effects: None,
            models: None,
            config: None,
            rng: None,
        }
    }

    /// Returns the NavigationOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::NavigationNotAvailable` if no navigation oracle was provided.
    pub fn navigation(&self) -> Result<&'a N, OracleError> {
        self.navigation.ok_or(OracleError::NavigationNotAvailable)
    }

    /// Returns the RoomOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RoomsNotAvailable` if no room oracle was provided.
    pub fn rooms(&self) -> Result<&'a W, OracleError> {
        self.rooms.ok_or(OracleError::RoomsNotAvailable)
    }

    /// Returns the EffectOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::EffectsNotAvailable` if no effect oracle was provided.
    pub fn effects(&self) -> Result<&'a E, OracleError> {
        self.effects.ok_or(OracleError::EffectsNotAvailable)
    }

    /// Returns the ModelOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ModelsNotAvailable` if no model oracle was provided.
    pub fn models(&self) -> Result<&'a M, OracleError> {
        self.models.ok_or(OracleError::ModelsNotAvailable)
    }

    /// Returns the ConfigOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config oracle was provided.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Snapshot of the combat thresholds from the config oracle.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config oracle was provided.
    pub fn combat_rules(&self) -> Result<CombatRules, OracleError> {
        Ok(CombatRules::from_oracle(self.config()?))
    }

    /// Looks up a creature model.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ModelsNotAvailable` or `OracleError::ModelNotFound`.
    pub fn creature_model(&self, id: ModelId) -> Result<&'a CreatureModel, OracleError> {
        self.models()?
            .model(id)
            .ok_or(OracleError::ModelNotFound(id))
    }

    /// Looks up an instance definition.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ModelsNotAvailable` or `OracleError::InstanceNotFound`.
    pub fn instance_info(&self, id: InstanceId) -> Result<&'a InstanceInfo, OracleError> {
        self.models()?
            .instance(id)
            .ok_or(OracleError::InstanceNotFound(id))
    }
}

impl<'a, N, W, E, M, C, R> Env<'a, N, W, E, M, C, R>
where
    N: NavigationOracle + 'a,
    W: RoomOracle + 'a,
    E: EffectOracle + 'a,
    M: ModelOracle + 'a,
    C: ConfigOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        self.as_game_env()
    }

    /// Converts this environment into a trait-object based `GameEnv` (borrows self).
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let navigation: Option<&'a dyn NavigationOracle> = self.navigation.map(|nav| nav as _);
        let rooms: Option<&'a dyn RoomOracle> = self.rooms.map(|rooms| rooms as _);
        let effects: Option<&'a dyn EffectOracle> = self.effects.map(|effects| effects as _);
        let models: Option<&'a dyn ModelOracle> = self.models.map(|models| models as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|config| config as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(navigation, rooms, effects, models, config, rng)
    }
}
