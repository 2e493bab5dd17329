//! Shared fake collaborators for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use lair_core::env::{EffectRequest, Impact};
use lair_core::{
    AttackType, CreatureId, CreatureModel, CreatureSpawn, EffectOracle, Env, GameConfig, GameEngine,
    InstanceInfo, InstanceKind, ModelId, ModelOracle, MoveStep, NavigationOracle, Obstacle, PcgRng,
    PlayerId, PlayerState, Position, RoomId, RoomInfo, RoomJob, RoomKind, RoomOracle, StateId, World,
};
use lair_core::state::InstanceId;

pub const KEEPER: PlayerId = PlayerId(0);
pub const HEROES: PlayerId = PlayerId(1);

pub const TROLL: ModelId = ModelId(1);
pub const KNIGHT: ModelId = ModelId(2);
pub const ARCHER: ModelId = ModelId(3);
pub const COWARD: ModelId = ModelId(4);

pub const CLAW: InstanceId = InstanceId(1);
pub const ARROW: InstanceId = InstanceId(2);

pub const HEART: Position = Position { x: 768 * 40, y: 768 * 40 };

/// Open map: every destination is reachable and creatures walk straight.
pub struct OpenMap;

impl NavigationOracle for OpenMap {
    fn can_navigate_to(&self, _: CreatureId, _: Position, _: Position) -> bool {
        true
    }

    fn move_toward(&self, _: CreatureId, from: Position, dest: Position, speed: u32) -> MoveStep {
        if from.distance_to(dest) <= speed {
            return MoveStep::Arrived;
        }
        let step = i32::try_from(speed).unwrap_or(i32::MAX);
        let dx = (dest.x - from.x).clamp(-step, step);
        let dy = (dest.y - from.y).clamp(-step, step);
        MoveStep::Progressing(Position::new(from.x + dx, from.y + dy))
    }
}

#[derive(Default)]
pub struct FakeRooms {
    pub rooms: HashMap<RoomId, RoomInfo>,
}

impl FakeRooms {
    pub fn add(&mut self, id: RoomId, kind: RoomKind, owner: PlayerId, center: Position) {
        self.rooms.insert(
            id,
            RoomInfo {
                kind,
                owner,
                center,
                capacity: 4,
            },
        );
    }
}

impl RoomOracle for FakeRooms {
    fn room(&self, id: RoomId) -> Option<RoomInfo> {
        self.rooms.get(&id).copied()
    }

    fn find_room_for_job(&self, owner: PlayerId, job: RoomJob, _: Position) -> Option<RoomId> {
        let mut ids: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.owner == owner && room.kind == job.room_kind())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_by_key(|id| id.0);
        ids.first().copied()
    }
}

/// Every hit deals a fixed amount; obstacles stand until struck `door_health` times.
pub struct FixedEffects {
    pub damage: u32,
    pub door_health: u32,
    pub strikes: Mutex<u32>,
}

impl Default for FixedEffects {
    fn default() -> Self {
        Self {
            damage: 10,
            door_health: 3,
            strikes: Mutex::new(0),
        }
    }
}

impl EffectOracle for FixedEffects {
    fn resolve(&self, request: &EffectRequest) -> Option<Impact> {
        match request.kind {
            InstanceKind::SelfBuff => None,
            _ => Some(Impact {
                damage: self.damage,
                healing: 0,
            }),
        }
    }

    fn obstacle_intact(&self, _: &Obstacle) -> bool {
        self.strikes.lock().map_or(false, |strikes| *strikes < self.door_health)
    }

    fn strike_obstacle(&self, _: CreatureId, _: &Obstacle, _: InstanceId) {
        if let Ok(mut strikes) = self.strikes.lock() {
            *strikes += 1;
        }
    }
}

pub struct Catalog {
    pub models: HashMap<ModelId, CreatureModel>,
    pub instances: HashMap<InstanceId, InstanceInfo>,
}

impl Catalog {
    pub fn standard() -> Self {
        let mut troll = CreatureModel::new("troll");
        troll.instances.push(CLAW);
        troll.annoy_level = 100;
        troll.annoy_no_lair = 40;
        troll.annoy_no_salary = 60;
        troll.annoy_sulking = -10;
        troll.needs_lair = true;
        troll.salary = 50;

        let mut knight = CreatureModel::new("knight");
        knight.instances.push(CLAW);

        let mut archer = CreatureModel::new("archer");
        archer.attack_preference = AttackType::Ranged;
        archer.instances.push(ARROW);
        archer.instances.push(CLAW);

        let mut coward = CreatureModel::new("coward");
        coward.fear_wounded = 255;
        coward.instances.push(CLAW);

        let mut instances = HashMap::new();
        instances.insert(
            CLAW,
            InstanceInfo {
                kind: InstanceKind::Melee,
                range_min: 0,
                range_max: 284,
                action_turns: 2,
                reset_turns: 4,
            },
        );
        instances.insert(
            ARROW,
            InstanceInfo {
                kind: InstanceKind::Ranged,
                range_min: 156,
                range_max: 2048,
                action_turns: 3,
                reset_turns: 10,
            },
        );

        Self {
            models: HashMap::from([(TROLL, troll), (KNIGHT, knight), (ARCHER, archer), (COWARD, coward)]),
            instances,
        }
    }
}

impl ModelOracle for Catalog {
    fn model(&self, id: ModelId) -> Option<&CreatureModel> {
        self.models.get(&id)
    }

    fn instance(&self, id: InstanceId) -> Option<&InstanceInfo> {
        self.instances.get(&id)
    }
}

/// A world plus the collaborators needed to drive it.
pub struct Sim {
    pub world: World,
    pub map: OpenMap,
    pub rooms: FakeRooms,
    pub effects: FixedEffects,
    pub catalog: Catalog,
    pub config: GameConfig,
    pub rng: PcgRng,
}

impl Sim {
    /// One keeper and one hero player, hostile to each other.
    pub fn new() -> Self {
        let world = World::new(0x5eed)
            .with_player(KEEPER, PlayerState::keeper().with_heart(HEART))
            .with_player(HEROES, PlayerState::heroes());
        Self {
            world,
            map: OpenMap,
            rooms: FakeRooms::default(),
            effects: FixedEffects::default(),
            catalog: Catalog::standard(),
            config: GameConfig::default(),
            rng: PcgRng,
        }
    }

    pub fn engine(&mut self) -> GameEngine<'_> {
        let env = Env::with_all(
            &self.map,
            &self.rooms,
            &self.effects,
            &self.catalog,
            &self.config,
            &self.rng,
        )
        .into_game_env();
        GameEngine::new(&mut self.world, env)
    }

    pub fn spawn(&mut self, model: ModelId, owner: PlayerId, position: Position) -> CreatureId {
        self.engine()
            .create_creature(CreatureSpawn::new(model, owner, position))
            .expect("creature pool has room")
    }

    pub fn state_of(&self, creature: CreatureId) -> StateId {
        self.world.creature(creature).active_state
    }
}

pub fn at_slab(x: i32, y: i32) -> Position {
    Position::new(x * 768 + 384, y * 768 + 384)
}
