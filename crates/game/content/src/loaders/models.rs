//! Creature model catalog loader.
//!
//! `models.ron` lists instances (weapon swings, shots, buffs) and creature
//! models. Models name their instances; the loader resolves names to ids and
//! rejects catalogs the engine could not run.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail, ensure};
use arrayvec::ArrayVec;
use lair_core::env::{CreatureModel, InstanceInfo, InstanceKind, ModelOracle};
use lair_core::state::InstanceId;
use lair_core::{AttackType, GameConfig, ModelId, StateId, StateType, state_info};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One instance entry in `models.ron`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub id: u16,
    pub name: String,
    pub kind: InstanceKind,
    #[serde(default)]
    pub range_min: u32,
    pub range_max: u32,
    pub action_turns: u16,
    #[serde(default)]
    pub reset_turns: u16,
}

/// One creature model entry in `models.ron`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub fear_wounded: u8,
    #[serde(default = "default_attack_preference")]
    pub attack_preference: AttackType,
    #[serde(default)]
    pub annoy_level: i32,
    #[serde(default)]
    pub annoy_no_salary: i32,
    #[serde(default)]
    pub annoy_no_lair: i32,
    #[serde(default)]
    pub annoy_sulking: i32,
    #[serde(default = "default_good_start_state")]
    pub good_start_state: StateId,
    #[serde(default = "default_evil_start_state")]
    pub evil_start_state: StateId,
    /// Instance names, in the order the creature tries them.
    #[serde(default)]
    pub instances: Vec<String>,
    #[serde(default)]
    pub base_speed: Option<u32>,
    #[serde(default)]
    pub sight_range: Option<u32>,
    #[serde(default)]
    pub needs_lair: bool,
    #[serde(default)]
    pub salary: u32,
}

fn default_attack_preference() -> AttackType {
    AttackType::Melee
}

fn default_good_start_state() -> StateId {
    StateId::GoodDoingNothing
}

fn default_evil_start_state() -> StateId {
    StateId::CreatureDoingNothing
}

/// On-disk layout of `models.ron`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub instances: Vec<InstanceSpec>,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

/// Creature models and instances by id. Serves as the engine's [`ModelOracle`].
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<ModelId, CreatureModel>,
    instances: HashMap<InstanceId, InstanceInfo>,
    model_names: HashMap<String, ModelId>,
}

impl ModelCatalog {
    pub fn model_id(&self, name: &str) -> Option<ModelId> {
        self.model_names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Builds a catalog from its file layout, resolving instance names.
    pub fn from_file(file: CatalogFile) -> LoadResult<Self> {
        let mut catalog = Self::default();
        let mut instance_names = HashMap::new();

        for spec in file.instances {
            ensure!(spec.id != 0, "instance '{}' uses reserved id 0", spec.name);
            ensure!(
                spec.range_min <= spec.range_max,
                "instance '{}' has range_min above range_max",
                spec.name
            );
            let id = InstanceId(spec.id);
            if instance_names.insert(spec.name.clone(), id).is_some() {
                bail!("duplicate instance name '{}'", spec.name);
            }
            let info = InstanceInfo {
                kind: spec.kind,
                range_min: spec.range_min,
                range_max: spec.range_max,
                action_turns: spec.action_turns,
                reset_turns: spec.reset_turns,
            };
            if catalog.instances.insert(id, info).is_some() {
                bail!("duplicate instance id {}", spec.id);
            }
        }

        for spec in file.models {
            let name = spec.name.clone();
            let id = ModelId(spec.id);
            let model = build_model(spec, &instance_names)
                .with_context(|| format!("Invalid model '{name}'"))?;
            ensure!(id.is_some(), "model '{name}' uses reserved id 0");
            if catalog.model_names.insert(name.clone(), id).is_some() {
                bail!("duplicate model name '{name}'");
            }
            if catalog.models.insert(id, model).is_some() {
                bail!("duplicate model id {}", id.0);
            }
        }

        tracing::debug!(
            models = catalog.models.len(),
            instances = catalog.instances.len(),
            "built model catalog"
        );
        Ok(catalog)
    }
}

impl ModelOracle for ModelCatalog {
    fn model(&self, id: ModelId) -> Option<&CreatureModel> {
        self.models.get(&id)
    }

    fn instance(&self, id: InstanceId) -> Option<&InstanceInfo> {
        self.instances.get(&id)
    }
}

fn build_model(spec: ModelSpec, instance_names: &HashMap<String, InstanceId>) -> LoadResult<CreatureModel> {
    for state in [spec.good_start_state, spec.evil_start_state] {
        ensure!(
            state != StateId::Unused && state_info(state).state_type == StateType::Idle,
            "start state {state} is not an idle state"
        );
    }
    ensure!(
        spec.attack_preference != AttackType::Unset,
        "attack preference must be Melee or Ranged"
    );

    let mut instances = ArrayVec::<InstanceId, { GameConfig::MAX_MODEL_INSTANCES }>::new();
    for instance in &spec.instances {
        let Some(id) = instance_names.get(instance) else {
            bail!("unknown instance '{instance}'");
        };
        if instances.try_push(*id).is_err() {
            bail!(
                "more than {} instances",
                GameConfig::MAX_MODEL_INSTANCES
            );
        }
    }

    let mut model = CreatureModel::new(spec.name);
    model.fear_wounded = spec.fear_wounded;
    model.attack_preference = spec.attack_preference;
    model.annoy_level = spec.annoy_level;
    model.annoy_no_salary = spec.annoy_no_salary;
    model.annoy_no_lair = spec.annoy_no_lair;
    model.annoy_sulking = spec.annoy_sulking;
    model.good_start_state = spec.good_start_state;
    model.evil_start_state = spec.evil_start_state;
    model.instances = instances;
    if let Some(speed) = spec.base_speed {
        model.base_speed = speed;
    }
    if let Some(range) = spec.sight_range {
        model.sight_range = range;
    }
    model.needs_lair = spec.needs_lair;
    model.salary = spec.salary;
    Ok(model)
}

/// Loader for the model catalog from RON files.
pub struct ModelLoader;

impl ModelLoader {
    pub fn load(path: &Path) -> LoadResult<ModelCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid model catalog {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<ModelCatalog> {
        let file: CatalogFile =
            ron::from_str(content).context("Failed to parse model catalog RON")?;
        ModelCatalog::from_file(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"(
        instances: [
            (id: 1, name: "claw", kind: Melee, range_max: 284, action_turns: 2, reset_turns: 4),
            (id: 2, name: "arrow", kind: Ranged, range_min: 156, range_max: 2048, action_turns: 3, reset_turns: 10),
        ],
        models: [
            (
                id: 1,
                name: "troll",
                annoy_level: 100,
                annoy_no_lair: 40,
                annoy_sulking: -10,
                instances: ["claw"],
                needs_lair: true,
                salary: 50,
            ),
            (
                id: 3,
                name: "archer",
                attack_preference: Ranged,
                instances: ["arrow", "claw"],
                base_speed: 96,
            ),
        ],
    )"#;

    #[test]
    fn parses_models_and_resolves_instances() {
        let catalog = ModelLoader::parse(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.instance_count(), 2);

        let archer = catalog.model(catalog.model_id("archer").unwrap()).unwrap();
        assert!(archer.prefers_ranged());
        assert_eq!(archer.instances.as_slice(), &[InstanceId(2), InstanceId(1)]);
        assert_eq!(archer.base_speed, 96);
        assert_eq!(archer.evil_start_state, StateId::CreatureDoingNothing);

        let troll = catalog.model(ModelId(1)).unwrap();
        assert_eq!(troll.sight_range, CreatureModel::new("x").sight_range);
        assert!(troll.needs_lair);

        let arrow = catalog.instance(InstanceId(2)).unwrap();
        assert!(arrow.in_range(1000));
        assert!(!arrow.in_range(100));
    }

    #[test]
    fn unknown_instance_is_rejected() {
        let text = r#"(models: [(id: 1, name: "imp", instances: ["fireball"])])"#;
        let error = ModelLoader::parse(text).unwrap_err();
        assert!(format!("{error:#}").contains("fireball"));
    }

    #[test]
    fn duplicate_model_ids_are_rejected() {
        let text = r#"(models: [(id: 1, name: "imp"), (id: 1, name: "fly")])"#;
        assert!(ModelLoader::parse(text).is_err());
    }

    #[test]
    fn reserved_ids_are_rejected() {
        assert!(ModelLoader::parse(r#"(models: [(id: 0, name: "imp")])"#).is_err());
        let text = r#"(instances: [(id: 0, name: "bite", kind: Melee, range_max: 200, action_turns: 1)])"#;
        assert!(ModelLoader::parse(text).is_err());
    }

    #[test]
    fn start_state_must_be_idle() {
        let text = r#"(models: [(id: 1, name: "imp", evil_start_state: CreatureInCombat)])"#;
        assert!(ModelLoader::parse(text).is_err());
    }

    #[test]
    fn too_many_instances_are_rejected() {
        let names = vec!["\"claw\""; GameConfig::MAX_MODEL_INSTANCES + 1].join(", ");
        let text = format!(
            r#"(
                instances: [(id: 1, name: "claw", kind: Melee, range_max: 284, action_turns: 2)],
                models: [(id: 1, name: "hydra", instances: [{names}])],
            )"#
        );
        assert!(ModelLoader::parse(&text).is_err());
    }
}
