//! Timed actions ("instances").
//!
//! A creature runs at most one instance at a time. Starting one records the
//! target and a countdown; when the countdown reaches zero the effect
//! collaborator resolves it and the core applies the returned [`Impact`].

use crate::env::{EffectRequest, Impact, InstanceKind};
use crate::state::{ActiveInstance, CreatureId, InstanceId, Position};

use super::{EngineError, GameEngine};

/// What happened when an instance fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InstanceOutcome {
    Idle,
    Running,
    Fired { target_destroyed: bool },
}

impl<'a> GameEngine<'a> {
    pub fn creature_instance_is_active(&self, creature: CreatureId) -> bool {
        self.world.control(creature).instance.is_some()
    }

    /// Starts `instance` against `target`. Refused while another instance is
    /// running or the instance is cooling down.
    pub(crate) fn set_creature_instance(
        &mut self,
        creature: CreatureId,
        instance: InstanceId,
        target: CreatureId,
        target_position: Position,
    ) -> Result<bool, EngineError> {
        let info = self.env.instance_info(instance)?;
        let turn = self.world.turn;
        let Some(control) = self.world.control_mut(creature) else {
            return Ok(false);
        };
        if control.instance.is_some() || !control.cooldown_ready(instance, turn) {
            return Ok(false);
        }
        control.instance = Some(ActiveInstance {
            id: instance,
            target,
            target_position,
            turns_left: info.action_turns.max(1),
        });
        control.set_cooldown(instance, turn + u64::from(info.reset_turns));
        tracing::debug!(%creature, %instance, %target, "instance started");
        Ok(true)
    }

    /// Advances the running instance by one turn and fires it when due.
    pub(crate) fn process_creature_instance(
        &mut self,
        creature: CreatureId,
    ) -> Result<InstanceOutcome, EngineError> {
        let Some(control) = self.world.control_mut(creature) else {
            return Ok(InstanceOutcome::Idle);
        };
        let Some(active) = control.instance.as_mut() else {
            return Ok(InstanceOutcome::Idle);
        };
        active.turns_left = active.turns_left.saturating_sub(1);
        if active.turns_left > 0 {
            return Ok(InstanceOutcome::Running);
        }
        let active = *active;
        control.instance = None;
        let target_destroyed = self.fire_instance(creature, active)?;
        Ok(InstanceOutcome::Fired { target_destroyed })
    }

    /// Resolves a finished instance. Returns whether its target was destroyed.
    fn fire_instance(
        &mut self,
        creature: CreatureId,
        active: ActiveInstance,
    ) -> Result<bool, EngineError> {
        let info = self.env.instance_info(active.id)?;
        let effects = self.env.effects()?;
        let source = self.world.creature(creature);
        let (source_position, source_level) = (source.position, source.level);

        if info.kind == InstanceKind::SelfBuff {
            let until = self.world.turn + u64::from(info.reset_turns);
            if let Some(control) = self.world.control_mut(creature) {
                control.buff_until = until;
            }
        }

        let target = if info.kind == InstanceKind::SelfBuff {
            Some(creature)
        } else if self.world.creature_exists(active.target) {
            Some(active.target)
        } else {
            None
        };
        let request = EffectRequest {
            instance: active.id,
            kind: info.kind,
            source: creature,
            source_position,
            source_level,
            target,
            target_position: active.target_position,
        };
        let Some(impact) = effects.resolve(&request) else {
            return Ok(false);
        };
        match target {
            Some(target) => self.apply_impact(target, impact),
            None => Ok(false),
        }
    }

    /// Applies damage and healing; destroys a target left without health.
    pub(crate) fn apply_impact(
        &mut self,
        target: CreatureId,
        impact: Impact,
    ) -> Result<bool, EngineError> {
        let Some(record) = self.world.creature_mut(target) else {
            return Ok(false);
        };
        record.health = record
            .health
            .saturating_sub(impact.damage)
            .saturating_add(impact.healing)
            .min(record.max_health);
        if record.is_alive() {
            return Ok(false);
        }
        tracing::debug!(creature = %target, "creature killed");
        self.destroy_creature(target)?;
        Ok(true)
    }

    pub fn creature_buff_active(&self, creature: CreatureId) -> bool {
        self.world.control(creature).buff_until > self.world.turn
    }
}
