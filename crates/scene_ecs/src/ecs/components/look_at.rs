//! Look-at component

use crate::ecs::component::{Component, ComponentContext, ComponentKind, ComponentType};
use crate::ecs::components::transform::TransformComponent;
use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// Keeps its entity facing another entity's world position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookAtComponent {
    /// Entity to face; nothing happens while unset
    pub target: Option<Entity>,
}

impl Component for LookAtComponent {
    fn wants_update(&self) -> bool {
        true
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        let Some(target) = self.target else {
            return;
        };
        let entity = ctx.entity();
        let registry = ctx.registry();

        let Some(target_handle) = registry.component_handle::<TransformComponent>(target) else {
            log::trace!("Look-at target {target} has no transform");
            return;
        };
        let Some(target_position) = registry.world_position(target_handle) else {
            return;
        };
        let result = registry
            .must_get_component::<TransformComponent>(entity)
            .and_then(|own| registry.look_at_world(own, target_position, Vec3::z()));
        if let Err(err) = result {
            log::warn!("Look-at on {entity} failed: {err}");
        }
    }
}

impl ComponentType for LookAtComponent {
    const KIND: ComponentKind = ComponentKind::new("LookAtComponent");
}

impl LookAtComponent {
    /// Face `target`
    #[must_use]
    pub const fn new(target: Entity) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Change or clear the target
    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }
}
