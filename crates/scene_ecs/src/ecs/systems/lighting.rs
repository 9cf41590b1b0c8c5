//! Lighting system
//!
//! Turns light entities into fixed-size uniform blocks. Each enabled light is
//! given the lowest free shader slot the first time it is seen and keeps it
//! until the light component is removed; a remove observer hands the slot
//! back. Lights that find no free slot are reported instead of dropped
//! silently.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::config::LightingConfig;
use crate::ecs::component::{ComponentHandle, ComponentType};
use crate::ecs::components::{ColorComponent, LightComponent, LightType, TransformComponent};
use crate::ecs::{ComponentRegistry, EcsError, EcsResult, Entity};
use crate::foundation::collections::ComponentKey;
use crate::foundation::math::Vec3;

/// Per-light data in the layout the lighting shader reads
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// 1 when the slot holds a live light
    pub enabled: i32,
    /// See [`LightType::shader_value`]
    pub light_type: i32,
    /// World-space position
    pub position: [f32; 3],
    /// World-space target (directional lights only)
    pub target: [f32; 3],
    /// Normalized RGBA color
    pub color: [f32; 4],
}

/// Uniform names of one light slot (`lights[i].field`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightUniformNames {
    /// `lights[i].enabled`
    pub enabled: String,
    /// `lights[i].type`
    pub light_type: String,
    /// `lights[i].position`
    pub position: String,
    /// `lights[i].target`
    pub target: String,
    /// `lights[i].color`
    pub color: String,
}

impl LightUniformNames {
    /// Names for slot `slot`
    #[must_use]
    pub fn for_slot(slot: usize) -> Self {
        let field = |name: &str| format!("lights[{slot}].{name}");
        Self {
            enabled: field("enabled"),
            light_type: field("type"),
            position: field("position"),
            target: field("target"),
            color: field("color"),
        }
    }
}

/// Fixed table of shader light slots
#[derive(Debug, Clone)]
pub struct LightSlots {
    owners: Vec<Option<ComponentKey>>,
}

impl LightSlots {
    /// Table with `capacity` free slots
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            owners: vec![None; capacity],
        }
    }

    /// Number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.owners.len()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.owners.iter().filter(|owner| owner.is_some()).count()
    }

    /// Slot held by `key`
    #[must_use]
    pub fn slot_of(&self, key: ComponentKey) -> Option<usize> {
        self.owners.iter().position(|owner| *owner == Some(key))
    }

    /// Slot held by `key`, assigning the lowest free one if it has none
    pub fn assign(&mut self, key: ComponentKey) -> EcsResult<usize> {
        if let Some(slot) = self.slot_of(key) {
            return Ok(slot);
        }
        let slot = self
            .owners
            .iter()
            .position(Option::is_none)
            .ok_or(EcsError::CapacityExceeded {
                resource: "light slots",
                capacity: self.owners.len(),
            })?;
        self.owners[slot] = Some(key);
        Ok(slot)
    }

    /// Free the slot held by `key`
    pub fn release(&mut self, key: ComponentKey) -> Option<usize> {
        let slot = self.slot_of(key)?;
        self.owners[slot] = None;
        Some(slot)
    }
}

/// Lighting state for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct LightFrame {
    /// Camera position for specular terms
    pub view_position: Option<Vec3>,
    /// Ambient color
    pub ambient_color: [f32; 4],
    /// One block per slot; unused slots are zeroed (disabled)
    pub lights: Vec<LightUniform>,
    /// Enabled lights that did not get a slot
    pub overflow: Vec<Entity>,
}

/// Lighting system that assigns light slots and builds uniform data
pub struct LightingSystem {
    slots: Rc<RefCell<LightSlots>>,
    ambient_color: [f32; 4],
    overflowing: HashSet<ComponentKey>,
}

impl LightingSystem {
    /// Create the system and hook slot release into the registry
    pub fn new(config: &LightingConfig, registry: &mut ComponentRegistry) -> Self {
        let slots = Rc::new(RefCell::new(LightSlots::new(config.max_lights)));
        let released = Rc::clone(&slots);
        registry.add_remove_observer(LightComponent::KIND, move |event| {
            if let Some(slot) = released.borrow_mut().release(event.key) {
                log::debug!("Light slot {slot} released by {}", event.entity);
            }
        });
        Self {
            slots,
            ambient_color: config.ambient_color,
            overflowing: HashSet::new(),
        }
    }

    /// Slot assigned to a light, if any
    #[must_use]
    pub fn slot_of(&self, light: ComponentHandle<LightComponent>) -> Option<usize> {
        self.slots.borrow().slot_of(light.key())
    }

    /// Number of slots currently assigned
    #[must_use]
    pub fn slots_in_use(&self) -> usize {
        self.slots.borrow().in_use()
    }

    /// Build this frame's light data
    ///
    /// Lights without a transform or color get default ones, the same way
    /// any must-get lookup does.
    pub fn update(&mut self, registry: &mut ComponentRegistry, camera: Option<Entity>) -> LightFrame {
        let capacity = self.slots.borrow().capacity();
        let mut frame = LightFrame {
            view_position: camera.and_then(|camera| Self::view_position(registry, camera)),
            ambient_color: self.ambient_color,
            lights: vec![LightUniform::zeroed(); capacity],
            overflow: Vec::new(),
        };

        for (entity, handle) in registry.component_handles::<LightComponent>() {
            let Some(light) = registry.get(handle).cloned() else {
                continue;
            };
            if !light.enabled || !registry.is_active(handle.key()) {
                continue;
            }
            let assigned = self.slots.borrow_mut().assign(handle.key());
            let slot = match assigned {
                Ok(slot) => {
                    self.overflowing.remove(&handle.key());
                    slot
                }
                Err(err) => {
                    if self.overflowing.insert(handle.key()) {
                        log::warn!("Light on {entity} not shaded: {err}");
                    }
                    frame.overflow.push(entity);
                    continue;
                }
            };
            match Self::light_uniform(registry, entity, &light) {
                Ok(uniform) => frame.lights[slot] = uniform,
                Err(err) => log::warn!("Light on {entity} skipped: {err}"),
            }
        }
        log::trace!("Lighting frame: {} slots in use", self.slots_in_use());
        frame
    }

    fn view_position(registry: &mut ComponentRegistry, camera: Entity) -> Option<Vec3> {
        let transform = registry.must_get_component::<TransformComponent>(camera).ok()?;
        registry.world_position(transform)
    }

    fn light_uniform(
        registry: &mut ComponentRegistry,
        entity: Entity,
        light: &LightComponent,
    ) -> EcsResult<LightUniform> {
        let transform = registry.must_get_component::<TransformComponent>(entity)?;
        let position = registry.world_position(transform).ok_or(EcsError::StaleHandle)?;
        let target = match light.light_type {
            LightType::Directional => registry.world_target(transform).ok_or(EcsError::StaleHandle)?,
            LightType::Point => Vec3::zeros(),
        };
        let color = registry.must_get_component::<ColorComponent>(entity)?;
        let color = registry
            .get(color)
            .map_or([1.0; 4], ColorComponent::gl_color);

        Ok(LightUniform {
            enabled: 1,
            light_type: light.light_type.shader_value(),
            position: position.into(),
            target: target.into(),
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Rgba;

    fn spawn_light(registry: &mut ComponentRegistry, light_type: LightType) -> ComponentHandle<LightComponent> {
        let entity = registry.create_entity();
        registry
            .insert_component(entity, LightComponent::new(light_type))
            .unwrap()
    }

    #[test]
    fn test_uniform_names() {
        let names = LightUniformNames::for_slot(2);
        assert_eq!(names.enabled, "lights[2].enabled");
        assert_eq!(names.light_type, "lights[2].type");
        assert_eq!(names.color, "lights[2].color");
    }

    #[test]
    fn test_uniform_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }

    #[test]
    fn test_slots_assign_lowest_free_and_report_overflow() {
        let mut slots = LightSlots::new(2);
        let mut arena = crate::foundation::collections::HandleMap::<()>::default();
        let (a, b, c) = (arena.insert(()), arena.insert(()), arena.insert(()));

        assert_eq!(slots.assign(a), Ok(0));
        assert_eq!(slots.assign(b), Ok(1));
        assert_eq!(slots.assign(a), Ok(0));
        assert_eq!(
            slots.assign(c),
            Err(EcsError::CapacityExceeded {
                resource: "light slots",
                capacity: 2
            })
        );
        assert_eq!(slots.release(a), Some(0));
        assert_eq!(slots.assign(c), Ok(0));
    }

    #[test]
    fn test_fifth_light_overflows_and_gets_slot_after_removal() {
        let mut registry = ComponentRegistry::new();
        let mut system = LightingSystem::new(&LightingConfig::default(), &mut registry);
        let lights: Vec<_> = (0..5).map(|_| spawn_light(&mut registry, LightType::Point)).collect();

        let frame = system.update(&mut registry, None);
        assert_eq!(frame.lights.len(), 4);
        assert!(frame.lights.iter().all(|light| light.enabled == 1));
        assert_eq!(frame.overflow.len(), 1);
        assert_eq!(system.slots_in_use(), 4);
        let starved = lights
            .iter()
            .copied()
            .find(|light| system.slot_of(*light).is_none())
            .unwrap();

        let donor = lights.iter().copied().find(|light| *light != starved).unwrap();
        let freed = system.slot_of(donor);
        assert!(registry.remove_component(donor));

        let frame = system.update(&mut registry, None);
        assert!(frame.overflow.is_empty());
        assert_eq!(system.slot_of(starved), freed);
    }

    #[test]
    fn test_disabled_and_inactive_lights_are_skipped() {
        let mut registry = ComponentRegistry::new();
        let mut system = LightingSystem::new(&LightingConfig::default(), &mut registry);
        let disabled = spawn_light(&mut registry, LightType::Point);
        registry.get_mut(disabled).unwrap().enabled = false;
        let inactive = spawn_light(&mut registry, LightType::Point);
        registry.set_active(inactive.key(), false);

        let frame = system.update(&mut registry, None);
        assert!(frame.lights.iter().all(|light| light.enabled == 0));
        assert_eq!(system.slots_in_use(), 0);
    }

    #[test]
    fn test_directional_light_uses_world_placement_and_color() {
        let mut registry = ComponentRegistry::new();
        let mut system = LightingSystem::new(&LightingConfig::default(), &mut registry);
        let light = spawn_light(&mut registry, LightType::Directional);
        let entity = registry.entity_of(light.key()).unwrap();
        registry
            .insert_component(entity, TransformComponent::at(Vec3::new(0.0, 0.0, 5.0)))
            .unwrap();
        registry
            .insert_component(entity, ColorComponent::new(Rgba::new(255, 0, 0, 255)))
            .unwrap();
        let camera = registry.spawn::<TransformComponent>().unwrap();
        let camera_entity = registry.entity_of(camera.key()).unwrap();
        registry.transform_mut(camera).unwrap().set_position(1.0, 2.0, 3.0);

        let frame = system.update(&mut registry, Some(camera_entity));
        let slot = system.slot_of(light).unwrap();
        let uniform = frame.lights[slot];
        assert_eq!(uniform.light_type, 0);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
        assert!((uniform.position[2] - 5.0).abs() < 1e-5);
        assert!((uniform.target[1] - 1.0).abs() < 1e-5);
        let view = frame.view_position.unwrap();
        assert!((view - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-5);
    }
}
