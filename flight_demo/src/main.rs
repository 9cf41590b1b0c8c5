//! Headless flight demo
//!
//! Builds a small scene (a spinning test object with a child, a camera, a few
//! lights and some randomly drifting props), flies the camera along a
//! scripted input track and logs what the render and lighting systems see.
//!
//! Usage: `flight_demo [scene.toml|scene.ron]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use scene_ecs::config::{Config, ConfigError};
use scene_ecs::ecs::systems::{CameraView, LightFrame};
use scene_ecs::foundation::logging;
use scene_ecs::prelude::*;

const FRAMES: u64 = 600;
const PROP_COUNT: usize = 12;
const LIGHT_COUNT: usize = 5;
const SCENE_SEED: u64 = 0x5EED;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("scene: {0}")]
    Scene(#[from] EcsError),
}

/// Parent with a cylinder child, both turning at their own rates
fn create_test_entity(registry: &mut ComponentRegistry) -> Result<TransformHandle, DemoError> {
    let body = registry.spawn::<TransformComponent>()?;
    registry
        .transform_mut(body)
        .ok_or(EcsError::StaleHandle)?
        .set_position(3.0, 3.0, 3.0)
        .rotate_heading(45.0)
        .rotate_pitch(30.0);
    registry.add_component_to_owner::<DrawableComponent, _>(Some(body))?;
    let entity = registry.entity_of(body.key()).ok_or(EcsError::StaleHandle)?;
    if let Some(drawable) = registry.get_component_mut::<DrawableComponent>(entity) {
        drawable.color = Rgba::PURPLE;
        drawable.size = Vec3::new(0.25, 0.75, 0.25);
    }
    registry.insert_component(
        entity,
        AutoMoverComponent::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 90.0, 0.0)),
    )?;

    let child = registry.spawn::<TransformComponent>()?;
    registry.add_child(body, child)?;
    registry
        .transform_mut(child)
        .ok_or(EcsError::StaleHandle)?
        .set_position(0.0, 0.0, 0.35);
    let child_entity = registry.entity_of(child.key()).ok_or(EcsError::StaleHandle)?;
    registry.insert_component(
        child_entity,
        AutoMoverComponent::new(Vec3::zeros(), Vec3::new(0.0, 180.0, 0.0)),
    )?;
    registry.insert_component(
        child_entity,
        DrawableComponent::new(DrawShape::Cylinder, Vec3::new(0.25, 0.125, 0.125), Rgba::SKY_BLUE),
    )?;
    Ok(body)
}

fn create_camera(registry: &mut ComponentRegistry, config: &SceneConfig) -> Result<Entity, DemoError> {
    let camera = registry.create_entity();
    registry.insert_component(camera, TransformComponent::at(Vec3::new(0.0, -15.0, 4.0)))?;
    registry.add_component::<CameraComponent>(camera)?;
    registry.insert_component(camera, FlightDataComponent::from_config(&config.flight))?;
    Ok(camera)
}

/// Lights circling the origin, each aimed at the test object
fn create_lights(registry: &mut ComponentRegistry, target: Entity) -> Result<(), DemoError> {
    let palette = [Rgba::WHITE, Rgba::RED, Rgba::YELLOW, Rgba::SKY_BLUE, Rgba::PURPLE];
    for index in 0..LIGHT_COUNT {
        let light = registry.create_entity();
        #[allow(clippy::cast_precision_loss)]
        let angle = (index as f32 / LIGHT_COUNT as f32) * std::f32::consts::TAU;
        registry.insert_component(
            light,
            TransformComponent::at(Vec3::new(angle.cos() * 8.0, angle.sin() * 8.0, 6.0)),
        )?;
        let light_type = if index == 0 {
            LightType::Directional
        } else {
            LightType::Point
        };
        registry.insert_component(light, LightComponent::new(light_type))?;
        registry.insert_component(light, ColorComponent::new(palette[index % palette.len()]))?;
        registry.insert_component(light, LookAtComponent::new(target))?;
    }
    Ok(())
}

fn create_props(registry: &mut ComponentRegistry, rng: &mut StdRng) -> Result<(), DemoError> {
    let shapes = [DrawShape::Box, DrawShape::Sphere, DrawShape::Cylinder, DrawShape::Plane];
    for _ in 0..PROP_COUNT {
        let prop = registry.create_entity();
        let position = Vec3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(0.0..10.0),
        );
        registry.insert_component(prop, TransformComponent::at(position))?;
        let shape = shapes[rng.gen_range(0..shapes.len())];
        registry.insert_component(prop, DrawableComponent::new(shape, Vec3::new(0.5, 0.5, 0.5), Rgba::GRAY))?;
        let mover = AutoMoverComponent::new(
            Vec3::new(0.0, rng.gen_range(0.5..3.0), 0.0),
            Vec3::new(0.0, rng.gen_range(-60.0..60.0), 0.0),
        );
        registry.insert_component(prop, mover.with_heading())?;
    }
    Ok(())
}

/// Input for frame `frame`: cruise, bank round, then mouse-look while boosting
fn scripted_input(frame: u64) -> FlightInput {
    #[allow(clippy::cast_precision_loss)]
    let cursor = Vec2::new(640.0 + (frame % 200) as f32, 450.0);
    match frame {
        0..=149 => FlightInput {
            forward: true,
            mouse_position: cursor,
            ..FlightInput::default()
        },
        150..=299 => FlightInput {
            forward: true,
            turn_right: true,
            roll_right: frame % 2 == 0,
            mouse_position: cursor,
            ..FlightInput::default()
        },
        300..=449 => FlightInput {
            look_button: true,
            mouse_position: cursor,
            ..FlightInput::default()
        },
        _ => FlightInput {
            boost: true,
            up: true,
            backward: true,
            mouse_position: cursor,
            ..FlightInput::default()
        },
    }
}

fn log_frame(frame: u64, view: &CameraView, draw_count: usize, lights: &LightFrame) {
    let shaded = lights.lights.iter().filter(|light| light.enabled == 1).count();
    log::info!(
        "frame {frame}: camera X{:.2} Y{:.2} Z{:.2}, {draw_count} draws, {shaded} lights ({} unshaded)",
        view.position.x,
        view.position.y,
        view.position.z,
        lights.overflow.len()
    );
}

fn run(config: &SceneConfig) -> Result<(), DemoError> {
    let mut registry = ComponentRegistry::with_config(&config.registry);
    let render = RenderSystem::new(&mut registry);
    let mut lighting = LightingSystem::new(&config.lighting, &mut registry);
    let controller = FreeFlightController::new(&config.flight);
    let mut rng = StdRng::seed_from_u64(SCENE_SEED);

    let test_entity = create_test_entity(&mut registry)?;
    let test_owner = registry.entity_of(test_entity.key()).ok_or(EcsError::StaleHandle)?;
    let camera = create_camera(&mut registry, config)?;
    let camera_transform = registry
        .component_handle::<TransformComponent>(camera)
        .ok_or(EcsError::StaleHandle)?;
    create_lights(&mut registry, test_owner)?;
    create_props(&mut registry, &mut rng)?;
    log::info!(
        "Scene ready: {} entities, {} components",
        registry.entities().len(),
        registry.component_count()
    );

    let delta_time = config.frame.fixed_delta_time();
    let mut timer = FrameTimer::new(config.frame.max_delta_time);
    for frame in 0..FRAMES {
        timer.update();
        registry.update(delta_time)?;
        controller.update(&mut registry, camera_transform, &scripted_input(frame), delta_time)?;

        let view = render.begin(&mut registry, camera)?;
        let draw_list = render.collect_draw_list(&mut registry);
        let lights = lighting.update(&mut registry, Some(camera));
        if frame % 100 == 0 {
            log_frame(frame, &view, draw_list.len(), &lights);
        }
    }

    let removed = registry.destroy_with_children(test_entity);
    log::info!(
        "Destroyed test object ({removed} components); {} drawables and {} lit slots remain",
        render.visible_count(),
        lighting.slots_in_use()
    );
    log::info!(
        "Simulated {} frames at {:.0} frames/s",
        timer.frame_count(),
        timer.average_fps()
    );
    registry.clear();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting flight demo");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene settings from {path}");
            SceneConfig::load_from_file(path).map_err(DemoError::from)?
        }
        None => SceneConfig::default(),
    };
    run(&config)?;

    log::info!("Flight demo finished");
    Ok(())
}
