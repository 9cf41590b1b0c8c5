//! Free-flight camera control
//!
//! Applies one frame of keyboard and mouse input to a transform. Input is
//! passed in as a plain snapshot so the controller has no window or device
//! dependency.

use crate::config::FlightConfig;
use crate::ecs::components::{FlightDataComponent, TransformHandle};
use crate::ecs::{ComponentRegistry, EcsError, EcsResult};
use crate::foundation::math::Vec2;

/// Input state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightInput {
    /// Speed boost held
    pub boost: bool,
    /// Move up
    pub up: bool,
    /// Move down
    pub down: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Move forward
    pub forward: bool,
    /// Move backwards
    pub backward: bool,
    /// Turn left
    pub turn_left: bool,
    /// Turn right
    pub turn_right: bool,
    /// Nose up
    pub pitch_up: bool,
    /// Nose down
    pub pitch_down: bool,
    /// Bank left
    pub roll_left: bool,
    /// Bank right
    pub roll_right: bool,
    /// Mouse-look button held
    pub look_button: bool,
    /// Cursor position in window pixels
    pub mouse_position: Vec2,
}

/// Moves a transform from [`FlightInput`]
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFlightController {
    boost_multiplier: f32,
    mouse_sensitivity: f32,
}

impl FreeFlightController {
    /// Controller using the boost and mouse settings from `config`
    #[must_use]
    pub const fn new(config: &FlightConfig) -> Self {
        Self {
            boost_multiplier: config.boost_multiplier,
            mouse_sensitivity: config.mouse_sensitivity,
        }
    }

    /// Apply one frame of input to `target`
    ///
    /// The target's entity gets default flight data if it has none. Opposing
    /// keys do not cancel: the first of each pair wins.
    ///
    /// Turning right is a negative angle in both heading and yaw mode, and
    /// moving the mouse right turns right, since positive heading angles
    /// turn counter-clockwise seen from +Z.
    pub fn update(
        &self,
        registry: &mut ComponentRegistry,
        target: TransformHandle,
        input: &FlightInput,
        delta_time: f32,
    ) -> EcsResult<()> {
        let flight_handle = registry.must_get_sibling::<FlightDataComponent>(target.key())?;
        let flight = registry.get(flight_handle).cloned().ok_or(EcsError::StaleHandle)?;

        let mut speed = flight.speed * delta_time;
        if input.boost {
            speed *= self.boost_multiplier;
        }
        let rot_speed = flight.rotation_speed * delta_time;
        let mouse_delta = if !flight.use_mouse_button || input.look_button {
            flight
                .last_mouse_position
                .map_or_else(Vec2::zeros, |last| input.mouse_position - last)
        } else {
            Vec2::zeros()
        };

        let mut transform = registry.transform_mut(target).ok_or(EcsError::StaleHandle)?;
        if input.up {
            transform.move_up(speed);
        } else if input.down {
            transform.move_down(speed);
        }
        if input.right {
            transform.move_right(speed);
        } else if input.left {
            transform.move_left(speed);
        }
        if input.forward {
            transform.move_forward(speed);
        } else if input.backward {
            transform.move_backwards(speed);
        }

        let turn = if input.turn_right {
            -rot_speed
        } else if input.turn_left {
            rot_speed
        } else {
            0.0
        };
        if turn != 0.0 {
            if flight.use_heading {
                transform.rotate_heading(turn);
            } else {
                transform.rotate_yaw(turn);
            }
        }

        if input.pitch_up {
            transform.rotate_pitch(-rot_speed);
        } else if input.pitch_down {
            transform.rotate_pitch(rot_speed);
        }

        if mouse_delta != Vec2::zeros() {
            transform
                .rotate_heading(-mouse_delta.x * rot_speed * self.mouse_sensitivity)
                .rotate_pitch(mouse_delta.y * rot_speed * self.mouse_sensitivity);
        }

        if input.roll_left {
            transform.rotate_roll(-rot_speed);
        } else if input.roll_right {
            transform.rotate_roll(rot_speed);
        }

        if let Some(flight) = registry.get_mut(flight_handle) {
            flight.last_mouse_position = Some(input.mouse_position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn setup() -> (ComponentRegistry, TransformHandle, FreeFlightController) {
        let mut registry = ComponentRegistry::new();
        let camera = registry.spawn::<TransformComponent>().unwrap();
        (registry, camera, FreeFlightController::new(&FlightConfig::default()))
    }

    #[test]
    fn test_forward_with_boost() {
        let (mut registry, camera, controller) = setup();
        let input = FlightInput {
            forward: true,
            boost: true,
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.1).unwrap();

        let transform = registry.get(camera).unwrap();
        assert_relative_eq!(transform.position(), Vec3::new(0.0, 5.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_first_of_opposing_keys_wins() {
        let (mut registry, camera, controller) = setup();
        let input = FlightInput {
            up: true,
            down: true,
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.5).unwrap();
        assert_relative_eq!(registry.get(camera).unwrap().position().z, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_turn_right_heads_toward_positive_x() {
        let (mut registry, camera, controller) = setup();
        let input = FlightInput {
            turn_right: true,
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.5).unwrap();
        assert_relative_eq!(registry.get(camera).unwrap().forward(), Vec3::x(), epsilon = 1e-4);
    }

    #[test]
    fn test_turn_right_matches_in_yaw_mode() {
        let (mut registry, camera, controller) = setup();
        let entity = registry.entity_of(camera.key()).unwrap();
        let flight = registry.must_get_component::<FlightDataComponent>(entity).unwrap();
        registry.get_mut(flight).unwrap().use_heading = false;
        let input = FlightInput {
            turn_right: true,
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.5).unwrap();
        assert_relative_eq!(registry.get(camera).unwrap().forward(), Vec3::x(), epsilon = 1e-4);
    }

    #[test]
    fn test_pitch_up_raises_nose() {
        let (mut registry, camera, controller) = setup();
        let input = FlightInput {
            pitch_up: true,
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.1).unwrap();
        assert!(registry.get(camera).unwrap().forward().z > 0.0);
    }

    #[test]
    fn test_mouse_look_needs_button_and_history() {
        let (mut registry, camera, controller) = setup();
        let mut input = FlightInput {
            mouse_position: Vec2::new(100.0, 100.0),
            ..FlightInput::default()
        };
        controller.update(&mut registry, camera, &input, 0.1).unwrap();
        assert_relative_eq!(registry.get(camera).unwrap().forward(), Vec3::y(), epsilon = 1e-6);

        input.mouse_position = Vec2::new(110.0, 100.0);
        controller.update(&mut registry, camera, &input, 0.1).unwrap();
        assert_relative_eq!(registry.get(camera).unwrap().forward(), Vec3::y(), epsilon = 1e-6);

        input.mouse_position = Vec2::new(120.0, 100.0);
        input.look_button = true;
        controller.update(&mut registry, camera, &input, 0.1).unwrap();
        let forward = registry.get(camera).unwrap().forward();
        assert!(forward.x > 0.0, "moving the mouse right turns right");

        let entity = registry.entity_of(camera.key()).unwrap();
        let flight = registry.get_component::<FlightDataComponent>(entity).unwrap();
        assert_eq!(flight.last_mouse_position, Some(Vec2::new(120.0, 100.0)));
    }
}
