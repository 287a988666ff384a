//! Robot pose kinematics and path history.
//!
//! Heading convention: degrees, 0 = +Y (north), 90 = +X (east), increasing
//! clockwise, always normalized to `[0, 360)`.

use crate::camera::CameraSpec;
use crate::error::ConfigError;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Displacements with both components below this are treated as having no direction.
pub const MIN_DIRECTION_COMPONENT: f64 = 1e-3;

/// Normalizes a heading in degrees to `[0, 360)`.
///
/// Non-finite input maps to 0.
pub fn normalize_heading(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let h = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Signed shortest rotation from `from` to `to`, in `[-180, 180]` degrees.
pub fn heading_difference(from: f64, to: f64) -> f64 {
    let mut diff = normalize_heading(to) - normalize_heading(from);
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

/// Heading (degrees) pointing along the displacement `(dx, dy)`.
///
/// Returns `None` for a near-zero displacement, where the direction is meaningless.
pub fn heading_towards(dx: f64, dy: f64) -> Option<f64> {
    if dx.abs() < MIN_DIRECTION_COMPONENT && dy.abs() < MIN_DIRECTION_COMPONENT {
        return None;
    }
    Some(normalize_heading(dx.atan2(dy).to_degrees()))
}

/// Position and heading of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    /// Position in meters, world frame
    pub position: Vector2<f64>,

    /// Heading in degrees, `[0, 360)`
    heading: f64,
}

impl RobotPose {
    /// Creates a pose at `(x, y)` facing north.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading: 0.0,
        }
    }

    /// Creates a pose with an explicit heading (normalized).
    pub fn with_heading(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading: normalize_heading(heading),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Heading in degrees, `[0, 360)`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Heading in radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading.to_radians()
    }

    /// Unit vector along the current heading.
    pub fn direction(&self) -> Vector2<f64> {
        let h = self.heading_rad();
        Vector2::new(h.sin(), h.cos())
    }

    /// Distance from the world origin.
    pub fn distance_from_origin(&self) -> f64 {
        self.position.norm()
    }
}

/// A single motion primitive emitted by a search strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Drive `distance` meters along the current heading
    Forward(f64),

    /// Translate by `(dx, dy)` meters without changing heading
    MoveBy(f64, f64),

    /// Rotate by the given degrees (positive = clockwise)
    Turn(f64),

    /// Set the absolute heading in degrees
    SetHeading(f64),
}

/// The simulated robot: pose, path history, speed, and camera.
#[derive(Debug, Clone)]
pub struct Robot {
    pose: RobotPose,

    /// Every position visited, starting with the spawn point
    path: Vec<Vector2<f64>>,

    /// Forward speed in m/s
    speed: f64,

    camera: CameraSpec,
}

impl Robot {
    /// Spawns a robot at `(x, y)` facing north.
    pub fn new(x: f64, y: f64, speed: f64, camera: CameraSpec) -> Result<Self, ConfigError> {
        ConfigError::require_positive("robot_speed", speed)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "start position",
                value: if x.is_finite() { y } else { x },
            });
        }

        let pose = RobotPose::new(x, y);
        Ok(Self {
            pose,
            path: vec![pose.position],
            speed,
            camera,
        })
    }

    pub fn pose(&self) -> &RobotPose {
        &self.pose
    }

    pub fn x(&self) -> f64 {
        self.pose.x()
    }

    pub fn y(&self) -> f64 {
        self.pose.y()
    }

    pub fn heading(&self) -> f64 {
        self.pose.heading()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn camera(&self) -> &CameraSpec {
        &self.camera
    }

    /// Positions visited, oldest first.
    pub fn path(&self) -> &[Vector2<f64>] {
        &self.path
    }

    /// Total length of the path polyline in meters.
    pub fn distance_traveled(&self) -> f64 {
        self.path
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Translates the robot and records the new position.
    ///
    /// Leaving the search area is allowed; out-of-area observations are
    /// filtered downstream.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.pose.position += Vector2::new(dx, dy);
        self.path.push(self.pose.position);
    }

    /// Drives `distance` meters along the current heading.
    pub fn move_forward(&mut self, distance: f64) {
        let step = self.pose.direction() * distance;
        self.move_by(step.x, step.y);
    }

    /// Rotates by `delta_degrees` (positive = clockwise).
    pub fn turn(&mut self, delta_degrees: f64) {
        self.pose.heading = normalize_heading(self.pose.heading + delta_degrees);
    }

    /// Sets the absolute heading.
    pub fn set_heading(&mut self, degrees: f64) {
        self.pose.heading = normalize_heading(degrees);
    }

    /// Turns to face along `(dx, dy)`. Leaves the heading unchanged for a
    /// near-zero displacement and returns false.
    pub fn face_towards(&mut self, dx: f64, dy: f64) -> bool {
        match heading_towards(dx, dy) {
            Some(heading) => {
                self.pose.heading = heading;
                true
            }
            None => false,
        }
    }

    /// Applies a strategy-produced motion command.
    pub fn apply(&mut self, command: MotionCommand) {
        match command {
            MotionCommand::Forward(distance) => self.move_forward(distance),
            MotionCommand::MoveBy(dx, dy) => self.move_by(dx, dy),
            MotionCommand::Turn(delta) => self.turn(delta),
            MotionCommand::SetHeading(heading) => self.set_heading(heading),
        }
    }
}
