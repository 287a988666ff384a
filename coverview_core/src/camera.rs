//! Camera model and field-of-view sampling.
//!
//! The camera is an ideal 2D cone centered on the robot heading. The visible
//! footprint is found by sampling the cone on a polar lattice (angles x ranges)
//! and collecting the grid cells the samples land in.

use crate::area::{GridCell, SearchArea};
use crate::error::ConfigError;
use crate::robot::RobotPose;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Immutable camera geometry.
///
/// Deserialization goes through [`CameraSpec::new`], so invalid geometry is
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSpec {
    /// Horizontal field of view (degrees)
    fov_horizontal: f64,

    /// Vertical field of view (degrees). Carried for completeness; the 2D model ignores it.
    fov_vertical: f64,

    /// Nearest observable range (meters)
    min_range: f64,

    /// Farthest observable range (meters)
    max_range: f64,
}

#[derive(Deserialize)]
struct CameraFields {
    fov_horizontal: f64,
    fov_vertical: f64,
    min_range: f64,
    max_range: f64,
}

impl<'de> Deserialize<'de> for CameraSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = CameraFields::deserialize(deserializer)?;
        Self::new(
            fields.fov_horizontal,
            fields.fov_vertical,
            fields.min_range,
            fields.max_range,
        )
        .map_err(de::Error::custom)
    }
}

impl CameraSpec {
    /// Creates a camera spec, rejecting FOVs outside `(0, 360]` and invalid ranges.
    pub fn new(
        fov_horizontal: f64,
        fov_vertical: f64,
        min_range: f64,
        max_range: f64,
    ) -> Result<Self, ConfigError> {
        for (name, fov) in [
            ("camera_fov_horizontal", fov_horizontal),
            ("camera_fov_vertical", fov_vertical),
        ] {
            ConfigError::require_positive(name, fov)?;
            if fov > 360.0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    value: fov,
                    expected: "(0, 360]",
                });
            }
        }
        ConfigError::require_non_negative("camera_min_range", min_range)?;
        ConfigError::require_positive("camera_max_range", max_range)?;
        if min_range > max_range {
            return Err(ConfigError::InvertedRange { min_range, max_range });
        }

        Ok(Self {
            fov_horizontal,
            fov_vertical,
            min_range,
            max_range,
        })
    }

    /// Intel RealSense D435: 87 x 58 degrees, 0.3-3.0 m usable depth.
    pub fn realsense_d435() -> Self {
        Self {
            fov_horizontal: 87.0,
            fov_vertical: 58.0,
            min_range: 0.3,
            max_range: 3.0,
        }
    }

    pub fn fov_horizontal(&self) -> f64 {
        self.fov_horizontal
    }

    pub fn fov_vertical(&self) -> f64 {
        self.fov_vertical
    }

    pub fn min_range(&self) -> f64 {
        self.min_range
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Width of the footprint at maximum range (meters).
    pub fn footprint_width(&self) -> f64 {
        2.0 * self.max_range * (self.fov_horizontal.to_radians() / 2.0).tan().abs()
    }
}

/// Samples the camera cone onto a coverage grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySampler {
    /// Number of angular samples across the horizontal FOV
    angle_samples: usize,

    /// Number of range samples between `min_range` and `max_range`
    range_samples: usize,
}

impl Default for VisibilitySampler {
    fn default() -> Self {
        Self {
            angle_samples: 30,
            range_samples: 20,
        }
    }
}

/// `n` evenly spaced values over `[start, end]`, endpoints included.
/// A single sample sits at `start`.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n && n > 1 { end } else { start + step * i as f64 })
}

impl VisibilitySampler {
    pub fn new(angle_samples: usize, range_samples: usize) -> Result<Self, ConfigError> {
        if angle_samples == 0 {
            return Err(ConfigError::ZeroSamples("angle_samples"));
        }
        if range_samples == 0 {
            return Err(ConfigError::ZeroSamples("range_samples"));
        }
        Ok(Self {
            angle_samples,
            range_samples,
        })
    }

    pub fn angle_samples(&self) -> usize {
        self.angle_samples
    }

    pub fn range_samples(&self) -> usize {
        self.range_samples
    }

    /// Grid cells currently observable from `pose`.
    ///
    /// Samples start at the camera's `min_range`; the blind zone in front of
    /// the lens is never marked.
    pub fn visible_cells(
        &self,
        pose: &RobotPose,
        camera: &CameraSpec,
        area: &SearchArea,
    ) -> HashSet<GridCell> {
        let mut cells = HashSet::new();
        let heading = pose.heading_rad();
        let half_fov = camera.fov_horizontal().to_radians() / 2.0;

        // With one angular sample the cone collapses onto the heading ray
        let (angle_lo, angle_hi) = if self.angle_samples == 1 {
            (0.0, 0.0)
        } else {
            (-half_fov, half_fov)
        };

        for offset in linspace(angle_lo, angle_hi, self.angle_samples) {
            let (sin, cos) = (heading + offset).sin_cos();
            for range in linspace(camera.min_range(), camera.max_range(), self.range_samples) {
                let cell = area.world_to_grid(pose.x() + range * sin, pose.y() + range * cos);
                if area.is_within_bounds(cell.x, cell.y) {
                    cells.insert(cell);
                }
            }
        }

        cells
    }
}
