//! Physical-range screening of scenario inputs.
//!
//! The disk model accepts any finite input; these checks reject scenarios
//! outside the range the empirical calibration was tuned for.

use propforce_types::error::{PropError, PropResult};
use propforce_types::state::{FlowState, Geometry};

/// Closed intervals accepted for each scenario input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputBounds {
    /// Diameter [m].
    pub diameter: (f64, f64),
    pub rpm: (f64, f64),
    /// Freestream velocity [m/s].
    pub velocity: (f64, f64),
}

impl Default for InputBounds {
    fn default() -> Self {
        InputBounds {
            diameter: (0.05, 2.0),
            rpm: (100.0, 20_000.0),
            velocity: (0.0, 100.0),
        }
    }
}

fn within(quantity: &'static str, value: f64, (min, max): (f64, f64)) -> PropResult<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(PropError::OutOfRange {
            quantity,
            value,
            min,
            max,
        })
    }
}

impl InputBounds {
    /// Check diameter, rpm and velocity in that order.
    pub fn check(&self, diameter: f64, rpm: f64, velocity: f64) -> PropResult<()> {
        within("diameter", diameter, self.diameter)?;
        within("rpm", rpm, self.rpm)?;
        within("velocity", velocity, self.velocity)
    }

    pub fn check_scenario(&self, geometry: &Geometry, flow: &FlowState) -> PropResult<()> {
        self.check(geometry.diameter(), flow.rpm(), flow.velocity_inf())
    }
}

/// [`InputBounds::check`] with the default bounds.
pub fn validate_inputs(diameter: f64, rpm: f64, velocity: f64) -> PropResult<()> {
    InputBounds::default().check(diameter, rpm, velocity)
}
