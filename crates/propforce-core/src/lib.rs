//! Radial actuator-disk propeller model.
//!
//! Loading evaluation, induced velocity, integrated forces, non-dimensional
//! coefficients, RPM sweeps, named loading presets and input-range checks.

pub mod disk;
pub mod metrics;
pub mod presets;
pub mod sweep;
pub mod validate;
