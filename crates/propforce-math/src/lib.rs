//! Numerical primitives for PropForce.

pub mod integrate;
pub mod linalg;
pub mod poly;
pub mod qp;
pub mod stats;
