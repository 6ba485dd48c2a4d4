//! Constrained optimization of radial loading distributions.
//!
//! Stage 1: nonlinear-program seam and finite differences
//! Stage 2: SQP, augmented Lagrangian and bounded quasi-Newton solvers
//! Stage 3: loading problem adaptor with evaluation history

pub mod augmented;
pub mod history;
pub mod loading;
pub mod nlp;
pub mod sqp;
