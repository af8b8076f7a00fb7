//! Chemistry reference data shared by every template: periodic table,
//! VSEPR geometry and the compound catalogue.

pub mod compounds;
pub mod geometry;
pub mod periodic;

pub use compounds::Compound;
pub use periodic::{Element, PeriodicTable};
