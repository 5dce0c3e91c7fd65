//! Module providing the metabolic model query surface consumed by the
//! selection and regime pipelines
pub mod model;
pub mod reaction;
