//! Module for classifying each experimental condition's active nutrient
//! limitation regime from flux balance results
pub mod config;
pub mod labeler;
pub mod saturation;
pub mod table;
