// Personality questionnaire: fixed question bank, per-axis vote scoring,
// and the profile creation flow that ends in a backend analysis call.

pub mod analysis;
pub mod questions;
pub mod scoring;
pub mod wizard;

pub use analysis::{BackendAnalyzer, ProfileAnalyzer};
pub use scoring::Choice;
pub use wizard::{complete_profile, ProfileDraft};
