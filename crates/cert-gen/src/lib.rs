//! Vehicle test certificate payload assembly.
//!
//! A test result is turned into the structured payload consumed by the document
//! generation service: independent payload commands each contribute a fragment
//! (core pass/fail fields, defects, make and model, ADR/IVA/MSVA/roadworthiness
//! detail) and the generator merges them section by section.

pub mod certificates;
pub mod config;
pub mod error;
pub mod telemetry;
