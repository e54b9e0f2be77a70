//! Renderers for archipelago analysis reports.

pub mod json;
pub mod markdown;
pub mod text;
