// wspscan - app/mod.rs
//
// Application layer: pipeline orchestration and report rendering.
// Dependencies: core layer.

pub mod pipeline;
pub mod report;
