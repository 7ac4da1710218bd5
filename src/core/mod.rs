// wspscan - core/mod.rs
//
// Core analysis layer: sniffing, classification, merging, aggregation.
// Pure with respect to file contents; the only I/O here is discovery
// metadata and config file reads. Must NOT depend on: app.

pub mod classify;
pub mod config;
pub mod discovery;
pub mod events;
pub mod export;
pub mod frequency;
pub mod grouping;
pub mod model;
pub mod sniff;
pub mod summary;
