// ICT Parser - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, regex, csv, serde.
// Must NOT depend on: ui, platform, app, or the filesystem directly.

pub mod aggregate;
pub mod export;
pub mod extractor;
pub mod model;
pub mod selection;
