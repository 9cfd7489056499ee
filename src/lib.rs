// Public library interface for tidemap-rs
// The CLI and the debug-layout tool are thin wrappers over these modules

pub mod config;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod render;
pub mod source;

pub use error::LayoutError;
pub use layout::{layout, layout_with_defaults, Fit, InvalidWeightPolicy, Item, LayoutOptions, Placement};
