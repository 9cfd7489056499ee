//! Presentation helpers for finished layouts. The packer itself knows nothing
//! about colour or text; these turn placements into something drawable.

pub mod colors;
pub mod labels;
pub mod svg;
