use compact_str::CompactString;
use thiserror::Error;

/// Layout computation error.
///
/// An empty item list is not an error: `layout` returns an empty placement list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// An item has a zero, negative or non-finite weight and the policy is `Reject`.
    #[error("item {index} ('{name}') has invalid weight {weight}")]
    InvalidWeight {
        index: usize,
        name: CompactString,
        weight: f64,
    },
    /// Canvas width or height is zero, negative or non-finite.
    #[error("degenerate canvas {width}x{height}")]
    DegenerateCanvas { width: f64, height: f64 },
    /// A layout option is outside its valid range.
    #[error("layout option {name} must be a finite value in [0, 1], got {value}")]
    InvalidOption { name: &'static str, value: f64 },
    /// The weights are individually valid but their sum is not finite.
    #[error("total weight overflowed")]
    WeightOverflow,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
