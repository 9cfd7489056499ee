pub mod batch;
pub mod check;
mod strip;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// A weighted entry to be drawn as a proportional rectangle.
///
/// `tag` is carried through untouched for downstream use (colouring, tooltips).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T = ()> {
    pub name: CompactString,
    pub weight: f64,
    pub tag: T,
}

impl<T> Item<T> {
    pub fn new(name: &str, weight: f64, tag: T) -> Self {
        Self {
            name: CompactString::new(name),
            weight,
            tag,
        }
    }

    /// Weight is strictly positive and finite.
    pub fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

impl Item<()> {
    pub fn untagged(name: &str, weight: f64) -> Self {
        Self::new(name, weight, ())
    }
}

/// How a placement's size was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    /// Area equals the item's share of the canvas.
    Proportional,
    /// Grown to the minimum-size floor.
    Floored,
    /// Shrunk to stay inside the remaining region.
    Clamped,
    /// Last tile in layout order; takes whatever remains.
    Remainder,
}

/// A positioned rectangle for one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement<'a, T = ()> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `weight / total_weight * 100`
    pub percentage: f64,
    /// Position of the item in the caller's input slice.
    pub index: usize,
    /// Position in layout order (0 = heaviest, placed first).
    pub rank: usize,
    pub fit: Fit,
    pub item: &'a Item<T>,
}

impl<T> Placement<'_, T> {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// What to do with items whose weight is zero, negative or non-finite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidWeightPolicy {
    /// Fail the whole call with [`LayoutError::InvalidWeight`].
    #[default]
    Reject,
    /// Drop the item from both the total and the output.
    Skip,
}

/// Configuration for the packer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub on_invalid_weight: InvalidWeightPolicy,
    /// Minimum tile width as a fraction of the canvas width
    pub min_width_fraction: f64,
    /// Minimum tile height as a fraction of the canvas height
    pub min_height_fraction: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            on_invalid_weight: InvalidWeightPolicy::Reject,
            min_width_fraction: 0.15,
            min_height_fraction: 0.20,
        }
    }
}

impl LayoutOptions {
    pub fn skipping_invalid(mut self) -> Self {
        self.on_invalid_weight = InvalidWeightPolicy::Skip;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_width_fraction", self.min_width_fraction),
            ("min_height_fraction", self.min_height_fraction),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(LayoutError::InvalidOption { name, value });
            }
        }
        Ok(())
    }
}

/// Lay out `items` on a `width` x `height` canvas with the default options.
pub fn layout_with_defaults<T>(
    items: &[Item<T>],
    width: f64,
    height: f64,
) -> Result<Vec<Placement<'_, T>>> {
    layout(items, width, height, &LayoutOptions::default())
}

/// Partition the canvas into one rectangle per valid item, areas proportional
/// to weight. Placements come back in input order.
pub fn layout<'a, T>(
    items: &'a [Item<T>],
    width: f64,
    height: f64,
    options: &LayoutOptions,
) -> Result<Vec<Placement<'a, T>>> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LayoutError::DegenerateCanvas { width, height });
    }
    options.validate()?;

    // (input index, item) for every item that takes part in the layout
    let mut valid: Vec<(usize, &'a Item<T>)> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.has_valid_weight() {
            valid.push((index, item));
            continue;
        }
        match options.on_invalid_weight {
            InvalidWeightPolicy::Reject => {
                return Err(LayoutError::InvalidWeight {
                    index,
                    name: item.name.clone(),
                    weight: item.weight,
                });
            }
            InvalidWeightPolicy::Skip => {
                tracing::debug!(
                    "Skipping item {} '{}' with invalid weight {}",
                    index,
                    item.name,
                    item.weight
                );
            }
        }
    }

    if valid.is_empty() {
        tracing::debug!("Nothing to lay out ({} items supplied)", items.len());
        return Ok(Vec::new());
    }

    let total_weight: f64 = valid.iter().map(|(_, item)| item.weight).sum();
    if !total_weight.is_finite() {
        return Err(LayoutError::WeightOverflow);
    }

    // Layout order: heaviest first. Stable, so ties keep input order.
    let mut order: Vec<usize> = (0..valid.len()).collect();
    order.sort_by(|&a, &b| valid[b].1.weight.total_cmp(&valid[a].1.weight));
    let weights: Vec<f64> = order.iter().map(|&i| valid[i].1.weight).collect();

    let tiles = strip::pack(
        &weights,
        total_weight,
        width,
        height,
        width * options.min_width_fraction,
        height * options.min_height_fraction,
    );

    tracing::debug!(
        "Laid out {} of {} items (total weight {}) in {:.1}x{:.1}",
        valid.len(),
        items.len(),
        total_weight,
        width,
        height
    );

    // Back to input order: `valid` is already sorted by input index.
    let mut slots: Vec<Option<Placement<'a, T>>> = (0..valid.len()).map(|_| None).collect();
    for (rank, (&valid_pos, tile)) in order.iter().zip(tiles).enumerate() {
        let (index, item) = valid[valid_pos];
        slots[valid_pos] = Some(Placement {
            x: tile.x,
            y: tile.y,
            width: tile.w,
            height: tile.h,
            percentage: item.weight / total_weight * 100.0,
            index,
            rank,
            fit: tile.fit,
            item,
        });
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(weights: &[f64]) -> Vec<Item> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Item::untagged(&format!("item{}", i), w))
            .collect()
    }

    #[test]
    fn two_items_split_sixty_forty() {
        let items = vec![Item::untagged("A", 60.0), Item::untagged("B", 40.0)];
        let placed = layout_with_defaults(&items, 200.0, 100.0).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].item.name, "A");
        assert_eq!(placed[1].item.name, "B");

        let a = placed[0].area();
        let b = placed[1].area();
        assert!((a / b - 1.5).abs() < 1e-9, "ratio {}", a / b);
        assert!((a + b - 20_000.0).abs() < 1e-9);

        // A is a vertical strip on the left, B fills the rest.
        assert_eq!((placed[0].x, placed[0].y), (0.0, 0.0));
        assert!((placed[0].width - 120.0).abs() < 1e-9);
        assert!((placed[1].x - 120.0).abs() < 1e-9);
        assert_eq!(placed[0].fit, Fit::Proportional);
        assert_eq!(placed[1].fit, Fit::Remainder);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let placed = layout_with_defaults::<()>(&[], 200.0, 100.0).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn negative_weight_rejected_by_default() {
        let items = vec![Item::untagged("bad", -5.0)];
        let err = layout_with_defaults(&items, 200.0, 100.0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidWeight { index: 0, .. }));
    }

    #[test]
    fn negative_weight_skipped_when_configured() {
        let items = vec![Item::untagged("bad", -5.0)];
        let options = LayoutOptions::default().skipping_invalid();
        let placed = layout(&items, 200.0, 100.0, &options).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn skipped_items_do_not_count_towards_total() {
        let items = vec![
            Item::untagged("a", 30.0),
            Item::untagged("nan", f64::NAN),
            Item::untagged("zero", 0.0),
            Item::untagged("b", 10.0),
        ];
        let options = LayoutOptions::default().skipping_invalid();
        let placed = layout(&items, 100.0, 100.0, &options).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].index, 0);
        assert_eq!(placed[1].index, 3);
        assert!((placed[0].percentage - 75.0).abs() < 1e-9);
        assert!((placed[1].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_width_canvas_fails_regardless_of_items() {
        let err = layout_with_defaults::<()>(&[], 0.0, 100.0).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateCanvas { .. }));
        let err = layout_with_defaults(&items(&[1.0]), 100.0, f64::NAN).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateCanvas { .. }));
    }

    #[test]
    fn out_of_range_fraction_rejected() {
        let options = LayoutOptions {
            min_width_fraction: 1.5,
            ..LayoutOptions::default()
        };
        let err = layout(&items(&[1.0]), 100.0, 100.0, &options).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidOption {
                name: "min_width_fraction",
                value: 1.5
            }
        );
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let items = items(&[f64::MAX, f64::MAX]);
        let err = layout_with_defaults(&items, 100.0, 100.0).unwrap_err();
        assert_eq!(err, LayoutError::WeightOverflow);
    }

    #[test]
    fn output_keeps_input_order_and_ranks_by_weight() {
        let items = items(&[5.0, 50.0, 20.0]);
        let placed = layout_with_defaults(&items, 300.0, 200.0).unwrap();
        let indices: Vec<usize> = placed.iter().map(|p| p.index).collect();
        let ranks: Vec<usize> = placed.iter().map(|p| p.rank).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(ranks, vec![2, 0, 1]);
    }

    #[test]
    fn equal_weights_keep_input_order_in_layout() {
        let items = items(&[1.0, 1.0, 1.0]);
        let placed = layout_with_defaults(&items, 300.0, 100.0).unwrap();
        let ranks: Vec<usize> = placed.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
        assert!(placed[0].x < placed[1].x && placed[1].x < placed[2].x);
    }

    #[test]
    fn single_item_fills_canvas() {
        let items = items(&[3.0]);
        let placed = layout_with_defaults(&items, 1920.0, 1080.0).unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].width, 1920.0);
        assert_eq!(placed[0].height, 1080.0);
        assert!((placed[0].percentage - 100.0).abs() < 1e-12);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"on_invalid_weight": "skip"}"#).unwrap();
        assert_eq!(options.on_invalid_weight, InvalidWeightPolicy::Skip);
        assert_eq!(options.min_width_fraction, 0.15);
        assert_eq!(options.min_height_fraction, 0.20);
    }
}
