use super::Fit;

/// Relative tolerance used when classifying a tile's [`Fit`].
const FIT_TOLERANCE: f64 = 1e-9;

/// Share of the extent owed to later tiles that a floored tile may not take.
const RESERVE_SHARE: f64 = 0.5;

/// A tile produced by the strip pass, in layout order.
#[derive(Debug, Clone, Copy)]
pub(super) struct Tile {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub fit: Fit,
}

/// Slice the canvas into one strip per weight.
///
/// `weights` must be positive, finite and sorted in layout order; `total` is
/// their sum. Each strip spans the full cross extent of the remaining region,
/// so strips never overlap and the last one closes the region exactly.
pub(super) fn pack(
    weights: &[f64],
    total: f64,
    canvas_w: f64,
    canvas_h: f64,
    min_w: f64,
    min_h: f64,
) -> Vec<Tile> {
    let mut result = Vec::with_capacity(weights.len());
    let canvas_area = canvas_w * canvas_h;

    let (mut x, mut y) = (0.0f64, 0.0f64);
    let (mut w, mut h) = (canvas_w, canvas_h);
    // Once the region is a few ulps thin, rounding can carry the cursor onto
    // the far edge; tiles always start strictly inside the canvas.
    let (last_x, last_y) = (next_below(canvas_w), next_below(canvas_h));
    // Weight of the tiles placed after each position, summed from the back so
    // that small tails are not lost to cancellation.
    let mut after = vec![0.0f64; weights.len()];
    for i in (0..weights.len().saturating_sub(1)).rev() {
        after[i] = after[i + 1] + weights[i + 1];
    }

    for (i, &weight) in weights.iter().enumerate() {
        if i + 1 == weights.len() {
            result.push(Tile {
                x,
                y,
                w,
                h,
                fit: Fit::Remainder,
            });
            break;
        }

        let ideal_area = weight / total * canvas_area;
        // Wider than tall: vertical strip across the full height.
        let vertical = w > h;
        let (extent_room, cross, min_extent, min_cross) = if vertical {
            (w, h, min_w, min_h)
        } else {
            (h, w, min_h, min_w)
        };

        let ideal = ideal_area / cross;
        let owed = (after[i] / (weight + after[i])).max(f64::EPSILON);
        let reserve = extent_room * owed * RESERVE_SHARE;
        let mut extent = ideal.max(min_extent).min(extent_room - reserve);
        // A dominant weight rounds the reserve away; a negligible one
        // underflows its ideal to zero. Either way both this strip and the
        // rest of the region must keep a positive extent.
        if extent >= extent_room {
            extent = next_below(extent_room);
        }
        if extent <= 0.0 {
            extent = next_below(extent_room).min(f64::from_bits(1));
        }
        let thickness = cross.max(min_cross).min(cross);

        let tolerance = FIT_TOLERANCE * extent_room;
        let fit = if extent < ideal - tolerance {
            Fit::Clamped
        } else if extent > ideal + tolerance {
            Fit::Floored
        } else {
            Fit::Proportional
        };

        if vertical {
            result.push(Tile {
                x,
                y,
                w: extent,
                h: thickness,
                fit,
            });
            x = (x + extent).min(last_x);
            w = (w - extent).max(0.0);
        } else {
            result.push(Tile {
                x,
                y,
                w: thickness,
                h: extent,
                fit,
            });
            y = (y + extent).min(last_y);
            h = (h - extent).max(0.0);
        }
    }

    result
}

/// Largest `f64` strictly below a positive finite `v`.
fn next_below(v: f64) -> f64 {
    f64::from_bits(v.to_bits() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(tiles: &[Tile]) -> Vec<f64> {
        tiles.iter().map(|t| t.w * t.h).collect()
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let weights = [400.0, 300.0, 200.0, 100.0];
        let tiles = pack(&weights, 1000.0, 50.0, 20.0, 0.0, 0.0);
        let total_out: f64 = areas(&tiles).iter().sum();
        assert!((total_out - 1000.0).abs() < 1e-9);
        for (tile, weight) in tiles.iter().zip(weights) {
            assert!((tile.w * tile.h - weight).abs() < 1e-9);
        }
    }

    #[test]
    fn strips_alternate_with_region_shape() {
        // 100x100 square: horizontal strip first, then the 100x50 rest is wider.
        let tiles = pack(&[50.0, 25.0, 25.0], 100.0, 100.0, 100.0, 0.0, 0.0);
        assert_eq!((tiles[0].w, tiles[0].h), (100.0, 50.0));
        assert_eq!((tiles[1].x, tiles[1].y), (0.0, 50.0));
        assert!((tiles[1].w - 50.0).abs() < 1e-9);
        assert_eq!(tiles[1].h, 50.0);
        assert!((tiles[2].x - 50.0).abs() < 1e-9);
        assert_eq!(tiles[2].fit, Fit::Remainder);
    }

    #[test]
    fn floor_grows_thin_strip() {
        // 90 takes a 180-wide strip; the 20x100 rest is taller than wide,
        // so the next strip is horizontal and its height hits the floor.
        let tiles = pack(&[90.0, 1.0, 9.0], 100.0, 200.0, 100.0, 30.0, 20.0);
        assert_eq!(tiles[0].fit, Fit::Proportional);
        assert_eq!(tiles[1].fit, Fit::Floored);
        assert!((tiles[1].h - 20.0).abs() < 1e-9);
        assert!(tiles[2].h > 0.0);
    }

    #[test]
    fn floor_never_starves_later_tiles() {
        let weights = [1.0; 8];
        let tiles = pack(&weights, 8.0, 100.0, 100.0, 90.0, 90.0);
        assert_eq!(tiles.len(), 8);
        for tile in &tiles {
            assert!(tile.w > 0.0 && tile.h > 0.0, "{:?}", tile);
        }
        let total: f64 = areas(&tiles).iter().sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn dominant_weight_leaves_room_for_the_last_tile() {
        let weights = [1e17, 1.0];
        let tiles = pack(&weights, 1e17 + 1.0, 100.0, 100.0, 15.0, 20.0);
        assert!(tiles[0].h < 100.0);
        assert!(tiles[1].y < 100.0);
        assert!(tiles[1].w > 0.0 && tiles[1].h > 0.0, "{:?}", tiles[1]);
        assert_eq!(tiles[1].fit, Fit::Remainder);
    }

    #[test]
    fn extreme_ratios_keep_every_tile_positive() {
        let weights = [1e300, 1e200, 1e100, 1.0, 1e-100, 1e-200, 1e-300];
        let total: f64 = weights.iter().sum();
        for (min_w, min_h) in [(0.0, 0.0), (15.0, 20.0), (100.0, 100.0)] {
            let tiles = pack(&weights, total, 100.0, 100.0, min_w, min_h);
            assert_eq!(tiles.len(), weights.len());
            for tile in &tiles {
                assert!(tile.w > 0.0 && tile.h > 0.0, "{:?}", tile);
                assert!(tile.x < 100.0 && tile.y < 100.0, "{:?}", tile);
            }
        }
    }
}
