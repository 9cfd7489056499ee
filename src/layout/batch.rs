use rayon::prelude::*;

use super::{layout, Item, LayoutOptions, Placement};
use crate::error::Result;

/// One independent canvas and the items to pack into it.
#[derive(Debug, Clone)]
pub struct Panel<T = ()> {
    pub items: Vec<Item<T>>,
    pub width: f64,
    pub height: f64,
}

impl<T> Panel<T> {
    pub fn new(items: Vec<Item<T>>, width: f64, height: f64) -> Self {
        Self {
            items,
            width,
            height,
        }
    }
}

/// Lay out every panel in parallel. Results are in panel order and each
/// panel succeeds or fails on its own.
pub fn layout_batch<'a, T: Sync>(
    panels: &'a [Panel<T>],
    options: &LayoutOptions,
) -> Vec<Result<Vec<Placement<'a, T>>>> {
    let results: Vec<_> = panels
        .par_iter()
        .map(|panel| layout(&panel.items, panel.width, panel.height, options))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        tracing::warn!("{} of {} panels failed to lay out", failed, panels.len());
    } else {
        tracing::debug!("Laid out {} panels", panels.len());
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn batch_matches_sequential_layout() {
        let panels: Vec<Panel> = (1..=16)
            .map(|n| {
                let items = (1..=n)
                    .map(|i| Item::untagged(&format!("p{}", i), i as f64))
                    .collect();
                Panel::new(items, 100.0 + n as f64, 80.0)
            })
            .collect();

        let options = LayoutOptions::default();
        let parallel = layout_batch(&panels, &options);
        assert_eq!(parallel.len(), panels.len());
        for (panel, result) in panels.iter().zip(&parallel) {
            let sequential = layout(&panel.items, panel.width, panel.height, &options).unwrap();
            assert_eq!(result.as_ref().unwrap(), &sequential);
        }
    }

    #[test]
    fn failing_panel_does_not_affect_others() {
        let panels = vec![
            Panel::new(vec![Item::untagged("a", 1.0)], 0.0, 10.0),
            Panel::new(vec![Item::untagged("b", 1.0)], 10.0, 10.0),
        ];
        let results = layout_batch(&panels, &LayoutOptions::default());
        assert!(matches!(
            results[0],
            Err(LayoutError::DegenerateCanvas { .. })
        ));
        assert_eq!(results[1].as_ref().unwrap().len(), 1);
    }
}
