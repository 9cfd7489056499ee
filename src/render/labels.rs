use crate::layout::Placement;

/// When a tile is big enough to carry text, and how much of the name fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPolicy {
    /// Tile must be wider than this (canvas units)
    pub min_width: f64,
    /// Tile must be taller than this (canvas units)
    pub min_height: f64,
    /// Longer names are cut to this many characters plus "..."
    pub max_name_chars: usize,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            min_width: 80.0,
            min_height: 50.0,
            max_name_chars: 25,
        }
    }
}

/// Text lines for one tile: name, count and share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub count: String,
    pub percentage: String,
}

impl Label {
    pub fn lines(&self) -> [&str; 3] {
        [self.name.as_str(), self.count.as_str(), self.percentage.as_str()]
    }
}

impl LabelPolicy {
    pub fn fits<T>(&self, placement: &Placement<'_, T>) -> bool {
        placement.width > self.min_width && placement.height > self.min_height
    }

    /// The label for `placement`, or `None` when the tile is too small.
    pub fn label<T>(&self, placement: &Placement<'_, T>) -> Option<Label> {
        if !self.fits(placement) {
            return None;
        }
        Some(Label {
            name: truncate_name(&placement.item.name, self.max_name_chars),
            count: format!("Count: {}", placement.item.weight),
            percentage: format!("Percentage: {:.1}%", placement.percentage),
        })
    }
}

/// Cut `name` to `max_chars` characters, appending "..." when anything was cut.
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let truncated: String = name.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
