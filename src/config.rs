use std::path::Path;

use anyhow::{Context, Result};

use crate::layout::{InvalidWeightPolicy, LayoutOptions};
use crate::source::{FileSource, ItemSource, StaticSource};

/// Command-line values that take precedence over an options file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub skip_invalid: bool,
    pub min_width_fraction: Option<f64>,
    pub min_height_fraction: Option<f64>,
}

/// Layout options from `path` (JSON, missing fields defaulted), then `overrides`.
pub fn load_options(path: Option<&Path>, overrides: &Overrides) -> Result<LayoutOptions> {
    let mut options = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read options file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => LayoutOptions::default(),
    };

    if overrides.skip_invalid {
        options.on_invalid_weight = InvalidWeightPolicy::Skip;
    }
    if let Some(f) = overrides.min_width_fraction {
        options.min_width_fraction = f;
    }
    if let Some(f) = overrides.min_height_fraction {
        options.min_height_fraction = f;
    }

    options.validate()?;
    tracing::debug!("Layout options: {:?}", options);
    Ok(options)
}

/// The dataset at `input`, or the built-in species sample.
pub fn open_source(input: Option<&Path>) -> Result<Box<dyn ItemSource + Send>> {
    match input {
        Some(path) => Ok(Box::new(FileSource::open(path)?)),
        None => {
            tracing::info!("No input given, using the built-in species sample");
            Ok(Box::new(StaticSource::species_sample()))
        }
    }
}
