use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::Item;

/// Whether a species is native to the monitored waters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Native,
    Invasive,
}

impl Status {
    pub fn from_invasive(invasive: bool) -> Self {
        if invasive {
            Status::Invasive
        } else {
            Status::Native
        }
    }
}

/// A provider of weighted items for the packer.
///
/// `load` may report progress in percent (0..=100) through `progress`.
pub trait ItemSource {
    /// Human-readable description for logs and task listings.
    fn describe(&self) -> String;

    fn load(&self, progress: &mut dyn FnMut(f32)) -> Result<Vec<Item<Status>>>;
}

/// A fixed, in-memory item list.
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    items: Vec<Item<Status>>,
}

impl StaticSource {
    pub fn new(label: &str, items: Vec<Item<Status>>) -> Self {
        Self {
            label: label.to_string(),
            items,
        }
    }

    /// Species counts from the reference monitoring site.
    pub fn species_sample() -> Self {
        Self::new(
            "species sample",
            vec![
                Item::new("Pink salmon (Oncorhynchus gorbuscha)", 60.0, Status::Invasive),
                Item::new("Arctic charr (Salvelinus alpinus)", 10.0, Status::Native),
                Item::new("Atlantic salmon (Salmo salar)", 12.0, Status::Native),
                Item::new("Brown trout (Salmo trutta)", 7.0, Status::Native),
                Item::new("European flounder (Platichthys flesus)", 20.0, Status::Native),
            ],
        )
    }
}

impl ItemSource for StaticSource {
    fn describe(&self) -> String {
        format!("{} ({} items)", self.label, self.items.len())
    }

    fn load(&self, progress: &mut dyn FnMut(f32)) -> Result<Vec<Item<Status>>> {
        progress(100.0);
        Ok(self.items.clone())
    }
}

/// On-disk dataset format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Header row `name,weight,invasive`
    Csv,
    /// Array of `{"name", "weight", "invasive"}` objects
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            _ => bail!(
                "unsupported dataset extension '{}' for {} (expected .csv or .json)",
                ext,
                path.display()
            ),
        }
    }
}

/// One row of a dataset file.
#[derive(Debug, Clone, Deserialize)]
struct Record {
    name: String,
    weight: f64,
    #[serde(default)]
    invasive: bool,
}

impl From<Record> for Item<Status> {
    fn from(record: Record) -> Self {
        Item::new(&record.name, record.weight, Status::from_invasive(record.invasive))
    }
}

/// Items read from a CSV or JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    /// Format is chosen from the file extension.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self, progress: &mut dyn FnMut(f32)) -> Result<Vec<Item<Status>>> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open dataset {}", self.path.display()))?;
        let total = file.metadata().map(|m| m.len()).unwrap_or(0);
        // Buffer outside the counter so progress fires once per chunk, not per byte.
        let reader = BufReader::new(ProgressReader {
            inner: file,
            read: 0,
            total,
            progress,
        });

        let records: Vec<Record> = match self.format {
            FileFormat::Csv => csv::Reader::from_reader(reader)
                .deserialize()
                .collect::<std::result::Result<Vec<Record>, csv::Error>>()
                .with_context(|| format!("malformed CSV in {}", self.path.display()))?,
            FileFormat::Json => serde_json::from_reader(reader)
                .with_context(|| format!("malformed JSON in {}", self.path.display()))?,
        };

        tracing::debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records.into_iter().map(Item::from).collect())
    }
}

/// Reports the fraction of bytes consumed as it reads.
struct ProgressReader<'a, R> {
    inner: R,
    read: u64,
    total: u64,
    progress: &'a mut dyn FnMut(f32),
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if n == 0 || self.total == 0 {
            (self.progress)(100.0);
        } else {
            (self.progress)((self.read as f64 / self.total as f64 * 100.0).min(100.0) as f32);
        }
        Ok(n)
    }
}
