//! Read-only preview of the training dataset
//!
//! The dataset is a CSV file with a header row and a binary outcome column.
//! It is loaded once, kept in memory, and only ever read.

use cataract_core::{Error, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Rows shown by default in the preview table
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

pub const MAX_HISTOGRAM_BINS: usize = 100;

/// Type inferred for a column from its non-empty cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let mut integer = true;
        for cell in cells.filter(|c| !c.is_empty()) {
            seen = true;
            if cell.parse::<i64>().is_ok() {
                continue;
            }
            if cell.parse::<f64>().is_ok() {
                integer = false;
            } else {
                return Self::Text;
            }
        }
        match (seen, integer) {
            (false, _) => Self::Text,
            (true, true) => Self::Integer,
            (true, false) => Self::Float,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// An in-memory CSV table
#[derive(Debug)]
pub struct Dataset {
    source: PathBuf,
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<String>>,
    outcome: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nulls: usize,
    pub distinct: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub source: PathBuf,
    pub rows: usize,
    pub outcome_column: String,
    pub columns: Vec<ColumnSummary>,
    pub numeric_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    /// Row count per outcome value
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub feature: String,
    pub outcome_column: String,
    pub outcomes: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub bins: Vec<HistogramBin>,
}

impl Dataset {
    /// Read a CSV file; the outcome column must be present in the header
    pub fn load(path: impl AsRef<Path>, outcome_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::dataset(format!("cannot open {}: {}", path.display(), e)))?;
        let dataset = Self::from_reader(file, outcome_column, path)?;
        info!(
            "Loaded dataset {} ({} rows, {} columns)",
            path.display(),
            dataset.rows.len(),
            dataset.columns.len()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        outcome_column: &str,
        source: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| Error::dataset(format!("cannot read header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let outcome = columns
            .iter()
            .position(|c| c == outcome_column)
            .ok_or_else(|| {
                Error::dataset(format!("outcome column '{}' not in header", outcome_column))
            })?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| Error::dataset(format!("row {}: {}", index + 1, e)))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let types = (0..columns.len())
            .map(|i| ColumnType::infer(rows.iter().map(|row| row[i].as_str())))
            .collect();

        Ok(Self {
            source: source.into(),
            columns,
            types,
            rows,
            outcome,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn outcome_column(&self) -> &str {
        &self.columns[self.outcome]
    }

    /// Header plus the first `n` rows
    pub fn preview(&self, n: usize) -> DatasetPreview {
        DatasetPreview {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }

    /// Per-column type, empty-cell count and distinct-value count
    pub fn summary(&self) -> DatasetSummary {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cells = self.rows.iter().map(|row| row[i].as_str());
                let nulls = cells.clone().filter(|c| c.is_empty()).count();
                let distinct = cells
                    .filter(|c| !c.is_empty())
                    .collect::<BTreeSet<_>>()
                    .len();
                ColumnSummary {
                    name: name.clone(),
                    column_type: self.types[i],
                    nulls,
                    distinct,
                }
            })
            .collect();

        DatasetSummary {
            source: self.source.clone(),
            rows: self.rows.len(),
            outcome_column: self.outcome_column().to_string(),
            columns,
            numeric_columns: self.numeric_columns().into_iter().map(str::to_string).collect(),
        }
    }

    /// Columns whose inferred type is integer or float
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .zip(&self.types)
            .filter(|(_, t)| t.is_numeric())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Equal-width histogram of a numeric column split by outcome value
    pub fn histogram(&self, column: &str, bins: usize) -> Result<Histogram> {
        if !(1..=MAX_HISTOGRAM_BINS).contains(&bins) {
            return Err(Error::invalid_input(format!(
                "bins must be within 1..={}, got {}",
                MAX_HISTOGRAM_BINS, bins
            )));
        }

        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::invalid_input(format!("unknown column '{}'", column)))?;
        if !self.types[index].is_numeric() {
            return Err(Error::invalid_input(format!("column '{}' is not numeric", column)));
        }

        let samples: Vec<(f64, &str)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let value = row[index].parse::<f64>().ok()?;
                Some((value, row[self.outcome].as_str()))
            })
            .collect();

        let outcomes: BTreeSet<&str> = samples.iter().map(|(_, o)| *o).collect();
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (v, _)| {
                (lo.min(*v), hi.max(*v))
            });
        let (min, max) = if samples.is_empty() { (0.0, 0.0) } else { (min, max) };
        let width = (max - min) / bins as f64;

        let mut histogram_bins: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
                counts: outcomes.iter().map(|o| (o.to_string(), 0)).collect(),
            })
            .collect();

        for (value, outcome) in &samples {
            let bin = if width > 0.0 {
                (((value - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            if let Some(count) = histogram_bins[bin].counts.get_mut(*outcome) {
                *count += 1;
            }
        }

        Ok(Histogram {
            feature: column.to_string(),
            outcome_column: self.outcome_column().to_string(),
            outcomes: outcomes.into_iter().map(str::to_string).collect(),
            min,
            max,
            bins: histogram_bins,
        })
    }
}

/// Dataset loaded on first use and kept for the life of the process
///
/// Failed loads are not stored; a dataset added later is picked up on the
/// next request.
pub struct DatasetCache {
    path: PathBuf,
    outcome_column: String,
    slot: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, outcome_column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome_column: outcome_column.into(),
            slot: RwLock::new(None),
        }
    }

    /// The cached dataset, without reading the file
    pub fn cached(&self) -> Option<Arc<Dataset>> {
        self.slot.read().clone()
    }

    pub fn get_or_load(&self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.slot.read().as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let mut slot = self.slot.write();
        if let Some(dataset) = slot.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        match Dataset::load(&self.path, &self.outcome_column) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                *slot = Some(Arc::clone(&dataset));
                Ok(dataset)
            }
            Err(e) => {
                warn!("Dataset unavailable: {}", e);
                Err(e)
            }
        }
    }
}
