//! Sample tables: named columns, rows in capture order.
//!
//! Row order is the only time axis the renderer has, so loaders must preserve
//! it: CSV rows as written, sampler artifacts by capture time.

use anyhow::Context;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Name of the sampler's one-time artifact, never part of the time series.
pub const STATIC_FILE: &str = "static.json";

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Gaps are NaN.
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    columns: Vec<Column>,
    rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Num(f64),
    Text(String),
    Missing,
}

impl Cell {
    fn from_raw(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            Cell::Missing
        } else {
            s.parse::<f64>()
                .map(Cell::Num)
                .unwrap_or_else(|_| Cell::Text(s.to_string()))
        }
    }
}

/// Accumulates rows whose column sets may differ.
#[derive(Default)]
struct TableBuilder {
    names: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Vec<Cell>>,
    rows: usize,
}

impl TableBuilder {
    fn push_row<I: IntoIterator<Item = (String, Cell)>>(&mut self, row: I) {
        for (name, cell) in row {
            let idx = match self.index.get(&name) {
                Some(&i) => i,
                None => {
                    let i = self.names.len();
                    self.index.insert(name.clone(), i);
                    self.names.push(name);
                    self.cells.push(vec![Cell::Missing; self.rows]);
                    i
                }
            };
            let col = &mut self.cells[idx];
            col.resize(self.rows, Cell::Missing);
            col.push(cell);
        }
        self.rows += 1;
    }

    fn finish(self) -> SampleTable {
        let rows = self.rows;
        let columns = self
            .names
            .into_iter()
            .zip(self.cells)
            .map(|(name, mut cells)| {
                cells.resize(rows, Cell::Missing);
                let is_text = cells.iter().any(|c| matches!(c, Cell::Text(_)));
                let data = if is_text {
                    ColumnData::Text(
                        cells
                            .into_iter()
                            .map(|c| match c {
                                Cell::Num(v) => v.to_string(),
                                Cell::Text(s) => s,
                                Cell::Missing => String::new(),
                            })
                            .collect(),
                    )
                } else {
                    ColumnData::Numeric(
                        cells
                            .into_iter()
                            .map(|c| match c {
                                Cell::Num(v) => v,
                                _ => f64::NAN,
                            })
                            .collect(),
                    )
                };
                Column { name, data }
            })
            .collect();
        SampleTable { columns, rows }
    }
}

impl SampleTable {
    pub fn new(columns: Vec<Column>) -> Self {
        let rows = columns
            .iter()
            .map(|c| match &c.data {
                ColumnData::Numeric(v) => v.len(),
                ColumnData::Text(v) => v.len(),
            })
            .max()
            .unwrap_or(0);
        Self { columns, rows }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a numeric column; `None` if absent or textual.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| matches!(c.data, ColumnData::Numeric(_)))
            .map(|c| c.name.as_str())
    }

    /// The synthetic 0-based tick index used as the X axis.
    pub fn time_steps(&self) -> impl Iterator<Item = f64> {
        (0..self.rows).map(|i| i as f64)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut b = TableBuilder::default();
        // declare every header so empty tables still know their columns
        for h in &headers {
            if !b.index.contains_key(h) {
                b.index.insert(h.clone(), b.names.len());
                b.names.push(h.clone());
                b.cells.push(Vec::new());
            }
        }
        for rec in rdr.records() {
            let rec = rec?;
            b.push_row(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), Cell::from_raw(rec.get(i).unwrap_or("")))),
            );
        }
        Ok(b.finish())
    }

    pub fn from_csv_path(path: &Path) -> anyhow::Result<Self> {
        let f = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_csv_reader(f).with_context(|| format!("reading {}", path.display()))
    }

    /// Load a sampler output directory: every tick artifact except the static
    /// one, ordered by capture time. Top-level scalars become columns; nested
    /// values (the process list) are not plottable and are left out.
    pub fn from_sampler_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut ticks: Vec<(u64, String, serde_json::Map<String, Value>)> = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let path = entry?.path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !name.ends_with(".json") || name == STATIC_FILE {
                continue;
            }
            let raw = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            match serde_json::from_slice::<Value>(&raw) {
                Ok(Value::Object(map)) => {
                    let ts = map.get("currentTime").and_then(Value::as_u64).unwrap_or(0);
                    ticks.push((ts, name, map));
                }
                Ok(_) | Err(_) => {
                    tracing::warn!("skipping {}: not a sample record", path.display())
                }
            }
        }
        ticks.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut b = TableBuilder::default();
        for (_, _, map) in ticks {
            b.push_row(map.into_iter().filter_map(|(k, v)| {
                let cell = match v {
                    Value::Number(n) => Cell::Num(n.as_f64()?),
                    Value::String(s) => Cell::Text(s),
                    Value::Bool(_) | Value::Null => Cell::Missing,
                    Value::Array(_) | Value::Object(_) => return None,
                };
                Some((k, cell))
            }));
        }
        Ok(b.finish())
    }

    /// Directory -> sampler artifacts, anything else -> CSV.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.is_dir() {
            Self::from_sampler_dir(path)
        } else {
            Self::from_csv_path(path)
        }
    }
}
