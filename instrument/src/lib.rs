//! Event ledger for settlement simulation runs.
//!
//! A `tracing` subscriber that files every INFO/WARN event into a table keyed
//! by the event target (`claim`, `release`, `vote`, `diagnostic`, ...). Columns
//! are created on first sight of a field, so the schema of each table is
//! whatever the simulation emits.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "claim", settlement = id.0, x = pos.x, y = pos.y);
//!
//! // In a test:
//! let (_, recorder) = instrument::record(|| game.place_settlement(id));
//! assert_eq!(recorder.row_count("claim"), 9);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

/// A column of typed values.
#[derive(Debug, Clone)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        match self {
            TypedColumn::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::F64(v) => v.extend(std::iter::repeat_n(0.0, missing)),
            TypedColumn::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            TypedColumn::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

/// One scalar value taken from an event field.
#[derive(Debug, Clone)]
enum Cell {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl Cell {
    fn empty_column(&self, rows: usize) -> TypedColumn {
        match self {
            Cell::U64(_) => TypedColumn::U64(vec![0; rows]),
            Cell::I64(_) => TypedColumn::I64(vec![0; rows]),
            Cell::F64(_) => TypedColumn::F64(vec![0.0; rows]),
            Cell::Bool(_) => TypedColumn::Bool(vec![false; rows]),
            Cell::Str(_) => TypedColumn::Str(vec![String::new(); rows]),
        }
    }
}

/// A table with dynamically-typed columns.
#[derive(Debug, Clone, Default)]
pub struct DynamicTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl DynamicTable {
    /// Append one cell to the row currently being written.
    ///
    /// A field that changes type between events keeps its first type; the
    /// mismatching value is dropped and the slot padded.
    fn push(&mut self, name: &str, cell: Cell) {
        let rows = self.row_count;
        let column = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| cell.empty_column(rows));
        match (column, cell) {
            (TypedColumn::U64(v), Cell::U64(x)) => v.push(x),
            (TypedColumn::I64(v), Cell::I64(x)) => v.push(x),
            (TypedColumn::I64(v), Cell::U64(x)) => v.push(x as i64),
            (TypedColumn::F64(v), Cell::F64(x)) => v.push(x),
            (TypedColumn::Bool(v), Cell::Bool(x)) => v.push(x),
            (TypedColumn::Str(v), Cell::Str(x)) => v.push(x),
            _ => {}
        }
    }

    /// Close the current row, padding any column that got no value.
    fn finish_row(&mut self) {
        self.row_count += 1;
        for column in self.columns.values_mut() {
            column.pad_to(self.row_count);
        }
    }

    pub fn u64_column(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name) {
            Some(TypedColumn::U64(v)) => Some(v),
            _ => None,
        }
    }

    pub fn i64_column(&self, name: &str) -> Option<&[i64]> {
        match self.columns.get(name) {
            Some(TypedColumn::I64(v)) => Some(v),
            _ => None,
        }
    }

    pub fn str_column(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name) {
            Some(TypedColumn::Str(v)) => Some(v),
            _ => None,
        }
    }
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, DynamicTable>,
}

impl Recorder {
    /// Number of events recorded under `target` (0 if none).
    pub fn row_count(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, |t| t.row_count)
    }

    pub fn table(&self, target: &str) -> Option<&DynamicTable> {
        self.tables.get(target)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

struct RowVisitor<'a> {
    table: &'a mut DynamicTable,
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.table.push(field.name(), Cell::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.table.push(field.name(), Cell::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.table.push(field.name(), Cell::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.table.push(field.name(), Cell::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.table.push(field.name(), Cell::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.table.push(field.name(), Cell::Str(format!("{value:?}")));
    }
}

/// Subscriber that files INFO and WARN events into per-target tables.
///
/// Spans are ignored; the simulation only emits flat events.
pub struct EventSubscriber;

impl Subscriber for EventSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let metadata = event.metadata();
        let target = metadata.target().to_string();

        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();
            table.push("level", Cell::Str(metadata.level().to_string()));
            event.record(&mut RowVisitor { table: &mut *table });
            table.finish_row();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the EventSubscriber as the global default.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(EventSubscriber);
}

/// Drain all recorded data from the thread-local recorder.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Clear all recorded data without returning it.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with the EventSubscriber scoped to this thread and return what it
/// recorded. Anything recorded earlier on this thread is discarded.
pub fn record<R>(f: impl FnOnce() -> R) -> (R, Recorder) {
    clear();
    let out = tracing::subscriber::with_default(EventSubscriber, f);
    (out, drain())
}

// === Polars Integration ===

use polars::prelude::*;

impl DynamicTable {
    /// Convert this table to a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&String> = self.columns.keys().collect();
        names.sort();
        let columns = names
            .into_iter()
            .map(|name| match &self.columns[name] {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Convert all tables to polars DataFrames.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}
