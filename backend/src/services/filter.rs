//! Row selection by date range and country, with optional dedupe and projection.
//!
//! Every page narrows the dataset snapshot through [`filter_rows`] before
//! aggregating. Filtering never mutates its input: it returns borrowed rows
//! in their original order.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{ChartRow, Feature};

/// Inclusive date interval. A range whose start is after its end matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering exactly one day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Country-membership predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountrySelector {
    /// Single country-name equality.
    One(String),
    /// Membership in an ordered set of country names.
    Many(Vec<String>),
    /// No country predicate. Undated rows never match, since they are only
    /// reachable through an explicit selection.
    All,
}

impl CountrySelector {
    pub fn one(name: impl Into<String>) -> Self {
        Self::One(name.into())
    }

    pub fn many<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(names.into_iter().map(Into::into).collect())
    }

    /// Whether the row's country is in the selection.
    pub fn selects(&self, country_name: &str) -> bool {
        match self {
            Self::One(name) => name == country_name,
            Self::Many(names) => names.iter().any(|n| n == country_name),
            Self::All => false,
        }
    }

    fn accepts(&self, country_name: &str) -> bool {
        matches!(self, Self::All) || self.selects(country_name)
    }
}

/// Column used to keep only the first occurrence of each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeKey {
    TrackId,
    TrackName,
}

impl DedupeKey {
    fn key<'a>(&self, row: &'a ChartRow) -> &'a str {
        match self {
            Self::TrackId => &row.track_id,
            Self::TrackName => &row.track_name,
        }
    }
}

/// A projectable chart-row column, named as in the chart-history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TrackId,
    TrackName,
    Artists,
    DailyRank,
    DailyMovement,
    Country,
    SnapshotDate,
    AlbumReleaseDate,
    CountryName,
    CountryRegion,
    Genres,
    Audio(Feature),
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackId => "spotify_id",
            Self::TrackName => "track_name",
            Self::Artists => "artists",
            Self::DailyRank => "daily_rank",
            Self::DailyMovement => "daily_movement",
            Self::Country => "country",
            Self::SnapshotDate => "snapshot_date",
            Self::AlbumReleaseDate => "album_release_date",
            Self::CountryName => "country_name",
            Self::CountryRegion => "country_region",
            Self::Genres => "genres",
            Self::Audio(feature) => feature.as_str(),
        }
    }

    /// Value of this column for a row; absent values are `null`.
    pub fn value(&self, row: &ChartRow) -> Value {
        match self {
            Self::TrackId => Value::from(row.track_id.as_str()),
            Self::TrackName => Value::from(row.track_name.as_str()),
            Self::Artists => Value::from(row.artists_joined()),
            Self::DailyRank => row.daily_rank.map(Value::from).unwrap_or(Value::Null),
            Self::DailyMovement => row.daily_movement.map(Value::from).unwrap_or(Value::Null),
            Self::Country => Value::from(row.country.as_str()),
            Self::SnapshotDate => row
                .snapshot_date
                .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
                .unwrap_or_else(|| Value::from("")),
            Self::AlbumReleaseDate => Value::from(row.album_release_date.as_str()),
            Self::CountryName => Value::from(row.country_name.as_str()),
            Self::CountryRegion => Value::from(row.country_region.as_str()),
            Self::Genres => Value::from(row.genres.as_str()),
            Self::Audio(feature) => row
                .audio
                .map(|a| Value::from(a.get(*feature)))
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s {
            "spotify_id" => Self::TrackId,
            "track_name" => Self::TrackName,
            "artists" => Self::Artists,
            "daily_rank" => Self::DailyRank,
            "daily_movement" => Self::DailyMovement,
            "country" => Self::Country,
            "snapshot_date" => Self::SnapshotDate,
            "album_release_date" => Self::AlbumReleaseDate,
            "country_name" => Self::CountryName,
            "country_region" => Self::CountryRegion,
            "genres" => Self::Genres,
            other => Self::Audio(other.parse().map_err(|_| format!("Unknown column '{}'", other))?),
        };
        Ok(column)
    }
}

/// One projected table row. Serializes as a JSON object whose keys follow
/// the projection order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    cells: Vec<(Column, Value)>,
}

impl TableRecord {
    pub fn project(row: &ChartRow, columns: &[Column]) -> Self {
        Self {
            cells: columns.iter().map(|c| (*c, c.value(row))).collect(),
        }
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    /// Replace one cell's value in place.
    pub fn set(&mut self, column: Column, value: Value) {
        if let Some(cell) = self.cells.iter_mut().find(|(c, _)| *c == column) {
            cell.1 = value;
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.cells.iter().map(|(c, _)| *c)
    }
}

impl Serialize for TableRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

/// Parameters for [`filter_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// `None` applies no date predicate to dated rows.
    pub range: Option<DateRange>,
    pub selector: CountrySelector,
    pub dedupe: Option<DedupeKey>,
    pub columns: Option<Vec<Column>>,
}

impl FilterParams {
    pub fn new(range: Option<DateRange>, selector: CountrySelector) -> Self {
        Self {
            range,
            selector,
            dedupe: None,
            columns: None,
        }
    }

    pub fn dedupe(mut self, key: DedupeKey) -> Self {
        self.dedupe = Some(key);
        self
    }

    pub fn columns(mut self, columns: &[Column]) -> Self {
        self.columns = Some(columns.to_vec());
        self
    }

    /// Row predicate: dated rows must fall in the range and pass the country
    /// predicate; undated rows pass only when their label is selected.
    pub fn matches(&self, row: &ChartRow) -> bool {
        match row.snapshot_date {
            Some(date) => {
                self.range.map_or(true, |r| r.contains(date))
                    && self.selector.accepts(&row.country_name)
            }
            None => self.selector.selects(&row.country_name),
        }
    }
}

/// Filtered rows plus the optional projection to apply when tabulating them.
#[derive(Debug, Clone)]
pub struct RowSet<'a> {
    rows: Vec<&'a ChartRow>,
    columns: Option<Vec<Column>>,
}

impl<'a> RowSet<'a> {
    pub fn rows(&self) -> &[&'a ChartRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ChartRow> + Clone + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep the first row per key, preserving order.
    pub fn dedupe(mut self, key: DedupeKey) -> Self {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(key.key(*row)));
        self
    }

    /// Keep rows matching a predicate.
    pub fn retain<F>(mut self, f: F) -> Self
    where
        F: FnMut(&&'a ChartRow) -> bool,
    {
        self.rows.retain(f);
        self
    }

    /// Tabulate the rows with the projection, or all plain columns when none was given.
    pub fn records(&self) -> Vec<TableRecord> {
        let columns: &[Column] = self.columns.as_deref().unwrap_or(&ALL_COLUMNS);
        self.rows
            .iter()
            .map(|row| TableRecord::project(row, columns))
            .collect()
    }
}

const ALL_COLUMNS: [Column; 11] = [
    Column::TrackId,
    Column::TrackName,
    Column::Artists,
    Column::DailyRank,
    Column::DailyMovement,
    Column::Country,
    Column::SnapshotDate,
    Column::AlbumReleaseDate,
    Column::CountryName,
    Column::CountryRegion,
    Column::Genres,
];

/// Select rows from `rows` according to `params`.
pub fn filter_rows<'a, I>(rows: I, params: &FilterParams) -> RowSet<'a>
where
    I: IntoIterator<Item = &'a ChartRow>,
{
    let set = RowSet {
        rows: rows.into_iter().filter(|row| params.matches(row)).collect(),
        columns: params.columns.clone(),
    };
    match params.dedupe {
        Some(key) => set.dedupe(key),
        None => set,
    }
}
