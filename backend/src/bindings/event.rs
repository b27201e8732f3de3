//! Tagged control events.
//!
//! Every page request names the control that fired and carries its new
//! value, so handlers never have to guess which input triggered them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::charts::AxisScale;
use crate::models::Feature;

/// A point picked on a chart, as reported by the front end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Category or date on the x axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovertext: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customdata: Vec<String>,
}

impl ChartPoint {
    /// Point carrying only a country label in `customdata`.
    pub fn country(name: impl Into<String>) -> Self {
        Self {
            customdata: vec![name.into()],
            ..Default::default()
        }
    }

    /// Point carrying only hover text.
    pub fn hover(text: impl Into<String>) -> Self {
        Self {
            hovertext: Some(text.into()),
            ..Default::default()
        }
    }

    /// Country label of a genre-space point.
    pub fn country_label(&self) -> Option<&str> {
        self.customdata.first().map(String::as_str)
    }

    /// The x coordinate read as a date, accepting `YYYY-MM-DD` with an
    /// optional time suffix.
    pub fn x_date(&self) -> Option<NaiveDate> {
        let raw = self.x.as_ref()?.as_str()?;
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// New value of a selection-style control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum Selection {
    /// Multi-select of countries or playlist labels.
    Countries(Vec<String>),
    /// Single country dropdown.
    Country(String),
    XColumn(Feature),
    YColumn(Feature),
    XScale(AxisScale),
    YScale(AxisScale),
    Window(usize),
    ScalingFactor(u8),
}

/// One control change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ControlEvent {
    /// Page load: every output is computed.
    Initial,
    /// Date picker change. Single-date pickers set only `start`.
    DateChanged {
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
    SelectionChanged(Selection),
    /// Playlist submit button, with the text inputs read at click time.
    SubmitClicked {
        n_clicks: u32,
        label: String,
        playlist_id: String,
    },
    /// Warning modal close button.
    DismissClicked,
    ChartClicked(ChartPoint),
    /// Box selection on a chart; an empty point list means the selection was cleared.
    ChartSelected { points: Vec<ChartPoint> },
}

impl ControlEvent {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ControlEvent::Initial => "initial",
            ControlEvent::DateChanged { .. } => "date_changed",
            ControlEvent::SelectionChanged(_) => "selection_changed",
            ControlEvent::SubmitClicked { .. } => "submit_clicked",
            ControlEvent::DismissClicked => "dismiss_clicked",
            ControlEvent::ChartClicked(_) => "chart_clicked",
            ControlEvent::ChartSelected { .. } => "chart_selected",
        }
    }
}
