//! Declarative figure model.
//!
//! Figures serialize to the JSON shape plotly.js consumes (`{data, layout}`),
//! so the front end can render them without further mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Linear or logarithmic axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    /// Axis `type` value understood by plotly.
    pub fn as_plotly(&self) -> &'static str {
        match self {
            AxisScale::Linear => "linear",
            AxisScale::Log => "log",
        }
    }
}

impl fmt::Display for AxisScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisScale::Linear => f.write_str("Linear"),
            AxisScale::Log => f.write_str("Log"),
        }
    }
}

impl FromStr for AxisScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(AxisScale::Linear),
            "log" => Ok(AxisScale::Log),
            _ => Err(format!("Unknown axis scale '{}'", s)),
        }
    }
}

/// Axis coordinate: numeric or categorical/date text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Text(String),
}

impl From<f64> for AxisValue {
    fn from(v: f64) -> Self {
        AxisValue::Number(v)
    }
}

impl From<String> for AxisValue {
    fn from(v: String) -> Self {
        AxisValue::Text(v)
    }
}

impl From<&str> for AxisValue {
    fn from(v: &str) -> Self {
        AxisValue::Text(v.to_string())
    }
}

/// Marker color: one color for the trace, or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<MarkerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// Cartesian scatter or line series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScatterTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mode: String,
    pub x: Vec<AxisValue>,
    /// `null` marks an undefined point.
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hovertext: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub customdata: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendgroup: Option<String>,
}

impl ScatterTrace {
    pub fn markers() -> Self {
        Self {
            mode: "markers".to_string(),
            ..Default::default()
        }
    }

    pub fn lines() -> Self {
        Self {
            mode: "lines".to_string(),
            ..Default::default()
        }
    }

    /// Number of points in the series.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorBar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

/// Geographic areas colored by a continuous value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChoroplethTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    pub z: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hovertext: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub customdata: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
}

/// Text or markers placed at geographic locations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScattergeoTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    pub mode: String,
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textfont: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Choropleth(ChoroplethTrace),
    Scattergeo(ScattergeoTrace),
}

impl Trace {
    /// Number of data points carried by the trace.
    pub fn len(&self) -> usize {
        match self {
            Trace::Scatter(t) => t.len(),
            Trace::Choropleth(t) => t.locations.len(),
            Trace::Scattergeo(t) => t.locations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl Margin {
    pub fn new(l: f64, r: f64, t: f64, b: f64) -> Self {
        Self { l, r, t, b }
    }
}

/// Text placed on the figure, positioned in data or paper coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textangle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
}

impl Annotation {
    /// Annotation in paper coordinates with no arrow.
    pub fn paper(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            showarrow: false,
            ..Default::default()
        }
    }

    pub fn anchored(mut self, xanchor: &str, yanchor: &str) -> Self {
        self.xanchor = Some(xanchor.to_string());
        self.yanchor = Some(yanchor.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showframe: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub projection_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub annotations: Vec<Annotation>,
    /// Cartesian axes keyed `xaxis`, `yaxis`, `xaxis2`, ...
    #[serde(flatten)]
    pub axes: BTreeMap<String, Axis>,
}

impl Layout {
    pub fn axis_mut(&mut self, key: &str) -> &mut Axis {
        self.axes.entry(key.to_string()).or_default()
    }

    pub fn axis(&self, key: &str) -> Option<&Axis> {
        self.axes.get(key)
    }
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn push(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// Total data points across all traces.
    pub fn point_count(&self) -> usize {
        self.data.iter().map(Trace::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Axis key pair for facet `index` (0-based): `("xaxis", "x")`, `("xaxis2", "x2")`, ...
pub fn facet_axis_names(index: usize) -> (String, String, String, String) {
    let suffix = if index == 0 {
        String::new()
    } else {
        (index + 1).to_string()
    };
    (
        format!("xaxis{}", suffix),
        format!("x{}", suffix),
        format!("yaxis{}", suffix),
        format!("y{}", suffix),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_is_tagged_by_type() {
        let mut trace = ScatterTrace::lines();
        trace.x = vec!["2023-10-01".into(), 2.0.into()];
        trace.y = vec![Some(1.0), None];
        let value = serde_json::to_value(Trace::Scatter(trace)).unwrap();
        assert_eq!(
            value,
            json!({"type": "scatter", "mode": "lines", "x": ["2023-10-01", 2.0], "y": [1.0, null]})
        );
    }

    #[test]
    fn test_layout_flattens_axes() {
        let mut layout = Layout::default();
        layout.axis_mut("xaxis2").range = Some([-100.0, 1550.0]);
        layout.axis_mut("yaxis").axis_type = Some("log".to_string());
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["xaxis2"]["range"], json!([-100.0, 1550.0]));
        assert_eq!(value["yaxis"]["type"], json!("log"));
        assert!(value.get("annotations").is_none());
    }

    #[test]
    fn test_facet_axis_names() {
        assert_eq!(facet_axis_names(0).1, "x");
        assert_eq!(facet_axis_names(2).0, "xaxis3");
        assert_eq!(facet_axis_names(2).3, "y3");
    }

    #[test]
    fn test_axis_scale_parsing() {
        assert_eq!("Log".parse::<AxisScale>().unwrap(), AxisScale::Log);
        assert_eq!("linear".parse::<AxisScale>().unwrap().as_plotly(), "linear");
        assert!("cubic".parse::<AxisScale>().is_err());
    }
}
