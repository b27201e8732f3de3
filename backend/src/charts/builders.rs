//! Figure builders for each page's charts.
//!
//! Builders are pure and deterministic: identical rows and parameters give
//! identical figures. Empty input yields a figure with no traces.

use crate::models::{BoundaryCurve, Feature, GenreSpace};
use crate::services::{ArtistShare, CountryFeatureMean, GenreCount, SeriesPoint, TrackRankSeries};

use super::figure::{
    facet_axis_names, Annotation, Axis, AxisScale, AxisValue, ChoroplethTrace, ColorBar, Figure, Font,
    Geo, Layout, Legend, Line, Margin, Marker, MarkerColor, Projection, ScatterTrace, ScattergeoTrace,
    Title, Trace,
};

/// Fixed genre-space axis ranges.
pub const GENRE_X_RANGE: [f64; 2] = [-100.0, 1550.0];
pub const GENRE_Y_RANGE: [f64; 2] = [-1000.0, 23500.0];

/// Largest marker size at scaling factor 1.
pub const BASE_SIZE_MAX: f64 = 20.0;

/// Facets per row in the genre-space grid.
pub const FACET_WRAP: usize = 3;

/// Horizontal gap between facets, in paper fraction.
const FACET_SPACING: f64 = 0.03;

pub const GENRE_X_LABEL: &str = "← denser and atmospheric | spikier and bouncier →";
pub const GENRE_Y_LABEL: &str = "← organic | mechanical and electric →";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Choropleth of each country's top-artist share, with artist names
/// overlaid as text.
pub fn world_map(shares: &[ArtistShare]) -> Figure {
    let mut fig = Figure::new(Layout {
        template: Some("plotly_dark".to_string()),
        margin: Some(Margin::new(0.0, 0.0, 0.0, 0.0)),
        geo: Some(Geo {
            projection: Some(Projection {
                projection_type: "equirectangular".to_string(),
            }),
            showframe: Some(false),
        }),
        legend: Some(Legend {
            title: Some(Title::new("Appearance percentage:")),
            ..Default::default()
        }),
        ..Default::default()
    });

    if shares.is_empty() {
        return fig;
    }

    let locations: Vec<String> = shares.iter().map(|s| s.country.clone()).collect();
    let artists: Vec<String> = shares.iter().map(|s| s.artist.clone()).collect();

    fig.push(Trace::Choropleth(ChoroplethTrace {
        locations: locations.clone(),
        locationmode: "ISO-3".to_string(),
        z: shares.iter().map(|s| s.percentage).collect(),
        hovertext: artists.clone(),
        customdata: shares.iter().map(|s| vec![s.country_name.clone()]).collect(),
        hovertemplate: Some(
            "<b>%{hovertext}</b><br>Country Name=%{customdata[0]}<br>Appearance Percentage=%{z:.3r}<extra></extra>"
                .to_string(),
        ),
        colorbar: Some(ColorBar {
            title: Some(Title::new("Appearance Percentage")),
        }),
    }));
    fig.push(Trace::Scattergeo(ScattergeoTrace {
        locations,
        locationmode: "ISO-3".to_string(),
        mode: "text".to_string(),
        text: artists,
        textfont: Some(Font {
            color: Some("White".to_string()),
            size: None,
        }),
        hoverinfo: Some("none".to_string()),
        showlegend: Some(false),
    }));
    fig
}

/// Mean feature scatter, one trace per region in order of first appearance.
pub fn feature_scatter(
    means: &[CountryFeatureMean],
    x: Feature,
    y: Feature,
    x_scale: AxisScale,
    y_scale: AxisScale,
) -> Figure {
    let mut layout = Layout {
        margin: Some(Margin::new(40.0, 0.0, 10.0, 40.0)),
        hovermode: Some("closest".to_string()),
        legend: Some(Legend {
            title: Some(Title::new("Country Region")),
            ..Default::default()
        }),
        ..Default::default()
    };
    *layout.axis_mut("xaxis") = Axis {
        title: Some(Title::new(x.as_str())),
        axis_type: Some(x_scale.as_plotly().to_string()),
        ..Default::default()
    };
    *layout.axis_mut("yaxis") = Axis {
        title: Some(Title::new(y.as_str())),
        axis_type: Some(y_scale.as_plotly().to_string()),
        ..Default::default()
    };
    let mut fig = Figure::new(layout);

    let mut regions: Vec<&str> = Vec::new();
    for m in means {
        if !regions.contains(&m.country_region.as_str()) {
            regions.push(&m.country_region);
        }
    }

    let template = format!(
        "<b>%{{hovertext}}</b><br>{}=%{{x:.3r}}<br>{}=%{{y:.3r}}<extra></extra>",
        x, y
    );
    for region in regions {
        let mut trace = ScatterTrace::markers();
        trace.name = Some(region.to_string());
        trace.legendgroup = Some(region.to_string());
        trace.hovertemplate = Some(template.clone());
        for m in means.iter().filter(|m| m.country_region == region) {
            trace.x.push(AxisValue::Number(m.features.get(x)));
            trace.y.push(Some(m.features.get(y)));
            trace.hovertext.push(m.country_name.clone());
        }
        fig.push(Trace::Scatter(trace));
    }
    fig
}

/// Single-country time series with the country and feature as a leading label.
pub fn feature_time_series(
    series: &[SeriesPoint],
    country: &str,
    feature: Feature,
    scale: AxisScale,
) -> Figure {
    let mut layout = Layout {
        height: Some(225.0),
        margin: Some(Margin::new(20.0, 10.0, 10.0, 30.0)),
        annotations: vec![Annotation {
            align: Some("left".to_string()),
            ..Annotation::paper(format!("<b>{}</b><br>{}", country, feature), 0.0, 0.85)
                .anchored("left", "bottom")
        }],
        ..Default::default()
    };
    layout.axis_mut("xaxis").showgrid = Some(false);
    *layout.axis_mut("yaxis") = Axis {
        title: Some(Title::new(feature.as_str())),
        axis_type: Some(scale.as_plotly().to_string()),
        ..Default::default()
    };
    let mut fig = Figure::new(layout);

    if series.is_empty() {
        return fig;
    }

    let mut trace = ScatterTrace::lines();
    trace.hovertemplate = Some(format!("snapshot_date=%{{x}}<br>{}=%{{y:.3r}}<extra></extra>", feature));
    for point in series {
        trace.x.push(AxisValue::Text(point.date.format(DATE_FORMAT).to_string()));
        trace.y.push(point.value);
    }
    fig.push(Trace::Scatter(trace));
    fig
}

/// Domain of facet `index` out of `count` facets laid out in one row.
fn facet_domain(index: usize, count: usize) -> [f64; 2] {
    let count = count.max(1) as f64;
    let width = (1.0 - FACET_SPACING * (count - 1.0)) / count;
    let start = index as f64 * (width + FACET_SPACING);
    [start, (start + width).min(1.0)]
}

fn boundary_trace(boundary: &BoundaryCurve, xaxis: &str, yaxis: &str) -> ScatterTrace {
    let mut trace = ScatterTrace::lines();
    trace.x = boundary.x.iter().map(|v| AxisValue::Number(*v)).collect();
    trace.y = boundary.y.iter().map(|v| Some(*v)).collect();
    trace.line = Some(Line {
        color: Some("black".to_string()),
        width: Some(0.5),
    });
    trace.showlegend = Some(false);
    trace.hovertemplate = Some("<extra></extra>".to_string());
    trace.xaxis = Some(xaxis.to_string());
    trace.yaxis = Some(yaxis.to_string());
    trace
}

fn genre_axis_labels() -> Vec<Annotation> {
    vec![
        Annotation {
            xanchor: Some("center".to_string()),
            ..Annotation::paper(GENRE_X_LABEL, 0.5, -0.1)
        },
        Annotation {
            xanchor: Some("center".to_string()),
            yanchor: Some("middle".to_string()),
            textangle: Some(270.0),
            ..Annotation::paper(GENRE_Y_LABEL, -0.03, 0.5)
        },
    ]
}

/// Faceted genre-space scatter, one facet per country or playlist (first
/// [`FACET_WRAP`] only), marker area proportional to song count.
///
/// `scaling_factor` multiplies [`BASE_SIZE_MAX`]; callers validate it.
pub fn genre_facets(
    counts: &[GenreCount],
    countries: &[String],
    boundary: &BoundaryCurve,
    scaling_factor: u8,
) -> Figure {
    let facets: Vec<&String> = countries.iter().take(FACET_WRAP).collect();

    let mut layout = Layout {
        title: Some(Title::new(format!("Genre-space in {}", countries.join(", ")))),
        annotations: genre_axis_labels(),
        ..Default::default()
    };

    for (i, country) in facets.iter().enumerate() {
        let (xkey, xref, ykey, yref) = facet_axis_names(i);
        let domain = facet_domain(i, facets.len());
        *layout.axis_mut(&xkey) = Axis {
            title: Some(Title::new("")),
            range: Some(GENRE_X_RANGE),
            domain: Some(domain),
            anchor: Some(yref.clone()),
            matches: (i > 0).then(|| "x".to_string()),
            ..Default::default()
        };
        *layout.axis_mut(&ykey) = Axis {
            title: Some(Title::new("")),
            range: Some(GENRE_Y_RANGE),
            anchor: Some(xref.clone()),
            matches: (i > 0).then(|| "y".to_string()),
            showticklabels: Some(i == 0),
            ..Default::default()
        };
        layout.annotations.push(
            Annotation::paper(country.as_str(), (domain[0] + domain[1]) / 2.0, 1.0)
                .anchored("center", "bottom"),
        );
    }

    let mut fig = Figure::new(layout);
    if counts.is_empty() {
        return fig;
    }

    let size_max = BASE_SIZE_MAX * f64::from(scaling_factor);
    let max_count = counts.iter().map(|c| c.song_count).max().unwrap_or(1).max(1) as f64;
    let sizeref = 2.0 * max_count / (size_max * size_max);

    for (i, country) in facets.iter().enumerate() {
        let (_, xref, _, yref) = facet_axis_names(i);
        let rows: Vec<&GenreCount> = counts.iter().filter(|c| c.country == **country).collect();

        let mut trace = ScatterTrace::markers();
        trace.name = Some(country.to_string());
        trace.xaxis = Some(xref.clone());
        trace.yaxis = Some(yref.clone());
        trace.showlegend = Some(false);
        trace.hovertemplate = Some(
            "<b>%{hovertext}</b><br>x=%{x}<br>y=%{y}<br>Number of Songs=%{marker.size}<extra></extra>"
                .to_string(),
        );
        trace.x = rows.iter().map(|c| AxisValue::Number(c.x)).collect();
        trace.y = rows.iter().map(|c| Some(c.y)).collect();
        trace.hovertext = rows.iter().map(|c| c.genre.clone()).collect();
        trace.customdata = rows.iter().map(|c| vec![c.country.clone()]).collect();
        trace.marker = Some(Marker {
            color: Some(MarkerColor::PerPoint(rows.iter().map(|c| c.color.clone()).collect())),
            size: Some(rows.iter().map(|c| c.song_count as f64).collect()),
            sizemode: Some("area".to_string()),
            sizeref: Some(sizeref),
            opacity: Some(0.8),
        });
        fig.push(Trace::Scatter(trace));
        if !boundary.is_empty() {
            fig.push(Trace::Scatter(boundary_trace(boundary, &xref, &yref)));
        }
    }
    fig
}

/// Daily rank lines for the top tracks, best rank at the top.
pub fn ranking_lines(series: &[TrackRankSeries], country: &str) -> Figure {
    let mut layout = Layout {
        title: Some(Title::new(format!(
            "Daily Ranking of the Top 10 Songs on Spotify's {} Top 50 Chart",
            country
        ))),
        legend: Some(Legend {
            orientation: Some("h".to_string()),
            x: Some(1.0),
            y: Some(-0.5),
            xanchor: Some("right".to_string()),
            yanchor: Some("bottom".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    layout.axis_mut("xaxis").title = Some(Title::new("Date"));
    *layout.axis_mut("yaxis") = Axis {
        title: Some(Title::new("Daily Rank")),
        range: Some([50.0, 1.0]),
        ..Default::default()
    };
    let mut fig = Figure::new(layout);

    for track in series {
        let mut trace = ScatterTrace::lines();
        trace.name = Some(track.track_name.clone());
        trace.legendgroup = Some(track.track_name.clone());
        trace.hovertemplate = Some(format!(
            "track_name={}<br>Date=%{{x}}<br>Daily Rank=%{{y}}<br>Mean Rank={:.2}<extra></extra>",
            track.track_name, track.mean_rank
        ));
        for point in &track.points {
            trace.x.push(AxisValue::Text(point.date.format(DATE_FORMAT).to_string()));
            trace.y.push(Some(f64::from(point.daily_rank)));
        }
        fig.push(Trace::Scatter(trace));
    }
    fig
}

/// Every genre in the reference layout with the boundary, for the home page.
pub fn genre_overview(space: &GenreSpace) -> Figure {
    let mut layout = Layout {
        title: Some(Title::new("Genre-space")),
        annotations: genre_axis_labels(),
        ..Default::default()
    };
    *layout.axis_mut("xaxis") = Axis {
        title: Some(Title::new("")),
        range: Some(GENRE_X_RANGE),
        ..Default::default()
    };
    *layout.axis_mut("yaxis") = Axis {
        title: Some(Title::new("")),
        range: Some(GENRE_Y_RANGE),
        ..Default::default()
    };
    let mut fig = Figure::new(layout);

    if space.is_empty() {
        return fig;
    }

    let points = space.points();
    let mut trace = ScatterTrace::markers();
    trace.showlegend = Some(false);
    trace.hovertemplate = Some("<b>%{hovertext}</b><extra></extra>".to_string());
    trace.x = points.iter().map(|p| AxisValue::Number(p.x)).collect();
    trace.y = points.iter().map(|p| Some(p.y)).collect();
    trace.hovertext = points.iter().map(|p| p.genre.clone()).collect();
    trace.marker = Some(Marker {
        color: Some(MarkerColor::PerPoint(points.iter().map(|p| p.color.clone()).collect())),
        size: Some(points.iter().map(|p| p.size).collect()),
        opacity: Some(0.8),
        ..Default::default()
    });
    fig.push(Trace::Scatter(trace));

    if !space.boundary().is_empty() {
        fig.push(Trace::Scatter(boundary_trace(space.boundary(), "x", "y")));
    }
    fig
}

#[cfg(test)]
#[path = "builders_tests.rs"]
mod builders_tests;
