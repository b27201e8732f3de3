//! End-to-end scenarios through the binding layer.

mod support;

use serde_json::json;
use std::sync::Arc;

use support::{date, genre_space, ranking_dataset, FixedResolver};
use top50_rust::bindings::{ChartPoint, ControlEvent, Dashboard, MemoCache, OutputId, OutputPayload, Selection};
use top50_rust::charts::{feature_scatter, genre_facets, ranking_lines, world_map, AxisScale};
use top50_rust::db::RepositoryFactory;
use top50_rust::models::{BoundaryCurve, Feature};
use top50_rust::routes::PageId;
use top50_rust::services::{filter_rows, top_sustained_tracks, CountrySelector, DateRange, FilterParams};

fn dashboard(resolver: Arc<FixedResolver>) -> Dashboard {
    let repository = RepositoryFactory::create_local(ranking_dataset(), genre_space(), json!({}));
    Dashboard::new(repository, resolver, MemoCache::new(32))
}

#[test]
fn test_ranking_pipeline_over_two_days() {
    let rows = ranking_dataset();
    assert_eq!(rows.len(), 300);

    let range = DateRange::new(date("2023-10-17"), date("2023-10-18"));
    let params = FilterParams::new(Some(range), CountrySelector::one("Brazil"));
    let set = filter_rows(&rows, &params);
    let series = top_sustained_tracks(set.iter()).unwrap();

    // Every track charts on exactly one day, so all 100 qualify
    let names: Vec<&str> = series.iter().map(|s| s.track_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["A01", "B01", "A02", "B02", "A03", "B03", "A04", "B04", "A05", "B05"]
    );
    assert!(series.windows(2).all(|w| w[0].mean_rank <= w[1].mean_rank));
    assert!(series.iter().all(|s| s.days_in == 1));
}

#[test]
fn test_empty_inputs_give_empty_figures() {
    assert_eq!(world_map(&[]).trace_count(), 0);
    assert_eq!(
        feature_scatter(&[], Feature::Energy, Feature::Valence, AxisScale::Log, AxisScale::Linear).trace_count(),
        0
    );
    assert_eq!(ranking_lines(&[], "Global").trace_count(), 0);
    assert_eq!(
        genre_facets(&[], &["Global".to_string()], &BoundaryCurve::default(), 1).trace_count(),
        0
    );
}

#[tokio::test]
async fn test_resubmitting_a_label_is_a_no_op() {
    let resolver = Arc::new(FixedResolver::new(vec![("Mine", "indie")]));
    let dashboard = dashboard(resolver.clone());
    let submit = ControlEvent::SubmitClicked {
        n_clicks: 1,
        label: "BR".to_string(),
        playlist_id: "37i9dQZF1DXcBWIGoYBM5M".to_string(),
    };

    let controls = json!({"countries": ["Global"]});
    let first = dashboard
        .handle(PageId::Genres, Some(controls), submit.clone())
        .await
        .unwrap();
    let options = first.controls["options"].as_array().unwrap().len();
    let version = dashboard.repository().snapshot().version();
    assert_eq!(version, 1);

    let second = dashboard
        .handle(PageId::Genres, Some(first.controls.clone()), submit)
        .await
        .unwrap();
    assert_eq!(second.controls["options"].as_array().unwrap().len(), options);
    assert_eq!(dashboard.repository().snapshot().version(), version);
    assert_eq!(resolver.calls(), 1);
    assert_eq!(second.warnings.len(), 1);
}

#[tokio::test]
async fn test_playlist_rows_reach_genre_table_but_not_ranking() {
    let resolver = Arc::new(FixedResolver::new(vec![("Mine", "indie"), ("Ours", "pop")]));
    let dashboard = dashboard(resolver);
    let submit = ControlEvent::SubmitClicked {
        n_clicks: 1,
        label: "Road Trip".to_string(),
        playlist_id: "abc123".to_string(),
    };
    dashboard
        .handle(PageId::Genres, Some(json!({"countries": ["Global"]})), submit)
        .await
        .unwrap();

    let click = ChartPoint::country("Road Trip");
    let update = dashboard
        .handle(PageId::Genres, None, ControlEvent::ChartClicked(click))
        .await
        .unwrap();
    match update.output(OutputId::GenreTable) {
        Some(OutputPayload::Table { title, records }) => {
            assert_eq!(title, "Songs in Road Trip");
            assert_eq!(records.len(), 2);
        }
        other => panic!("unexpected payload {:?}", other),
    }

    // Playlist rows are undated and never reach the ranking chart
    let update = dashboard
        .handle(PageId::Ranking, None, ControlEvent::Initial)
        .await
        .unwrap();
    let figure = update.output(OutputId::RankChart).and_then(OutputPayload::figure).unwrap();
    assert_eq!(figure.trace_count(), 10);
}

#[tokio::test]
async fn test_features_flow_keeps_clicked_country() {
    let dashboard = dashboard(Arc::new(FixedResolver::new(Vec::new())));
    let clicked = dashboard
        .handle(
            PageId::Features,
            None,
            ControlEvent::ChartClicked(ChartPoint::hover("Brazil")),
        )
        .await
        .unwrap();
    let update = dashboard
        .handle(
            PageId::Features,
            Some(clicked.controls),
            ControlEvent::SelectionChanged(Selection::Window(3)),
        )
        .await
        .unwrap();
    assert_eq!(update.controls["country"], json!("Brazil"));
    assert!(update.output(OutputId::FeatureScatter).is_none());
    let figure = update.output(OutputId::YTimeSeries).and_then(OutputPayload::figure).unwrap();
    assert_eq!(figure.point_count(), 2);
}
