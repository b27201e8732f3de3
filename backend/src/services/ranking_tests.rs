#[cfg(test)]
mod tests {
    use crate::models::ChartRow;
    use crate::services::error::AnalysisError;
    use crate::services::filter::{filter_rows, Column, CountrySelector, DateRange, FilterParams};
    use crate::services::ranking::{display_release_date, rank_table, top_sustained_tracks};
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn create_test_row(track: usize, country: &str, day: &str, rank: u8) -> ChartRow {
        ChartRow {
            track_id: format!("id-{:02}", track),
            track_name: format!("Track {:02}", track),
            artists: vec![format!("Artist {}", track % 7)],
            country: country[..3].to_uppercase(),
            country_name: country.to_string(),
            country_region: String::new(),
            snapshot_date: Some(date(day)),
            daily_rank: Some(rank),
            daily_movement: Some(0),
            album_release_date: "2023-04-05".to_string(),
            genres: String::new(),
            audio: None,
        }
    }

    /// Three countries, two days, a full chart each day. Day one charts
    /// tracks 0..50, day two charts tracks 25..75.
    fn scenario_rows() -> Vec<ChartRow> {
        let mut rows = Vec::new();
        for country in ["Brazil", "Japan", "Iceland"] {
            for i in 0..50 {
                rows.push(create_test_row(i, country, "2023-10-01", (i + 1) as u8));
                rows.push(create_test_row(i + 25, country, "2023-10-02", (i + 1) as u8));
            }
        }
        rows
    }

    #[test]
    fn test_scenario_three_countries_two_days() {
        let rows = scenario_rows();
        assert_eq!(rows.len(), 300);

        let params = FilterParams::new(
            Some(DateRange::new(date("2023-10-01"), date("2023-10-02"))),
            CountrySelector::one("Brazil"),
        );
        let filtered = filter_rows(&rows, &params);
        assert_eq!(filtered.len(), 100);

        let top = top_sustained_tracks(filtered.iter()).unwrap();
        assert_eq!(top.len(), 10);

        // Only 25 tracks charted on both days, so the threshold falls to one day
        let names: Vec<String> = top.iter().map(|t| t.track_name.clone()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("Track {:02}", i)).collect();
        assert_eq!(names, expected);

        for pair in top.windows(2) {
            assert!(pair[0].mean_rank <= pair[1].mean_rank);
        }
        assert!(top.iter().all(|t| t.days_in >= 1 && !t.points.is_empty()));
        assert_eq!(top[0].mean_rank, 1.0);
    }

    #[test]
    fn test_threshold_keeps_only_sustained_tracks() {
        let mut rows = Vec::new();
        for i in 0..40 {
            rows.push(create_test_row(i, "Japan", "2023-10-01", (i + 11) as u8));
            rows.push(create_test_row(i, "Japan", "2023-10-02", (i + 11) as u8));
        }
        // Ten one-day tracks with the best ranks
        for i in 0..10 {
            rows.push(create_test_row(100 + i, "Japan", "2023-10-03", (i + 1) as u8));
        }

        let top = top_sustained_tracks(&rows).unwrap();
        assert!(top.iter().all(|t| t.days_in == 2));
        assert_eq!(top[0].track_name, "Track 00");
        assert_eq!(top[0].mean_rank, 11.0);
        assert_eq!(top[0].points.len(), 2);
        assert!(top[0].points[0].date < top[0].points[1].date);
    }

    #[test]
    fn test_mean_rank_ties_break_by_name() {
        let mut rows = Vec::new();
        for i in 0..40 {
            rows.push(create_test_row(i, "Japan", "2023-10-01", (i + 1) as u8));
            rows.push(create_test_row(i, "Japan", "2023-10-02", (40 - i) as u8));
        }
        let top = top_sustained_tracks(&rows).unwrap();
        assert!(top.iter().all(|t| t.mean_rank == 20.5));
        assert_eq!(top[0].track_name, "Track 00");
        assert_eq!(top[9].track_name, "Track 09");
    }

    #[test]
    fn test_insufficient_data() {
        let rows: Vec<ChartRow> = (0..30)
            .map(|i| create_test_row(i, "Iceland", "2023-10-01", (i + 1) as u8))
            .collect();
        assert_eq!(
            top_sustained_tracks(&rows),
            Err(AnalysisError::InsufficientData {
                required: 31,
                available: 30
            })
        );
        assert!(matches!(
            top_sustained_tracks(std::iter::empty()),
            Err(AnalysisError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn test_mean_rank_rounded() {
        let mut rows: Vec<ChartRow> = (0..31)
            .map(|i| create_test_row(i, "Iceland", "2023-10-01", (i + 1) as u8))
            .collect();
        rows.push(create_test_row(0, "Iceland", "2023-10-02", 2));
        rows.push(create_test_row(0, "Iceland", "2023-10-03", 2));
        let top = top_sustained_tracks(&rows).unwrap();
        // Mean of 1, 2 and 2
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].track_name, "Track 00");
        assert_eq!(top[0].days_in, 3);
        assert_eq!(top[0].mean_rank, 1.67);
    }

    #[test]
    fn test_rank_table_for_one_day() {
        let rows = scenario_rows();
        let table = rank_table(&rows, "Japan", date("2023-10-02"));
        assert_eq!(table.len(), 50);
        assert_eq!(
            serde_json::to_value(&table[0]).unwrap(),
            json!({
                "track_name": "Track 25",
                "artists": "Artist 4",
                "album_release_date": "05/04/2023",
                "daily_rank": 1,
                "daily_movement": 0
            })
        );
        assert_eq!(table[0].get(Column::DailyRank), Some(&json!(1)));
        assert!(rank_table(&rows, "Japan", date("2023-11-01")).is_empty());
    }

    #[test]
    fn test_display_release_date() {
        assert_eq!(display_release_date("2023-10-18"), "18/10/2023");
        assert_eq!(display_release_date("2019"), "2019");
        assert_eq!(display_release_date(""), "");
    }
}
