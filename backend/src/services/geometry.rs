//! Boundary computation for the genre-space overlay.

use geo::{ConvexHull, MultiPoint, Point};

use crate::models::{BoundaryCurve, GenrePoint};

/// Convex hull of a point set, counter-clockwise, without repeating the
/// first vertex. Non-finite coordinates are ignored.
pub fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let cloud: MultiPoint<f64> = points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|&(x, y)| Point::new(x, y))
        .collect();
    if cloud.0.is_empty() {
        return Vec::new();
    }
    let hull = cloud.convex_hull();
    let mut ring: Vec<(f64, f64)> = hull.exterior().coords().map(|c| (c.x, c.y)).collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Closed boundary around the genre points: the convex hull with its first
/// vertex repeated at the end so a line trace draws a closed shape.
pub fn genre_boundary(points: &[GenrePoint]) -> BoundaryCurve {
    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    let mut hull = convex_hull(&coords);
    if let Some(&first) = hull.first() {
        if hull.len() > 2 {
            hull.push(first);
        }
    }
    BoundaryCurve::from_vertices(&hull)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Intersects, LineString, Polygon};

    fn sorted(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        points
    }

    #[test]
    fn test_hull_of_square_with_interior_points() {
        let points = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 5.0),
            (2.0, 7.0),
            (f64::NAN, 3.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(
            sorted(hull),
            vec![(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)]
        );
    }

    #[test]
    fn test_hull_of_nothing() {
        assert!(convex_hull(&[]).is_empty());
        assert!(convex_hull(&[(f64::INFINITY, 0.0)]).is_empty());
    }

    #[test]
    fn test_hull_contains_every_point() {
        let points: Vec<(f64, f64)> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.7;
                (t.cos() * (i % 7) as f64 * 100.0, t.sin() * (i % 5) as f64 * 300.0)
            })
            .collect();
        let hull = convex_hull(&points);
        let polygon = Polygon::new(LineString::from(hull), vec![]);
        for &(x, y) in &points {
            assert!(polygon.intersects(&Point::new(x, y)), "({}, {}) outside hull", x, y);
        }
    }

    #[test]
    fn test_genre_boundary_is_closed() {
        let points: Vec<GenrePoint> = [(0.0, 0.0), (100.0, 0.0), (50.0, 900.0), (50.0, 100.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| GenrePoint {
                genre: format!("g{}", i),
                x,
                y,
                size: 1.0,
                color: "#000000".to_string(),
            })
            .collect();
        let boundary = genre_boundary(&points);
        assert_eq!(boundary.len(), 4);
        assert_eq!(boundary.x.first(), boundary.x.last());
        assert_eq!(boundary.y.first(), boundary.y.last());
    }
}
