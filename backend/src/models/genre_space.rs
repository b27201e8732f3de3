//! Static genre-space reference data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One genre positioned in the fixed 2-D genre-space layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenrePoint {
    pub genre: String,
    pub x: f64,
    pub y: f64,
    /// Marker size hint from the reference layout.
    pub size: f64,
    /// Display color, used verbatim as the marker color.
    pub color: String,
}

/// Closed boundary drawn over genre-space plots, stored as two parallel sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl BoundaryCurve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, String> {
        if x.len() != y.len() {
            return Err(format!(
                "Boundary sequences differ in length: {} x values, {} y values",
                x.len(),
                y.len()
            ));
        }
        Ok(Self { x, y })
    }

    pub fn from_vertices(vertices: &[(f64, f64)]) -> Self {
        let (x, y) = vertices.iter().copied().unzip();
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Genre reference table plus the boundary curve, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct GenreSpace {
    points: Vec<GenrePoint>,
    boundary: BoundaryCurve,
    index: HashMap<String, usize>,
}

impl GenreSpace {
    pub fn new(points: Vec<GenrePoint>, boundary: BoundaryCurve) -> Self {
        let mut index = HashMap::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            // First occurrence wins on duplicate genre names
            index.entry(point.genre.clone()).or_insert(i);
        }
        Self {
            points,
            boundary,
            index,
        }
    }

    pub fn points(&self) -> &[GenrePoint] {
        &self.points
    }

    pub fn boundary(&self) -> &BoundaryCurve {
        &self.boundary
    }

    pub fn point(&self, genre: &str) -> Option<&GenrePoint> {
        self.index.get(genre).map(|&i| &self.points[i])
    }

    pub fn contains(&self, genre: &str) -> bool {
        self.index.contains_key(genre)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Label/value pair offered by a country selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    /// Option whose label and value are both `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            value: name,
        }
    }
}
