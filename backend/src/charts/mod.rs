//! Chart builders and the figure model they produce.

pub mod builders;
pub mod figure;

pub use builders::{
    feature_scatter, feature_time_series, genre_facets, genre_overview, ranking_lines, world_map,
    BASE_SIZE_MAX, FACET_WRAP, GENRE_X_RANGE, GENRE_Y_RANGE,
};
pub use figure::{AxisScale, AxisValue, Figure, Layout, ScatterTrace, Trace};
