pub mod chart;
pub mod genre_space;

pub use chart::*;
pub use genre_space::*;
