pub mod chart;
mod data;
pub mod intro;

pub use data::{load_movies, read_movies, render_table, top_rated, DataError, Movie, MovieTable};

/// Number of movies shown in the ranking, the chart and the table.
pub const TOP_N: usize = 10;
