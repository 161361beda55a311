pub mod rank;
pub mod time_series;

pub use rank::Rank;
pub use time_series::TimeSeriesStore;
