//! Bar storage, causal history views, and period slicing.

pub mod period;
pub mod store;
pub mod view;

pub use period::slice_period;
pub use store::{BarStore, SeriesMap, ValidationError};
pub use view::HistoryView;
