mod summary;
pub mod views;

pub use summary::{ledger_summary, ledger_view, HISTOGRAM_BINS};
