//! Visit analytics
//!
//! Summary statistics are derived on demand from the append-only visit
//! log; nothing is materialized or cached. See [`summary::build_stats`].

pub mod device;
pub mod models;
pub mod summary;

pub use device::{classify, Device};
pub use models::{LinkView, StatsResponse};
pub use summary::build_stats;
