//! EIS (Electrochemical Impedance Spectroscopy) projection engine.
//!
//! Turns a batch of frequency/impedance measurements into a single labeled
//! point in a clamped 3D space, collapses index-combination listings to their
//! latest entries, and tracks which records of a polled series are new.
//!
//! Zero I/O: pure math and bookkeeping, with no opinion about transport or
//! where the records come from.

pub mod category;
pub mod combination;
pub mod constants;
pub mod error;
pub mod feature;
pub mod highlight;
pub mod measurement;
pub mod pipeline;
pub mod projector;
pub mod series;
pub mod time;

pub use category::{Categorizer, Category};
pub use combination::{
    CombinationFilter, IndexCombination, Page, ParsedCombination, UpdatedAt, paginate,
    reduce_to_latest,
};
pub use constants::{
    CLAMP_RANGE, FAR_THRESHOLD, HIGHLIGHT_WINDOW_MS, ITEMS_PER_PAGE, NEAR_THRESHOLD,
    POLL_INTERVAL_MS,
};
pub use error::{EisError, Result};
pub use feature::build_feature_vector;
pub use highlight::HighlightTracker;
pub use measurement::{Measurement, decode_measurements, is_valid_record, record_id};
pub use pipeline::{EisPipeline, ProjectedPoint, ProjectionConfig, process, validate};
pub use projector::{Basis, Projector, dot_prefix};
pub use series::{NyquistRow, frequency_range, nyquist_rows};
pub use time::{millis_to_iso8601, parse_iso8601_millis};
