//! Run output: record delivery and the terminal summary
//!
//! The emitter delivers validated records to the remote sink, falling
//! back to the durable NDJSON buffer; the metrics accumulate the run's
//! counters and render the single machine-parseable summary line.

mod emitter;
mod metrics;

pub use emitter::{Delivery, Emitter};
pub use metrics::RunMetrics;
