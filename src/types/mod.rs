pub mod aggregate;
pub mod grouping;
pub mod measurement;
pub mod metric;
pub mod unified_frame;
