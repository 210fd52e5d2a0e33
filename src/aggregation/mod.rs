//! Derived, read-only views over a [`crate::UnifiedFrame`]: regional rankings,
//! grouped summary statistics and bounded samples for distribution plots.

pub mod ranking;
pub mod sampling;
pub mod top_groups;
