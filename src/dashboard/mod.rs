//! Dashboard
//!
//! - [`DashboardAggregator`]: all-or-nothing load of the five resources
//! - [`DashboardView`]: text rendering with placeholders for missing fields

mod aggregator;
mod render;

pub use aggregator::{
    AggregateError, Dashboard, DashboardAggregator, DashboardState, LoadOutcome, Resource,
};
pub use render::{
    format_timestamp, render_json, render_text, DashboardView, NOT_AVAILABLE, NO_DEADLINE,
    NO_DESCRIPTION,
};
