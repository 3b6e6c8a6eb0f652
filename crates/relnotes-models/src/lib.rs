//! Core data models for release note generation.
//!
//! This crate provides the plain data types that flow through the release
//! notes pipeline: work items pulled from the tracking service and the
//! heading shown at the top of the rendered document.

pub mod heading;
pub mod work_item;

// Re-export main types
pub use heading::{ReleaseHeading, DATE_PLACEHOLDER, NAME_PLACEHOLDER};
pub use work_item::{WorkItem, WorkItemId};
