//! Stores and the background service.
//!
//! # Responsibility
//! - Own the capture log and task list and persist every mutation.
//! - Serve the background message protocol on top of the capture log.

pub mod background;
pub mod capture_log;
pub mod store_error;
pub mod task_list;
