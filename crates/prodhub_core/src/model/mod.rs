//! Domain records persisted by the hub stores.
//!
//! # Responsibility
//! - Define the capture entry and task shapes shared by stores, messages and
//!   the CLI.
//! - Keep the persisted JSON field names compatible with lists written by the
//!   browser extension (`url`, `title`, `timestamp`, `createdAt`).

pub mod capture;
pub mod task;
