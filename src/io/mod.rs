//! File output for usage history.

pub mod export;
