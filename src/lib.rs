//! `Hypomnema` - biblical and patristic reference normalization.
//!
//! This crate parses verse references written in the many styles found in
//! patristic translations ("Matt. I. 22, 23.", "John 1.35-37"), resolves which
//! passage each homily or sermon of a commentary covers, and builds the
//! verse-to-homily lookups the reader application consumes.

pub mod bible;
pub mod canon;
pub mod commentary;
pub mod config;
pub mod constants;
pub mod error;
pub mod services;
