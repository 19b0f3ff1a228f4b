//! Service modules around the core library.
//!
//! Adapters that feed source records into the resolver and persist what it
//! produces. All I/O lives here.

pub mod batch;
pub mod export;
pub mod work;
