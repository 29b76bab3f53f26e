//! Repositories operate on a snapshot that is already loaded; they never
//! touch the store themselves. [`crate::catalog::Catalog`] wraps each call
//! in a load/save cycle.

pub mod items;
pub mod subscribers;
