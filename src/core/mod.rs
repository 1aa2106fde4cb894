//! Core report building blocks: URL normalization, the page/issue model, and
//! the aggregation pass that groups pages by signature. These are internal
//! primitives consumed by the high-level `api` module.
pub mod aggregate;
pub mod model;
pub mod urls;
