//! Core building blocks: band sampling, histograms, percentile cuts, the
//! nodata override, stretch parameters and applying a stretch. These are the
//! primitives consumed by the high-level `api` module.
pub mod histogram;
pub mod nodata;
pub mod params;
pub mod percentile;
pub mod sample;
pub mod stretch;
