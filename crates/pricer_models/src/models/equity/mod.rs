//! Equity and FX processes.
//!
//! - [`MultiAssetBlackScholes`]: correlated lognormal assets on one discount curve

pub mod multi_asset;

pub use multi_asset::{AssetSpec, MultiAssetBlackScholes};
