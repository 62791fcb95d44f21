//! # Pricer Models (L2: Stochastic Processes)
//!
//! Diffusion models behind the Monte Carlo engine in `pricer_pricing`.
//!
//! This crate provides:
//! - The [`models::StochasticProcess`] contract (dynamics plus closed-form
//!   numeraire, bond and asset formulas)
//! - Hull-White, multi-asset Black-Scholes and two-factor commodity processes
//! - Correlation matrices with Cholesky factors
//!
//! ## Design Principles
//!
//! - **Trait objects at the seam**: the simulator holds `Arc<dyn StochasticProcess<T>>`
//! - **Active type `T`** for states and outputs, `f64` for times and parameters
//! - **Validated constructors** returning [`models::ProcessError`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod models;
