// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

#![doc = include_str!("../README.md")]

//------------------------------------------------------------------------
// groupexp public modules
//------------------------------------------------------------------------

// Group capability traits
pub mod traits;

// Error types
pub mod errors;

// Exponent recodings: wNAF, sliding windows, radix 2^w
pub mod exponent;

// Per-base tables of small powers
pub mod window;

// Exponentiation and multi-exponentiation algorithms
pub mod scalar_mul;

// Multi-exponentiation descriptors
pub mod multiexp;

// Power products over bases known in advance
pub mod fixed_bases;

// Eagerly evaluated elements
pub mod basic;

// Lazy evaluation settings
pub mod config;

// Lazily evaluated elements
pub mod lazy;

// The unit group Z_n^*, a reference implementation of the traits
pub mod zn;

//------------------------------------------------------------------------
// Re-exports
//------------------------------------------------------------------------

pub use crate::basic::BasicGroupElement;
pub use crate::config::{ExecutionPolicy, LazyConfig};
pub use crate::errors::Error;
pub use crate::fixed_bases::FixedBasePowProduct;
pub use crate::lazy::{EvaluationStats, LazyGroup, LazyGroupElement};
pub use crate::multiexp::{MultiExpTerm, Multiexponentiation};
pub use crate::traits::{Group, GroupElement};
pub use crate::window::SmallExponentPrecomputation;
