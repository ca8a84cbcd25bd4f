//! # Object Set
//!
//! A hash-set engine for members that supply their own hash and equality.
//!
//! ## Philosophy
//!
//! - **Members decide equality**: the engine never inspects a member; it only
//!   asks for a hash and an equality verdict through [`SetMember`].
//! - **Hash once**: a member's hash is computed when it is inserted and stored
//!   alongside it, so probing and set algebra never re-hash stored members.
//! - **Linear algebra**: union, intersection, symmetric difference and
//!   difference are O(|a| + |b|) hash lookups.
//!
//! ## Key Types
//!
//! - [`SetMember`]: What a value must provide to be stored
//! - [`ObjectSet`]: The hash set itself
//! - [`SetConfig`]: Construction-time tuning

pub mod algebra;
pub mod config;
pub mod set;

pub use config::SetConfig;
pub use set::{ObjectSet, SetMember};
