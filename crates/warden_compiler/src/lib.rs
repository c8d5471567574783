//! Policy to system-instruction compiler for Warden.
//!
//! This crate is **pure and deterministic**:
//! - No network calls
//! - No randomness
//! - Same input always produces same output
//!
//! # Example
//!
//! ```rust
//! use warden_compiler::Compiler;
//! use warden_policy::seed;
//!
//! let policy = &seed::policies()[0];
//! let instruction = Compiler::new().compile(policy);
//! assert!(instruction.contains("User asks for a diagnosis"));
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

pub mod brief;
pub mod compiler;

pub use brief::render_brief;
pub use compiler::{CompileOptions, Compiler, NONE_SPECIFIED, NO_RULES};
