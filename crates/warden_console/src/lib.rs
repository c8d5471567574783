//! Console core for Warden: simulation sessions, navigation and product
//! registration.
//!
//! This crate provides:
//! - [`Session`], the transcript state machine for one policy, and
//!   [`Simulator`], which drives it against the model one turn at a time
//! - [`View`] and [`Event`], the console's navigation state
//! - [`Registrar`], which turns a requirements document into a product and
//!   draft policies
//! - [`Console`], which ties the three to a single catalog

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod console;
pub mod error;
pub mod registration;
pub mod session;
pub mod view;

pub use console::Console;
pub use error::{Error, Result};
pub use registration::Registrar;
pub use session::{
    Rejection, Session, Simulator, SuggestionState, SuggestionTicket, TurnOutcome, TurnRequest,
    TurnState, TurnTicket,
};
pub use view::{Event, InvalidTransition, Section, View};
