//! Lead Registrant voting
//!
//! [`scoring`] holds the pure aggregation and completion math; [`engine`]
//! wires it to the database and drives server-side auto-finalization.

pub mod engine;
pub mod scoring;

pub use engine::{BallotOutcome, VoteState};
