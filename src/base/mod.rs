//! Base types and error handling.
//!
//! - [`NetError`]: the crate-wide error enum
//! - [`PromiseState`]: observable promise states

pub mod neterror;
pub mod state;

pub use neterror::{FailureCause, NetError};
pub use state::PromiseState;
