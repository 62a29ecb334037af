//! Command objects consumed by the backend services
//!
//! These are the validated inputs for every state-changing operation. The
//! boundary layer deserializes and validates them before the core sees them.

pub mod expense;
pub mod product;
pub mod purchase;
pub mod sale;

pub use expense::*;
pub use product::*;
pub use purchase::*;
pub use sale::*;
