//! Re-exports of the shared command objects and value types
//!
//! Persistence row types live next to the services that own them.

pub use shared::models::*;
pub use shared::types::*;
