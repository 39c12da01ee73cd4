//! Common value types shared by client and server

pub mod errors;
pub mod identifiers;
pub mod money;
