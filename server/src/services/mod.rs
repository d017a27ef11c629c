//! Domain services behind the HTTP routes.

pub mod content;
pub mod payments;
