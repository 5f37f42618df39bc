//! Router Module Index
//!
//! Splits the routes by access level so the auth layer is applied to whole routers,
//! never to individual handlers by accident.

/// Routes open to anonymous clients: banner, health check, login.
pub mod public;

/// Routes wrapped in the bearer-token middleware: the menu CRUD and the greeting.
pub mod authenticated;
