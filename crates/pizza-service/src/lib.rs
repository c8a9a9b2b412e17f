//! Hosts for the pizza order application: the terminal front end and the
//! local order API.

pub mod apis;
pub mod host;
pub mod server;
