//! birdsock - client for the BIRD routing daemon control socket.

pub mod config;
pub mod protocol;
pub mod socket;
