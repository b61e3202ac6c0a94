//! stk-swift: HTTP transport for the stacktor Swift client
//!
//! This crate implements the [`stk_core::Transport`] trait on top of
//! reqwest. It is the only crate that talks to the network.

pub mod client;

pub use client::{SwiftTransport, connect};
