//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The marketplace is served over HTTP only; see [`http`].

pub mod http;
