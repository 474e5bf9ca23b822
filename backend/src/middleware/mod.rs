//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route. The
//! credential gate lives with the HTTP adapter because it depends on handler
//! state.

pub mod trace;

pub use trace::Trace;
