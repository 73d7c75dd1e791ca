//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the
//! control vector and its wire telegram encoding, the UDP transport used to
//! carry telegrams from the surface to the vehicle, and the command lines of
//! the external video transport pipelines.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control vector and telegram codec
pub mod telegram;

/// Network module
pub mod net;

/// Video transport pipeline command lines
pub mod video;
