//! # Equipment Interface
//!
//! This module defines the interface structures which are handed to the equipment collaborators.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod pneumatics;
