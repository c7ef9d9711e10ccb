//! Request middleware.

pub mod bootstrap;
pub mod gate;
