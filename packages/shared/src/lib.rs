//! Utilities shared by the Rakugaki workspace packages.

pub mod logger;
pub mod time;
