//! Exit codes returned by [`crate::run`].

pub const SUCCESS: i32 = 0;

pub const ERROR: i32 = 2;
