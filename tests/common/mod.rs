#![allow(dead_code)]

pub mod command;
pub mod file;

/// Length of the hex object ids printed by the binary
pub const OID_LENGTH: usize = 40;
