mod base;

pub mod san;

pub use base::*;
