//! Data structures shared by the CPU and its bindings.

pub mod error;
pub mod value;
pub mod variable;
pub mod volume;
