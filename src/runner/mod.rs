pub mod binding;
pub mod config;
pub mod cpu;
pub mod ds;
pub mod std_bindings;
