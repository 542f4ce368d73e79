pub mod accelerator;
pub mod help;
