pub mod v1_0_0;

// the schema every reader converts into
pub use v1_0_0 as current;
