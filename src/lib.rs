pub mod config;
pub mod errors;
pub mod hooks;
pub mod language;
pub mod manager;
pub mod oci;
pub mod repository;
pub mod version;
pub mod when;

pub use config::Config;
pub use errors::{HookError, MatchError};
pub use language::Language;
pub use manager::{ExtensionStageHooks, Manager};
pub use repository::Repository;
pub use version::read_file;
