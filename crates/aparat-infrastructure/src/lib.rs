//! Infrastructure layer for Aparat: file-backed stores, file input,
//! configuration and secrets.

pub mod config_service;
pub mod fs_asset_source;
pub mod memory_flag_store;
pub mod paths;
pub mod result_exporter;
pub mod secret_service;
pub mod storage;
pub mod toml_flag_store;

pub use crate::config_service::ConfigService;
pub use crate::fs_asset_source::FsAssetSource;
pub use crate::memory_flag_store::InMemoryFlagStore;
pub use crate::paths::{AparatPaths, PathError, ServiceType};
pub use crate::result_exporter::ResultExporter;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::toml_flag_store::TomlFlagStore;
