//! Uploaded asset store.

pub mod data_uri;
pub mod model;
pub mod source;
pub mod store;

pub use data_uri::DataUri;
pub use model::{RawFile, UploadedAsset};
pub use source::AssetSource;
pub use store::{ingest, ingest_raw, sniff_image_mime};
