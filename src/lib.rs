//! podfm-rs - a client library and command-line utility for remote pod
//! file storage.

pub mod cli;
pub mod config;
pub mod store;
pub mod transfer;
pub mod util;
pub mod validate;

pub use config::{Config, ConfigSource, LimitsConfig, PodConfig};

pub use store::{
    HttpStore, MemoryStore, MemoryStoreBuilder, RemoteNode, RemoteStore, StoreError,
};

pub use transfer::{
    delete_resource, move_folder, rename_file, upload_batch, NoopSink, ProgressSink,
    TransferError, TransferPlan,
};

pub use validate::{
    validate_batch, validate_content_type, validate_file, validate_file_name,
    validate_folder_name, validate_path, UploadFile, ValidationError,
};
