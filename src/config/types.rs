//! Configuration types for podfm-rs.
//!
//! This module defines the structures used to represent application
//! configuration as parsed from an INI-format config file.

use std::collections::HashSet;

use crate::validate::ALLOWED_CONTENT_TYPES;

// =============================================================================
// Primitive Types
// =============================================================================

/// A byte size that can be parsed from strings like "100MB", "1GB", etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

// =============================================================================
// Config Sections
// =============================================================================

/// [pod] section - remote pod connection settings.
#[derive(Debug, Clone, Default)]
pub struct PodConfig {
    /// Base URL of the pod storage server. When set, every target URL is
    /// required to fall under it.
    pub url: Option<String>,
    /// Bearer token attached to every request.
    pub token: Option<String>,
}

/// [limits] section - upload and naming policy limits.
///
/// The per-file ceiling bounds the worst-case memory use of one transfer;
/// the aggregate ceiling bounds the worst-case total per invocation; the
/// content-type allow-list bounds what the remote store is ever asked to
/// accept.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Per-file size ceiling.
    pub max_file_size: ByteSize,
    /// Aggregate size ceiling across one upload batch.
    pub max_batch_size: ByteSize,
    /// Content types uploads may declare.
    pub allowed_content_types: HashSet<String>,
    /// Maximum length of a file or folder name.
    pub max_name_length: usize,
    /// Maximum length of a destination path or URL.
    pub max_path_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: ByteSize(100 * 1024 * 1024),
            max_batch_size: ByteSize(500 * 1024 * 1024),
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|(content_type, _)| content_type.to_string())
                .collect(),
            max_name_length: 255,
            max_path_length: 4096,
        }
    }
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub pod: PodConfig,
    pub limits: LimitsConfig,
}
