//! Pre-flight validation of upload candidates, names, and paths.
//!
//! Every check in this module is pure and runs before any network call.
//! File and folder names become URL path segments on the remote store, so
//! the character rules are deliberately narrow: a name that fails here is
//! never sent over the wire. Validators return structured results rather
//! than panicking; callers decide whether to abort or proceed.

use bytes::Bytes;

use crate::config::LimitsConfig;

// =============================================================================
// Constants
// =============================================================================

/// Allowed content types and the file extensions they cover.
///
/// The same table answers both directions: whether a declared content type
/// may be uploaded, and which content type a local file gets from its
/// extension.
pub const ALLOWED_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &[".jpg", ".jpeg"]),
    ("image/png", &[".png"]),
    ("image/gif", &[".gif"]),
    ("image/webp", &[".webp"]),
    ("text/plain", &[".txt", ".acl"]),
    ("text/markdown", &[".md"]),
    ("text/csv", &[".csv"]),
    ("application/json", &[".json"]),
    ("text/html", &[".html"]),
    ("text/javascript", &[".js"]),
    ("text/css", &[".css"]),
    ("application/pdf", &[".pdf"]),
];

/// Look up the allowed content type for a file extension (with leading dot).
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension))
        .map(|(content_type, _)| *content_type)
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors produced by validation checks.
///
/// Folder names get distinct variants from file names: they become
/// container path segments with different escaping rules downstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A file is larger than the per-file ceiling.
    #[error("File size exceeds {limit_mib}MB limit")]
    FileTooLarge { limit_mib: u64 },

    /// A file's declared content type is not in the allow-list.
    #[error("File type not allowed")]
    ContentTypeNotAllowed,

    /// A file name failed the name rules.
    #[error("Invalid file name")]
    InvalidFileName,

    /// A folder name was empty after stripping path segments.
    #[error("Invalid folder name")]
    InvalidFolderName,

    /// A folder name contains characters outside the folder allow-list.
    #[error("Folder name contains invalid characters")]
    FolderNameInvalidCharacters,

    /// A folder name is longer than the name ceiling.
    #[error("Folder name is too long")]
    FolderNameTooLong,

    /// A path contains a parent-directory traversal sequence.
    #[error("Invalid path")]
    InvalidPath,

    /// A path is longer than the path ceiling.
    #[error("Path is too long")]
    PathTooLong,

    /// The batch's total size exceeds the aggregate ceiling.
    #[error("Total upload size exceeds {limit_mib}MB limit")]
    BatchTooLarge { limit_mib: u64 },
}

// =============================================================================
// Upload Candidates
// =============================================================================

/// A candidate file for upload: metadata plus raw content.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// File name as supplied by the caller; may still carry path segments.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Declared content type.
    pub content_type: String,
    /// Raw content.
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create an upload candidate whose size is taken from its contents.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            bytes,
        }
    }
}

// =============================================================================
// Validation Results
// =============================================================================

/// Result of validating a single file. Violations accumulate; the check
/// does not stop at the first failure.
#[derive(Debug, Clone, Default)]
pub struct FileValidation {
    /// Every violation found, in check order.
    pub errors: Vec<ValidationError>,
}

impl FileValidation {
    /// Whether the file passed every check.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of validating an upload batch as a whole.
#[derive(Debug, Clone, Default)]
pub struct BatchValidation {
    /// Per-file violations (prefixed with the file name) followed by any
    /// batch-level violation.
    pub errors: Vec<String>,
}

impl BatchValidation {
    /// Whether every file and the batch as a whole passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Strip any leading path segments (text before the last `/` or `\`),
/// leaving the base name.
pub fn sanitize_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn is_file_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ' | '%' | '^')
}

fn is_folder_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ')
}

/// Check a single upload candidate against the size, type, and name rules.
pub fn validate_file(file: &UploadFile, limits: &LimitsConfig) -> FileValidation {
    let mut errors = Vec::new();

    if file.size > limits.max_file_size.0 {
        errors.push(ValidationError::FileTooLarge {
            limit_mib: limits.max_file_size.0 / 1024 / 1024,
        });
    }

    if !validate_content_type(&file.content_type, limits) {
        errors.push(ValidationError::ContentTypeNotAllowed);
    }

    if !validate_file_name(&file.name, limits) {
        errors.push(ValidationError::InvalidFileName);
    }

    FileValidation { errors }
}

/// Check a file name after stripping leading path segments.
///
/// This is a name-only check; traversal sequences in the stripped portion
/// are the business of [`validate_path`], not this function.
pub fn validate_file_name(name: &str, limits: &LimitsConfig) -> bool {
    let base = sanitize_name(name);
    !base.is_empty()
        && base.chars().all(is_file_name_char)
        && base.len() <= limits.max_name_length
}

/// Check a folder name after stripping leading path segments, returning
/// the sanitized name on success.
///
/// The folder allow-list is stricter than the file one: no `%` or `^`.
pub fn validate_folder_name(
    name: &str,
    limits: &LimitsConfig,
) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidFolderName);
    }

    let base = sanitize_name(name);
    if base.is_empty() || !base.chars().all(is_folder_name_char) {
        return Err(ValidationError::FolderNameInvalidCharacters);
    }
    if base.len() > limits.max_name_length {
        return Err(ValidationError::FolderNameTooLong);
    }

    Ok(base.to_string())
}

/// Reject paths carrying a parent-directory traversal sequence anywhere,
/// or exceeding the path length ceiling.
///
/// Applied to every computed destination URL before it is used in a
/// network call, independent of where the path string originated.
pub fn validate_path(path: &str, limits: &LimitsConfig) -> Result<(), ValidationError> {
    if path.is_empty() || path.contains("../") || path.contains("..\\") {
        return Err(ValidationError::InvalidPath);
    }
    if path.len() > limits.max_path_length {
        return Err(ValidationError::PathTooLong);
    }
    Ok(())
}

/// Whether a content type is in the allow-list.
pub fn validate_content_type(content_type: &str, limits: &LimitsConfig) -> bool {
    limits.allowed_content_types.contains(content_type)
}

/// Validate an upload batch: every file individually, plus the aggregate
/// size ceiling across the whole batch.
///
/// Per-file violations are prefixed with the file's name; the aggregate
/// violation, if any, comes last. Nothing short-circuits, so the caller
/// sees every problem at once.
pub fn validate_batch(files: &[UploadFile], limits: &LimitsConfig) -> BatchValidation {
    let mut errors = Vec::new();
    let mut total_size: u64 = 0;

    for file in files {
        total_size = total_size.saturating_add(file.size);
        let validation = validate_file(file, limits);
        if !validation.is_valid() {
            let messages: Vec<String> =
                validation.errors.iter().map(|e| e.to_string()).collect();
            errors.push(format!("{}: {}", file.name, messages.join(", ")));
        }
    }

    if total_size > limits.max_batch_size.0 {
        errors.push(
            ValidationError::BatchTooLarge {
                limit_mib: limits.max_batch_size.0 / 1024 / 1024,
            }
            .to_string(),
        );
    }

    BatchValidation { errors }
}
