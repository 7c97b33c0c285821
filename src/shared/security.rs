use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size of any input document (100 MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Reads a user-supplied file after checking it is safe to open
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected, not its
/// target. Symbolic links, non-regular files and files above `max_size`
/// are rejected before any byte is read.
///
/// # Arguments
/// * `path` - File to read
/// * `description` - Human-readable name used in error messages
/// * `max_size` - Upper bound in bytes
pub fn read_regular_file(path: &Path, description: &str, max_size: u64) -> Result<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} metadata at {}: {}",
            description,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    if metadata.len() > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            metadata.len(),
            max_size
        );
    }

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", description, e))
}
