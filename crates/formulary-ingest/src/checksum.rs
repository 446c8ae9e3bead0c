//! SHA256 checksums of source files for provenance.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use formulary_model::SourceProvenance;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Buffer size for reading files during checksum computation.
const BUFFER_SIZE: usize = 65536; // 64 KB

/// Compute the SHA256 hash of a file as lower-case hex.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| IngestError::file_read(path, e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| IngestError::file_read(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hex_hash = hex::encode(hasher.finalize());
    debug!(path = %path.display(), sha256 = %hex_hash, "checksum computed");
    Ok(hex_hash)
}

/// Renders a path with forward slashes regardless of platform.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Provenance entry for `path`, read now; `sha256` is `None` if the file is absent.
pub fn source_provenance(name: &str, path: &Path) -> Result<SourceProvenance> {
    let sha256 = if path.is_file() {
        Some(compute_file_sha256(path)?)
    } else {
        None
    };
    Ok(SourceProvenance {
        name: name.to_string(),
        path: display_path(path),
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_compute_sha256() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let hash = compute_file_sha256(file.path()).unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_absent_source_has_no_checksum() {
        let provenance = source_provenance("CNAM", Path::new("sources/missing.pdf")).unwrap();
        assert_eq!(provenance.sha256, None);
        assert_eq!(provenance.path, "sources/missing.pdf");
    }

    #[test]
    fn test_backslashes_become_forward_slashes() {
        assert_eq!(display_path(Path::new(r"sources\list.xls")), "sources/list.xls");
    }
}
