//! Checksum verification for installer files

use crate::error::{DownloadError, Result, ScriptingError};
use crate::files::InstallerFile;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt::Write;
use std::io::Read;
use std::path::Path;

fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().iter().fold(String::new(), |mut hex, byte| {
        let _ = write!(hex, "{:02x}", byte);
        hex
    }))
}

/// Hex digest of a file for one of md5, sha1, sha224, sha256, sha384, sha512
pub fn file_checksum(path: &Path, hash_type: &str) -> Result<String> {
    match hash_type.to_lowercase().as_str() {
        "sha224" => digest_file::<Sha224>(path),
        "sha256" => digest_file::<Sha256>(path),
        "sha384" => digest_file::<Sha384>(path),
        "sha512" => digest_file::<Sha512>(path),
        "md5" => digest_file::<Md5>(path),
        "sha1" => digest_file::<Sha1>(path),
        other => Err(DownloadError::UnsupportedChecksum(other.to_string()).into()),
    }
}

/// Compare the downloaded file against its `type:hash` checksum, if any
pub fn check_hash(file: &InstallerFile) -> Result<()> {
    let Some(checksum) = file.checksum() else {
        return Ok(());
    };
    let dest = file.dest_file()?;

    let Some((hash_type, expected)) = checksum.split_once(':') else {
        return Err(ScriptingError::with_data("Invalid checksum, expected format (type:hash) ", checksum).into());
    };

    tracing::info!("Checking hash {} for {}", hash_type, dest.display());
    let actual = file_checksum(&dest, hash_type)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        let mut hash_name = hash_type.to_string();
        if let Some(first) = hash_name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        return Err(DownloadError::ChecksumMismatch {
            hash_type: hash_name,
            expected: expected.to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();
        assert_eq!(
            file_checksum(&path, "sha256").unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn legacy_md5_and_sha1_are_computed_in_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();
        assert_eq!(file_checksum(&path, "md5").unwrap(), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(
            file_checksum(&path, "SHA1").unwrap(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
    }

    #[test]
    fn unknown_hash_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(file_checksum(&path, "crc32").is_err());
    }

    #[test]
    fn mismatch_names_the_hash_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let meta: serde_yaml::Value =
            serde_yaml::from_str("{url: 'https://x.org/hello.txt', filename: hello.txt, checksum: 'sha256:abc'}").unwrap();
        let mut file = InstallerFile::new("g", "hello", &meta, dir.path(), false).unwrap();
        file.set_dest_file(path);

        let err = check_hash(&file).unwrap_err();
        assert!(err.to_string().starts_with("Sha256 checksum mismatch"));
    }

    #[test]
    fn matching_checksum_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let meta: serde_yaml::Value = serde_yaml::from_str(
            "{url: 'https://x.org/hello.txt', filename: hello.txt, checksum: 'sha256:2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824'}",
        )
        .unwrap();
        let mut file = InstallerFile::new("g", "hello", &meta, dir.path(), false).unwrap();
        file.set_dest_file(path);
        check_hash(&file).unwrap();
    }
}
