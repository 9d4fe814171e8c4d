// Archive format detection (no I/O)

use crate::error::ExtractError;

use std::path::Path;

const SEVENZIP_TYPES: &[&str] = &[
    "7z", "xz", "bzip2", "gzip", "tar", "zip", "ar", "arj", "cab", "chm", "cpio", "cramfs", "dmg", "ext",
    "fat", "gpt", "hfs", "ihex", "iso", "lzh", "lzma", "mbr", "msi", "nsis", "ntfs", "qcow2", "rar", "rpm",
    "squashfs", "udf", "uefi", "vdi", "vhd", "vmdk", "wim", "xar", "z",
];

/// How an archive gets unpacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    /// .tar.gz / .tgz
    Tgz,
    /// .tar.xz / .txz
    Txz,
    Tar,
    /// .tar.bz2 / .tbz
    Bz2,
    /// single gzip-compressed file
    Gzip,
    /// Windows executable: Inno Setup installer or self-extracting archive
    Exe,
    /// GOG / Inno Setup installer
    Innoextract,
    /// Anything 7-zip understands. `None` lets the archive's extension decide.
    SevenZip(Option<String>),
}

/// Whether 7-zip handles `archive_type`, or the file extension when no type is given
pub fn is_7zip_supported(path: &str, archive_type: Option<&str>) -> bool {
    let kind = match archive_type {
        Some(kind) => kind.to_lowercase(),
        None => match Path::new(path).extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return false,
        },
    };
    SEVENZIP_TYPES.contains(&kind.as_str())
}

/// Guess the extractor from the file name
pub fn guess_extractor(path: &str) -> Result<Extractor, ExtractError> {
    let extractor = if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
        Extractor::Tgz
    } else if path.ends_with(".tar.xz") || path.ends_with(".txz") {
        Extractor::Txz
    } else if path.ends_with(".tar") {
        Extractor::Tar
    } else if path.ends_with(".tar.bz2") || path.ends_with(".tbz") {
        Extractor::Bz2
    } else if path.ends_with(".gz") {
        Extractor::Gzip
    } else if path.ends_with(".exe") {
        Extractor::Exe
    } else if is_7zip_supported(path, None) {
        Extractor::SevenZip(None)
    } else {
        return Err(ExtractError::NoExtractor(path.to_string()));
    };
    Ok(extractor)
}

/// Extractor for an explicit `format` parameter, or a guess without one
pub fn resolve_extractor(path: &str, format: Option<&str>) -> Result<Extractor, ExtractError> {
    let Some(format) = format.filter(|f| !f.is_empty()) else {
        return guess_extractor(path);
    };
    let extractor = match format {
        "tgz" => Extractor::Tgz,
        "txz" => Extractor::Txz,
        "tar" => Extractor::Tar,
        "bz2" => Extractor::Bz2,
        "gzip" => Extractor::Gzip,
        "exe" => Extractor::Exe,
        "gog" | "innoextract" => Extractor::Innoextract,
        other if is_7zip_supported(path, Some(other)) => Extractor::SevenZip(Some(other.to_lowercase())),
        _ => return Err(ExtractError::UnknownFormat(path.to_string())),
    };
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tarballs_are_recognized() {
        assert_eq!(guess_extractor("game.tar.gz").unwrap(), Extractor::Tgz);
        assert_eq!(guess_extractor("game.tgz").unwrap(), Extractor::Tgz);
        assert_eq!(guess_extractor("game.tar.xz").unwrap(), Extractor::Txz);
        assert_eq!(guess_extractor("game.tar.bz2").unwrap(), Extractor::Bz2);
        assert_eq!(guess_extractor("game.tar").unwrap(), Extractor::Tar);
    }

    #[test]
    fn single_files_and_executables() {
        assert_eq!(guess_extractor("data.gz").unwrap(), Extractor::Gzip);
        assert_eq!(guess_extractor("setup_quake.exe").unwrap(), Extractor::Exe);
    }

    #[test]
    fn sevenzip_types_by_extension() {
        assert_eq!(guess_extractor("data.ZIP").unwrap(), Extractor::SevenZip(None));
        assert_eq!(guess_extractor("disc.iso").unwrap(), Extractor::SevenZip(None));
        assert_eq!(guess_extractor("game.rar").unwrap(), Extractor::SevenZip(None));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = guess_extractor("readme.txt").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not extract `readme.txt` - no appropriate extractor found"
        );
    }

    #[test]
    fn explicit_format_overrides_the_name() {
        assert_eq!(resolve_extractor("setup.bin", Some("gog")).unwrap(), Extractor::Innoextract);
        assert_eq!(resolve_extractor("setup.bin", Some("innoextract")).unwrap(), Extractor::Innoextract);
        assert_eq!(
            resolve_extractor("data.bin", Some("RAR")).unwrap(),
            Extractor::SevenZip(Some("rar".to_string()))
        );
        assert_eq!(resolve_extractor("data.zip", None).unwrap(), Extractor::SevenZip(None));
    }

    #[test]
    fn unknown_explicit_format_is_an_error() {
        let err = resolve_extractor("data.bin", Some("lha2")).unwrap_err();
        assert!(err.to_string().contains("unknown format specified"));
    }
}
