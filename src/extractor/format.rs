use crate::error::UntarError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Forced archive handling. `Tar` extracts the source as-is, `Tgz` pipes it
/// through gzip decompression first. When no mode is configured the
/// decision falls back to the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveMode {
    Tar,
    Tgz,
}

impl FromStr for ArchiveMode {
    type Err = UntarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar" => Ok(ArchiveMode::Tar),
            "tgz" => Ok(ArchiveMode::Tgz),
            other => Err(UntarError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ArchiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveMode::Tar => write!(f, "tar"),
            ArchiveMode::Tgz => write!(f, "tgz"),
        }
    }
}

/// True iff the mode is unset or one of the recognized values.
pub fn is_valid_mode(mode: Option<&str>) -> bool {
    match mode {
        None => true,
        Some(m) => matches!(m, "tar" | "tgz"),
    }
}

/// Parse an optional raw mode string, rejecting anything outside the
/// recognized set.
pub fn parse_mode(mode: Option<&str>) -> Result<Option<ArchiveMode>, UntarError> {
    match mode {
        None => Ok(None),
        Some(m) => m.parse().map(Some),
    }
}

/// Decide whether the file must be gunzipped before tar extraction.
///
/// A configured mode fully overrides file inspection; otherwise the
/// extension decides (`.tgz` and `.gz`, case-insensitive).
pub fn needs_gunzip(file: &Path, mode: Option<ArchiveMode>) -> bool {
    if let Some(mode) = mode {
        return mode == ArchiveMode::Tgz;
    }

    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_lowercase();
            ext == "tgz" || ext == "gz"
        }
        None => false,
    }
}
