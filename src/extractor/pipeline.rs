use crate::error::UnitError;
use flate2::read::GzDecoder;
use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tar::Archive;

/// What the tar sink reported after consuming a unit's stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackStats {
    /// Entries written under the destination root.
    pub entries_written: u64,
    /// Entries whose paths would have escaped the destination root.
    pub entries_skipped: u64,
}

/// Run one extraction unit through the full pipeline: ensure the
/// destination directory, open the source, optionally gunzip, and unpack
/// the tar stream under `dest`.
///
/// Each stage is a terminal failure point; the returned error identifies
/// the stage so the orchestrator can log it and move on.
pub fn extract_archive(source: &Path, dest: &Path, gunzip: bool) -> Result<UnpackStats, UnitError> {
    fs::create_dir_all(dest).map_err(|e| UnitError::CreateDest {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let file = File::open(source).map_err(|e| UnitError::OpenSource {
        path: source.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    // A gzip failure surfaces through the tar sink's reads, so the decoder
    // is wrapped in a tap that remembers whether it was the origin. The
    // flag decides the error's stage at the unit's terminal point.
    let gunzip_failed = Cell::new(false);

    let result = if gunzip {
        let decoder = GunzipTap {
            inner: GzDecoder::new(reader),
            failed: &gunzip_failed,
        };
        unpack_entries(decoder, dest)
    } else {
        unpack_entries(reader, dest)
    };

    result.map_err(|e| {
        if gunzip_failed.get() {
            UnitError::Gunzip {
                path: source.to_path_buf(),
                source: e,
            }
        } else {
            UnitError::Untar {
                path: source.to_path_buf(),
                source: e,
            }
        }
    })
}

fn unpack_entries<R: Read>(reader: R, dest: &Path) -> io::Result<UnpackStats> {
    let mut archive = Archive::new(reader);
    let mut stats = UnpackStats::default();

    for entry in archive.entries()? {
        let mut entry = entry?;
        // unpack_in refuses entries that resolve outside the destination
        if entry.unpack_in(dest)? {
            stats.entries_written += 1;
        } else {
            stats.entries_skipped += 1;
        }
    }

    Ok(stats)
}

struct GunzipTap<'a, R: Read> {
    inner: GzDecoder<R>,
    failed: &'a Cell<bool>,
}

impl<R: Read> Read for GunzipTap<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|_| self.failed.set(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn build_tar(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn write_archive(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_extract_plain_tar() {
        let temp = TempDir::new().unwrap();
        let tar_data = build_tar(&[("hello.txt", "hi"), ("sub/nested.txt", "deep")]);
        let source = write_archive(temp.path(), "plain.tar", &tar_data);
        let dest = temp.path().join("out");

        let stats = extract_archive(&source, &dest, false).unwrap();

        assert_eq!(stats.entries_written, 2);
        assert_eq!(stats.entries_skipped, 0);
        assert_eq!(fs::read_to_string(dest.join("hello.txt")).unwrap(), "hi");
        assert_eq!(
            fs::read_to_string(dest.join("sub/nested.txt")).unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_extract_gzipped_tar() {
        let temp = TempDir::new().unwrap();
        let tgz_data = gzip(&build_tar(&[("a.txt", "compressed")]));
        let source = write_archive(temp.path(), "archive.tar.gz", &tgz_data);
        let dest = temp.path().join("out");

        let stats = extract_archive(&source, &dest, true).unwrap();

        assert_eq!(stats.entries_written, 1);
        assert_eq!(
            fs::read_to_string(dest.join("a.txt")).unwrap(),
            "compressed"
        );
    }

    #[test]
    fn test_gunzip_on_plain_tar_is_a_gunzip_error() {
        let temp = TempDir::new().unwrap();
        let tar_data = build_tar(&[("a.txt", "not gzipped")]);
        let source = write_archive(temp.path(), "plain.tar", &tar_data);
        let dest = temp.path().join("out");

        // Forced decompression of uncompressed data fails in the gzip
        // stage, not the tar stage.
        let err = extract_archive(&source, &dest, true).unwrap_err();
        assert!(matches!(err, UnitError::Gunzip { .. }), "got {:?}", err);
    }

    #[test]
    fn test_corrupt_tar_is_an_untar_error() {
        let temp = TempDir::new().unwrap();
        let mut data = build_tar(&[("a.txt", "content")]);
        // Mangle the checksum field of the first header
        for byte in &mut data[148..156] {
            *byte = b'9';
        }
        let source = write_archive(temp.path(), "broken.tar", &data);
        let dest = temp.path().join("out");

        let err = extract_archive(&source, &dest, false).unwrap_err();
        assert!(matches!(err, UnitError::Untar { .. }), "got {:?}", err);
    }

    #[test]
    fn test_truncated_gzip_is_a_gunzip_error() {
        let temp = TempDir::new().unwrap();
        let mut tgz_data = gzip(&build_tar(&[("a.txt", "soon to be cut off")]));
        tgz_data.truncate(tgz_data.len() / 2);
        let source = write_archive(temp.path(), "truncated.tgz", &tgz_data);
        let dest = temp.path().join("out");

        let err = extract_archive(&source, &dest, true).unwrap_err();
        assert!(matches!(err, UnitError::Gunzip { .. }), "got {:?}", err);
    }

    #[test]
    fn test_dest_colliding_with_file_fails_before_open() {
        let temp = TempDir::new().unwrap();
        let tar_data = build_tar(&[("a.txt", "content")]);
        let source = write_archive(temp.path(), "plain.tar", &tar_data);

        // Destination path already exists as a regular file
        let dest = temp.path().join("occupied");
        fs::write(&dest, "in the way").unwrap();

        let err = extract_archive(&source, &dest, false).unwrap_err();
        assert!(matches!(err, UnitError::CreateDest { .. }), "got {:?}", err);
    }

    #[test]
    fn test_missing_source_is_an_open_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("ghost.tar");
        let dest = temp.path().join("out");

        let err = extract_archive(&source, &dest, false).unwrap_err();
        assert!(matches!(err, UnitError::OpenSource { .. }), "got {:?}", err);
        // The destination directory was still created (stage 1 precedes it)
        assert!(dest.is_dir());
    }

    #[test]
    fn test_escaping_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let mut builder = tar::Builder::new(Vec::new());

        let mut header = tar::Header::new_gnu();
        header.set_size(4);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "inside.txt", &b"safe"[..])
            .unwrap();

        // set_path refuses `..`, so write the name field directly
        let mut header = tar::Header::new_gnu();
        let name = b"../escape.txt";
        header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
        header.set_size(7);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, &b"outside"[..]).unwrap();

        let data = builder.into_inner().unwrap();
        let source = write_archive(temp.path(), "sneaky.tar", &data);
        let dest = temp.path().join("out");

        let stats = extract_archive(&source, &dest, false).unwrap();

        assert_eq!(stats.entries_written, 1);
        assert_eq!(stats.entries_skipped, 1);
        assert!(dest.join("inside.txt").exists());
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_empty_tar_succeeds() {
        let temp = TempDir::new().unwrap();
        let data = build_tar(&[]);
        let source = write_archive(temp.path(), "empty.tar", &data);
        let dest = temp.path().join("out");

        let stats = extract_archive(&source, &dest, false).unwrap();
        assert_eq!(stats, UnpackStats::default());
        assert!(dest.is_dir());
    }
}
