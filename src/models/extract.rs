use std::{
    fs::{self, File},
    io,
    path::Path,
};

use anyhow::{Context, Result};
use zip::read::ZipArchive;

/// Unpacks a zip archive next to itself and returns the number of files written.
///
/// The archive stays on disk whatever the outcome.
pub fn extract_zip(archive_path: &Path) -> Result<usize> {
    let destination = archive_path
        .parent()
        .with_context(|| format!("archive has no parent directory: {}", archive_path.display()))?;
    let file = File::open(archive_path)
        .with_context(|| format!("open archive {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file).context("open zip archive")?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("read zip entry")?;
        let dest = destination.join(entry.mangled_name());
        if entry.is_dir() {
            fs::create_dir_all(&dest).context("create zip dir")?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).context("create zip file parent")?;
            }
            let mut outfile = File::create(&dest)
                .with_context(|| format!("create {}", dest.display()))?;
            io::copy(&mut entry, &mut outfile).context("write zip file")?;
            written += 1;
        }
    }
    tracing::debug!(
        archive = %archive_path.display(),
        files = written,
        "archive extracted"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::{FileOptions, ZipWriter};

    use super::*;

    fn write_fixture(path: &Path) {
        let file = File::create(path).expect("create fixture");
        let mut writer = ZipWriter::new(file);
        writer
            .add_directory("checkpoints/", FileOptions::default())
            .expect("add dir");
        writer
            .start_file("checkpoints/model.pth", FileOptions::default())
            .expect("start file");
        writer.write_all(b"weights").expect("write file");
        writer
            .start_file("README.txt", FileOptions::default())
            .expect("start file");
        writer.write_all(b"hello").expect("write file");
        writer.finish().expect("finish zip");
    }

    #[test]
    fn unpacks_into_archive_parent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("sadtalker").join("checkpoints.zip");
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        write_fixture(&archive);

        let written = extract_zip(&archive).expect("extract");
        assert_eq!(written, 2);

        let base = dir.path().join("sadtalker");
        assert_eq!(
            fs::read(base.join("checkpoints").join("model.pth")).unwrap(),
            b"weights"
        );
        assert_eq!(fs::read(base.join("README.txt")).unwrap(), b"hello");
        assert!(archive.exists());
    }

    #[test]
    fn corrupt_archive_errors_and_stays() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"not a zip").unwrap();

        assert!(extract_zip(&archive).is_err());
        assert!(archive.exists());
    }

    #[test]
    fn missing_archive_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(extract_zip(&dir.path().join("absent.zip")).is_err());
    }
}
