//! Writing reports to disk
//!
//! A packaged report is a directory named after the report title holding
//! `metadata.json`, `base.png` and `shade.png`, optionally zipped.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{METADATA_FILE, Report, ReportMetadata};

/// Packaging failures
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to compress report: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PackageError + '_ {
    move |source| PackageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Metadata plus the screenshot copies an HTTP upload sends
#[derive(Debug, Clone, PartialEq)]
pub struct ApiPayload {
    pub meta: ReportMetadata,
    pub base: PathBuf,
    pub shade: PathBuf,
}

/// File name of the base screenshot inside a packaged report
pub const BASE_FILE: &str = "base.png";
/// File name of the shade screenshot inside a packaged report
pub const SHADE_FILE: &str = "shade.png";

/// Turn a report title into a single safe path component
///
/// Anything other than letters, digits, `-`, `_` and spaces becomes `_`, so
/// separators and `.`/`..` can never leave the parent directory.
pub fn file_name_for(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        "report".to_string()
    } else {
        name
    }
}

fn copy_as(src: &Path, dir: &Path, name: &str) -> Result<PathBuf, PackageError> {
    let dst = dir.join(name);
    fs::copy(src, &dst).map_err(io_error(src))?;
    Ok(dst)
}

fn report_dir(report: &Report, parent: &Path) -> Result<PathBuf, PackageError> {
    let dir = parent.join(file_name_for(report.title()));
    fs::create_dir_all(&dir).map_err(io_error(&dir))?;
    Ok(dir)
}

/// Copy both screenshots into `dir`, returning `(base, shade)`
fn copy_screenshots(report: &Report, dir: &Path) -> Result<(PathBuf, PathBuf), PackageError> {
    let base = copy_as(report.base_screenshot(), dir, BASE_FILE)?;
    let shade = copy_as(report.shade_screenshot(), dir, SHADE_FILE)?;
    Ok((base, shade))
}

/// Write `<parent>/<title>/` with `metadata.json`, `base.png` and `shade.png`
pub fn write_to_directory(report: &Report, parent: &Path) -> Result<PathBuf, PackageError> {
    let dir = report_dir(report, parent)?;

    let meta_path = dir.join(METADATA_FILE);
    let meta_file = File::create(&meta_path).map_err(io_error(&meta_path))?;
    serde_json::to_writer_pretty(meta_file, &report.metadata())?;

    copy_screenshots(report, &dir)?;
    log::info!("Wrote report {} to {}", report.title(), dir.display());
    Ok(dir)
}

fn add_dir(
    zip: &mut ZipWriter<File>,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<(), PackageError> {
    let mut entries = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(dir))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            add_dir(zip, &path, options)?;
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        zip.start_file(name.to_string_lossy().into_owned(), options)?;
        let mut file = File::open(&path).map_err(io_error(&path))?;
        io::copy(&mut file, zip).map_err(io_error(&path))?;
    }
    Ok(())
}

/// Zip every file under `dir` into `output`
///
/// Entries are stored flat, by file name.
pub fn compress(dir: &Path, output: &Path) -> Result<PathBuf, PackageError> {
    let file = File::create(output).map_err(io_error(output))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_dir(&mut zip, dir, options)?;
    zip.finish()?;
    log::info!("Compressed {} into {}", dir.display(), output.display());
    Ok(output.to_path_buf())
}

/// Write the report directory under `cache_dir` and zip it next to it
pub fn generate_compressed(report: &Report, cache_dir: &Path) -> Result<PathBuf, PackageError> {
    let dir = write_to_directory(report, cache_dir)?;
    let output = cache_dir.join(format!("{}.zip", file_name_for(report.title())));
    compress(&dir, &output)
}

/// Copy the screenshots under `cache_dir` and pair them with the metadata
pub fn generate_api_payload(report: &Report, cache_dir: &Path) -> Result<ApiPayload, PackageError> {
    let dir = report_dir(report, cache_dir)?;
    let (base, shade) = copy_screenshots(report, &dir)?;
    Ok(ApiPayload {
        meta: report.metadata(),
        base,
        shade,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MarkerBoard;
    use crate::config::FlyTrapConfig;
    use crate::domain::Point;
    use crate::report::build_report;
    use std::io::Read;

    fn fixture(dir: &Path) -> Report {
        let base = dir.join("base.png");
        let shade = dir.join("shade.png");
        fs::write(&base, b"base-bytes").unwrap();
        fs::write(&shade, b"shade-bytes").unwrap();

        let mut board = MarkerBoard::new(&FlyTrapConfig::default());
        let mut marker = board.next_marker(Point::new(40.0, 40.0));
        marker.set_comment("This switch is broken");
        board.add_or_absorb(marker);
        build_report(&board, base, shade, Some("TRAP_REPORT_TEST".into()))
    }

    #[test]
    fn test_write_to_directory_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let report = fixture(tmp.path());
        let out = tmp.path().join("cache");

        let dir = write_to_directory(&report, &out).unwrap();
        assert_eq!(dir, out.join("TRAP_REPORT_TEST"));
        assert_eq!(fs::read(dir.join("base.png")).unwrap(), b"base-bytes");
        assert_eq!(fs::read(dir.join("shade.png")).unwrap(), b"shade-bytes");

        let meta: ReportMetadata =
            serde_json::from_slice(&fs::read(dir.join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(meta, report.metadata());
        assert_eq!(meta.bugs[0].comment, "This switch is broken");
    }

    #[test]
    fn test_generate_compressed_contains_all_files() {
        let tmp = tempfile::tempdir().unwrap();
        let report = fixture(tmp.path());
        let cache = tmp.path().join("cache");

        let archive = generate_compressed(&report, &cache).unwrap();
        assert_eq!(archive, cache.join("TRAP_REPORT_TEST.zip"));

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, ["base.png", METADATA_FILE, "shade.png"]);

        let mut contents = String::new();
        zip.by_name("shade.png")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "shade-bytes");
    }

    #[test]
    fn test_api_payload_copies_screenshots() {
        let tmp = tempfile::tempdir().unwrap();
        let report = fixture(tmp.path());
        let cache = tmp.path().join("cache");

        let payload = generate_api_payload(&report, &cache).unwrap();
        assert_eq!(payload.meta, report.metadata());
        assert_eq!(payload.base, cache.join("TRAP_REPORT_TEST").join("base.png"));
        assert!(payload.shade.exists());
    }

    #[test]
    fn test_title_cannot_escape_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let sample = fixture(tmp.path());
        let cache = tmp.path().join("cache");
        let outside = tmp.path().join("outside").to_string_lossy().into_owned();

        for title in ["../x", "/abs", "..", "a/b\\c", outside.as_str()] {
            let report = build_report(
                &MarkerBoard::new(&FlyTrapConfig::default()),
                sample.base_screenshot(),
                sample.shade_screenshot(),
                Some(title.to_string()),
            );
            let dir = write_to_directory(&report, &cache).unwrap();
            assert_eq!(dir.parent(), Some(cache.as_path()), "title {:?}", title);

            let archive = generate_compressed(&report, &cache).unwrap();
            assert_eq!(archive.parent(), Some(cache.as_path()), "title {:?}", title);
        }
        assert_eq!(file_name_for("../x"), "___x");
        assert_eq!(file_name_for("/abs"), "_abs");
        assert_eq!(file_name_for("  "), "report");
        assert_eq!(file_name_for("TRAP_REPORT_20140709_130509"), "TRAP_REPORT_20140709_130509");
        assert!(!tmp.path().join("outside").exists());
    }

    #[test]
    fn test_same_named_screenshots_do_not_clash() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = tmp.path().join("a");
        let shade_dir = tmp.path().join("b");
        fs::create_dir_all(&base_dir).unwrap();
        fs::create_dir_all(&shade_dir).unwrap();
        fs::write(base_dir.join(METADATA_FILE), b"base-bytes").unwrap();
        fs::write(shade_dir.join(METADATA_FILE), b"shade-bytes").unwrap();

        let report = build_report(
            &MarkerBoard::new(&FlyTrapConfig::default()),
            base_dir.join(METADATA_FILE),
            shade_dir.join(METADATA_FILE),
            Some("clash".into()),
        );
        let dir = write_to_directory(&report, &tmp.path().join("cache")).unwrap();
        assert_eq!(fs::read(dir.join(BASE_FILE)).unwrap(), b"base-bytes");
        assert_eq!(fs::read(dir.join(SHADE_FILE)).unwrap(), b"shade-bytes");
        let meta: ReportMetadata =
            serde_json::from_slice(&fs::read(dir.join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(meta.title, "clash");
    }

    #[test]
    fn test_missing_screenshot_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let report = fixture(tmp.path());
        fs::remove_file(report.shade_screenshot()).unwrap();

        let err = write_to_directory(&report, &tmp.path().join("cache")).unwrap_err();
        assert!(matches!(err, PackageError::Io { .. }));
    }
}
