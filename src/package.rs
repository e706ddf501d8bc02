//! Deployment package builder.
//!
//! Zips a function's source directory into `<output_dir>/<id>.zip`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{DeployError, Result};

/// Generate a fresh package id. Also used as the function name on create.
pub fn new_package_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("lambench-{}", &id[..12])
}

/// Build a deflated zip of everything under `source_dir`.
///
/// Entry names are relative to `source_dir` and `/` separated. Hidden entries
/// (names starting with `.`) are left out, matching a plain `**/*` glob.
pub fn build_package(source_dir: &Path, output_dir: &Path, package_id: &str) -> Result<PathBuf> {
    if !source_dir.is_dir() {
        return Err(DeployError::packaging(
            source_dir,
            "source directory does not exist",
        ));
    }
    fs::create_dir_all(output_dir).map_err(|e| DeployError::io(output_dir, e))?;

    let zip_path = output_dir.join(format!("{}.zip", package_id));
    let file = File::create(&zip_path).map_err(|e| DeployError::packaging(&zip_path, e))?;
    let mut zip = ZipWriter::new(file);

    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let dir_options = SimpleFileOptions::default().unix_permissions(0o755);

    let mut file_count = 0usize;
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| DeployError::packaging(source_dir, e))?;
        let name = entry_name(source_dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(name, dir_options)
                .map_err(|e| DeployError::packaging(entry.path(), e))?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, file_options)
                .map_err(|e| DeployError::packaging(entry.path(), e))?;
            let mut source =
                File::open(entry.path()).map_err(|e| DeployError::packaging(entry.path(), e))?;
            io::copy(&mut source, &mut zip).map_err(|e| DeployError::packaging(entry.path(), e))?;
            file_count += 1;
        } else {
            tracing::debug!("skipping {} (not a regular file)", entry.path().display());
        }
    }

    zip.finish()
        .map_err(|e| DeployError::packaging(&zip_path, e))?;

    let size = fs::metadata(&zip_path)
        .map(|m| m.len())
        .map_err(|e| DeployError::io(&zip_path, e))?;
    tracing::debug!(
        "packaged {} files from {} into {} ({:.2} KB)",
        file_count,
        source_dir.display(),
        zip_path.display(),
        size as f64 / 1024.0
    );

    Ok(zip_path)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| DeployError::packaging(path, e))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
