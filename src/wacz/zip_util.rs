//! ZIP container assembly and archive naming

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Builds the output filename for a finished archive
///
/// Title characters outside `[a-zA-Z0-9-_]` are replaced with underscores.
pub fn archive_filename(title: &str, created: DateTime<Utc>, request_id: i64) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "wacz_{}_{}_{}.wacz",
        sanitized,
        created.format("%Y-%m-%d_%H-%M-%S"),
        request_id
    )
}

/// Zips a directory tree into `dest`, preserving relative paths
pub fn zip_directory(src: &Path, dest: &Path) -> crate::Result<()> {
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();

    add_directory(&mut writer, src, src, options)?;

    writer.finish()?;
    Ok(())
}

fn add_directory(
    writer: &mut ZipWriter<File>,
    root: &Path,
    dir: &Path,
    options: FileOptions,
) -> crate::Result<()> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    for path in paths {
        let relative = path
            .strip_prefix(root)
            .map_err(|e| crate::WaczError::ArchiveBuild(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if path.is_dir() {
            writer.add_directory(name, options)?;
            add_directory(writer, root, &path, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, writer)?;
        }
    }

    Ok(())
}
