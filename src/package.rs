//! Plugin packaging: zip a plugin directory for distribution, leaving out
//! Python bytecode caches.
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{Error, Result};

/// True for `.pyc` files and for anything below a `__pycache__` directory.
/// `rel` is relative to the plugin directory.
pub fn is_excluded(rel: &Path) -> bool {
    let is_pyc = rel
        .file_name()
        .map(|n| n.to_string_lossy().ends_with(".pyc"))
        .unwrap_or(false);
    let in_cache = rel
        .parent()
        .map(|dir| {
            dir.components().any(|c| match c {
                Component::Normal(name) => name.to_string_lossy().contains("__pycache__"),
                _ => false,
            })
        })
        .unwrap_or(false);
    is_pyc || in_cache
}

/// Archive entry name: relative path with `/` separators
fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk(root, &path, out)?;
        } else if path.is_file() {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| Error::Processing(e.to_string()))?
                .to_path_buf();
            if is_excluded(&rel) {
                debug!("Skipping {:?}", rel);
                continue;
            }
            out.push(rel);
        }
    }
    Ok(())
}

/// Files to package, relative to `plugin_dir`, in sorted order
pub fn collect_plugin_files(plugin_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(plugin_dir, plugin_dir, &mut files)?;
    files.sort();
    Ok(files)
}

/// Archive location for a plugin directory: `<parent>/<name>.zip`
pub fn archive_path(plugin_dir: &Path) -> Result<PathBuf> {
    let name = plugin_dir.file_name().ok_or(Error::InvalidArgument {
        arg: "plugin_dir",
        value: plugin_dir.display().to_string(),
    })?;
    let parent = plugin_dir.parent().unwrap_or(Path::new("/"));
    let mut file_name = name.to_os_string();
    file_name.push(".zip");
    Ok(parent.join(file_name))
}

/// Zip `plugin_dir` into `<parent>/<name>.zip`, replacing any previous archive.
///
/// Entries are deflated and named relative to the plugin directory. The
/// archive is written to a temporary file next to the target and then
/// persisted over it. Returns the archive path.
pub fn package_plugin(plugin_dir: &Path) -> Result<PathBuf> {
    let plugin_dir = fs::canonicalize(plugin_dir)?;
    if !plugin_dir.is_dir() {
        return Err(Error::NotADirectory(plugin_dir));
    }
    let out = archive_path(&plugin_dir)?;
    let parent = out.parent().unwrap_or(Path::new("/"));

    let files = collect_plugin_files(&plugin_dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".rasterstretch-")
        .suffix(".zip.part")
        .tempfile_in(parent)?;

    {
        let mut zip = ZipWriter::new(tmp.as_file_mut());
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for rel in &files {
            zip.start_file(entry_name(rel), options)?;
            let mut src = File::open(plugin_dir.join(rel))?;
            std::io::copy(&mut src, &mut zip)?;
        }
        zip.finish()?;
    }

    if out.exists() {
        fs::remove_file(&out)?;
    }
    tmp.persist(&out).map_err(|e| Error::Io(e.error))?;

    info!("Packaged {} file(s) from {:?} into {:?}", files.len(), plugin_dir, out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_bytecode_and_caches() {
        assert!(is_excluded(Path::new("module.pyc")));
        assert!(is_excluded(Path::new("pkg/__pycache__/module.cpython-312.py")));
        assert!(is_excluded(Path::new("__pycache__/x.txt")));
        assert!(!is_excluded(Path::new("pkg/module.py")));
        assert!(!is_excluded(Path::new("metadata.txt")));
        assert!(!is_excluded(Path::new("icons/icon.png")));
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let rel: PathBuf = ["ui", "forms", "dock.ui"].iter().collect();
        assert_eq!(entry_name(&rel), "ui/forms/dock.ui");
    }

    #[test]
    fn archive_sits_next_to_plugin_dir() {
        assert_eq!(
            archive_path(Path::new("/work/plugins/raster_stretch")).unwrap(),
            PathBuf::from("/work/plugins/raster_stretch.zip")
        );
        assert!(archive_path(Path::new("/")).is_err());
    }

    #[test]
    fn file_instead_of_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plugin.py");
        std::fs::write(&file, "x = 1\n").unwrap();
        assert!(matches!(package_plugin(&file), Err(Error::NotADirectory(_))));
    }
}
