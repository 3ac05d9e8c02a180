//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Every helper resolves an ambient directory first and then works relative to
//! it, so callers only ever hold a capability for the directory they touch.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};
use std::path::Component;

const TEMP_ATTEMPTS: u32 = 16;

/// Open a directory using ambient authority.
pub fn open_ambient_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
}

/// Resolve an ambient directory for the given path and return the directory with the file name.
///
/// A bare file name resolves against the current directory.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = open_ambient_dir(parent_or_current(path))?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists, handling absolute paths safely for cap-std.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_os_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)?;
    Ok(())
}

/// Read a file's bytes, returning `None` when it does not exist.
///
/// A missing parent directory counts as a missing file. No encoding is
/// assumed, so callers decide how to treat invalid text.
pub fn read_if_exists(path: &Utf8Path) -> io::Result<Option<Vec<u8>>> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    match dir.read(name.as_str()) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Replace the contents of `path` with `contents` in one step.
///
/// The data is written to a hidden temporary file next to the target, flushed
/// to disk, and renamed over the target. Readers see either the old file or
/// the new one. On failure the temporary file is removed and the target is
/// left as it was.
pub fn write_atomically(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let (dir, name) = open_dir_and_file(path)?;
    let (temp_name, file) = create_temp_file(&dir, &name)?;

    let written = write_and_sync(file, contents)
        .and_then(|()| dir.rename(temp_name.as_str(), &dir, name.as_str()));
    if let Err(err) = written {
        if let Err(cleanup) = dir.remove_file(temp_name.as_str()) {
            log::warn!("failed to remove temporary file {temp_name}: {cleanup}");
        }
        return Err(err);
    }
    Ok(())
}

/// Split an absolute or relative parent path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        // Unix-style absolute path.
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = open_ambient_dir(&base)?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;

    Ok((dir, relative))
}

fn parent_or_current(path: &Utf8Path) -> &Utf8Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    }
}

fn write_and_sync(mut file: fs_utf8::File, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents)?;
    file.sync_all()
}

fn create_temp_file(dir: &fs_utf8::Dir, name: &str) -> io::Result<(String, fs_utf8::File)> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let pid = std::process::id();
    for attempt in 0..TEMP_ATTEMPTS {
        let temp_name = format!(".{name}.{pid}-{attempt}.tmp");
        match dir.open_with(temp_name.as_str(), &options) {
            Ok(file) => return Ok((temp_name, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free temporary name for {name}"),
    ))
}
