//! Gzip-compressed tarball extraction.
//!
//! Extraction runs in two passes. The first writes directories and files and
//! records links, the second recreates links once their targets exist.
//! Directory modes are applied last so read-only directories can still be
//! populated.

use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::{debug, trace};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A link recorded during the first pass.
#[derive(Debug)]
enum PendingLink {
    Symbolic {
        relative: PathBuf,
        target: PathBuf,
    },
    Hard {
        relative: PathBuf,
        original: PathBuf,
    },
}

/// Unpack a `.tar.gz` stream into `destination`, dropping the first
/// `strip_components` path components of every entry.
pub fn extract(mut reader: impl Read, destination: &Path, strip_components: usize) -> Result<()> {
    let mut magic = [0u8; 2];
    reader
        .read_exact(&mut magic)
        .map_err(|source| Error::GzipReader { source })?;
    if magic != GZIP_MAGIC {
        return Err(Error::GzipReader {
            source: io::Error::new(io::ErrorKind::InvalidData, "missing gzip header"),
        });
    }

    let mut archive = Archive::new(GzDecoder::new(io::Cursor::new(magic).chain(reader)));
    let mut links = Vec::new();
    let mut directory_modes = Vec::new();
    let mut entries_written = 0usize;

    let entries = archive
        .entries()
        .map_err(|source| Error::TarRead { source })?;
    for entry in entries {
        let mut entry = entry.map_err(|source| Error::TarRead { source })?;
        let raw_path = entry
            .path()
            .map_err(|source| Error::TarRead { source })?
            .into_owned();
        let entry_type = entry.header().entry_type();

        let Some(relative) = strip(&raw_path, strip_components, entry_type)? else {
            trace!(path = ?raw_path, "Skipping stripped entry");
            continue;
        };
        let target = destination.join(&relative);
        let mode = entry.header().mode().ok();
        trace!(path = ?relative, ?entry_type, "Extracting entry");

        match entry_type {
            EntryType::Directory => {
                create_dir(&target)?;
                if let Some(mode) = mode {
                    directory_modes.push((target, mode));
                }
            }
            EntryType::Regular | EntryType::Continuous => {
                if let Some(parent) = target.parent() {
                    create_dir(parent)?;
                }
                let mut file = File::create(&target).map_err(|source| Error::CreateFile {
                    path: target.as_path().into(),
                    source,
                })?;
                io::copy(&mut entry, &mut file).map_err(|source| Error::CreateFile {
                    path: target.as_path().into(),
                    source,
                })?;
                if let Some(mode) = mode {
                    set_mode(&target, mode).map_err(|source| Error::CreateFile {
                        path: target.as_path().into(),
                        source,
                    })?;
                }
            }
            EntryType::Symlink => {
                let link = link_name(&entry)?;
                if link.as_os_str().is_empty() {
                    return Err(Error::symlink(&target, "", "link target is empty", None));
                }
                links.push(PendingLink::Symbolic {
                    relative,
                    target: link,
                });
            }
            EntryType::Link => {
                let link = link_name(&entry)?;
                let original = strip(&link, strip_components, entry_type)?.ok_or_else(|| {
                    Error::CreateFile {
                        path: target.as_path().into(),
                        source: io::Error::new(
                            io::ErrorKind::InvalidData,
                            "hard link target was stripped",
                        ),
                    }
                })?;
                links.push(PendingLink::Hard { relative, original });
            }
            other => {
                trace!(path = ?relative, entry_type = ?other, "Ignoring unsupported entry type");
                continue;
            }
        }
        entries_written += 1;
    }

    for link in &links {
        create_link(destination, link)?;
    }

    for (path, mode) in directory_modes.iter().rev() {
        set_mode(path, *mode).map_err(|source| Error::CreateDirectory {
            path: path.as_path().into(),
            source,
        })?;
    }

    debug!(
        ?destination,
        entries = entries_written,
        links = links.len(),
        "Extracted archive"
    );
    Ok(())
}

/// Remove leading components and reject paths that climb out of the
/// destination. `None` means nothing is left after stripping.
fn strip(path: &Path, strip_components: usize, entry_type: EntryType) -> Result<Option<PathBuf>> {
    let mut normal = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normal.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                let source = io::Error::new(
                    io::ErrorKind::InvalidData,
                    "entry path escapes the destination",
                );
                let path = path.into();
                return Err(if entry_type == EntryType::Directory {
                    Error::CreateDirectory { path, source }
                } else {
                    Error::CreateFile { path, source }
                });
            }
        }
    }

    if normal.len() <= strip_components {
        return Ok(None);
    }
    Ok(Some(normal[strip_components..].iter().collect()))
}

fn link_name<R: Read>(entry: &tar::Entry<'_, R>) -> Result<PathBuf> {
    let name = entry
        .link_name()
        .map_err(|source| Error::TarRead { source })?;
    Ok(name.map(|n| n.into_owned()).unwrap_or_default())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDirectory {
        path: path.into(),
        source,
    })
}

fn create_link(destination: &Path, link: &PendingLink) -> Result<()> {
    match link {
        PendingLink::Symbolic { relative, target } => {
            let path = destination.join(relative);
            let display_target = target.to_string_lossy();
            if crosses_symlink(destination, relative) {
                return Err(Error::symlink(
                    &path,
                    display_target,
                    "link path escapes the destination",
                    None,
                ));
            }
            if target.is_relative() && !stays_inside(relative, target) {
                return Err(Error::symlink(
                    &path,
                    display_target,
                    "link target escapes the destination",
                    None,
                ));
            }
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
            remove_existing(&path)
                .and_then(|()| symlink(target, &path))
                .map_err(|source| {
                    Error::symlink(&path, display_target, "could not create link", Some(source))
                })?;
            trace!(?path, ?target, "Created symlink");
        }
        PendingLink::Hard { relative, original } => {
            let path = destination.join(relative);
            if crosses_symlink(destination, relative) || crosses_symlink(destination, original) {
                return Err(Error::CreateFile {
                    path: path.as_path().into(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        "link path escapes the destination",
                    ),
                });
            }
            let original = destination.join(original);
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
            remove_existing(&path)
                .and_then(|()| fs::hard_link(&original, &path))
                .map_err(|source| Error::CreateFile {
                    path: path.as_path().into(),
                    source,
                })?;
            trace!(?path, ?original, "Created hard link");
        }
    }
    Ok(())
}

/// Whether a relative `target` resolved from the directory holding `link`
/// stays within the extraction root.
fn stays_inside(link: &Path, target: &Path) -> bool {
    let mut depth = link.components().count().saturating_sub(1);
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// Whether any parent directory of `relative` under `destination` is a
/// symlink, which would send the link outside the lexical path.
fn crosses_symlink(destination: &Path, relative: &Path) -> bool {
    let mut current = destination.to_path_buf();
    let Some(parent) = relative.parent() else {
        return false;
    };
    parent.components().any(|component| {
        current.push(component);
        fs::symlink_metadata(&current).is_ok_and(|meta| meta.file_type().is_symlink())
    })
}

fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, path: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, path)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are only supported on unix",
    ))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
