//! `docker save` layouts: archive unpacking, manifest and layer handling.

use crate::error::{AcquisitionErrorKind, ErrorContext, ImageDiffError, Result};
use crate::model::relative_entry;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, warn};
use walkdir::WalkDir;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const MANIFEST_FILE: &str = "manifest.json";
const WHITEOUT_PREFIX: &str = ".wh.";
const OPAQUE_WHITEOUT: &str = ".wh..wh..opq";

/// Unpack a tar archive, gzip-compressed or not, into `dest`.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive).map_err(|e| ImageDiffError::io(archive, e))?;
    let mut reader = BufReader::new(file);
    let compressed = reader
        .fill_buf()
        .map_err(|e| ImageDiffError::io(archive, e))?
        .starts_with(&GZIP_MAGIC);

    fs::create_dir_all(dest).map_err(|e| ImageDiffError::io(dest, e))?;
    let unpacked = if compressed {
        unpack_from(GzDecoder::new(reader), dest)
    } else {
        unpack_from(reader, dest)
    };
    unpacked.map_err(|e| {
        ImageDiffError::acquisition(
            format!("unpacking {}", archive.display()),
            AcquisitionErrorKind::Archive(format!("{e} (into {})", dest.display())),
        )
    })
}

fn unpack_from<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_mtime(false);
    archive.unpack(dest)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestEntry {
    config: String,
    #[serde(default)]
    repo_tags: Option<Vec<String>>,
    #[serde(default)]
    layers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ImageConfig {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    #[serde(default)]
    created_by: Option<String>,
}

/// The files of an extracted `docker save` archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    root: PathBuf,
    config: PathBuf,
    layers: Vec<PathBuf>,
}

impl ImageLayout {
    /// Read `manifest.json` at the root of an extracted archive.
    ///
    /// Only the first image of a multi-image archive is used.
    pub fn load(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        let content =
            fs::read_to_string(&manifest_path).map_err(|e| ImageDiffError::io(&manifest_path, e))?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&content).map_err(|e| {
            ImageDiffError::acquisition(
                format!("parsing {}", manifest_path.display()),
                AcquisitionErrorKind::InvalidManifest(e.to_string()),
            )
        })?;

        if entries.len() > 1 {
            warn!(
                "Multiple images found in {}, diffing only the first",
                root.display()
            );
        }
        let entry = entries.into_iter().next().ok_or_else(|| {
            ImageDiffError::acquisition(
                format!("reading {}", manifest_path.display()),
                AcquisitionErrorKind::InvalidManifest("manifest lists no images".to_string()),
            )
        })?;
        if let Some(tags) = &entry.repo_tags {
            debug!("Image tags: {}", tags.join(", "));
        }

        let config = archive_member(root, &manifest_path, &entry.config)?;
        let layers = entry
            .layers
            .iter()
            .map(|layer| archive_member(root, &manifest_path, layer))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            config,
            layers,
        })
    }

    /// Layer archives, base layer first.
    #[must_use]
    pub fn layer_archives(&self) -> &[PathBuf] {
        &self.layers
    }

    /// The `created_by` command of every history step, trimmed.
    pub fn history(&self) -> Result<Vec<String>> {
        let content =
            fs::read_to_string(&self.config).map_err(|e| ImageDiffError::io(&self.config, e))?;
        let config: ImageConfig = serde_json::from_str(&content).map_err(|e| {
            ImageDiffError::acquisition(
                format!("parsing {}", self.config.display()),
                AcquisitionErrorKind::InvalidManifest(e.to_string()),
            )
        })?;
        Ok(config
            .history
            .into_iter()
            .map(|step| step.created_by.unwrap_or_default().trim().to_string())
            .collect())
    }

    /// Unpack every layer into its own directory below `dest`.
    ///
    /// Directories are named `<index>-<layer id>` and returned in layer order.
    pub fn unpack_layers(&self, dest: &Path) -> Result<Vec<PathBuf>> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let dir = dest.join(format!("{index}-{}", layer_id(layer)));
                unpack_archive(layer, &dir)
                    .with_context(|| format!("layer {index} of {}", self.root.display()))?;
                Ok(dir)
            })
            .collect()
    }
}

/// Resolve a path named by the manifest to a file inside the archive root.
///
/// The path must be relative and may not climb out of `root`, neither
/// lexically nor through a symlink unpacked from the archive.
fn archive_member(root: &Path, manifest: &Path, member: &str) -> Result<PathBuf> {
    let invalid = |reason: &str| {
        ImageDiffError::acquisition(
            format!("reading {}", manifest.display()),
            AcquisitionErrorKind::InvalidManifest(format!("{member:?} {reason}")),
        )
    };

    let relative = Path::new(member);
    let lexically_contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && relative.components().any(|c| matches!(c, Component::Normal(_)));
    if !lexically_contained {
        return Err(invalid("is not a path inside the archive"));
    }

    let path = root.join(relative);
    let resolved = fs::canonicalize(&path).map_err(|e| ImageDiffError::io(&path, e))?;
    let canonical_root = fs::canonicalize(root).map_err(|e| ImageDiffError::io(root, e))?;
    if !resolved.starts_with(&canonical_root) {
        return Err(invalid("resolves outside the archive"));
    }
    Ok(path)
}

/// Short identifier for a layer archive path.
///
/// Legacy layouts store `<id>/layer.tar`, OCI layouts `blobs/sha256/<id>`.
fn layer_id(layer: &Path) -> String {
    let named = if layer.file_name() == Some(OsStr::new("layer.tar")) {
        layer.parent().and_then(Path::file_name)
    } else {
        layer.file_name()
    };
    let id = named.map(OsStr::to_string_lossy).unwrap_or_default();
    id.trim_end_matches(".tar").chars().take(12).collect()
}

/// Apply one unpacked layer on top of a root filesystem.
///
/// `.wh.<name>` removes `<name>` from the lower layers and `.wh..wh..opq`
/// empties its directory before the layer's own entries are copied in.
pub fn apply_layer(layer: &Path, rootfs: &Path) -> Result<()> {
    let walk = || WalkDir::new(layer).min_depth(1).follow_links(false).sort_by_file_name();

    for entry in walk() {
        let entry = walk_entry(entry, layer)?;
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with(WHITEOUT_PREFIX) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(layer) else {
            continue;
        };
        let Some(parent) = rootfs_dir(rootfs, relative.parent().unwrap_or(Path::new("")))? else {
            debug!("Whiteout {} has nothing below it", relative_entry(relative));
            continue;
        };
        if name == OPAQUE_WHITEOUT {
            clear_dir_contents(&parent)?;
        } else if let Some(hidden) = hidden_name(&name) {
            let hidden = parent.join(hidden);
            remove_path(&hidden).map_err(|e| ImageDiffError::io(&hidden, e))?;
        } else {
            warn!("Ignoring malformed whiteout {}", relative_entry(relative));
        }
    }

    for entry in walk() {
        let entry = walk_entry(entry, layer)?;
        if entry.file_name().to_string_lossy().starts_with(WHITEOUT_PREFIX) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(layer) else {
            continue;
        };
        let target = rootfs.join(relative);
        let file_type = entry.file_type();

        let copied = if file_type.is_dir() {
            copy_dir_entry(&target)
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)
        } else if file_type.is_file() {
            remove_path(&target).and_then(|()| fs::copy(entry.path(), &target).map(|_| ()))
        } else {
            debug!("Skipping special file {}", relative_entry(relative));
            Ok(())
        };
        copied.map_err(|e| ImageDiffError::io(&target, e))?;
    }
    Ok(())
}

/// The real directory at `relative` below `rootfs`, without following symlinks.
///
/// `None` when any component is missing or is not a directory.
fn rootfs_dir(rootfs: &Path, relative: &Path) -> Result<Option<PathBuf>> {
    let mut dir = rootfs.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return Ok(None);
        };
        dir.push(part);
        match fs::symlink_metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(meta) => {
                if meta.file_type().is_symlink() {
                    warn!("Not following symlink {} for a whiteout", dir.display());
                }
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ImageDiffError::io(&dir, e)),
        }
    }
    Ok(Some(dir))
}

/// The entry name a `.wh.<name>` whiteout hides, if it names a single entry.
fn hidden_name(whiteout: &str) -> Option<&str> {
    let hidden = whiteout.strip_prefix(WHITEOUT_PREFIX)?;
    let single = !hidden.is_empty()
        && hidden != "."
        && hidden != ".."
        && !hidden.contains(['/', '\\']);
    single.then_some(hidden)
}

fn walk_entry(
    entry: std::result::Result<walkdir::DirEntry, walkdir::Error>,
    layer: &Path,
) -> Result<walkdir::DirEntry> {
    entry.map_err(|e| {
        let path = e.path().unwrap_or(layer).to_path_buf();
        match e.into_io_error() {
            Some(io) => ImageDiffError::io(path, io),
            None => ImageDiffError::validation(format!("filesystem loop in {}", path.display())),
        }
    })
}

/// Make `target` a real directory, replacing whatever else sits there.
fn copy_dir_entry(target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            fs::remove_file(target)?;
            fs::create_dir_all(target)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir_all(target),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    remove_path(target)?;
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, _target: &Path) -> io::Result<()> {
    warn!("Symlinks are not supported on this platform, skipping {}", source.display());
    Ok(())
}

/// Remove a file, symlink or directory tree. A missing path is not an error.
fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn clear_dir_contents(dir: &Path) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ImageDiffError::io(dir, e)),
    };
    for entry in entries {
        let path = entry.map_err(|e| ImageDiffError::io(dir, e))?.path();
        remove_path(&path).map_err(|e| ImageDiffError::io(&path, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_unpack_plain_and_gzip() {
        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("plain.tar");
        fs::write(&plain, tar_bytes(&[("etc/hosts", b"127.0.0.1")])).unwrap();

        let gz = tmp.path().join("compressed.tar.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut encoder, &tar_bytes(&[("a.txt", b"hi")])).unwrap();
        fs::write(&gz, encoder.finish().unwrap()).unwrap();

        unpack_archive(&plain, &tmp.path().join("out1")).unwrap();
        unpack_archive(&gz, &tmp.path().join("out2")).unwrap();
        assert_eq!(
            fs::read(tmp.path().join("out1/etc/hosts")).unwrap(),
            b"127.0.0.1"
        );
        assert_eq!(fs::read(tmp.path().join("out2/a.txt")).unwrap(), b"hi");
    }

    #[test]
    fn test_unpack_garbage_is_archive_error() {
        let tmp = TempDir::new().unwrap();
        let bad = tmp.path().join("bad.tar");
        fs::write(&bad, vec![7u8; 1024]).unwrap();
        let err = unpack_archive(&bad, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(
            err,
            ImageDiffError::Acquisition {
                source: AcquisitionErrorKind::Archive(_),
                ..
            }
        ));
    }

    #[test]
    fn test_layout_history_and_layers() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(
            root.join("manifest.json"),
            r#"[{"Config":"cfg.json","RepoTags":["demo:1"],"Layers":["abc123def4567890/layer.tar"]}]"#,
        )
        .unwrap();
        fs::write(
            root.join("cfg.json"),
            r#"{"history":[{"created_by":" /bin/sh -c #(nop) ADD file:abc in / "},{"empty_layer":true}]}"#,
        )
        .unwrap();
        fs::create_dir(root.join("abc123def4567890")).unwrap();
        fs::write(
            root.join("abc123def4567890/layer.tar"),
            tar_bytes(&[("bin/sh", b"elf")]),
        )
        .unwrap();

        let layout = ImageLayout::load(root).unwrap();
        assert_eq!(
            layout.history().unwrap(),
            vec!["/bin/sh -c #(nop) ADD file:abc in /".to_string(), String::new()]
        );

        let layers = layout.unpack_layers(&root.join("layers")).unwrap();
        assert_eq!(layers, vec![root.join("layers/0-abc123def456")]);
        assert!(layers[0].join("bin/sh").is_file());
    }

    #[test]
    fn test_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        assert!(ImageLayout::load(tmp.path()).unwrap_err().is_io());
    }

    #[test]
    fn test_empty_manifest_is_invalid() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("manifest.json"), "[]").unwrap();
        assert!(matches!(
            ImageLayout::load(tmp.path()),
            Err(ImageDiffError::Acquisition {
                source: AcquisitionErrorKind::InvalidManifest(_),
                ..
            })
        ));
    }

    fn load_manifest(manifest: &str) -> Result<ImageLayout> {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("manifest.json"), manifest).unwrap();
        fs::write(tmp.path().join("cfg.json"), "{}").unwrap();
        ImageLayout::load(tmp.path())
    }

    fn is_invalid_manifest(result: &Result<ImageLayout>) -> bool {
        matches!(
            result,
            Err(ImageDiffError::Acquisition {
                source: AcquisitionErrorKind::InvalidManifest(_),
                ..
            })
        )
    }

    #[test]
    fn test_manifest_paths_stay_inside_archive() {
        assert!(is_invalid_manifest(&load_manifest(
            r#"[{"Config":"../../etc/passwd","Layers":[]}]"#
        )));
        assert!(is_invalid_manifest(&load_manifest(
            r#"[{"Config":"cfg.json","Layers":["/etc/passwd"]}]"#
        )));
        assert!(is_invalid_manifest(&load_manifest(
            r#"[{"Config":"cfg.json","Layers":["abc/../../layer.tar"]}]"#
        )));
        assert!(is_invalid_manifest(&load_manifest(r#"[{"Config":"","Layers":[]}]"#)));
        assert!(load_manifest(r#"[{"Config":"./cfg.json","Layers":[]}]"#).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_manifest_symlink_out_of_archive_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("saved");
        fs::create_dir(&root).unwrap();
        fs::write(tmp.path().join("secret.json"), "{}").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("secret.json"), root.join("cfg.json")).unwrap();
        fs::write(
            root.join("manifest.json"),
            r#"[{"Config":"cfg.json","Layers":[]}]"#,
        )
        .unwrap();

        assert!(is_invalid_manifest(&ImageLayout::load(&root)));
    }

    #[test]
    fn test_layer_ids() {
        assert_eq!(layer_id(Path::new("/x/0123456789abcdef/layer.tar")), "0123456789ab");
        assert_eq!(layer_id(Path::new("/x/blobs/sha256/fedcba9876543210")), "fedcba987654");
    }

    #[test]
    fn test_apply_layers_with_whiteouts() {
        let tmp = TempDir::new().unwrap();
        let lower = tmp.path().join("lower");
        let upper = tmp.path().join("upper");
        let rootfs = tmp.path().join("rootfs");
        fs::create_dir_all(lower.join("etc/conf.d")).unwrap();
        fs::write(lower.join("etc/passwd"), "root").unwrap();
        fs::write(lower.join("etc/motd"), "hello").unwrap();
        fs::write(lower.join("etc/conf.d/old"), "1").unwrap();
        fs::create_dir_all(upper.join("etc/conf.d")).unwrap();
        fs::write(upper.join("etc/.wh.motd"), "").unwrap();
        fs::write(upper.join("etc/conf.d/.wh..wh..opq"), "").unwrap();
        fs::write(upper.join("etc/conf.d/new"), "2").unwrap();
        fs::write(upper.join("etc/passwd"), "root\nuser").unwrap();
        fs::create_dir_all(&rootfs).unwrap();

        apply_layer(&lower, &rootfs).unwrap();
        apply_layer(&upper, &rootfs).unwrap();

        assert_eq!(fs::read_to_string(rootfs.join("etc/passwd")).unwrap(), "root\nuser");
        assert!(!rootfs.join("etc/motd").exists());
        assert!(!rootfs.join("etc/conf.d/old").exists());
        assert!(rootfs.join("etc/conf.d/new").is_file());
        assert!(!rootfs.join("etc/.wh.motd").exists());
    }

    #[test]
    fn test_file_replaces_directory() {
        let tmp = TempDir::new().unwrap();
        let lower = tmp.path().join("lower");
        let upper = tmp.path().join("upper");
        let rootfs = tmp.path().join("rootfs");
        fs::create_dir_all(lower.join("opt/app")).unwrap();
        fs::write(lower.join("opt/app/bin"), "x").unwrap();
        fs::create_dir_all(upper.join("opt")).unwrap();
        fs::write(upper.join("opt/app"), "now a file").unwrap();
        fs::create_dir_all(&rootfs).unwrap();

        apply_layer(&lower, &rootfs).unwrap();
        apply_layer(&upper, &rootfs).unwrap();
        assert!(rootfs.join("opt/app").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_whiteouts_never_follow_lower_symlinks() {
        let tmp = TempDir::new().unwrap();
        let host = tmp.path().join("host");
        let lower = tmp.path().join("lower");
        let upper = tmp.path().join("upper");
        let rootfs = tmp.path().join("rootfs");
        fs::create_dir_all(&host).unwrap();
        fs::write(host.join("precious"), "keep").unwrap();
        fs::write(host.join("other"), "keep").unwrap();
        fs::create_dir_all(&lower).unwrap();
        std::os::unix::fs::symlink(&host, lower.join("etc")).unwrap();
        fs::create_dir_all(upper.join("etc")).unwrap();
        fs::write(upper.join("etc/.wh.precious"), "").unwrap();
        fs::write(upper.join("etc/.wh..wh..opq"), "").unwrap();
        fs::write(upper.join("etc/hosts"), "localhost").unwrap();
        fs::create_dir_all(&rootfs).unwrap();

        apply_layer(&lower, &rootfs).unwrap();
        assert!(fs::symlink_metadata(rootfs.join("etc")).unwrap().file_type().is_symlink());
        apply_layer(&upper, &rootfs).unwrap();

        assert!(host.join("precious").is_file());
        assert!(host.join("other").is_file());
        assert!(!fs::symlink_metadata(rootfs.join("etc")).unwrap().file_type().is_symlink());
        assert!(rootfs.join("etc/hosts").is_file());
        assert!(!host.join("hosts").exists());
    }

    #[test]
    fn test_dot_whiteouts_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let lower = tmp.path().join("lower");
        let upper = tmp.path().join("upper");
        let rootfs = tmp.path().join("work/rootfs");
        fs::create_dir_all(lower.join("etc")).unwrap();
        fs::write(lower.join("etc/hosts"), "localhost").unwrap();
        fs::create_dir_all(&rootfs).unwrap();
        fs::write(tmp.path().join("work/sibling"), "").unwrap();
        fs::create_dir_all(upper.join("etc")).unwrap();
        fs::write(upper.join(".wh..."), "").unwrap();
        fs::write(upper.join("etc/.wh.."), "").unwrap();

        apply_layer(&lower, &rootfs).unwrap();
        apply_layer(&upper, &rootfs).unwrap();

        assert!(rootfs.join("etc/hosts").is_file());
        assert!(tmp.path().join("work/sibling").is_file());
    }

    #[test]
    fn test_hidden_names() {
        assert_eq!(hidden_name(".wh.motd"), Some("motd"));
        assert_eq!(hidden_name(".wh..hidden"), Some(".hidden"));
        assert_eq!(hidden_name(".wh."), None);
        assert_eq!(hidden_name(".wh.."), None);
        assert_eq!(hidden_name(".wh..."), None);
        assert_eq!(hidden_name("motd"), None);
    }
}
