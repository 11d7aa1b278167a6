// SPDX-License-Identifier: Apache-2.0

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{BuildError, BuildReport};
use relief_atlas_core::sha256_hex;
use relief_atlas_model::{
    artifact_paths, ArtifactChecksums, ArtifactManifest, ArtifactStats, GeoHierarchy, ManifestLock,
};

struct PublishLockGuard {
    lock_path: PathBuf,
}

impl Drop for PublishLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn acquire_publish_lock(lock_path: &Path) -> Result<PublishLockGuard, BuildError> {
    match OpenOptions::new().create_new(true).write(true).open(lock_path) {
        Ok(_) => Ok(PublishLockGuard {
            lock_path: lock_path.to_path_buf(),
        }),
        Err(e) => Err(BuildError(format!(
            "failed to acquire publish lock (another build in flight?): {e}"
        ))),
    }
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let mut f = fs::File::create(path)
        .map_err(|e| BuildError(format!("create {}: {e}", path.display())))?;
    f.write_all(bytes)
        .map_err(|e| BuildError(format!("write {}: {e}", path.display())))?;
    f.sync_all()
        .map_err(|e| BuildError(format!("sync {}: {e}", path.display())))?;
    Ok(())
}

fn sync_dir(dir: &Path) -> Result<(), BuildError> {
    let f = OpenOptions::new()
        .read(true)
        .open(dir)
        .map_err(|e| BuildError(format!("open {}: {e}", dir.display())))?;
    f.sync_all()
        .map_err(|e| BuildError(format!("sync {}: {e}", dir.display())))?;
    Ok(())
}

pub fn publish_artifact(
    root: &Path,
    hierarchy: &GeoHierarchy,
    report: &BuildReport,
) -> Result<ArtifactManifest, BuildError> {
    fs::create_dir_all(root).map_err(|e| BuildError(format!("create {}: {e}", root.display())))?;
    let paths = artifact_paths(root);
    let _guard = acquire_publish_lock(&paths.publish_lock)?;

    let hierarchy_bytes =
        serde_json::to_vec(hierarchy).map_err(|e| BuildError(format!("encode hierarchy: {e}")))?;
    let report_bytes =
        serde_json::to_vec(report).map_err(|e| BuildError(format!("encode report: {e}")))?;

    let manifest = ArtifactManifest::new(
        ArtifactChecksums {
            hierarchy_sha256: sha256_hex(&hierarchy_bytes),
            report_sha256: sha256_hex(&report_bytes),
        },
        ArtifactStats::from_hierarchy(hierarchy, report.rejected.len() as u64),
        report.source_total,
    );
    manifest
        .validate_strict()
        .map_err(|e| BuildError(format!("manifest failed strict validation: {e}")))?;
    let manifest_bytes =
        serde_json::to_vec(&manifest).map_err(|e| BuildError(format!("encode manifest: {e}")))?;
    let lock = ManifestLock::from_bytes(&manifest_bytes, &hierarchy_bytes);
    let lock_bytes =
        serde_json::to_vec(&lock).map_err(|e| BuildError(format!("encode lock: {e}")))?;

    let hierarchy_tmp = paths.hierarchy.with_extension("json.tmp");
    let report_tmp = paths.report.with_extension("json.tmp");
    let manifest_tmp = paths.manifest.with_extension("json.tmp");
    let lock_tmp = paths.manifest_lock.with_extension("lock.tmp");

    write_and_sync(&hierarchy_tmp, &hierarchy_bytes)?;
    write_and_sync(&report_tmp, &report_bytes)?;
    write_and_sync(&manifest_tmp, &manifest_bytes)?;
    write_and_sync(&lock_tmp, &lock_bytes)?;

    rename(&hierarchy_tmp, &paths.hierarchy)?;
    rename(&report_tmp, &paths.report)?;
    rename(&manifest_tmp, &paths.manifest)?;
    // The lock seals the publish; it goes last.
    rename(&lock_tmp, &paths.manifest_lock)?;
    sync_dir(root)?;

    Ok(manifest)
}

fn rename(from: &Path, to: &Path) -> Result<(), BuildError> {
    fs::rename(from, to)
        .map_err(|e| BuildError(format!("rename {} -> {}: {e}", from.display(), to.display())))
}
