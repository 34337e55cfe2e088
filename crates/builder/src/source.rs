//! Source acquisition: git clone, pinned archive download, or local copy

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tinybrew_errors::{BuildError, Error};
use tinybrew_events::{AppEvent, BuildEvent, EventEmitter};
use tinybrew_recipe::{ArchiveSource, GitSource, LocalSource, SourceMethod, SourceSpec};

use crate::environment::BuildEnvironment;

/// Fetch the recipe's source into the build workspace and return the
/// checkout root.
///
/// # Errors
///
/// Returns `BuildError::FetchFailed` when the clone/download fails,
/// `BuildError::HashMismatch` when a pinned archive checksum does not
/// match, and `BuildError::ExtractionFailed` when a downloaded archive
/// cannot be unpacked.
pub async fn fetch_source(env: &BuildEnvironment, spec: &SourceSpec) -> Result<PathBuf, Error> {
    match spec.method()? {
        SourceMethod::Git(git) => fetch_git(env, git).await,
        SourceMethod::Archive(archive) => fetch_archive(env, archive).await,
        SourceMethod::Local(local) => copy_local(env, local).await,
    }
}

async fn fetch_git(env: &BuildEnvironment, git: &GitSource) -> Result<PathBuf, Error> {
    if !env.network_allowed() {
        return Err(BuildError::FetchFailed {
            url: git.url.clone(),
            message: "network access is disabled".to_string(),
        }
        .into());
    }

    env.emit(AppEvent::Build(BuildEvent::FetchStarted {
        package: env.package().to_string(),
        source: format!("{} @ {}", git.url, git.git_ref),
    }));

    let target = env.work_dir().join("src");
    let target_str = target.display().to_string();
    let result = env
        .execute_command(
            "git",
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                &git.git_ref,
                &git.url,
                &target_str,
            ],
            None,
        )
        .await
        .map_err(|e| BuildError::FetchFailed {
            url: git.url.clone(),
            message: e.to_string(),
        })?;

    if !result.success {
        return Err(BuildError::FetchFailed {
            url: git.url.clone(),
            message: result.stderr,
        }
        .into());
    }

    env.emit(AppEvent::Build(BuildEvent::FetchCompleted {
        package: env.package().to_string(),
        path: target.clone(),
    }));

    Ok(target)
}

async fn fetch_archive(env: &BuildEnvironment, archive: &ArchiveSource) -> Result<PathBuf, Error> {
    if !env.network_allowed() {
        return Err(BuildError::FetchFailed {
            url: archive.url.clone(),
            message: "network access is disabled".to_string(),
        }
        .into());
    }

    env.emit(AppEvent::Build(BuildEvent::FetchStarted {
        package: env.package().to_string(),
        source: archive.url.clone(),
    }));

    let response = reqwest::get(&archive.url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| BuildError::FetchFailed {
            url: archive.url.clone(),
            message: e.to_string(),
        })?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BuildError::FetchFailed {
            url: archive.url.clone(),
            message: e.to_string(),
        })?;

    // Pinned mode: the checksum gates everything downstream
    verify_sha256(&bytes, &archive.sha256, &archive.url)?;

    let target = env.work_dir().join("src");
    let extract_target = target.clone();
    let data = bytes.to_vec();
    tokio::task::spawn_blocking(move || extract_tar_gz(&data, &extract_target))
        .await
        .map_err(|e| Error::internal(format!("extraction task failed: {e}")))??;

    let root = unwrap_single_dir(&target)?;

    env.emit(AppEvent::Build(BuildEvent::FetchCompleted {
        package: env.package().to_string(),
        path: root.clone(),
    }));

    Ok(root)
}

async fn copy_local(env: &BuildEnvironment, local: &LocalSource) -> Result<PathBuf, Error> {
    env.emit(AppEvent::Build(BuildEvent::FetchStarted {
        package: env.package().to_string(),
        source: local.path.display().to_string(),
    }));

    let source = local.path.clone();
    if !source.is_dir() {
        return Err(BuildError::FetchFailed {
            url: source.display().to_string(),
            message: "local source is not a directory".to_string(),
        }
        .into());
    }

    let target = env.work_dir().join("src");
    let copy_target = target.clone();
    tokio::task::spawn_blocking(move || copy_dir_recursive(&source, &copy_target))
        .await
        .map_err(|e| Error::internal(format!("copy task failed: {e}")))??;

    env.emit(AppEvent::Build(BuildEvent::FetchCompleted {
        package: env.package().to_string(),
        path: target.clone(),
    }));

    Ok(target)
}

fn verify_sha256(data: &[u8], expected: &str, url: &str) -> Result<(), Error> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let actual = format!("{:x}", hasher.finalize());

    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(BuildError::HashMismatch {
            file: url.to_string(),
            expected: expected.to_lowercase(),
            actual,
        }
        .into())
    }
}

fn extract_tar_gz(data: &[u8], target: &Path) -> Result<(), Error> {
    let decoder = flate2::read::GzDecoder::new(data);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(target)
        .map_err(|e| BuildError::ExtractionFailed {
            message: e.to_string(),
        })?;
    Ok(())
}

/// Release tarballs usually wrap everything in a single `name-version/`
/// directory; use that as the checkout root when present.
fn unwrap_single_dir(target: &Path) -> Result<PathBuf, Error> {
    let entries: Vec<_> = std::fs::read_dir(target)
        .map_err(|e| Error::io_with_path(&e, target))?
        .collect::<Result<_, _>>()
        .map_err(|e| Error::io_with_path(&e, target))?;

    if entries.len() == 1 && entries[0].path().is_dir() {
        Ok(entries[0].path())
    } else {
        Ok(target.to_path_buf())
    }
}

fn copy_dir_recursive(source: &Path, target: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(target).map_err(|e| Error::io_with_path(&e, target))?;
    for entry in std::fs::read_dir(source).map_err(|e| Error::io_with_path(&e, source))? {
        let entry = entry.map_err(|e| Error::io_with_path(&e, source))?;
        let dest = target.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io_with_path(&e, entry.path()))?;
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)
                .map_err(|e| Error::io_with_path(&e, entry.path()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinybrew_config::Config;

    fn test_env(root: &Path) -> BuildEnvironment {
        let mut config = Config::default();
        config.paths.work_path = Some(root.join("work"));
        config.paths.prefix_path = Some(root.join("prefix"));
        BuildEnvironment::new("demo", &config, None).unwrap()
    }

    #[test]
    fn test_sha256_round_trip() {
        // sha256 of the empty string
        let empty = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert!(verify_sha256(b"", empty, "url").is_ok());
        assert!(verify_sha256(b"x", empty, "url").is_err());
    }

    #[test]
    fn test_sha256_mismatch_reports_both_digests() {
        let err = verify_sha256(b"payload", &"0".repeat(64), "https://example.com/a.tar.gz")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("checksum mismatch"));
        assert!(message.contains(&"0".repeat(64)));
    }

    #[tokio::test]
    async fn test_copy_local_source() {
        let root = tempfile::tempdir().unwrap();
        let env = test_env(root.path());

        let src = root.path().join("project");
        std::fs::create_dir_all(src.join("cmd/tinyclaw")).unwrap();
        std::fs::write(src.join("cmd/tinyclaw/main.go"), "package main").unwrap();
        std::fs::write(src.join("go.mod"), "module example.com/tinyclaw").unwrap();

        let local = LocalSource { path: src };
        let checkout = copy_local(&env, &local).await.unwrap();
        assert!(checkout.join("cmd/tinyclaw/main.go").is_file());
        assert!(checkout.join("go.mod").is_file());
    }

    #[tokio::test]
    async fn test_local_source_must_be_a_directory() {
        let root = tempfile::tempdir().unwrap();
        let env = test_env(root.path());

        let local = LocalSource {
            path: root.path().join("missing"),
        };
        let err = copy_local(&env, &local).await.unwrap_err();
        assert!(err.to_string().contains("fetch failed"));
    }

    #[tokio::test]
    async fn test_git_fetch_refused_without_network() {
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.work_path = Some(root.path().join("work"));
        config.paths.prefix_path = Some(root.path().join("prefix"));
        config.build.network_access = false;
        let env = BuildEnvironment::new("demo", &config, None).unwrap();

        let git = GitSource {
            url: "https://example.com/tinyclaw.git".to_string(),
            git_ref: "main".to_string(),
        };
        let err = fetch_git(&env, &git).await.unwrap_err();
        assert!(err.to_string().contains("network access is disabled"));
    }

    #[test]
    fn test_extract_tar_gz_unpacks_release_layout() {
        let root = tempfile::tempdir().unwrap();

        // Build a gzipped tarball shaped like a release archive
        let data = b"package main";
        let mut header = tar::Header::new_gnu();
        header.set_size(u64::try_from(data.len()).unwrap());
        header.set_mode(0o644);
        header.set_cksum();

        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_data(&mut header, "tinyclaw-1.4.2/main.go", &data[..])
            .unwrap();
        let archive = builder.into_inner().unwrap().finish().unwrap();

        let target = root.path().join("src");
        extract_tar_gz(&archive, &target).unwrap();

        let checkout = unwrap_single_dir(&target).unwrap();
        assert!(checkout.ends_with("tinyclaw-1.4.2"));
        assert_eq!(
            std::fs::read_to_string(checkout.join("main.go")).unwrap(),
            "package main"
        );
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let root = tempfile::tempdir().unwrap();
        let err = extract_tar_gz(b"not a tarball", &root.path().join("src")).unwrap_err();
        assert!(err.to_string().contains("extraction failed"));
    }

    #[test]
    fn test_unwrap_single_dir() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("src");
        std::fs::create_dir_all(target.join("tinyclaw-1.4.2")).unwrap();
        let unwrapped = unwrap_single_dir(&target).unwrap();
        assert!(unwrapped.ends_with("tinyclaw-1.4.2"));

        // A second top-level entry keeps the root as-is
        std::fs::write(target.join("README"), "hi").unwrap();
        let kept = unwrap_single_dir(&target).unwrap();
        assert_eq!(kept, target);
    }
}
