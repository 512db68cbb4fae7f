//! Artifact harvesting from the workspace output folder

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use super::error::{BuildError, Result};
use super::types::HarvestOutcome;

/// Find a file directly under `output_dir` whose name contains `token`
/// (case-insensitive).
///
/// When several files match, the first one in directory enumeration order
/// is returned. That order is platform dependent, so which match wins is
/// unspecified.
pub fn find_artifact(output_dir: &Path, token: &str) -> Result<Option<PathBuf>> {
    if !output_dir.is_dir() {
        return Ok(None);
    }

    let token = token.to_lowercase();
    let mut matches = Vec::new();
    for entry in fs::read_dir(output_dir).map_err(|e| BuildError::io("read", output_dir, e))? {
        let entry = entry.map_err(|e| BuildError::io("read", output_dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().to_lowercase().contains(&token) {
            matches.push(path);
        }
    }

    if matches.len() > 1 {
        tracing::debug!(
            "{} artifacts match, taking {} and ignoring {:?}",
            matches.len(),
            matches[0].display(),
            &matches[1..]
        );
    }

    Ok(matches.into_iter().next())
}

/// Copy the matching artifact to `destination`.
///
/// No match is a quiet success ([`HarvestOutcome::NoArtifact`]). An existing
/// destination is never overwritten.
pub fn harvest(output_dir: &Path, token: &str, destination: &Path) -> Result<HarvestOutcome> {
    let Some(artifact) = find_artifact(output_dir, token)? else {
        tracing::warn!("No artifact matching {:?} in {}", token, output_dir.display());
        return Ok(HarvestOutcome::NoArtifact);
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io("create", parent, e))?;
    }

    let bytes = copy_new(&artifact, destination)?;
    tracing::info!(
        "Harvested {} -> {} ({} bytes)",
        artifact.display(),
        destination.display(),
        bytes
    );

    Ok(HarvestOutcome::Copied {
        from: artifact,
        to: destination.to_path_buf(),
        bytes,
    })
}

/// Copy `from` to a file that must not exist yet.
fn copy_new(from: &Path, to: &Path) -> Result<u64> {
    let mut reader = File::open(from).map_err(|e| BuildError::io("open", from, e))?;
    let mut writer = match OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(BuildError::DestinationExists { path: to.to_path_buf() });
        }
        Err(e) => return Err(BuildError::io("create", to, e)),
    };
    match io::copy(&mut reader, &mut writer) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            drop(writer);
            // a partial file would block the next run with DestinationExists
            if let Err(remove) = fs::remove_file(to) {
                tracing::warn!("Failed to remove partial {}: {}", to.display(), remove);
            }
            Err(BuildError::io("copy", from, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output_with(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output");
        fs::create_dir_all(&output).unwrap();
        for (name, content) in files {
            fs::write(output.join(name), content).unwrap();
        }
        temp
    }

    #[test]
    fn test_only_token_matches_are_eligible() {
        let temp = output_with(&[("Foo_UniCs2Cpp.cpp", "matched"), ("Bar.cpp", "other")]);
        let found = find_artifact(&temp.path().join("output"), "UniCs2Cpp").unwrap();
        assert_eq!(found, Some(temp.path().join("output").join("Foo_UniCs2Cpp.cpp")));
    }

    #[test]
    fn test_match_ignores_case_and_subdirectories() {
        let temp = output_with(&[("bulk_unics2cpp_0.CPP", "x")]);
        fs::create_dir_all(temp.path().join("output").join("UniCs2Cpp_dir")).unwrap();

        let found = find_artifact(&temp.path().join("output"), "UniCs2Cpp").unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), "bulk_unics2cpp_0.CPP");
    }

    #[test]
    fn test_harvest_copies_into_new_parent() {
        let temp = output_with(&[("Foo_UniCs2Cpp.cpp", "int main() {}")]);
        let destination = temp.path().join("nested").join("dir").join("Hello.cpp");

        let outcome = harvest(&temp.path().join("output"), "UniCs2Cpp", &destination).unwrap();
        assert!(matches!(outcome, HarvestOutcome::Copied { bytes: 13, .. }));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "int main() {}");
    }

    #[test]
    fn test_no_match_is_quiet_no_op() {
        let temp = output_with(&[("Bar.cpp", "other")]);
        let destination = temp.path().join("Hello.cpp");

        let outcome = harvest(&temp.path().join("output"), "UniCs2Cpp", &destination).unwrap();
        assert_eq!(outcome, HarvestOutcome::NoArtifact);
        assert!(!destination.exists());
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let temp = output_with(&[("UniCs2Cpp.cpp", "new")]);
        let destination = temp.path().join("Hello.cpp");
        fs::write(&destination, "old").unwrap();

        let err = harvest(&temp.path().join("output"), "UniCs2Cpp", &destination).unwrap_err();
        assert!(matches!(err, BuildError::DestinationExists { .. }));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_no_destination() {
        let temp = TempDir::new().unwrap();
        // opening a directory succeeds on unix, reading it does not
        let unreadable = temp.path().join("not_a_file");
        fs::create_dir_all(&unreadable).unwrap();
        let destination = temp.path().join("Hello.cpp");

        let err = copy_new(&unreadable, &destination).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
        assert!(!destination.exists());
    }
}
