//! Archive packaging of the finished artifact tree.

use crate::error::WorkflowError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Bundle everything under `root` (tests subtree included) into a sibling
/// `<root>.zip`. Entry content depends only on directory contents; the
/// archive is written to a temp file first so a failed run never leaves a
/// half-written deliverable behind.
pub fn package(root: &Path) -> Result<PathBuf, WorkflowError> {
    if !root.is_dir() {
        return Err(WorkflowError::packaging(format!(
            "artifact root {} is not a directory",
            root.display()
        )));
    }

    let archive_name = format!(
        "{}.zip",
        root.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string())
    );
    let parent = root.parent().unwrap_or_else(|| Path::new("."));
    let archive_path = parent.join(archive_name);

    let temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| WorkflowError::packaging(format!("cannot create temp archive: {}", e)))?;

    let mut writer = zip::ZipWriter::new(temp);
    // Fixed timestamp keeps archives reproducible for identical content.
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    entries.sort();

    for path in entries {
        let relative = path
            .strip_prefix(root)
            .map_err(|e| WorkflowError::packaging(e.to_string()))?
            .to_string_lossy()
            .replace('\\', "/");

        writer
            .start_file(relative.as_str(), options)
            .map_err(|e| WorkflowError::packaging(format!("cannot add {}: {}", relative, e)))?;

        let mut file = std::fs::File::open(&path)
            .map_err(|e| WorkflowError::packaging(format!("cannot open {}: {}", path.display(), e)))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|e| WorkflowError::packaging(format!("cannot read {}: {}", path.display(), e)))?;
        writer
            .write_all(&buffer)
            .map_err(|e| WorkflowError::packaging(format!("cannot write {}: {}", relative, e)))?;
    }

    let temp = writer
        .finish()
        .map_err(|e| WorkflowError::packaging(format!("cannot finalize archive: {}", e)))?;

    temp.persist(&archive_path)
        .map_err(|e| WorkflowError::packaging(format!("cannot persist archive: {}", e)))?;

    Ok(archive_path)
}

/// List the entry names of an archive, mainly for verification and tests.
pub fn archive_entries(archive_path: &Path) -> Result<Vec<String>, WorkflowError> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| WorkflowError::packaging(format!("cannot open archive: {}", e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| WorkflowError::packaging(format!("cannot read archive: {}", e)))?;

    let mut names = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| WorkflowError::packaging(e.to_string()))?;
        names.push(entry.name().to_string());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        std::fs::create_dir_all(root.join("models")).unwrap();
        std::fs::create_dir_all(root.join("tests")).unwrap();
        std::fs::write(root.join("main.py"), "print('main')\n").unwrap();
        std::fs::write(root.join("models/user.py"), "class User: pass\n").unwrap();
        std::fs::write(root.join("tests/test_main.py"), "def test(): pass\n").unwrap();
    }

    #[test]
    fn test_package_includes_all_files_and_tests_subtree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("proj");
        std::fs::create_dir_all(&root).unwrap();
        populate(&root);

        let archive = package(&root).unwrap();
        assert_eq!(archive, temp.path().join("proj.zip"));

        let entries = archive_entries(&archive).unwrap();
        assert_eq!(
            entries,
            vec!["main.py", "models/user.py", "tests/test_main.py"]
        );
    }

    #[test]
    fn test_package_missing_root_is_packaging_error() {
        let temp = TempDir::new().unwrap();
        let err = package(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, WorkflowError::Packaging { .. }));
    }

    #[test]
    fn test_repackaging_identical_content_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("proj");
        std::fs::create_dir_all(&root).unwrap();
        populate(&root);

        let first = std::fs::read(package(&root).unwrap()).unwrap();
        let second = std::fs::read(package(&root).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
