//! Path utilities for locating fixture documents.
//!
//! Request, response and capabilities documents live in
//! `crates/test-utils/testdata/` so every crate's tests read the same files.

use std::path::PathBuf;

/// Returns the shared testdata directory.
///
/// `TEST_DATA_DIR` overrides the default of `crates/test-utils/testdata/`.
pub fn testdata_dir() -> PathBuf {
    match std::env::var("TEST_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata"),
    }
}

/// Returns the path of a fixture document, or `None` if it does not exist.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let path = testdata_dir().join(name);
    path.exists().then_some(path)
}

/// Reads a fixture document into a string.
///
/// # Panics
///
/// Panics if the file is missing or unreadable; fixtures ship with the repo.
pub fn read_test_file(name: &str) -> String {
    let path = testdata_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Writes `contents` to a temporary file with the given extension.
///
/// The file is removed when the returned handle is dropped.
pub fn temp_file_with(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("sos_test_")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temporary file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_present() {
        for name in crate::fixtures::documents::ALL {
            assert!(find_test_file(name).is_some(), "missing fixture {}", name);
        }
        assert!(find_test_file("no_such_fixture.xml").is_none());
    }

    #[test]
    fn test_temp_file_with() {
        let file = temp_file_with("services: []\n", ".yaml");
        let path_str = file.path().to_string_lossy().to_string();
        assert!(path_str.ends_with(".yaml"));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "services: []\n");
    }
}
