//! Loads the YAML-defined constraint profiles that drive enforcement,
//! generalizing `fixtures.rs::FixtureBook::load_from_path` from the teacher
//! repository.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConstraintBookError;

/// A label name to its allowed-value set. `BTreeMap` gives deterministic,
/// sorted-by-key iteration, which `spec.md` §5 requires of both the
/// synthesizer and any diagnostic output that walks this map.
pub type ConstraintMap = BTreeMap<String, Vec<String>>;

/// A YAML file of named constraint profiles, keyed by profile name.
///
/// ```yaml
/// tenant-a:
///   namespace: ["demo", "prod"]
///   k8s_namespace_name: ["!~^kube-.*"]
/// tenant-b:
///   namespace: ["*"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintBook {
    #[serde(flatten)]
    profiles: BTreeMap<String, ConstraintMap>,
}

impl ConstraintBook {
    /// Load and parse a constraint book from `path`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConstraintBookError> {
        let raw = fs::read_to_string(path)?;
        let book: ConstraintBook = serde_yaml::from_str(&raw)?;
        Ok(book)
    }

    /// Look up a profile's constraint map by name.
    pub fn profile(&self, name: &str) -> Result<&ConstraintMap, ConstraintBookError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConstraintBookError::UnknownProfile(name.to_string()))
    }

    /// Names of every profile defined in this book, in sorted order.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// A self-cleaning scratch file under the system temp dir, since this
    /// crate carries no dev-dependency on a temp-file crate.
    struct ScratchFile {
        path: std::path::PathBuf,
    }

    impl ScratchFile {
        fn new(name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!("queryguard-test-{name}-{}.yaml", std::process::id()));
            let mut file = fs::File::create(&path).expect("create scratch file");
            file.write_all(contents.as_bytes()).expect("write scratch file");
            ScratchFile { path }
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn loads_profiles_and_looks_up_by_name() {
        let file = ScratchFile::new(
            "loads",
            r#"
tenant-a:
  namespace: ["demo", "prod"]
tenant-b:
  namespace: ["*"]
"#,
        );
        let book = ConstraintBook::load_from_path(&file.path).expect("valid yaml");
        let tenant_a = book.profile("tenant-a").expect("tenant-a exists");
        assert_eq!(tenant_a.get("namespace").unwrap(), &vec!["demo".to_string(), "prod".to_string()]);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let file = ScratchFile::new("unknown", "tenant-a:\n  namespace: [\"demo\"]\n");
        let book = ConstraintBook::load_from_path(&file.path).expect("valid yaml");
        let err = book.profile("tenant-missing").unwrap_err();
        assert!(matches!(err, ConstraintBookError::UnknownProfile(name) if name == "tenant-missing"));
    }

    #[test]
    fn profile_names_are_sorted() {
        let file = ScratchFile::new("sorted", "z-tenant:\n  a: [\"1\"]\na-tenant:\n  a: [\"1\"]\n");
        let book = ConstraintBook::load_from_path(&file.path).expect("valid yaml");
        let names: Vec<&str> = book.profile_names().collect();
        assert_eq!(names, vec!["a-tenant", "z-tenant"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ConstraintBook::load_from_path("/no/such/path.yaml").unwrap_err();
        assert!(matches!(err, ConstraintBookError::Io(_)));
    }
}
