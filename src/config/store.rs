use crate::config::credentials::Credentials;
use crate::config::profile::Profile;
use crate::utils::error::Result;
use crate::utils::validation::validate_profile_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const PROFILES_DIR: &str = "profiles";

/// Resolves profile and credential files under a base directory and caches
/// what it has parsed, keyed by path.
#[derive(Debug)]
pub struct ConfigStore {
    base_dir: PathBuf,
    profiles_dir: PathBuf,
    profiles: Mutex<HashMap<PathBuf, Arc<Profile>>>,
    credentials: Mutex<HashMap<PathBuf, Arc<Credentials>>>,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            profiles_dir: PathBuf::from(PROFILES_DIR),
            profiles: Mutex::new(HashMap::new()),
            credentials: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_profiles_dir<P: Into<PathBuf>>(mut self, profiles_dir: P) -> Self {
        self.profiles_dir = profiles_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn profile_path(&self, name: &str) -> Result<PathBuf> {
        validate_profile_name("profile", name)?;
        Ok(self
            .base_dir
            .join(&self.profiles_dir)
            .join(format!("{}.yaml", name)))
    }

    pub fn credentials_path(&self, credentials_file: &str) -> PathBuf {
        self.base_dir.join(credentials_file)
    }

    pub fn load_profile(&self, name: &str) -> Result<Arc<Profile>> {
        let path = self.profile_path(name)?;
        load_cached(&self.profiles, path, |p| Profile::from_file(p))
    }

    pub fn load_credentials(&self, credentials_file: &str) -> Result<Arc<Credentials>> {
        let path = self.credentials_path(credentials_file);
        load_cached(&self.credentials, path, |p| Credentials::from_file(p))
    }

    pub fn cached_profiles(&self) -> usize {
        self.profiles.lock().map(|c| c.len()).unwrap_or(0)
    }
}

fn load_cached<T, F>(
    cache: &Mutex<HashMap<PathBuf, Arc<T>>>,
    path: PathBuf,
    load: F,
) -> Result<Arc<T>>
where
    F: FnOnce(&Path) -> Result<T>,
{
    if let Ok(guard) = cache.lock() {
        if let Some(hit) = guard.get(&path) {
            tracing::debug!("Configuration cache hit: {}", path.display());
            return Ok(Arc::clone(hit));
        }
    }

    tracing::debug!("Loading configuration from {}", path.display());
    let value = Arc::new(load(&path)?);
    if let Ok(mut guard) = cache.lock() {
        guard.insert(path, Arc::clone(&value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GptApiError;
    use tempfile::TempDir;

    const PROFILE: &str = r#"
model: gpt-4o
system_prompt: Be brief.
parameters: {max_tokens: 64, temperature: 0.2, top_p: 1.0, n: 1}
"#;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("profiles")).unwrap();
        std::fs::write(dir.path().join("profiles/brief.yaml"), PROFILE).unwrap();
        std::fs::write(dir.path().join("keys.yaml"), "openai_api: sk-abc\n").unwrap();
        dir
    }

    #[test]
    fn test_profile_is_cached() {
        let dir = setup();
        let store = ConfigStore::new(dir.path());

        let first = store.load_profile("brief").unwrap();
        // later edits are not seen once cached
        std::fs::write(dir.path().join("profiles/brief.yaml"), "garbage: [").unwrap();
        let second = store.load_profile("brief").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.cached_profiles(), 1);
    }

    #[test]
    fn test_credentials_resolved_from_base_dir() {
        let dir = setup();
        let store = ConfigStore::new(dir.path());

        let credentials = store.load_credentials("keys.yaml").unwrap();
        assert_eq!(credentials.api_key(), "sk-abc");
    }

    #[test]
    fn test_missing_profile_is_io_error() {
        let dir = setup();
        let store = ConfigStore::new(dir.path());

        let err = store.load_profile("nope").unwrap_err();
        assert!(matches!(err, GptApiError::Io(_)));
    }

    #[test]
    fn test_custom_profiles_dir() {
        let dir = setup();
        std::fs::create_dir_all(dir.path().join("alt")).unwrap();
        std::fs::write(dir.path().join("alt/other.yaml"), PROFILE).unwrap();

        let store = ConfigStore::new(dir.path()).with_profiles_dir("alt");
        assert!(store.load_profile("other").is_ok());
        assert!(store.load_profile("../keys").is_err());
    }
}
