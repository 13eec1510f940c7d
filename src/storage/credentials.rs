use super::Result;
use crate::error::StorageError;
use std::env;
use std::sync::RwLock;

#[cfg(not(test))]
use keyring::Entry;

const SERVICE_NAME: &str = "opsdash";

// get() consults a process-wide environment variable in test builds, so
// every test that observes token state serializes on this lock.
#[cfg(test)]
pub(crate) static TOKEN_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Bearer-token store shared between the HTTP client and the CLI.
///
/// Constructor-injected everywhere; two stores never share state, so
/// independent sessions can coexist in one process. A keyring-backed store
/// persists the token under `session-{profile}`; an in-memory store is
/// ephemeral.
#[derive(Debug)]
pub struct SessionStore {
    token: RwLock<Option<String>>,
    profile: Option<String>,
}

impl SessionStore {
    /// Empty store; persists to the keyring when a profile is given
    pub fn new(profile: Option<String>) -> Self {
        Self {
            token: RwLock::new(None),
            profile,
        }
    }

    /// Ephemeral store with no keyring backing
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Keyring-backed store, seeded with the persisted token if any
    pub fn for_profile(profile: &str) -> Result<Self> {
        let store = Self::new(Some(profile.to_string()));
        let persisted = store.load_persisted()?;
        if let Some(token) = persisted {
            store.write_token(Some(token));
        }
        Ok(store)
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Overwrite the stored token and persist it when keyring-backed
    pub fn save(&self, token: &str) -> Result<()> {
        self.write_token(Some(token.to_string()));
        self.persist(token)
    }

    /// Current token, if any. Never fails. An environment token takes
    /// precedence when set and non-empty.
    pub fn get(&self) -> Option<String> {
        if let Some(token) = Self::env_token() {
            return Some(token);
        }

        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drop the token unconditionally; idempotent. The in-memory token is
    /// gone even when keyring deletion fails.
    pub fn clear(&self) -> Result<()> {
        self.write_token(None);
        self.delete_persisted()
    }

    fn write_token(&self, token: Option<String>) {
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = token;
    }

    fn entry_name(&self) -> Option<String> {
        self.profile
            .as_ref()
            .map(|profile| format!("session-{}", profile))
    }

    #[cfg(not(test))]
    fn env_token() -> Option<String> {
        env::var("OPSDASH_TOKEN").ok().filter(|t| !t.is_empty())
    }

    #[cfg(test)]
    fn env_token() -> Option<String> {
        env::var("TEST_OPSDASH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
    }

    #[cfg(not(test))]
    fn load_persisted(&self) -> Result<Option<String>> {
        let Some(name) = self.entry_name() else {
            return Ok(None);
        };

        let entry = Entry::new(SERVICE_NAME, &name)
            .map_err(|e| StorageError::KeyringError(e.to_string()))?;

        match entry.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::KeyringError(e.to_string())),
        }
    }

    #[cfg(not(test))]
    fn persist(&self, token: &str) -> Result<()> {
        let Some(name) = self.entry_name() else {
            return Ok(());
        };

        let entry = Entry::new(SERVICE_NAME, &name)
            .map_err(|e| StorageError::KeyringError(e.to_string()))?;

        entry
            .set_password(token)
            .map_err(|e| StorageError::KeyringError(e.to_string()))
    }

    #[cfg(not(test))]
    fn delete_persisted(&self) -> Result<()> {
        let Some(name) = self.entry_name() else {
            return Ok(());
        };

        let entry = Entry::new(SERVICE_NAME, &name)
            .map_err(|e| StorageError::KeyringError(e.to_string()))?;

        // A missing entry is fine for logout
        match entry.delete_credential() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::KeyringError(e.to_string())),
        }
    }

    #[cfg(test)]
    fn load_persisted(&self) -> Result<Option<String>> {
        if let Some(name) = self.entry_name() {
            println!("MOCK: Loading {} from keyring", name);
        }
        Ok(None) // Mock implementation for tests
    }

    #[cfg(test)]
    fn persist(&self, _token: &str) -> Result<()> {
        if let Some(name) = self.entry_name() {
            println!("MOCK: Saving {} to keyring", name);
        }
        Ok(()) // Mock implementation for tests
    }

    #[cfg(test)]
    fn delete_persisted(&self) -> Result<()> {
        if let Some(name) = self.entry_name() {
            println!("MOCK: Deleting {} from keyring", name);
        }
        Ok(()) // Mock implementation for tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_get_clear_in_memory() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap();

        let store = SessionStore::in_memory();
        assert!(store.get().is_none());

        store.save("token-1").expect("save should succeed");
        assert_eq!(store.get(), Some("token-1".to_string()));

        // Save overwrites
        store.save("token-2").expect("save should succeed");
        assert_eq!(store.get(), Some("token-2".to_string()));

        store.clear().expect("clear should succeed");
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap();

        let store = SessionStore::in_memory();
        assert!(store.clear().is_ok());
        assert!(store.clear().is_ok());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_for_profile_uses_mock_keyring() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap();

        let store = SessionStore::for_profile("test-profile").expect("load should succeed");
        assert_eq!(store.profile(), Some("test-profile"));
        assert!(store.get().is_none(), "Mock keyring holds no token");

        assert!(store.save("abc").is_ok());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_independent_stores_do_not_share_state() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap();

        let a = SessionStore::in_memory();
        let b = SessionStore::in_memory();

        a.save("only-a").expect("save should succeed");
        assert_eq!(a.get(), Some("only-a".to_string()));
        assert!(b.get().is_none());
    }

    #[test]
    fn test_env_token_override() {
        let _guard = TOKEN_ENV_LOCK.lock().unwrap();
        let original = env::var("TEST_OPSDASH_TOKEN").ok();

        unsafe {
            env::set_var("TEST_OPSDASH_TOKEN", "env-token");
        }
        let store = SessionStore::in_memory();
        store.save("stored-token").expect("save should succeed");
        assert_eq!(store.get(), Some("env-token".to_string()));

        unsafe {
            env::set_var("TEST_OPSDASH_TOKEN", "");
        }
        assert_eq!(store.get(), Some("stored-token".to_string()));

        unsafe {
            match original {
                Some(value) => env::set_var("TEST_OPSDASH_TOKEN", value),
                None => env::remove_var("TEST_OPSDASH_TOKEN"),
            }
        }
    }
}
