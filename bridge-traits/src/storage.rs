//! Key-value storage abstraction
//!
//! The playback core persists a small snapshot (theme flag, last-played track,
//! cache membership) as JSON-encoded string records.

use crate::error::Result;
use async_trait::async_trait;

/// Key-value settings storage
///
/// Values are stored as strings; callers that need structured data encode it
/// as JSON themselves.
///
/// # Platform Support
///
/// - **Desktop**: SQLite database
/// - **Mobile**: UserDefaults / SharedPreferences
/// - **Web**: localStorage
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_theme(store: &dyn SettingsStore, dark: bool) -> Result<()> {
///     store.set_string("svaram_theme", &serde_json::to_string(&dark)?).await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}
