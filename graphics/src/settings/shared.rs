use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;

use super::RenderSettings;

/// Immutable view of a camera's settings taken at the start of a frame.
///
/// Edits made after the snapshot was taken are not visible through it.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    settings: Arc<RenderSettings>,
    version: u64,
}

impl SettingsSnapshot {
    /// Version of the settings this snapshot was taken from.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

impl Deref for SettingsSnapshot {
    type Target = RenderSettings;

    fn deref(&self) -> &RenderSettings {
        &self.settings
    }
}

#[derive(Debug)]
struct Versioned {
    settings: Arc<RenderSettings>,
    version: u64,
}

/// Render settings shared between a camera's controller and the renderer.
///
/// Writers replace the whole bundle (copy-on-write); readers take cheap
/// snapshots. The version increases by one with every edit.
#[derive(Debug)]
pub struct SharedRenderSettings {
    inner: RwLock<Versioned>,
}

impl SharedRenderSettings {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            inner: RwLock::new(Versioned {
                settings: Arc::new(settings),
                version: 0,
            }),
        }
    }

    /// Take a snapshot of the current settings.
    pub fn snapshot(&self) -> SettingsSnapshot {
        let inner = self.inner.read();
        SettingsSnapshot {
            settings: Arc::clone(&inner.settings),
            version: inner.version,
        }
    }

    /// Edit the settings. Snapshots taken before the call are unaffected.
    /// Returns the new version.
    pub fn update(&self, edit: impl FnOnce(&mut RenderSettings)) -> u64 {
        let mut inner = self.inner.write();
        let mut settings = RenderSettings::clone(&inner.settings);
        edit(&mut settings);
        inner.settings = Arc::new(settings);
        inner.version += 1;
        inner.version
    }

    /// Replace the settings wholesale. Returns the new version.
    pub fn replace(&self, settings: RenderSettings) -> u64 {
        self.update(|current| *current = settings)
    }

    pub fn version(&self) -> u64 {
        self.inner.read().version
    }
}

impl Default for SharedRenderSettings {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

static_assertions::assert_impl_all!(SharedRenderSettings: Send, Sync);
