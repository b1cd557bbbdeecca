//! Durable key/value storage for the session record.

use std::{
    collections::{BTreeMap, HashMap},
    fs::{self, OpenOptions},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

/// The access token handed out at login.
pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// When the session began, as milliseconds since the Unix epoch.
pub const SESSION_START_KEY: &str = "sessionStartTime";

pub(crate) const SESSION_KEYS: [&str; 3] =
    [TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_START_KEY];

/// Somewhere the session can be persisted so it survives a restart.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Storage which only lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { MemoryStorage::default() }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries =
            self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries =
            self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Keeps the session in a small JSON object on disk.
///
/// The whole file is re-read on every access so a session written by
/// another invocation of the CLI is picked up, but there is no locking
/// between processes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileStorage {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn load(&self) -> io::Result<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(Into::into),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let mut file = private_file().open(&self.path)?;

        #[cfg(unix)]
        {
            // files from older versions were created world-readable
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&bytes)
    }

    fn update<F>(&self, mutate: F) -> io::Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) if is_corrupt(&e) => {
                log::warn!(
                    "Discarding the unreadable session in \"{}\": {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            },
            Err(e) => return Err(e),
        };
        mutate(&mut entries);
        self.save(&entries)
    }
}

/// The session holds bearer tokens, so only the owner may read it.
fn private_file() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
}

fn is_corrupt(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::InvalidData | ErrorKind::UnexpectedEof)
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                log::warn!(
                    "Unable to read the session from \"{}\": {}",
                    self.path.display(),
                    e
                );
                None
            },
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
