//! RecipientStore: recipient id -> Recipient, with durable load/save.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{Recipient, RecipientId, StoreError};
use crate::ports::Clock;

/// In-memory view of every subscription.
///
/// Backed by a `BTreeMap` so iteration order is stable across cycles and the
/// serialized form is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientStore {
    recipients: BTreeMap<RecipientId, Recipient>,
}

impl RecipientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`.
    ///
    /// A missing or unreadable file is the normal first-run state, and a file
    /// that does not parse is treated the same way: both yield an empty store.
    pub fn load(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    area = "db",
                    path = %path.display(),
                    error = %e,
                    "could not load data file on start-up"
                );
                return Self::new();
            }
        };

        match serde_json::from_slice::<BTreeMap<RecipientId, Recipient>>(&bytes) {
            Ok(recipients) => {
                info!(
                    area = "db",
                    path = %path.display(),
                    recipients = recipients.len(),
                    "loaded data file"
                );
                Self { recipients }
            }
            Err(e) => {
                warn!(
                    area = "db",
                    path = %path.display(),
                    error = %e,
                    "data file is corrupt, starting empty"
                );
                Self::new()
            }
        }
    }

    /// Serialize the store and write it to `path`.
    ///
    /// The previous file is first copied to `<path>.<unix seconds>`; a failed
    /// backup is logged and does not stop the save. The new content goes to a
    /// sibling temp file which is synced and then renamed over `path`.
    ///
    /// Callers hold the shared state lock for the duration.
    pub fn save(&self, path: &Path, clock: &dyn Clock) -> Result<(), StoreError> {
        let json = self.to_json()?;

        let backup = backup_path(path, clock.now().timestamp());
        match fs::copy(path, &backup) {
            Ok(_) => debug!(area = "db", backup = %backup.display(), "backed up data file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(area = "db", path = %path.display(), "no previous data file to back up");
            }
            Err(e) => {
                warn!(
                    area = "db",
                    backup = %backup.display(),
                    error = %e,
                    "could not back up data file"
                );
            }
        }

        write_durably(path, &json).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialized form written by `save`.
    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(&self.recipients)?)
    }

    pub fn get(&self, id: &RecipientId) -> Option<&Recipient> {
        self.recipients.get(id)
    }

    /// Add or overwrite the record keyed by `recipient.id`.
    pub fn upsert(&mut self, recipient: Recipient) -> Option<Recipient> {
        self.recipients.insert(recipient.id.clone(), recipient)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> {
        self.recipients.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Recipient> {
        self.recipients.values_mut()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// `<path>.<timestamp>`
pub fn backup_path(path: &Path, timestamp: i64) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{timestamp}"));
    PathBuf::from(name)
}

fn write_durably(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
