//! Profile persistence over a platform-provided key/value store.
//!
//! Saved data is plain JSON under well-known keys. Reads are defensive:
//! corrupt payloads and records carrying anything that looks like personal
//! data are discarded with a warning instead of failing the load, so a bad
//! save never bricks a profile.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BOT_KEY_PREFIX, LEDGER_KEY};
use crate::ledger::{ActivityRecord, ProgressLedger};

/// Trait for abstracting key/value save storage.
/// Platform-specific implementations should provide this.
pub trait ProfileStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored at `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove the value at `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;

    /// List every stored key starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage backend failure")]
    Backend(#[source] anyhow::Error),
    #[error("failed to serialize {key}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistError {
    fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Backend(err.into())
    }
}

/// One customization applied to a saved bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCustomization {
    pub id: String,
    pub kind: String,
    pub value: String,
    pub applied_at_ms: u64,
}

/// A named robot design saved to the collection. Saving a bot with an
/// existing id replaces that entry rather than duplicating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBot {
    pub id: String,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub customizations: Vec<AppliedCustomization>,
    pub created_at_ms: u64,
    pub last_modified_ms: u64,
}

/// Persist the ledger as JSON.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_ledger<S: ProfileStore>(store: &S, ledger: &ProgressLedger) -> Result<(), PersistError> {
    let json = serde_json::to_string(ledger).map_err(|source| PersistError::Serialize {
        key: LEDGER_KEY.to_string(),
        source,
    })?;
    store
        .set_item(LEDGER_KEY, &json)
        .map_err(PersistError::backend)
}

/// Load the saved ledger, if one exists.
///
/// Corrupt payloads and ledgers with impossible balances are treated as
/// absent. History rows whose free-text fields look like personal data are
/// dropped, and the remaining rows are re-clamped to their invariant ranges
/// before the ledger is returned.
///
/// # Errors
///
/// Returns an error only when the backend itself fails.
pub fn load_ledger<S: ProfileStore>(store: &S) -> Result<Option<ProgressLedger>, PersistError> {
    let Some(json) = store.get_item(LEDGER_KEY).map_err(PersistError::backend)? else {
        return Ok(None);
    };
    match serde_json::from_str::<ProgressLedger>(&json) {
        Ok(mut ledger) => {
            if ledger.gems_spent > ledger.gems_earned {
                log::warn!(
                    "discarding ledger save with impossible balance: spent {} of {} earned",
                    ledger.gems_spent,
                    ledger.gems_earned
                );
                return Ok(None);
            }
            scrub_ledger(&mut ledger);
            Ok(Some(ledger))
        }
        Err(err) => {
            log::warn!("discarding corrupt ledger save: {err}");
            Ok(None)
        }
    }
}

/// Remove the saved ledger.
///
/// # Errors
///
/// Returns an error if the backend write fails.
pub fn delete_ledger<S: ProfileStore>(store: &S) -> Result<(), PersistError> {
    store.remove_item(LEDGER_KEY).map_err(PersistError::backend)
}

/// Save a bot design, replacing any existing entry with the same id.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_bot<S: ProfileStore>(store: &S, bot: &SavedBot) -> Result<(), PersistError> {
    let key = bot_key(&bot.id);
    let json = serde_json::to_string(bot).map_err(|source| PersistError::Serialize {
        key: key.clone(),
        source,
    })?;
    store.set_item(&key, &json).map_err(PersistError::backend)
}

/// Load every saved bot design, skipping corrupt or suspect entries.
///
/// # Errors
///
/// Returns an error only when the backend itself fails.
pub fn load_bots<S: ProfileStore>(store: &S) -> Result<Vec<SavedBot>, PersistError> {
    let keys = store
        .list_keys(BOT_KEY_PREFIX)
        .map_err(PersistError::backend)?;
    let mut bots = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(json) = store.get_item(&key).map_err(PersistError::backend)? else {
            continue;
        };
        match serde_json::from_str::<SavedBot>(&json) {
            Ok(bot) if bot_is_clean(&bot) => bots.push(bot),
            Ok(bot) => log::warn!("dropping saved bot {}: personal data in fields", bot.id),
            Err(err) => log::warn!("dropping corrupt saved bot at {key}: {err}"),
        }
    }
    Ok(bots)
}

/// Delete one saved bot design by id.
///
/// # Errors
///
/// Returns an error if the backend write fails.
pub fn delete_bot<S: ProfileStore>(store: &S, id: &str) -> Result<(), PersistError> {
    store
        .remove_item(&bot_key(id))
        .map_err(PersistError::backend)
}

fn bot_key(id: &str) -> String {
    format!("{BOT_KEY_PREFIX}{id}")
}

/// Heuristic PII check used on load: email-shaped strings and long digit
/// runs (phone numbers and the like) disqualify a record.
fn looks_like_pii(text: &str) -> bool {
    if text.contains('@') {
        return true;
    }
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= 7 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn record_is_clean(record: &ActivityRecord) -> bool {
    match record {
        ActivityRecord::Diagnostic(_) => true,
        ActivityRecord::Repair(r) => !r.concepts.iter().any(|c| looks_like_pii(c)),
        ActivityRecord::Customization(r) => !r
            .colors
            .iter()
            .chain(r.accessories.iter())
            .any(|s| looks_like_pii(s)),
    }
}

fn bot_is_clean(bot: &SavedBot) -> bool {
    !looks_like_pii(&bot.name)
        && !looks_like_pii(&bot.kind)
        && !bot
            .customizations
            .iter()
            .any(|c| looks_like_pii(&c.id) || looks_like_pii(&c.value))
}

fn scrub_ledger(ledger: &mut ProgressLedger) {
    let before = ledger.history.len();
    ledger.history.retain(record_is_clean);
    let dropped = before - ledger.history.len();
    if dropped > 0 {
        log::warn!("dropped {dropped} history rows with personal data");
    }
    // Saves are written sanitized, but a hand-edited file may not be.
    for record in &mut ledger.history {
        *record = record.clone().sanitized();
    }
    ledger
        .unlocked_customizations
        .retain(|item| !looks_like_pii(item));
}
