use thiserror::Error;

use super::storage::{Storage, StorageError, BREAK_LENGTH_KEY, SESSION_LENGTH_KEY};

pub const DEFAULT_SESSION_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("'{0}' is not a whole number of minutes")]
    NotANumber(String),
    #[error("{0} minutes is too short, the minimum is 1")]
    BelowMinimum(u32),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Session and break lengths, held in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub session_secs: u32,
    pub break_secs: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            session_secs: DEFAULT_SESSION_MINUTES * 60,
            break_secs: DEFAULT_BREAK_MINUTES * 60,
        }
    }
}

impl Durations {
    pub fn load(storage: &Storage) -> Result<Self, StorageError> {
        Ok(Self {
            session_secs: stored_minutes(storage, SESSION_LENGTH_KEY, DEFAULT_SESSION_MINUTES)? * 60,
            break_secs: stored_minutes(storage, BREAK_LENGTH_KEY, DEFAULT_BREAK_MINUTES)? * 60,
        })
    }

    pub fn session_minutes(&self) -> u32 {
        self.session_secs / 60
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_secs / 60
    }

    pub fn set_session_minutes(&mut self, storage: &Storage, input: &str) -> Result<u32, SettingsError> {
        let minutes = parse_minutes(input)?;
        storage.set(SESSION_LENGTH_KEY, &minutes.to_string())?;
        self.session_secs = minutes * 60;
        tracing::info!(minutes, "session length saved");
        Ok(minutes)
    }

    pub fn set_break_minutes(&mut self, storage: &Storage, input: &str) -> Result<u32, SettingsError> {
        let minutes = parse_minutes(input)?;
        storage.set(BREAK_LENGTH_KEY, &minutes.to_string())?;
        self.break_secs = minutes * 60;
        tracing::info!(minutes, "break length saved");
        Ok(minutes)
    }
}

fn parse_minutes(input: &str) -> Result<u32, SettingsError> {
    let trimmed = input.trim();
    let minutes: u32 = trimmed
        .parse()
        .map_err(|_| SettingsError::NotANumber(trimmed.to_string()))?;
    if minutes < 1 {
        return Err(SettingsError::BelowMinimum(minutes));
    }
    Ok(minutes)
}

fn stored_minutes(storage: &Storage, key: &str, default: u32) -> Result<u32, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(default);
    };
    match parse_minutes(&raw) {
        Ok(minutes) => Ok(minutes),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored length unreadable, using default");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn defaults_when_nothing_stored() -> Result<()> {
        let storage = Storage::open_in_memory()?;
        let durations = Durations::load(&storage)?;
        assert_eq!(durations, Durations::default());
        assert_eq!(durations.session_secs, 1500);
        assert_eq!(durations.break_secs, 300);
        Ok(())
    }

    #[test]
    fn saved_minutes_become_seconds() -> Result<()> {
        let storage = Storage::open_in_memory()?;
        let mut durations = Durations::load(&storage)?;
        durations.set_session_minutes(&storage, "1")?;
        assert_eq!(durations.session_secs, 60);
        assert_eq!(storage.get(SESSION_LENGTH_KEY)?.as_deref(), Some("1"));
        assert_eq!(Durations::load(&storage)?.session_secs, 60);
        Ok(())
    }

    #[test]
    fn garbage_input_keeps_previous_value() -> Result<()> {
        let storage = Storage::open_in_memory()?;
        let mut durations = Durations::load(&storage)?;
        durations.set_break_minutes(&storage, "7")?;

        let err = durations.set_break_minutes(&storage, "abc").unwrap_err();
        assert!(matches!(err, SettingsError::NotANumber(ref s) if s == "abc"));
        assert_eq!(durations.break_secs, 7 * 60);
        assert_eq!(storage.get(BREAK_LENGTH_KEY)?.as_deref(), Some("7"));
        Ok(())
    }

    #[test]
    fn rejected_input_writes_nothing() -> Result<()> {
        let storage = Storage::open_in_memory()?;
        let mut durations = Durations::load(&storage)?;
        assert!(durations.set_break_minutes(&storage, "abc").is_err());
        assert!(matches!(
            durations.set_session_minutes(&storage, "0"),
            Err(SettingsError::BelowMinimum(0))
        ));
        assert!(durations.set_session_minutes(&storage, "-3").is_err());
        assert_eq!(storage.get(BREAK_LENGTH_KEY)?, None);
        assert_eq!(storage.get(SESSION_LENGTH_KEY)?, None);
        assert_eq!(durations, Durations::default());
        Ok(())
    }

    #[test]
    fn unreadable_stored_value_falls_back() -> Result<()> {
        let storage = Storage::open_in_memory()?;
        storage.set(SESSION_LENGTH_KEY, "soon")?;
        assert_eq!(Durations::load(&storage)?.session_secs, 1500);
        Ok(())
    }
}
