use ahash::AHashMap;

use crate::district::ReferenceOrigin;
use crate::io::source::ReferenceSource;
use crate::quiz::{CityTable, QuizError, QuizSession, QuizState};
use crate::score::Scorer;

/// Owns one independent session per city key.
#[derive(Debug, Clone)]
pub struct QuizRegistry {
    table: CityTable,
    scorer: Scorer,
    sessions: AHashMap<String, QuizSession>,
}

impl QuizRegistry {
    /// New registry; sessions opened later use `scorer`.
    pub fn new(table: CityTable, scorer: Scorer) -> Self {
        Self { table, scorer, sessions: AHashMap::new() }
    }

    #[inline] pub fn table(&self) -> &CityTable { &self.table }

    #[inline] pub fn scorer(&self) -> &Scorer { &self.scorer }

    /// Session for `key`, created (uninitialized) on first use.
    pub fn open(&mut self, key: &str) -> Result<&mut QuizSession, QuizError> {
        if !self.sessions.contains_key(key) {
            let city = self.table.get(key)
                .ok_or_else(|| QuizError::UnknownCity(key.to_string()))?
                .clone();
            self.sessions.insert(key.to_string(), QuizSession::new(city, self.scorer));
        }
        self.sessions.get_mut(key).ok_or_else(|| QuizError::UnknownCity(key.to_string()))
    }

    /// Session for `key`, created and loaded from `source` on first use.
    pub fn open_loaded(&mut self, key: &str, source: &dyn ReferenceSource) -> Result<&mut QuizSession, QuizError> {
        let session = self.open(key)?;
        if session.state() == QuizState::Uninitialized {
            session.load(source)?;
        }
        Ok(session)
    }

    pub fn get(&self, key: &str) -> Option<&QuizSession> { self.sessions.get(key) }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut QuizSession> { self.sessions.get_mut(key) }

    /// Open and load every city in the table. Returns each city's reference origin.
    pub fn load_all(&mut self, source: &dyn ReferenceSource) -> Vec<(String, Result<ReferenceOrigin, QuizError>)> {
        let keys: Vec<String> = self.table.keys().map(str::to_string).collect();
        keys.into_iter().map(|key| {
            let outcome = self.open(&key).and_then(|session| {
                if session.state() == QuizState::Uninitialized {
                    session.load(source)
                } else {
                    session.reference().map(|r| r.origin()).ok_or(QuizError::ReferenceUnavailable)
                }
            });
            (key, outcome)
        }).collect()
    }

    /// Drop the session for `key`.
    pub fn close(&mut self, key: &str) -> Option<QuizSession> { self.sessions.remove(key) }

    /// Keys of open sessions.
    pub fn open_keys(&self) -> impl Iterator<Item = &str> { self.sessions.keys().map(String::as_str) }
}
