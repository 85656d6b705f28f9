//! Runtime configuration for the stage advancement run.
//!
//! The integration token is read from the environment; the database
//! identifiers are fixed for the workspace this automation targets.

use crate::{Error, Result};

/// Environment variable holding the Notion integration token.
pub const NOTION_TOKEN_ENV: &str = "NOTION_TOKEN";

/// Database holding one record per project.
pub const PROJECTS_DATABASE_ID: &str = "2334aa74d3bd81dd8e87d07e18195649";

/// Database holding the stages of every project.
pub const STAGES_DATABASE_ID: &str = "2344aa74d3bd80958c46cd097c3f1559";

/// Database holding the tasks of every stage.
pub const TASKS_DATABASE_ID: &str = "2334aa74d3bd81589439ed4116e01fbb";

/// How many leading characters of the token are safe to print.
const TOKEN_PREVIEW_CHARS: usize = 10;

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token used for every API call.
    pub token: String,
    /// Database id of the projects database.
    pub projects_db: String,
    /// Database id of the stages database.
    pub stages_db: String,
    /// Database id of the tasks database.
    pub tasks_db: String,
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// Fails with [`Error::MissingToken`] when the token variable is unset
    /// or empty; an empty token would only produce confusing 401 responses
    /// later.
    pub fn from_env() -> Result<Self> {
        match std::env::var(NOTION_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Ok(Self::with_token(token)),
            _ => Err(Error::MissingToken),
        }
    }

    /// Build a configuration around an explicit token, using the standard
    /// database ids.
    pub fn with_token(token: String) -> Self {
        Self {
            token,
            projects_db: PROJECTS_DATABASE_ID.to_string(),
            stages_db: STAGES_DATABASE_ID.to_string(),
            tasks_db: TASKS_DATABASE_ID.to_string(),
        }
    }

    /// A short prefix of the token suitable for log output.
    pub fn token_preview(&self) -> String {
        self.token.chars().take(TOKEN_PREVIEW_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_token(value: &str) {
        // SAFETY: set_var is technically unsafe on POSIX because setenv(3)
        // is not thread-safe. Acceptable here because these tests are
        // serialized with #[serial] and only run in test builds.
        unsafe {
            std::env::set_var(NOTION_TOKEN_ENV, value);
        }
    }

    fn clear_token() {
        // SAFETY: same reasoning as set_token; serialized test-only code.
        unsafe {
            std::env::remove_var(NOTION_TOKEN_ENV);
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_token() {
        set_token("secret_abcdefghijklmnop");
        let config = Config::from_env().unwrap();
        assert_eq!(config.token, "secret_abcdefghijklmnop");
        assert_eq!(config.projects_db, PROJECTS_DATABASE_ID);
        assert_eq!(config.stages_db, STAGES_DATABASE_ID);
        assert_eq!(config.tasks_db, TASKS_DATABASE_ID);
        clear_token();
    }

    #[test]
    #[serial]
    fn missing_token_is_fatal() {
        clear_token();
        assert!(matches!(Config::from_env(), Err(Error::MissingToken)));
    }

    #[test]
    #[serial]
    fn empty_token_is_fatal() {
        set_token("");
        assert!(matches!(Config::from_env(), Err(Error::MissingToken)));
        clear_token();
    }

    #[test]
    fn token_preview_masks_the_tail() {
        let config = Config::with_token("secret_abcdefghijklmnop".to_string());
        assert_eq!(config.token_preview(), "secret_abc");
    }

    #[test]
    fn short_token_preview_is_whole_token() {
        let config = Config::with_token("short".to_string());
        assert_eq!(config.token_preview(), "short");
    }
}
