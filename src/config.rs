use std::env;
use std::path::PathBuf;

use dotenv::dotenv;

pub const DEFAULT_DATABASE_PATH: &str = "nctsa.db";

/// Connection settings shared by every job.
///
/// Job inputs (CSV paths, row counts, notification id) are constants in the
/// individual binaries; only the database location can be overridden, through
/// `DATABASE_PATH` in the environment or a `.env` file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_database_path(env::var("DATABASE_PATH").ok())
    }

    fn from_database_path(value: Option<String>) -> Self {
        let database_path = match value {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => PathBuf::from(DEFAULT_DATABASE_PATH),
        };
        Settings { database_path }
    }
}

/// Logger setup used by every binary: `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_path() {
        assert_eq!(
            Settings::from_database_path(None).database_path,
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(
            Settings::from_database_path(Some("   ".into())).database_path,
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
    }

    #[test]
    fn uses_override() {
        let settings = Settings::from_database_path(Some(" /tmp/seed.db ".into()));
        assert_eq!(settings.database_path, PathBuf::from("/tmp/seed.db"));
    }
}
