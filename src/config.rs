//! Runtime settings read from the environment (after `.env` is loaded).

use std::path::PathBuf;

use crate::loader::DEFAULT_SOURCE;

/// Tab the export batch is appended to.
pub const DEFAULT_WORKSHEET: &str = "Registro";

pub const ENV_CSV: &str = "DASH_STUCK_CSV";
pub const ENV_SPREADSHEET_ID: &str = "DASH_STUCK_SPREADSHEET_ID";
pub const ENV_WORKSHEET: &str = "DASH_STUCK_WORKSHEET";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub csv_path: PathBuf,
    pub spreadsheet_id: Option<String>,
    pub worksheet: String,
    pub access_token: Option<String>,
    pub credentials_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            csv_path: get(ENV_CSV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)),
            spreadsheet_id: get(ENV_SPREADSHEET_ID),
            worksheet: get(ENV_WORKSHEET).unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            access_token: get(ENV_ACCESS_TOKEN),
            credentials_path: get(ENV_CREDENTIALS).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);

        assert_eq!(settings.csv_path, PathBuf::from("Data_Suit_RegionalCONO_CSV.csv"));
        assert_eq!(settings.worksheet, "Registro");
        assert!(settings.spreadsheet_id.is_none());
        assert!(settings.access_token.is_none());
    }

    #[test]
    fn test_values_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CSV, "exports/today.csv"),
            (ENV_SPREADSHEET_ID, "1AbC"),
            (ENV_WORKSHEET, "  "),
            (ENV_CREDENTIALS, "/secrets/user.json"),
        ]);
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.csv_path, PathBuf::from("exports/today.csv"));
        assert_eq!(settings.spreadsheet_id.as_deref(), Some("1AbC"));
        assert_eq!(settings.worksheet, "Registro");
        assert_eq!(settings.credentials_path, Some(PathBuf::from("/secrets/user.json")));
    }
}
