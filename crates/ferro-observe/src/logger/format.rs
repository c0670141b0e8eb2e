use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::logger::error::LoggerError;

/// Output format of the process logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerFormat {
    Text,
    Json,
    Journald,
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "text" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => {
                #[cfg(all(target_os = "linux", feature = "journald"))]
                {
                    Ok(LoggerFormat::Journald)
                }

                #[cfg(not(all(target_os = "linux", feature = "journald")))]
                {
                    Err(LoggerError::JournaldNotSupported)
                }
            }
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(LoggerFormat::from_str(" Text ").unwrap(), LoggerFormat::Text);
        assert_eq!(LoggerFormat::from_str("JSON").unwrap(), LoggerFormat::Json);
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(matches!(
            LoggerFormat::from_str("xml"),
            Err(LoggerError::InvalidFormat(_))
        ));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&LoggerFormat::Json).unwrap(),
            r#""json""#
        );
    }
}
