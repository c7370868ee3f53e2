//! Policy and source domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compliance policy the monitored document is checked against.
///
/// Policies are replaced wholesale on every reload; there is no partial
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub updated_at: DateTime<Utc>,
    pub text: String,
}

impl Policy {
    /// Build a policy from a file stem such as `data_retention`.
    ///
    /// The identity only depends on the stem, so it survives restarts as long
    /// as the file keeps its name.
    pub fn from_file_stem(stem: &str, file_name: &str, text: String) -> Self {
        Self {
            id: policy_id_from_stem(stem),
            name: policy_name_from_stem(stem),
            description: format!("Loaded from disk: {file_name}"),
            version: "1.0".to_string(),
            updated_at: Utc::now(),
            text,
        }
    }
}

/// `data_retention` -> `data-retention`
pub fn policy_id_from_stem(stem: &str) -> String {
    stem.replace('_', "-")
}

/// `data_retention` -> `Data Retention`
pub fn policy_name_from_stem(stem: &str) -> String {
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The monitored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub description: String,
    pub path: String,
}
