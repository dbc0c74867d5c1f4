//! Deserialization models for `minikube profile list -o json`.

use serde::Deserialize;

/// Top-level output of `minikube profile list -o json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileList {
    #[serde(default)]
    pub valid: Vec<Profile>,
    #[serde(default)]
    pub invalid: Vec<Profile>,
}

/// A single minikube profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(rename = "Name")]
    pub name: String,
    /// Profile status as minikube reports it (`Running`, `Stopped`, ...).
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Config", default)]
    pub config: Option<ProfileConfig>,
}

impl Profile {
    /// The VM/container driver backing this profile.
    #[must_use]
    pub fn driver(&self) -> &str {
        self.config.as_ref().map_or("", |c| c.driver.as_str())
    }
}

/// The subset of a profile's config kubenap cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileConfig {
    #[serde(rename = "Driver", default)]
    pub driver: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "invalid": [],
        "valid": [
            {
                "Name": "dev",
                "Status": "Running",
                "Config": {
                    "Name": "dev",
                    "Driver": "docker",
                    "Memory": 4000
                }
            },
            {
                "Name": "vbox-lab",
                "Status": "Stopped",
                "Config": {
                    "Name": "vbox-lab",
                    "Driver": "virtualbox"
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_profile_list() {
        let list: ProfileList = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(list.valid.len(), 2);
        assert!(list.invalid.is_empty());

        let dev = &list.valid[0];
        assert_eq!(dev.name, "dev");
        assert_eq!(dev.status, "Running");
        assert_eq!(dev.driver(), "docker");

        let vbox = &list.valid[1];
        assert_eq!(vbox.status, "Stopped");
        assert_eq!(vbox.driver(), "virtualbox");
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let list: ProfileList =
            serde_json::from_str(r#"{"valid": [{"Name": "bare"}]}"#).unwrap();
        assert_eq!(list.valid[0].name, "bare");
        assert_eq!(list.valid[0].status, "");
        assert_eq!(list.valid[0].driver(), "");
    }
}
