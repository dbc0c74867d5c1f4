//! Deserialization models for `k3d cluster list -o json`.

use serde::Deserialize;

/// One entry of `k3d cluster list -o json`.
#[derive(Debug, Clone, Deserialize)]
pub struct K3dCluster {
    pub name: String,
    #[serde(rename = "serversCount", default)]
    pub servers_count: u32,
    #[serde(rename = "serversRunning", default)]
    pub servers_running: u32,
    #[serde(rename = "agentsCount", default)]
    pub agents_count: u32,
    #[serde(rename = "agentsRunning", default)]
    pub agents_running: u32,
}

impl K3dCluster {
    /// A k3d cluster counts as running when any server node is up.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.servers_running > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "dev",
            "serversCount": 1,
            "serversRunning": 1,
            "agentsCount": 2,
            "agentsRunning": 2,
            "hasLoadbalancer": true
        },
        {
            "name": "lab",
            "serversCount": 1,
            "serversRunning": 0,
            "agentsCount": 0,
            "agentsRunning": 0
        }
    ]"#;

    #[test]
    fn test_parse_cluster_list() {
        let clusters: Vec<K3dCluster> = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].name, "dev");
        assert!(clusters[0].is_running());
        assert_eq!(clusters[0].agents_running, 2);
        assert!(!clusters[1].is_running());
    }
}
