// Provider traits consumed by per-version schema migrations
use serde::{Deserialize, Serialize};

/// A data source as seen by migrations that resolve datasource references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInfo {
    #[serde(default)]
    pub default: bool,
    pub uid: String,
    #[serde(rename = "type")]
    pub ds_type: String,
    #[serde(default)]
    pub api_version: String,
    pub name: String,
    #[serde(default)]
    pub id: i64,
}

/// An installed panel plugin and its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPluginInfo {
    pub id: String,
    #[serde(default)]
    pub version: String,
}

pub trait DataSourceInfoProvider: Send + Sync {
    /// All data sources visible to the migration
    fn get_data_source_info(&self) -> Vec<DataSourceInfo>;
}

pub trait PanelPluginInfoProvider: Send + Sync {
    /// All installed panel plugins
    fn get_panels(&self) -> Vec<PanelPluginInfo>;

    /// Lookup a single panel plugin by id
    fn get_panel_plugin(&self, id: &str) -> Option<PanelPluginInfo> {
        self.get_panels().into_iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPanels(Vec<PanelPluginInfo>);

    impl PanelPluginInfoProvider for FixedPanels {
        fn get_panels(&self) -> Vec<PanelPluginInfo> {
            self.0.clone()
        }
    }

    #[test]
    fn test_get_panel_plugin_default_lookup() {
        let provider = FixedPanels(vec![
            PanelPluginInfo { id: "timeseries".to_string(), version: "11.0.0".to_string() },
            PanelPluginInfo { id: "stat".to_string(), version: "11.0.0".to_string() },
        ]);

        assert_eq!(provider.get_panel_plugin("stat").map(|p| p.id), Some("stat".to_string()));
        assert!(provider.get_panel_plugin("graph").is_none());
    }

    #[test]
    fn test_data_source_info_deserializes_camel_case() {
        let info: DataSourceInfo = serde_json::from_value(serde_json::json!({
            "default": true,
            "uid": "prom-1",
            "type": "prometheus",
            "apiVersion": "v1",
            "name": "Prometheus",
            "id": 3
        }))
        .unwrap();

        assert!(info.default);
        assert_eq!(info.ds_type, "prometheus");
        assert_eq!(info.api_version, "v1");
    }
}
