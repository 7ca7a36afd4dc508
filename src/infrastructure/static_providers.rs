// Providers backed by the data source and plugin lists from configuration
use crate::application::providers::{
    DataSourceInfo, DataSourceInfoProvider, PanelPluginInfo, PanelPluginInfoProvider,
};

#[derive(Debug, Clone, Default)]
pub struct ConfiguredDataSources {
    datasources: Vec<DataSourceInfo>,
}

impl ConfiguredDataSources {
    pub fn new(datasources: Vec<DataSourceInfo>) -> Self {
        Self { datasources }
    }
}

impl DataSourceInfoProvider for ConfiguredDataSources {
    fn get_data_source_info(&self) -> Vec<DataSourceInfo> {
        self.datasources.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfiguredPanelPlugins {
    plugins: Vec<PanelPluginInfo>,
}

impl ConfiguredPanelPlugins {
    pub fn new(plugins: Vec<PanelPluginInfo>) -> Self {
        Self { plugins }
    }
}

impl PanelPluginInfoProvider for ConfiguredPanelPlugins {
    fn get_panels(&self) -> Vec<PanelPluginInfo> {
        self.plugins.clone()
    }

    fn get_panel_plugin(&self, id: &str) -> Option<PanelPluginInfo> {
        self.plugins.iter().find(|p| p.id == id).cloned()
    }
}
