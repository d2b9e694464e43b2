//! Conversions from `ConfigFile` sections to the runtime types they configure.

use std::time::Duration;

use tracing::{info, warn};

use super::settings::ConfigFile;
use crate::content::ContentSettings;
use crate::layer::{LayerRegistry, RegistryError, StyleDefaults};
use crate::query::QueryContext;
use crate::spatial::SpatialLocator;

impl From<&ConfigFile> for StyleDefaults {
    fn from(config: &ConfigFile) -> Self {
        Self {
            colormap: config.vector.default_colormap,
            opacity: config.vector.default_opacity,
            palette: config.vector.default_palette.clone(),
            feature_sample_size: config.vector.feature_sample_size,
            max_preset_categories: config.vector.max_preset_categories,
            max_selectable_raster: config.layers.max_selectable_raster,
        }
    }
}

impl From<&ConfigFile> for ContentSettings {
    fn from(config: &ConfigFile) -> Self {
        let panel = &config.detail_panel;
        Self {
            display_mode: panel.display_mode,
            url_type: panel.url_type,
            url_base: panel.url_base.clone(),
            basedir: panel.basedir.clone(),
            base_url: panel.base_url.clone(),
            id_basedir: panel.id_basedir.clone(),
            id_base_url: panel.id_base_url.clone(),
            fallback_image: panel.fallback_image.clone(),
            timeout_image: panel.timeout_image.clone(),
            image_extension: panel.image_extension.clone(),
            document_extension: panel.document_extension.clone(),
            spec_prefix: config.location_codes.spec_prefix.clone(),
            reserved_id_prefix: config.location_codes.reserved_grid_prefix.clone(),
            load_timeout: Duration::from_millis(panel.load_timeout_ms),
        }
    }
}

impl From<&ConfigFile> for SpatialLocator {
    fn from(config: &ConfigFile) -> Self {
        SpatialLocator::new(config.vector.point_detection_radius_m)
    }
}

impl ConfigFile {
    /// Loads the configured layer list.
    ///
    /// Without a `registry` path the list is empty.
    pub fn load_registry(&self) -> Result<LayerRegistry, RegistryError> {
        match &self.layers.registry {
            Some(path) => {
                let registry = LayerRegistry::load_from(path)?;
                info!(path = %path.display(), layers = registry.len(), "layer list loaded");
                Ok(registry)
            }
            None => {
                warn!("no layer list configured");
                Ok(LayerRegistry::default())
            }
        }
    }

    /// Builds a query context over `registry` with every configured default applied.
    pub fn query_context(&self, registry: LayerRegistry) -> QueryContext {
        QueryContext::new(registry, self.into(), self.into())
            .with_locator(self.into())
            .with_grid_minutes(self.location_codes.grid_minutes)
            .with_default_code_type(self.location_codes.default_type)
    }
}
