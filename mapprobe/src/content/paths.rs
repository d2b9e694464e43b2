//! Content path resolution.
//!
//! A layer may carry its own content folders; any folder it leaves unset
//! comes from the project-wide [`ContentSettings`].

use std::time::Duration;

use super::key::{LocationKey, DEFAULT_RESERVED_ID_PREFIX};
use super::types::{FallbackKind, TabSlot};
use crate::layer::{DisplayMode, LayerDescriptor, UrlType};

pub const DEFAULT_BASEDIR: &str = "../img/";
pub const DEFAULT_BASE_URL: &str = "../html/";
pub const DEFAULT_ID_BASEDIR: &str = "../my_assets/";
pub const DEFAULT_ID_BASE_URL: &str = "../my_assets/";
pub const DEFAULT_FALLBACK_IMAGE: &str = "../default_img/noimage1.png";
pub const DEFAULT_TIMEOUT_IMAGE: &str = "../default_img/timeout_image.png";
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "html";

/// Keys with this prefix always use the path form, even for `arg` layers.
pub const DEFAULT_SPEC_PREFIX: &str = "spec";

/// Time allowed for one probe.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(5000);

/// Project-wide content settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSettings {
    pub display_mode: DisplayMode,
    pub url_type: UrlType,
    pub url_base: Option<String>,
    pub basedir: String,
    pub base_url: String,
    pub id_basedir: String,
    pub id_base_url: String,
    pub fallback_image: String,
    pub timeout_image: String,
    pub image_extension: String,
    pub document_extension: String,
    pub spec_prefix: String,
    pub reserved_id_prefix: String,
    pub load_timeout: Duration,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            url_type: UrlType::default(),
            url_base: None,
            basedir: DEFAULT_BASEDIR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            id_basedir: DEFAULT_ID_BASEDIR.to_string(),
            id_base_url: DEFAULT_ID_BASE_URL.to_string(),
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
            timeout_image: DEFAULT_TIMEOUT_IMAGE.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
            spec_prefix: DEFAULT_SPEC_PREFIX.to_string(),
            reserved_id_prefix: DEFAULT_RESERVED_ID_PREFIX.to_string(),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl ContentSettings {
    /// Placeholder asset for a fallback.
    pub fn fallback_asset(&self, kind: FallbackKind) -> &str {
        match kind {
            FallbackKind::NotFound => &self.fallback_image,
            FallbackKind::Timeout => &self.timeout_image,
        }
    }
}

/// Content folders and URL style of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub basedir: String,
    pub base_url: String,
    pub id_basedir: String,
    pub id_base_url: String,
    pub url_type: UrlType,
    pub url_base: String,
}

impl ResolvedPaths {
    /// Paths of `layer`, or the project defaults when there is no layer.
    pub fn for_layer(layer: Option<&LayerDescriptor>, settings: &ContentSettings) -> Self {
        let Some(layer) = layer else {
            return Self::project(settings);
        };

        let paths = layer.paths.clone().unwrap_or_default();
        let base_url = paths.base_url.unwrap_or_else(|| settings.base_url.clone());
        let url_base = layer
            .url_base
            .clone()
            .or_else(|| settings.url_base.clone())
            .unwrap_or_else(|| base_url.clone());

        Self {
            basedir: paths.basedir.unwrap_or_else(|| settings.basedir.clone()),
            id_basedir: paths
                .id_basedir
                .unwrap_or_else(|| settings.id_basedir.clone()),
            id_base_url: paths
                .id_base_url
                .unwrap_or_else(|| settings.id_base_url.clone()),
            url_type: layer.url_type.unwrap_or(settings.url_type),
            url_base,
            base_url,
        }
    }

    fn project(settings: &ContentSettings) -> Self {
        Self {
            basedir: settings.basedir.clone(),
            base_url: settings.base_url.clone(),
            id_basedir: settings.id_basedir.clone(),
            id_base_url: settings.id_base_url.clone(),
            url_type: settings.url_type,
            url_base: settings
                .url_base
                .clone()
                .unwrap_or_else(|| settings.base_url.clone()),
        }
    }

    /// Image folder for the key's provenance.
    pub fn image_dir(&self, key: &LocationKey) -> &str {
        if key.uses_id_folder() {
            &self.id_basedir
        } else {
            &self.basedir
        }
    }

    /// Document folder for the key's provenance.
    pub fn document_dir(&self, key: &LocationKey) -> &str {
        if key.uses_id_folder() {
            &self.id_base_url
        } else {
            &self.base_url
        }
    }

    /// `{dir}{key}_{slot}.{ext}` under the image folder.
    pub fn image_url(&self, key: &LocationKey, slot: TabSlot, extension: &str) -> String {
        format!("{}{}_{}.{}", self.image_dir(key), key.key, slot, extension)
    }

    /// Document URL in the layer's URL style.
    ///
    /// The `arg` style is `{urlbase}&arg={key}&p={slot}`; keys starting
    /// with `spec_prefix` always use the path form.
    pub fn document_url(
        &self,
        key: &LocationKey,
        slot: TabSlot,
        extension: &str,
        spec_prefix: &str,
    ) -> String {
        let path_form = || format!("{}{}_{}.{}", self.document_dir(key), key.key, slot, extension);
        match self.url_type {
            UrlType::Arg if spec_prefix.is_empty() || !key.key.starts_with(spec_prefix) => {
                format!("{}&arg={}&p={}", self.url_base, key.key, slot)
            }
            _ => path_form(),
        }
    }

    /// Probe URL for one slot under a display mode.
    pub fn content_url(
        &self,
        key: &LocationKey,
        slot: TabSlot,
        mode: DisplayMode,
        settings: &ContentSettings,
    ) -> String {
        match mode {
            DisplayMode::Image => self.image_url(key, slot, &settings.image_extension),
            DisplayMode::Embedded => self.document_url(
                key,
                slot,
                &settings.document_extension,
                &settings.spec_prefix,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::key::KeyProvenance;
    use crate::layer::{LayerKind, LayerPaths};

    fn code_key(key: &str) -> LocationKey {
        LocationKey {
            key: key.to_string(),
            provenance: KeyProvenance::Code,
        }
    }

    fn id_key(key: &str) -> LocationKey {
        LocationKey {
            key: key.to_string(),
            provenance: KeyProvenance::Id,
        }
    }

    #[test]
    fn test_project_defaults_without_layer() {
        let paths = ResolvedPaths::for_layer(None, &ContentSettings::default());
        assert_eq!(
            paths.image_url(&code_key("53394611"), TabSlot::FIRST, "png"),
            "../img/53394611_1.png"
        );
        assert_eq!(
            paths.image_url(&id_key("site"), TabSlot::SECOND, "png"),
            "../my_assets/site_2.png"
        );
        assert_eq!(paths.url_type, UrlType::Raw);
    }

    #[test]
    fn test_layer_paths_override_field_by_field() {
        let mut layer = LayerDescriptor::new("temp", LayerKind::Raster);
        layer.paths = Some(LayerPaths {
            basedir: Some("temp/img/".into()),
            ..LayerPaths::default()
        });
        let paths = ResolvedPaths::for_layer(Some(&layer), &ContentSettings::default());
        assert_eq!(paths.basedir, "temp/img/");
        assert_eq!(paths.base_url, DEFAULT_BASE_URL);
        assert_eq!(paths.id_basedir, DEFAULT_ID_BASEDIR);
    }

    #[test]
    fn test_raw_document_url() {
        let paths = ResolvedPaths::for_layer(None, &ContentSettings::default());
        assert_eq!(
            paths.document_url(&code_key("139.45_35.45"), TabSlot::THIRD, "html", "spec"),
            "../html/139.45_35.45_3.html"
        );
    }

    #[test]
    fn test_arg_document_url() {
        let mut layer = LayerDescriptor::new("temp", LayerKind::Raster);
        layer.url_type = Some(UrlType::Arg);
        layer.url_base = Some("https://example.org/view?layer=t".into());
        let paths = ResolvedPaths::for_layer(Some(&layer), &ContentSettings::default());

        assert_eq!(
            paths.document_url(&code_key("53394611"), TabSlot::FIRST, "html", "spec"),
            "https://example.org/view?layer=t&arg=53394611&p=1"
        );
        assert_eq!(
            paths.document_url(&code_key("spec_001"), TabSlot::FIRST, "html", "spec"),
            "../html/spec_001_1.html",
            "spec-prefixed keys use the path form"
        );
    }

    #[test]
    fn test_arg_url_base_falls_back_to_base_url() {
        let mut layer = LayerDescriptor::new("temp", LayerKind::Raster);
        layer.url_type = Some(UrlType::Arg);
        layer.paths = Some(LayerPaths {
            base_url: Some("docs/?x=1".into()),
            ..LayerPaths::default()
        });
        let paths = ResolvedPaths::for_layer(Some(&layer), &ContentSettings::default());
        assert_eq!(paths.url_base, "docs/?x=1");
    }

    #[test]
    fn test_content_url_by_mode() {
        let settings = ContentSettings::default();
        let paths = ResolvedPaths::for_layer(None, &settings);
        let key = code_key("k");
        assert_eq!(
            paths.content_url(&key, TabSlot::FIRST, DisplayMode::Image, &settings),
            "../img/k_1.png"
        );
        assert_eq!(
            paths.content_url(&key, TabSlot::FIRST, DisplayMode::Embedded, &settings),
            "../html/k_1.html"
        );
    }

    #[test]
    fn test_fallback_asset() {
        let settings = ContentSettings::default();
        assert_eq!(settings.fallback_asset(FallbackKind::NotFound), DEFAULT_FALLBACK_IMAGE);
        assert_eq!(settings.fallback_asset(FallbackKind::Timeout), DEFAULT_TIMEOUT_IMAGE);
    }
}
