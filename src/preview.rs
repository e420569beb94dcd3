//! Preview surface.
//!
//! Maps the selected asset to what the view should show: an image, or a
//! request for the external 3D viewer. The viewer owns loading and
//! rendering; it is expected to show [`ViewerSettings::loading_label`]
//! until the model is ready.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::gallery::{AssetKind, AssetRecord};

/// Scene defaults handed to the 3D viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera_position: [f32; 3],
    pub field_of_view_degrees: f32,
    pub ambient_light_intensity: f32,
    pub directional_light_position: [f32; 3],
    pub directional_light_intensity: f32,
    /// Uniform scale applied to the loaded scene.
    pub model_scale: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    /// Name of the environment map preset.
    pub environment_preset: String,
    pub loading_label: String,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            camera_position: [0.0, 0.0, 5.0],
            field_of_view_degrees: 45.0,
            ambient_light_intensity: 0.5,
            directional_light_position: [5.0, 5.0, 5.0],
            directional_light_intensity: 1.0,
            model_scale: 1.5,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            enable_pan: true,
            enable_zoom: true,
            environment_preset: "sunset".to_string(),
            loading_label: "Loading 3D Model...".to_string(),
        }
    }
}

/// Everything the 3D viewer needs to show one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerRequest {
    pub model_url: Url,
    pub settings: ViewerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    Image { url: Url, name: String },
    Model(ViewerRequest),
}

impl Preview {
    pub fn for_asset(asset: &AssetRecord, viewer: &ViewerSettings) -> Self {
        match asset.kind {
            AssetKind::Image => Preview::Image {
                url: asset.url.clone(),
                name: asset.name.clone(),
            },
            AssetKind::Model => Preview::Model(ViewerRequest {
                model_url: asset.url.clone(),
                settings: viewer.clone(),
            }),
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Preview::Image { url, .. } => url,
            Preview::Model(request) => &request.model_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: AssetKind, path: &str) -> AssetRecord {
        AssetRecord {
            path: path.to_string(),
            url: Url::parse(&format!("memory:///{}", path)).unwrap(),
            name: "x".to_string(),
            kind,
            uploaded_at: None,
            size: None,
        }
    }

    #[test]
    fn test_model_preview_carries_viewer_defaults() {
        let asset = record(AssetKind::Model, "uploads/u1/1_scene.glb");
        let Preview::Model(request) = Preview::for_asset(&asset, &ViewerSettings::default()) else {
            panic!("expected a model preview");
        };
        assert_eq!(request.model_url, asset.url);
        assert_eq!(request.settings.camera_position, [0.0, 0.0, 5.0]);
        assert_eq!(request.settings.field_of_view_degrees, 45.0);
        assert_eq!(request.settings.environment_preset, "sunset");
    }

    #[test]
    fn test_image_preview() {
        let asset = record(AssetKind::Image, "uploads/u1/1_cat.png");
        let preview = Preview::for_asset(&asset, &ViewerSettings::default());
        assert!(matches!(preview, Preview::Image { .. }));
        assert_eq!(preview.url(), &asset.url);
    }

    #[test]
    fn test_viewer_settings_partial_json() {
        let settings: ViewerSettings =
            serde_json::from_str(r#"{"auto_rotate": false, "model_scale": 2.0}"#).unwrap();
        assert!(!settings.auto_rotate);
        assert_eq!(settings.model_scale, 2.0);
        assert_eq!(settings.loading_label, "Loading 3D Model...");
    }
}
