//! # Capture — From Rendered Faces to Coefficients
//!
//! The renderer draws the scene six times around a probe position (one
//! camera per [`CubeFace`](crate::CubeFace), oriented by its `look_dir` and
//! `up`), reads the faces back, and hands the bytes to
//! [`ShCapture`]:
//!
//! ```text
//! face bytes ──decode──▶ CubemapSampleSet ──┐
//!                                           ├──project──▶ CompressedSh
//! (resolution, band) ──cache──▶ BasisTable ─┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let capture = ShCapture::new(CaptureSettings::default());
//! let sh = capture.capture_layers(layers, 64, PixelFormat::Rgba16Float)?;
//! probe_grid_probes.push(sh);
//! ```
//!
//! ## Comparison
//!
//! - **Bevy**: `LightProbe` + `EnvironmentMapLight` keep the prefiltered
//!   cubemap itself. Here the cubemap is thrown away after projection and
//!   only `band²` RGB triples survive.
//! - **Unity**: `LightProbes` bake fixed 3-band SH. The band is configurable
//!   here (1 to 6).

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::basis::Band;
use crate::cache::{BasisCache, DEFAULT_CACHE_CAPACITY};
use crate::coeffs::CompressedSh;
use crate::error::{Result, ShError};
use crate::project::project;
use crate::samples::{CubemapSampleSet, PixelFormat};

/// Capture parameters. Embed in your own config and (de)serialize with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// SH band to project onto.
    pub band: Band,
    /// How many basis tables to keep around (one per face resolution).
    pub cache_capacity: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            band: Band::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Turns captured cubemaps into [`CompressedSh`] coefficients.
///
/// Cheap to share between threads: captures only read the cache's tables.
pub struct ShCapture {
    settings: CaptureSettings,
    cache: Arc<BasisCache>,
}

impl ShCapture {
    /// A capture pipeline with its own basis cache.
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            cache: Arc::new(BasisCache::new(settings.cache_capacity)),
        }
    }

    /// A capture pipeline sharing `cache` with other pipelines.
    pub fn with_cache(settings: CaptureSettings, cache: Arc<BasisCache>) -> Self {
        Self { settings, cache }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<BasisCache> {
        &self.cache
    }

    /// Project six faces given in [`CubeFace::ALL`](crate::CubeFace::ALL) order.
    pub fn capture(
        &self,
        faces: [&[u8]; 6],
        resolution: u32,
        format: PixelFormat,
    ) -> Result<CompressedSh> {
        let samples = CubemapSampleSet::build(faces, resolution, format)
            .inspect_err(|e| warn_rejected(e, format))?;
        self.capture_samples(&samples)
    }

    /// Project six faces given in GPU layer order (+X, -X, +Y, -Y, +Z, -Z).
    pub fn capture_layers(
        &self,
        layers: [&[u8]; 6],
        resolution: u32,
        format: PixelFormat,
    ) -> Result<CompressedSh> {
        let samples = CubemapSampleSet::from_layers(layers, resolution, format)
            .inspect_err(|e| warn_rejected(e, format))?;
        self.capture_samples(&samples)
    }

    /// Project already decoded samples.
    pub fn capture_samples(&self, samples: &CubemapSampleSet) -> Result<CompressedSh> {
        let start = Instant::now();
        let basis = self.cache.get_or_build(self.settings.band, samples.resolution())?;
        let sh = project(samples, &basis)?;

        log::info!(
            "Captured SH probe: band {}, {} coefficients from {}x{} faces in {:.2?}",
            self.settings.band,
            sh.coefficients().len(),
            samples.resolution(),
            samples.resolution(),
            start.elapsed()
        );
        Ok(sh)
    }
}

impl Default for ShCapture {
    fn default() -> Self {
        Self::new(CaptureSettings::default())
    }
}

fn warn_rejected(err: &ShError, format: PixelFormat) {
    if let ShError::UnsupportedFormat(_) = err {
        log::warn!("SH capture skipped: cannot decode {format:?} faces");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::SH_NORMALIZATION;
    use crate::face::CubeFace;
    use glam::Vec3;

    fn rgba8_faces(n: usize, rgba: [u8; 4]) -> Vec<Vec<u8>> {
        (0..6).map(|_| rgba.repeat(n * n)).collect()
    }

    fn as_array(faces: &[Vec<u8>]) -> [&[u8]; 6] {
        std::array::from_fn(|i| faces[i].as_slice())
    }

    #[test]
    fn default_settings() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.band.get(), 3);
        assert_eq!(settings.cache_capacity, 8);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: CaptureSettings = serde_json::from_str(r#"{"band":5}"#).unwrap();
        assert_eq!(settings.band.get(), 5);
        assert_eq!(settings.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(serde_json::from_str::<CaptureSettings>(r#"{"band":9}"#).is_err());
    }

    #[test]
    fn white_environment_captures_dc() {
        let capture = ShCapture::default();
        let faces = rgba8_faces(16, [255, 255, 255, 255]);
        let sh = capture.capture(as_array(&faces), 16, PixelFormat::Rgba8Unorm).unwrap();

        assert_eq!(sh.coefficients().len(), 9);
        let expected = SH_NORMALIZATION[0] * 4.0 * std::f32::consts::PI;
        assert!((sh.coefficients()[0].x - expected).abs() < 1e-2);
        assert!((sh.evaluate(Vec3::Y) - Vec3::ONE).length() < 2e-2);
    }

    #[test]
    fn tables_are_reused_between_captures() {
        let capture = ShCapture::new(CaptureSettings {
            band: Band::new(2).unwrap(),
            cache_capacity: 2,
        });
        let faces = rgba8_faces(4, [10, 20, 30, 255]);
        let a = capture.capture(as_array(&faces), 4, PixelFormat::Rgba8Unorm).unwrap();
        let b = capture.capture(as_array(&faces), 4, PixelFormat::Rgba8Unorm).unwrap();
        assert_eq!(a, b);
        assert_eq!(capture.cache().len(), 1);
        assert!(capture.cache().contains(Band::new(2).unwrap(), 4));
    }

    #[test]
    fn shared_cache() {
        let cache = Arc::new(BasisCache::new(4));
        let settings = CaptureSettings::default();
        let a = ShCapture::with_cache(settings, Arc::clone(&cache));
        let b = ShCapture::with_cache(settings, Arc::clone(&cache));
        let faces = rgba8_faces(2, [0, 0, 0, 255]);
        a.capture(as_array(&faces), 2, PixelFormat::Rgba8Unorm).unwrap();
        b.capture(as_array(&faces), 2, PixelFormat::Rgba8Unorm).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let capture = ShCapture::default();
        let faces = rgba8_faces(2, [0, 0, 0, 255]);
        let err = capture
            .capture(as_array(&faces), 2, PixelFormat::Bgra8Unorm)
            .unwrap_err();
        assert_eq!(err, ShError::UnsupportedFormat(PixelFormat::Bgra8Unorm));
        assert!(capture.cache().is_empty());
    }

    #[test]
    fn layer_order_matches_face_order() {
        let capture = ShCapture::new(CaptureSettings {
            band: Band::new(2).unwrap(),
            ..Default::default()
        });
        // Only the +Y layer (layer 2) is lit.
        let layers: Vec<Vec<u8>> = (0..6)
            .map(|layer| {
                let v = if layer == 2 { 255 } else { 0 };
                [v, v, v, 255].repeat(16)
            })
            .collect();
        let from_layers = capture
            .capture_layers(as_array(&layers), 4, PixelFormat::Rgba8Unorm)
            .unwrap();

        let faces: Vec<Vec<u8>> = CubeFace::ALL
            .iter()
            .map(|face| layers[face.layer()].clone())
            .collect();
        let from_faces = capture.capture(as_array(&faces), 4, PixelFormat::Rgba8Unorm).unwrap();

        assert_eq!(from_layers, from_faces);
        // Light from +Y: Y(1,-1) is negative in y.
        assert!(from_layers.coefficients()[1].x < 0.0);
    }
}
