//! # GPU Upload — Probe Volumes as 3D Textures
//!
//! Uploads the three [`PackedProbeVolumes`] channels as `Rgba16Float` 3D
//! textures. The lighting shader samples all three at the same coordinate and
//! reassembles RGB coefficients:
//!
//! ```text
//! texel(x * texels_per_probe + k, y, z)  in red/green/blue
//!   → scaled coefficients 4k..4k+4 of probe (x, y, z)
//! ```
//!
//! The bytes are written exactly as [`f32_to_f16`](crate::half_float::f32_to_f16)
//! produced them, so a CPU-side [`ProbeGrid::unpack`](crate::ProbeGrid::unpack)
//! and the GPU see the same values.

use wgpu::util::DeviceExt;

use crate::probe_grid::PackedProbeVolumes;

/// The three channel textures of a probe grid.
pub struct ProbeVolumeTextures {
    pub red: wgpu::Texture,
    pub green: wgpu::Texture,
    pub blue: wgpu::Texture,
}

impl ProbeVolumeTextures {
    /// Default views, in R, G, B order, for a bind group.
    pub fn views(&self) -> [wgpu::TextureView; 3] {
        [&self.red, &self.green, &self.blue]
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
    }
}

/// Create and fill the three `Rgba16Float` volume textures.
pub fn upload_probe_volumes(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    volumes: &PackedProbeVolumes,
) -> ProbeVolumeTextures {
    let size = wgpu::Extent3d {
        width: volumes.width,
        height: volumes.height,
        depth_or_array_layers: volumes.depth,
    };
    let [red, green, blue] = volumes.channel_bytes();

    let create = |label: &str, data: &[u8]| {
        device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D3,
                format: wgpu::TextureFormat::Rgba16Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        )
    };

    let textures = ProbeVolumeTextures {
        red: create("sh probes red", red),
        green: create("sh probes green", green),
        blue: create("sh probes blue", blue),
    };

    log::info!(
        "Uploaded SH probe volumes: {}x{}x{} texels, {} bytes per channel",
        volumes.width,
        volumes.height,
        volumes.depth,
        red.len()
    );

    textures
}
