//! Pack a small probe grid and upload it as three 3D textures on a headless
//! GPU device.
//!
//! Run with: `cargo run -p shprobe --example upload_volumes --features gpu`

use glam::Vec3;
use shprobe::prelude::*;

fn main() {
    env_logger::init();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .expect("Failed to find a suitable GPU adapter");

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("shprobe device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        ..Default::default()
    }))
    .expect("Failed to create GPU device");

    // A 4x2x4 grid, brighter towards +X.
    let desc = ProbeGridDesc::new(4, 2, 4);
    let band = Band::default();
    let probes = (0..desc.probe_count())
        .map(|i| {
            let x = (i % desc.nx as usize) as f32;
            let mut coefficients = vec![Vec3::ZERO; band.coeff_count()];
            coefficients[0] = Vec3::splat(1.0 + x);
            coefficients[3] = Vec3::new(-0.5, -0.25, 0.0);
            CompressedSh::new(band, coefficients).expect("coefficient count matches band")
        })
        .collect();
    let grid = ProbeGrid::new(desc, band, probes).expect("probe count matches grid");

    let packed = grid.pack();
    let textures = upload_probe_volumes(&device, &queue, &packed);
    let views = textures.views();

    println!(
        "uploaded {} probes into {} volumes of {:?}",
        desc.probe_count(),
        views.len(),
        textures.red.size()
    );
}
