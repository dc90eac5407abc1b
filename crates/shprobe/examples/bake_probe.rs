//! Bake one SH probe from a synthetic sky/ground cubemap.
//!
//! Run with: `RUST_LOG=debug cargo run -p shprobe --example bake_probe`

use glam::Vec3;
use shprobe::prelude::*;

const RESOLUTION: u32 = 64;

const SKY: Vec3 = Vec3::new(0.4, 0.6, 1.0);
const GROUND: Vec3 = Vec3::new(0.3, 0.2, 0.1);
const SUN_DIR: Vec3 = Vec3::new(0.3, 0.8, 0.5);

/// Simple outdoor environment: blue sky, brown ground, a warm sun spot.
fn environment(dir: Vec3) -> Vec3 {
    let base = if dir.y >= 0.0 { SKY } else { GROUND };
    let sun = dir.dot(SUN_DIR.normalize()).max(0.0).powf(64.0);
    base + Vec3::new(4.0, 3.6, 3.0) * sun
}

/// Render every face into `Rgba16Float` bytes, in GPU layer order.
fn render_layers() -> Vec<Vec<u8>> {
    (0..6)
        .map(|layer| {
            let face = CubeFace::from_layer(layer).expect("cube textures have 6 layers");
            let mut bytes = Vec::with_capacity((RESOLUTION * RESOLUTION * 8) as usize);
            for v in 0..RESOLUTION {
                for u in 0..RESOLUTION {
                    let color = environment(face.texel_direction(u, v, RESOLUTION).normalize());
                    for channel in [color.x, color.y, color.z, 1.0] {
                        bytes.extend_from_slice(&f32_to_f16(channel).to_le_bytes());
                    }
                }
            }
            bytes
        })
        .collect()
}

fn main() {
    env_logger::init();

    let layers = render_layers();
    let layers: [&[u8]; 6] = std::array::from_fn(|i| layers[i].as_slice());

    let capture = ShCapture::new(CaptureSettings::default());
    let sh = capture
        .capture_layers(layers, RESOLUTION, PixelFormat::Rgba16Float)
        .expect("capture failed");

    println!("{} coefficients (band {}):", sh.coefficients().len(), sh.band());
    for (i, c) in sh.coefficients().iter().enumerate() {
        println!("  [{i:2}] {:>9.4} {:>9.4} {:>9.4}", c.x, c.y, c.z);
    }

    for (name, dir) in [("up", Vec3::Y), ("down", Vec3::NEG_Y), ("sun", SUN_DIR)] {
        let approx = sh.evaluate(dir);
        let exact = environment(dir.normalize());
        println!("{name:>5}: sh {approx:.3}  env {exact:.3}");
    }

    let json = serde_json::to_string_pretty(&sh).expect("coefficients serialize");
    println!("{json}");

    let grid = ProbeGrid::new(ProbeGridDesc::new(1, 1, 1), sh.band(), vec![sh])
        .expect("one probe fills a 1x1x1 grid");
    let packed = grid.pack();
    println!(
        "packed volume: {}x{}x{} texels, {} bytes per channel",
        packed.width,
        packed.height,
        packed.depth,
        packed.channel_bytes()[0].len()
    );
}
