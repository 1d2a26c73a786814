//! Example: Run every built-in effect over an image.
//!
//! Reads a PNG when a path is given, otherwise uses a synthetic gradient,
//! and writes one PNG per effect into the current directory.
//!
//! Run with:
//!     cargo run --example apply_effects --features tokio -- [input.png] [config.json]

use anyhow::Context;
use liveeffect::config::RuntimeConfig;
use liveeffect::effects::{EffectEnv, EffectRegistry};
use liveeffect::params::ParameterSet;
use liveeffect::ImageBuffer;

fn synthetic(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, |x, y| {
        let checker = ((x / 16) + (y / 16)) % 2 == 0;
        [
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            if checker { 220 } else { 40 },
            255,
        ]
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    liveeffect::init_logging();

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => {
            let decoded = image::open(&path).with_context(|| format!("reading {}", path))?;
            ImageBuffer::from_rgba_image(decoded.to_rgba8())
        }
        None => synthetic(333, 200),
    };
    let config = match args.next() {
        Some(path) => RuntimeConfig::from_path(&path)?,
        None => RuntimeConfig::default(),
    };

    println!("LiveEffect - Apply Effects Example");
    println!("==================================\n");
    println!("Input: {}x{}", input.width(), input.height());

    let registry = EffectRegistry::builtin(&config);
    for (id, error) in registry.initialize_all() {
        println!("  {} unavailable: {}", id, error);
    }

    let env = EffectEnv::new(2.0, 1.0);
    for info in registry.list() {
        let effect = registry.get(info.id)?;
        if !effect.is_initialized() {
            continue;
        }

        let params = effect.normalize(&effect.schema().defaults());
        let start = std::time::Instant::now();
        let output = effect.invoke(&params, &input, &env)?;
        let path = format!("{}.png", info.id);
        output.save_png(&path)?;

        println!(
            "  {} v{} -> {} ({:.1} ms)",
            info.title,
            info.version,
            path,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let blended = {
        let blur = registry.get("box-blur")?;
        let a = ParameterSet::new().with("radius", 2.0);
        let b = ParameterSet::new().with("radius", 20.0);
        blur.interpolate(&blur.normalize(&a), &blur.normalize(&b), 0.5)
    };
    println!("\nInterpolated blur params: {}", blended.to_json()?);

    Ok(())
}
