//! Loader Demo
//!
//! Writes a handful of asset files to a temporary directory and loads them
//! through a headless engine:
//! - two models sharing a shader, the second built from the first's template
//! - a sound played from an entity once it has loaded
//! - two stacked boxes and the contacts between them
//!
//! Run with: cargo run -p kestrel_engine --example loader_demo
//! Set RUST_LOG=kestrel_assets=debug to watch each drain.

use glam::DVec3;
use kestrel_engine::{Engine, EngineConfig, SceneKind};
use kestrel_physics::Collider;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

const CUBE: &str = "\
o cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 3 4 8 7
f 2 3 7 6
f 1 5 8 4
";

fn write_assets(dir: &Path) -> std::io::Result<()> {
    fs::write(dir.join("flat.vsh"), "void main() { gl_Position = vec4(0.0); }")?;
    fs::write(dir.join("flat.fsh"), "void main() {}")?;
    fs::write(dir.join("cube.obj"), CUBE)?;
    fs::write(dir.join("paint.mtl"), "newmtl paint\nKd 0.9 0.3 0.1\n")?;

    let samples = [0u8; 256];
    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&22050u32.to_le_bytes());
    wav.extend_from_slice(&(22050u32 * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    wav.extend_from_slice(&samples);
    fs::write(dir.join("ping.wav"), wav)
}

fn update_until_idle(engine: &mut Engine) {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut frames = 0;
    while !engine.is_idle() && Instant::now() < deadline {
        let stats = engine.update();
        frames += 1;
        if stats.budget_exhausted {
            tracing::info!(frame = frames, "drain budget used up, continuing next frame");
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    tracing::info!(frames, idle = engine.is_idle(), "loading finished");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let dir = tempfile::tempdir()?;
    write_assets(dir.path())?;

    let config = EngineConfig::default()
        .with_workers(2)
        .with_asset_dir(dir.path());
    let mut engine = Engine::headless(config)?;
    let scene = engine.add_scene(SceneKind::Perspective)?.eid();

    let first = engine
        .ent(scene)
        .add_part()?
        .make_model("flat", "cube")
        .load_material("paint")
        .make_body(Collider::cuboid(DVec3::splat(0.5)), 1.0);
    let first = first.eid();
    let mut speaker = engine.ent(first).add_part()?.at(DVec3::new(0.0, 2.0, 0.0));
    let ping = speaker.add_sound("ping");
    let speaker = speaker.eid();
    update_until_idle(&mut engine);

    let second = engine
        .ent(scene)
        .add_part()?
        .at(DVec3::new(0.0, 0.0, 0.9))
        .make_model("flat", "cube")
        .load_material("paint")
        .make_body(Collider::cuboid(DVec3::splat(0.5)), 1.0)
        .eid();
    if let Some(model) = engine.components().models.get(second) {
        tracing::info!(
            loaded = model.is_loaded(),
            from_template = model.is_instance(),
            color = ?model.color,
            "second cube"
        );
    }

    if let Some(index) = ping {
        engine.ent(speaker).play_sound(index);
    }
    for cue in engine.drain_sound_cues() {
        tracing::info!(?cue, "audio");
    }

    engine.update();
    let contacts = engine
        .components()
        .bodies
        .contacts(first, second, DVec3::Z, 0.1);
    for contact in &contacts {
        tracing::info!(
            point = %contact.point1,
            penetration = contact.penetration(),
            "contact"
        );
    }

    let stats = engine.depot().stats();
    tracing::info!(assets = stats.total(), contacts = contacts.len(), "done");
    engine.shutdown();
    Ok(())
}
