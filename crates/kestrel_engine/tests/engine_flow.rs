//! End to end: entity operations queue loads, workers import from memory,
//! `Engine::update` uploads and hands the assets back to the managers.

use glam::DVec3;
use kestrel_assets::{
    AssetData, AssetError, AssetKind, AudioData, FileState, GlyphData, GlyphMap, HeadlessUploader,
    ImageData, Importer, MaterialData, MeshData, ShaderSource,
};
use kestrel_engine::{Engine, EngineConfig, SceneKind, SoundCue};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Produces every asset kind from memory and counts file reads
#[derive(Default)]
struct MemoryImporter {
    reads: AtomicUsize,
}

fn image(name: &str) -> ImageData {
    ImageData {
        name: name.to_string(),
        width: 4,
        height: 4,
        pixels: vec![255; 4 * 4 * 4],
    }
}

impl Importer for MemoryImporter {
    fn load(&self, path: &Path) -> kestrel_assets::Result<Vec<AssetData>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let record = match path.extension().and_then(|e| e.to_str()) {
            Some("vsh") => AssetData::Shader(ShaderSource {
                name,
                vertex: "void main() {}".into(),
                fragment: "void main() {}".into(),
            }),
            Some("obj") => {
                let mut mesh = MeshData::new(name);
                mesh.positions = vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
                mesh.indices = vec![0, 1, 2];
                AssetData::Mesh(mesh)
            }
            Some("png") => AssetData::Image(image(&name)),
            Some("mtl") => AssetData::Material(MaterialData {
                name,
                color: [0.2, 0.4, 0.6, 1.0],
                metallic: 0.0,
                roughness: 0.8,
            }),
            Some("wav") => AssetData::Audio(AudioData {
                name,
                channels: 1,
                sample_bits: 16,
                frequency: 22050,
                samples: vec![0; 64],
            }),
            Some("fnt") => {
                let glyph = |ch, x| GlyphData {
                    ch,
                    x,
                    width: 4,
                    height: 8,
                    x_advance: 5,
                    ..Default::default()
                };
                AssetData::FontAtlas(
                    GlyphMap {
                        name: name.clone(),
                        width: 16,
                        height: 16,
                        line_height: 10,
                        glyphs: vec![glyph('a', 0), glyph('b', 4)],
                    },
                    image(&name),
                )
            }
            _ => return Err(AssetError::NotFound(path.display().to_string())),
        };
        Ok(vec![record])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["vsh", "obj", "png", "mtl", "wav", "fnt"]
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn engine() -> (Engine, Arc<MemoryImporter>) {
    let importer = Arc::new(MemoryImporter::default());
    let config = EngineConfig::default().with_workers(3);
    let engine = Engine::new(config, importer.clone(), Box::new(HeadlessUploader::new())).unwrap();
    (engine, importer)
}

fn update_until_idle(engine: &mut Engine) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        engine.update();
        if engine.is_idle() {
            return;
        }
        assert!(Instant::now() < deadline, "engine did not go idle");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_model_loads_and_becomes_template() {
    let (mut engine, importer) = engine();
    let scene = engine.add_scene(SceneKind::Perspective).unwrap().eid();
    let first = engine
        .ent(scene)
        .add_part()
        .unwrap()
        .make_model("flat", "box")
        .add_texture("crate")
        .load_material("paint")
        .eid();

    update_until_idle(&mut engine);
    let model = engine.components().models.get(first).unwrap();
    assert!(model.is_loaded());
    assert_eq!(model.color, [0.2, 0.4, 0.6]);
    assert_eq!(importer.reads.load(Ordering::SeqCst), 4);

    let template = engine.depot().model("box").unwrap();
    assert_eq!(template.shader.name, "flat");
    assert_eq!(template.textures.len(), 1);

    // The next instance is complete immediately and reads nothing
    let second = engine
        .ent(scene)
        .add_part()
        .unwrap()
        .make_model("flat", "box")
        .add_texture("crate")
        .load_material("paint")
        .eid();
    assert!(engine.is_idle());
    let model = engine.components().models.get(second).unwrap();
    assert!(model.is_loaded());
    assert!(model.is_instance());
    assert_eq!(model.color, [0.2, 0.4, 0.6]);
    update_until_idle(&mut engine);
    assert_eq!(importer.reads.load(Ordering::SeqCst), 4);
}

#[test]
fn test_shared_parts_read_once() {
    let (mut engine, importer) = engine();
    let a = engine.add_part().unwrap().make_model("flat", "box").eid();
    let b = engine.add_part().unwrap().make_model("flat", "cone").eid();
    assert_eq!(engine.loader().file_state("flat.vsh"), FileState::Unrequested);

    engine.update();
    assert_ne!(engine.loader().file_state("flat.vsh"), FileState::Unrequested);
    update_until_idle(&mut engine);
    assert_eq!(engine.loader().file_state("flat.vsh"), FileState::Loaded);

    // flat.vsh, box.obj and cone.obj
    assert_eq!(importer.reads.load(Ordering::SeqCst), 3);
    let shader_a = engine.components().models.get(a).unwrap().shader.clone().unwrap();
    let shader_b = engine.components().models.get(b).unwrap().shader.clone().unwrap();
    assert!(Arc::ptr_eq(&shader_a, &shader_b));
}

#[test]
fn test_label_typesets_once_font_loads() {
    let (mut engine, importer) = engine();
    let eid = engine
        .add_scene(SceneKind::Orthographic)
        .unwrap()
        .add_part()
        .unwrap()
        .make_label("txt", "lucida")
        .typeset("abab")
        .eid();
    assert_eq!(engine.ent(eid).label_size(), (0, 0));

    update_until_idle(&mut engine);
    assert_eq!(engine.ent(eid).label_size(), (20, 10));
    // txt.vsh and lucida.fnt; the atlas texture comes from the font file
    assert_eq!(importer.reads.load(Ordering::SeqCst), 2);
    assert!(engine.components().models.get(eid).unwrap().is_loaded());
    let mesh = engine.components().models.get(eid).unwrap().mesh.clone().unwrap();
    assert_eq!(mesh.vertex_count, 16);

    // Wrapping at 10 pixels puts two glyphs on each line
    engine.ent(eid).set_wrap(10);
    update_until_idle(&mut engine);
    assert_eq!(engine.ent(eid).label_size(), (10, 20));
    let rewrapped = engine.components().models.get(eid).unwrap().mesh.clone().unwrap();
    assert_eq!(rewrapped.handle, mesh.handle);
    assert!(engine.depot().model("lucida").is_none());
}

#[test]
fn test_sound_plays_from_entity() {
    let (mut engine, _) = engine();
    let mut ent = engine.add_part().unwrap().at(DVec3::new(3.0, 0.0, 0.0));
    let index = ent.add_sound("ping").unwrap();
    let eid = ent.eid();
    assert!(!engine.ent(eid).play_sound(index));

    update_until_idle(&mut engine);
    engine.drain_sound_cues();
    assert!(engine.ent(eid).play_sound(index));

    let handle = engine.depot().sound("ping").unwrap().handle;
    assert_eq!(
        engine.drain_sound_cues(),
        vec![SoundCue::Play {
            sound: handle,
            location: DVec3::new(3.0, 0.0, 0.0)
        }]
    );
}

#[test]
fn test_disposed_entity_ignores_late_loads() {
    let (mut engine, _) = engine();
    let eid = engine.add_part().unwrap().make_model("flat", "box").eid();
    engine.update();
    assert!(engine.dispose_entity(eid));

    update_until_idle(&mut engine);
    assert!(engine.components().models.get(eid).is_none());
    assert!(engine.depot().fetch(AssetKind::Mesh, "box").is_some());
    assert!(engine.depot().model("box").is_none());
    engine.shutdown();
}
