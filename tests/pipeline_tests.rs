//! Integration tests running the whole pipeline against an in-memory scene.

use std::path::Path;

use mtlx_synth::geom::TransformParams;
use mtlx_synth::material::{ChannelCategory, MATERIAL_BIND_ATTRIB, MATERIAL_PATH_ATTRIB};
use mtlx_synth::pipeline::{Pipeline, PipelineConfig, ProgressEvent, Stage};
use mtlx_synth::scene::{MemoryScene, NodeKind, NodePath, Parm, ParmValue, SceneGraph};
use mtlx_synth::util::init_logging;
use mtlx_synth::Error;

use tempfile::TempDir;

fn texture_folder(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for file in files {
        std::fs::write(dir.path().join(file), b"").expect("Failed to write texture");
    }
    dir
}

/// `/obj/fbx` with one geometry node per (name, material path).
fn imported_scene(geos: &[(&str, &str)]) -> MemoryScene {
    let mut scene = MemoryScene::new();
    let fbx = scene
        .create_node(&NodePath::new("/obj"), NodeKind::ObjSubnet, "fbx")
        .expect("Failed to create fbx subnet");
    for (name, material) in geos {
        scene
            .create_geometry(&fbx, name, MATERIAL_PATH_ATTRIB, &[*material])
            .expect("Failed to create geometry");
    }
    scene
}

fn wood_metal() -> (MemoryScene, TempDir) {
    let scene = imported_scene(&[("G1", "/m/Wood"), ("G2", "/m/Metal")]);
    let textures = texture_folder(&["wood_basecolor.png", "wood_roughness.png", "metal_metallic.png"]);
    (scene, textures)
}

fn config(textures: &Path) -> PipelineConfig {
    PipelineConfig::new(textures, "/obj/fbx")
}

fn lopnet() -> NodePath {
    NodePath::new("/stage/lopnet")
}

fn image_file(scene: &MemoryScene, material: &str, image: &str) -> String {
    let path = NodePath::new(format!("/stage/lopnet/matlib/{material}/{image}"));
    scene
        .eval_string(&path, "file")
        .expect("Failed to read file parm")
        .expect("Image has no file parm")
}

#[test]
fn test_end_to_end_wood_metal() {
    init_logging("mtlx_synth=debug");
    let (mut scene, textures) = wood_metal();
    let report = Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert_eq!(report.identifiers(), vec!["Wood", "Metal"]);
    assert!(report.containers_created);
    assert_eq!(report.subgraphs_created, 2);
    assert_eq!(report.references_created, 2);

    // Wood: base color and roughness bound
    assert!(image_file(&scene, "Wood", "base_color").ends_with("wood_basecolor.png"));
    assert!(image_file(&scene, "Wood", "specular_roughness").ends_with("wood_roughness.png"));
    assert_eq!(image_file(&scene, "Wood", "metalness"), "");
    assert!(Path::new(&image_file(&scene, "Wood", "base_color")).is_absolute());

    // Metal: only metallic bound
    assert!(image_file(&scene, "Metal", "metalness").ends_with("metal_metallic.png"));
    for image in ["base_color", "specular", "specular_roughness", "normal"] {
        assert_eq!(image_file(&scene, "Metal", image), "", "{image} should be unbound");
    }

    // Slot wiring on the PBR shader
    let wood = NodePath::new("/stage/lopnet/matlib/Wood");
    let shader = wood.join("mtlx_material");
    assert_eq!(scene.input(&shader, 1).unwrap(), Some(wood.join("base_color")));
    assert_eq!(scene.input(&shader, 6).unwrap(), Some(wood.join("specular_roughness")));
    assert_eq!(
        scene.input(&wood.join("mtlxdisplacement"), 0).unwrap(),
        Some(wood.join("normal"))
    );

    let metal = report.material("Metal").unwrap();
    assert_eq!(metal.textures, vec!["metal_metallic.png".to_string()]);
    let bound: Vec<ChannelCategory> = metal
        .bindings
        .iter()
        .filter(|b| b.is_resolved())
        .map(|b| b.channel)
        .collect();
    assert_eq!(bound, vec![ChannelCategory::Metallic]);

    // Material library assignment
    let matlib = lopnet().join("matlib");
    assert_eq!(scene.parm(&matlib, "materials").unwrap(), Some(ParmValue::Int(2)));
    assert_eq!(scene.parm(&matlib, "assign1").unwrap(), Some(ParmValue::Int(1)));
}

#[test]
fn test_material_paths_rewritten() {
    let scene_geos = [("G1", "/shop/materials/Wood")];
    let mut scene = imported_scene(&scene_geos);
    let textures = texture_folder(&[]);
    Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");

    let geo = NodePath::new("/obj/fbx/G1");
    assert_eq!(
        scene.prim_string_attrib(&geo, MATERIAL_PATH_ATTRIB).unwrap(),
        Some(vec!["/materials/Wood".to_string()])
    );
    assert_eq!(
        scene.prim_string_attrib(&geo, MATERIAL_BIND_ATTRIB).unwrap(),
        Some(vec!["Wood".to_string()])
    );

    let reference = lopnet().join("geometries").join("G1");
    assert_eq!(
        scene.eval_string(&reference, "partitionattribs").unwrap().as_deref(),
        Some(MATERIAL_BIND_ATTRIB)
    );
    assert_eq!(
        scene.eval_string(&reference, "soppath").unwrap().as_deref(),
        Some("/obj/fbx/G1")
    );
}

#[test]
fn test_second_run_is_noop() {
    let (mut scene, textures) = wood_metal();
    let mut pipeline = Pipeline::new(config(textures.path()));
    pipeline.run(&mut scene).expect("First run failed");
    let before = scene.snapshot(&lopnet()).unwrap();

    let report = pipeline.run(&mut scene).expect("Second run failed");
    assert!(!report.containers_created);
    assert_eq!(report.subgraphs_created, 0);
    assert_eq!(report.subgraphs_skipped, 2);
    assert_eq!(report.references_skipped, 2);
    assert!(report.materials.iter().all(|m| m.bindings.is_empty()));
    assert_eq!(scene.snapshot(&lopnet()).unwrap(), before);
}

#[test]
fn test_rebuild_after_destroy_is_identical() {
    let (mut scene, textures) = wood_metal();
    let mut pipeline = Pipeline::new(config(textures.path()));
    pipeline.run(&mut scene).expect("First run failed");
    let first = scene.to_json(&lopnet()).unwrap();

    scene.destroy(&lopnet()).unwrap();
    assert!(!scene.exists(&lopnet()));

    let report = pipeline.run(&mut scene).expect("Second run failed");
    assert!(report.containers_created);
    assert_eq!(scene.to_json(&lopnet()).unwrap(), first);
}

#[test]
fn test_partially_built_library_is_completed() {
    let (mut scene, textures) = wood_metal();
    let mut pipeline = Pipeline::new(config(textures.path()));
    pipeline.run(&mut scene).expect("First run failed");
    let full = scene.snapshot(&lopnet()).unwrap();

    scene.destroy(&NodePath::new("/stage/lopnet/matlib/Metal")).unwrap();
    let report = pipeline.run(&mut scene).expect("Second run failed");
    assert_eq!(report.subgraphs_created, 1);
    assert!(report.material("Metal").unwrap().created);
    assert!(!report.material("Wood").unwrap().created);
    assert_eq!(scene.snapshot(&lopnet()).unwrap(), full);
}

#[test]
fn test_partial_containers_abort() {
    let (mut scene, textures) = wood_metal();
    let mut pipeline = Pipeline::new(config(textures.path()));
    pipeline.run(&mut scene).expect("First run failed");

    scene.destroy(&lopnet().join("matlib")).unwrap();
    let err = pipeline.run(&mut scene).unwrap_err();
    println!("{err}");
    assert!(matches!(err, Error::MissingContainer(_)));
    // Geometry references untouched by the aborted run
    assert!(scene.exists(&lopnet().join("geometries").join("G1_transform")));
}

#[test]
fn test_transform_fidelity() {
    let (mut scene, textures) = wood_metal();
    let source = NodePath::new("/obj/fbx/G1");
    scene
        .set_parms(
            &source,
            &[
                Parm::new("tx", 12.5),
                Parm::new("ty", -3.0),
                Parm::new("rx", 90.0),
                Parm::new("rz", -15.25),
                Parm::new("sy", 0.5),
                Parm::new("scale", 2.0),
                Parm::new("px", 1.0),
                Parm::new("pry", 30.0),
            ],
        )
        .unwrap();

    Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");

    let xform = lopnet().join("geometries").join("G1_transform");
    let expected = TransformParams::read(&scene, &source).unwrap();
    let copied = TransformParams::read(&scene, &xform).unwrap();
    assert!(!expected.is_identity());
    assert_eq!(copied, expected);

    let untouched = TransformParams::read(&scene, &lopnet().join("geometries").join("G2_transform")).unwrap();
    assert!(untouched.is_identity());
}

#[test]
fn test_references_merged_in_order() {
    let (mut scene, textures) = wood_metal();
    Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");

    let geometries = lopnet().join("geometries");
    let merge = geometries.join("merge");
    assert_eq!(scene.input(&geometries.join("output0"), 0).unwrap(), Some(merge.clone()));
    assert_eq!(scene.input(&merge, 0).unwrap(), Some(geometries.join("G1_transform")));
    assert_eq!(scene.input(&merge, 1).unwrap(), Some(geometries.join("G2_transform")));
    assert_eq!(scene.input(&merge, 2).unwrap(), None);
}

#[test]
fn test_progress_events() {
    let (mut scene, textures) = wood_metal();
    let mut events = Vec::new();
    {
        let mut pipeline =
            Pipeline::new(config(textures.path())).with_progress(|e| events.push(e.clone()));
        pipeline.run(&mut scene).expect("Pipeline failed");
    }

    for event in &events {
        println!("{event:?}");
    }
    let stages: Vec<Stage> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::StageStarted(stage) => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![Stage::Extract, Stage::Rewrite, Stage::Correlate, Stage::References, Stage::Shaders]
    );
    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    assert!(events.contains(&ProgressEvent::MaterialBuilt {
        identifier: "Metal".to_string(),
        created: true,
    }));
    assert!(events.contains(&ProgressEvent::ReferenceBuilt {
        source: NodePath::new("/obj/fbx/G2"),
        created: true,
    }));
}

#[test]
fn test_multi_channel_texture_binds_every_slot() {
    let mut scene = imported_scene(&[("crate", "/m/Crate")]);
    let textures = texture_folder(&["crate_diffuse_gloss.png", "crate_nrm.png"]);
    let report = Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");

    assert!(image_file(&scene, "Crate", "base_color").ends_with("crate_diffuse_gloss.png"));
    assert!(image_file(&scene, "Crate", "specular_roughness").ends_with("crate_diffuse_gloss.png"));
    assert!(image_file(&scene, "Crate", "normal").ends_with("crate_nrm.png"));
    assert_eq!(report.material("Crate").unwrap().bindings.len(), 5);
}

#[test]
fn test_node_parm_material_source() {
    let mut scene = MemoryScene::new();
    let fbx = scene
        .create_node(&NodePath::new("/obj"), NodeKind::ObjSubnet, "fbx")
        .unwrap();
    let geo = scene.create_node(&fbx, NodeKind::ObjGeometry, "body").unwrap();
    scene
        .set_parms(&geo, &[Parm::new("shop_materialpath", "/shop/materials/rustediron")])
        .unwrap();
    let textures = texture_folder(&["rustediron_basecolor.png", "RustedIron_Normal.png"]);

    let cfg = PipelineConfig::from_json(&format!(
        r#"{{"texture_folder": {:?}, "asset_root": "/obj/fbx",
            "material_source": {{"kind": "node_parm", "name": "shop_materialpath"}}}}"#,
        textures.path().to_str().unwrap()
    ))
    .unwrap();
    let mut events = Vec::new();
    let report = Pipeline::new(cfg)
        .with_progress(|e| events.push(e.clone()))
        .run(&mut scene)
        .expect("Pipeline failed");

    assert_eq!(report.identifiers(), vec!["rustediron"]);
    assert!(image_file(&scene, "rustediron", "normal").ends_with("RustedIron_Normal.png"));
    assert!(!events.contains(&ProgressEvent::StageStarted(Stage::Rewrite)));
}

#[test]
fn test_config_file_round_trip() {
    let textures = texture_folder(&["wood_basecolor.png"]);
    let path = textures.path().join("pipeline.json");
    let mut cfg = config(textures.path());
    cfg.displacement_scale = 0.1;
    cfg.save(&path).expect("Failed to save config");

    let loaded = PipelineConfig::load(&path).expect("Failed to load config");
    assert_eq!(loaded, cfg);

    let mut scene = imported_scene(&[("G1", "/m/Wood")]);
    Pipeline::new(loaded).run(&mut scene).expect("Pipeline failed");
    assert_eq!(
        scene
            .eval_float(&NodePath::new("/stage/lopnet/matlib/Wood/mtlxdisplacement"), "scale")
            .unwrap(),
        Some(0.1)
    );
}

#[test]
fn test_same_named_geometry_in_nested_subnets() {
    let mut scene = imported_scene(&[]);
    let fbx = NodePath::new("/obj/fbx");
    let mut sources = Vec::new();
    for (group, material) in [("chair", "/m/Wood"), ("table", "/m/Metal")] {
        let subnet = scene
            .create_node(&fbx, NodeKind::ObjSubnet, group)
            .expect("Failed to create group");
        let geo = scene
            .create_geometry(&subnet, "Mesh", MATERIAL_PATH_ATTRIB, &[material])
            .expect("Failed to create geometry");
        sources.push(geo);
    }
    // Shares a name with the aggregate node of the geometry subnet
    sources.push(
        scene
            .create_geometry(&fbx, "merge", MATERIAL_PATH_ATTRIB, &["/m/Wood"])
            .expect("Failed to create geometry"),
    );

    let textures = texture_folder(&[]);
    let report = Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Pipeline failed");
    assert_eq!(report.references_created, 3);
    assert_eq!(report.references_skipped, 0);

    // Every source is imported exactly once, each through its own merge input
    let geometries = lopnet().join("geometries");
    let merge = geometries.join("merge");
    assert_eq!(scene.kind(&merge).unwrap(), NodeKind::Merge);
    let mut imported = Vec::new();
    for index in 0..3 {
        let xform = scene
            .input(&merge, index)
            .unwrap()
            .expect("Merge input not connected");
        let import = scene.input(&xform, 0).unwrap().expect("Transform has no import");
        imported.push(scene.eval_string(&import, "soppath").unwrap().unwrap_or_default());
    }
    let expected: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
    assert_eq!(imported, expected);

    // A second run recognizes the renamed references
    let again = Pipeline::new(config(textures.path()))
        .run(&mut scene)
        .expect("Second run failed");
    assert_eq!(again.references_created, 0);
    assert_eq!(again.references_skipped, 3);
}
