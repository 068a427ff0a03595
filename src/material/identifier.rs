//! Material identifiers and records.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::scene::{NodePath, SceneGraph};
use crate::util::Result;

use super::MATERIAL_PATH_ATTRIB;

#[inline]
fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Maximal trailing run of `[A-Za-z0-9_]` in a raw material path.
///
/// Returns an empty string when the path is empty or ends in a separator;
/// callers discard those.
pub fn extract_identifier(raw: &str) -> &str {
    let start = raw.trim_end_matches(is_word).len();
    &raw[start..]
}

/// Where raw material paths are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum MaterialSource {
    /// Every distinct value of a per-primitive string attribute on the display geometry.
    PrimAttrib(String),
    /// A single evaluated string parameter on the geometry node.
    NodeParm(String),
}

impl Default for MaterialSource {
    fn default() -> Self {
        Self::PrimAttrib(MATERIAL_PATH_ATTRIB.to_string())
    }
}

impl MaterialSource {
    /// Raw material paths of one geometry node.
    pub fn read<S: SceneGraph + ?Sized>(&self, scene: &S, geo: &NodePath) -> Result<Vec<String>> {
        match self {
            Self::PrimAttrib(name) => scene.prim_string_values(geo, name),
            Self::NodeParm(name) => Ok(scene.eval_string(geo, name)?.into_iter().collect()),
        }
    }
}

/// A material identifier with its correlated texture filenames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaterialRecord {
    /// Canonical identifier (never empty).
    pub identifier: String,
    /// Texture filenames in directory-scan order.
    pub textures: Vec<String>,
}

impl MaterialRecord {
    fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            textures: Vec::new(),
        }
    }
}

/// Insertion-ordered set of material records keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct MaterialRecords {
    records: Vec<MaterialRecord>,
    index: HashMap<String, usize>,
}

impl MaterialRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the identifier from a raw path and register it.
    ///
    /// Returns the identifier, or None if extraction produced nothing.
    pub fn observe<'r>(&mut self, raw: &'r str) -> Option<&'r str> {
        let id = extract_identifier(raw);
        if id.is_empty() {
            return None;
        }
        self.insert(id);
        Some(id)
    }

    /// Register an identifier; returns false if it was already known or empty.
    pub fn insert(&mut self, identifier: &str) -> bool {
        if identifier.is_empty() || self.index.contains_key(identifier) {
            return false;
        }
        self.index.insert(identifier.to_string(), self.records.len());
        self.records.push(MaterialRecord::new(identifier));
        true
    }

    pub fn get(&self, identifier: &str) -> Option<&MaterialRecord> {
        self.index.get(identifier).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut MaterialRecord> {
        self.index.get(identifier).map(|&i| &mut self.records[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Records in first-observation order.
    pub fn iter(&self) -> impl Iterator<Item = &MaterialRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MaterialRecord> {
        self.records.iter_mut()
    }

    /// Identifiers in first-observation order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.identifier.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Distinct raw material paths of a set of geometry nodes, first-seen order.
pub fn distinct_material_paths<S: SceneGraph + ?Sized>(
    scene: &S,
    geos: &[NodePath],
    source: &MaterialSource,
) -> Result<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut paths = Vec::new();
    for geo in geos {
        for raw in source.read(scene, geo)? {
            if seen.insert(raw.clone()) {
                paths.push(raw);
            }
        }
    }
    Ok(paths)
}

/// Collect material identifiers from a set of geometry nodes.
///
/// Each distinct raw path is extracted once, however many nodes share it.
#[tracing::instrument(skip_all, fields(geometry = geos.len()))]
pub fn collect_identifiers<S: SceneGraph + ?Sized>(
    scene: &S,
    geos: &[NodePath],
    source: &MaterialSource,
) -> Result<MaterialRecords> {
    let mut records = MaterialRecords::new();
    for raw in distinct_material_paths(scene, geos, source)? {
        match records.observe(&raw) {
            Some(id) => tracing::debug!(raw = %raw, id, "material path"),
            None => tracing::debug!(raw = %raw, "no identifier in material path"),
        }
    }

    tracing::info!(materials = records.len(), "collected material identifiers");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, NodeKind, Parm};

    #[test]
    fn test_extract_identifier() {
        assert_eq!(extract_identifier("/shop/mat/Rust_01"), "Rust_01");
        assert_eq!(extract_identifier("/shop/mat/"), "");
        assert_eq!(extract_identifier(""), "");
        assert_eq!(extract_identifier("plain"), "plain");
        assert_eq!(extract_identifier("/obj/fbx/materials/metal-rough.01"), "01");
        assert_eq!(extract_identifier("/a/b c"), "c");
        // Non-ASCII letters are separators
        assert_eq!(extract_identifier("/m/bois_é"), "");
    }

    #[test]
    fn test_records_dedup_and_order() {
        let mut records = MaterialRecords::new();
        assert_eq!(records.observe("/m/Wood"), Some("Wood"));
        assert_eq!(records.observe("/m/Metal"), Some("Metal"));
        assert_eq!(records.observe("/other/Wood"), Some("Wood"));
        assert_eq!(records.observe("/m/"), None);
        assert!(!records.insert(""));

        assert_eq!(records.identifiers(), vec!["Wood", "Metal"]);
        assert!(records.get("Wood").unwrap().textures.is_empty());
        assert!(!records.contains(""));
    }

    #[test]
    fn test_collect_from_prim_attrib() {
        let mut scene = MemoryScene::new();
        let obj = NodePath::new("/obj");
        let g1 = scene
            .create_geometry(&obj, "g1", MATERIAL_PATH_ATTRIB, &["/m/Wood", "/m/Wood", "/m/"])
            .unwrap();
        let g2 = scene
            .create_geometry(&obj, "g2", MATERIAL_PATH_ATTRIB, &["/m/Metal", "/m/Wood"])
            .unwrap();
        let g3 = scene.create_node(&obj, NodeKind::ObjGeometry, "g3").unwrap();

        let records =
            collect_identifiers(&scene, &[g1, g2, g3], &MaterialSource::default()).unwrap();
        assert_eq!(records.identifiers(), vec!["Wood", "Metal"]);
    }

    #[test]
    fn test_shared_paths_extracted_once() {
        let mut scene = MemoryScene::new();
        let obj = NodePath::new("/obj");
        let g1 = scene
            .create_geometry(&obj, "g1", MATERIAL_PATH_ATTRIB, &["/m/Wood", "/m/Metal"])
            .unwrap();
        let g2 = scene
            .create_geometry(&obj, "g2", MATERIAL_PATH_ATTRIB, &["/m/Metal", "/m/Wood"])
            .unwrap();
        let geos = [g1, g2];
        let source = MaterialSource::default();

        let paths = distinct_material_paths(&scene, &geos, &source).unwrap();
        assert_eq!(paths, vec!["/m/Wood", "/m/Metal"]);

        let records = collect_identifiers(&scene, &geos, &source).unwrap();
        assert_eq!(records.len(), paths.len());
        assert_eq!(records.identifiers(), vec!["Wood", "Metal"]);
    }

    #[test]
    fn test_collect_from_node_parm() {
        let mut scene = MemoryScene::new();
        let obj = NodePath::new("/obj");
        let g1 = scene.create_node(&obj, NodeKind::ObjGeometry, "g1").unwrap();
        let g2 = scene.create_node(&obj, NodeKind::ObjGeometry, "g2").unwrap();
        scene
            .set_parms(&g1, &[Parm::new("shop_materialpath", "/shop/materials/rustediron")])
            .unwrap();

        let source = MaterialSource::NodeParm("shop_materialpath".to_string());
        let records = collect_identifiers(&scene, &[g1, g2], &source).unwrap();
        assert_eq!(records.identifiers(), vec!["rustediron"]);
    }

    #[test]
    fn test_source_json() {
        let json = serde_json::to_string(&MaterialSource::default()).unwrap();
        assert_eq!(json, r#"{"kind":"prim_attrib","name":"shop_materialpath"}"#);
    }
}
