//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geom::{MaterialPathRewrite, DEFAULT_PATH_PREFIX};
use crate::material::{
    MaterialSource, MATERIAL_BIND_ATTRIB, MATERIAL_PREFIX, USD_MATERIAL_PATH_ATTRIB,
};
use crate::scene::{DisplacementConfig, NodePath, DEFAULT_DISPLACEMENT_SCALE};
use crate::util::{Error, Result};

/// Everything a run needs to know, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // Inputs
    pub texture_folder: PathBuf,
    pub asset_root: NodePath,

    // Containers
    pub stage_root: NodePath,
    pub lopnet_name: String,
    pub matlib_name: String,
    pub geometries_name: String,

    // Material paths
    pub material_source: MaterialSource,
    pub rewrite_material_paths: bool,
    pub bind_attrib: String,
    pub usd_material_attrib: String,
    pub material_prefix: String,

    // Geometry references
    pub geometry_path_prefix: String,

    // Shading
    pub displacement_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            texture_folder: PathBuf::new(),
            asset_root: NodePath::new("/obj"),
            stage_root: NodePath::new("/stage"),
            lopnet_name: "lopnet".to_string(),
            matlib_name: "matlib".to_string(),
            geometries_name: "geometries".to_string(),
            material_source: MaterialSource::default(),
            rewrite_material_paths: true,
            bind_attrib: MATERIAL_BIND_ATTRIB.to_string(),
            usd_material_attrib: USD_MATERIAL_PATH_ATTRIB.to_string(),
            material_prefix: MATERIAL_PREFIX.to_string(),
            geometry_path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            displacement_scale: DEFAULT_DISPLACEMENT_SCALE,
        }
    }
}

impl PipelineConfig {
    /// Config for a texture folder and an imported asset subtree, defaults elsewhere.
    pub fn new(texture_folder: impl Into<PathBuf>, asset_root: impl Into<NodePath>) -> Self {
        Self {
            texture_folder: texture_folder.into(),
            asset_root: asset_root.into(),
            ..Default::default()
        }
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject configs a run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.texture_folder.as_os_str().is_empty() {
            return Err(Error::Config("texture_folder is empty".into()));
        }
        if self.asset_root.is_root() {
            return Err(Error::Config("asset_root must name a node".into()));
        }
        let names = [
            ("lopnet_name", &self.lopnet_name),
            ("matlib_name", &self.matlib_name),
            ("geometries_name", &self.geometries_name),
        ];
        for (field, name) in names {
            if name.is_empty() || name.contains('/') {
                return Err(Error::Config(format!("{field} is not a valid node name: {name:?}")));
            }
        }
        let attribs = [
            ("bind_attrib", &self.bind_attrib),
            ("usd_material_attrib", &self.usd_material_attrib),
            ("material_prefix", &self.material_prefix),
        ];
        for (field, value) in attribs {
            if value.is_empty() {
                return Err(Error::Config(format!("{field} is empty")));
            }
        }
        let source = match &self.material_source {
            MaterialSource::PrimAttrib(name) | MaterialSource::NodeParm(name) => name,
        };
        if source.is_empty() {
            return Err(Error::Config("material_source names no attribute".into()));
        }
        if !self.displacement_scale.is_finite() {
            return Err(Error::Config("displacement_scale is not finite".into()));
        }
        Ok(())
    }

    pub fn lopnet_path(&self) -> NodePath {
        self.stage_root.join(&self.lopnet_name)
    }

    pub fn matlib_path(&self) -> NodePath {
        self.lopnet_path().join(&self.matlib_name)
    }

    pub fn geometries_path(&self) -> NodePath {
        self.lopnet_path().join(&self.geometries_name)
    }

    pub fn displacement(&self) -> DisplacementConfig {
        DisplacementConfig {
            scale: self.displacement_scale,
            ..Default::default()
        }
    }

    /// Material path rewrite settings, if the source calls for one.
    ///
    /// Only per-primitive attributes are rewritten; a node parameter source
    /// has nothing to partition on.
    pub fn material_rewrite(&self) -> Option<MaterialPathRewrite> {
        match &self.material_source {
            MaterialSource::PrimAttrib(attrib) if self.rewrite_material_paths => {
                Some(MaterialPathRewrite {
                    path_attrib: attrib.clone(),
                    bind_attrib: self.bind_attrib.clone(),
                    usd_attrib: self.usd_material_attrib.clone(),
                    prefix: self.material_prefix.clone(),
                })
            }
            _ => None,
        }
    }
}
