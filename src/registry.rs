// External crates
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// Internal modules
use crate::error::{ForecastError, Result};

const BUILTIN_REGISTRY: &str = include_str!("../registry/materials.json");

/// One forecastable material: its source file and the regions it is priced in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    pub source: String,
    pub regions: Vec<String>,
}

impl MaterialEntry {
    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    materials: Vec<MaterialEntry>,
}

/// Immutable material → (source, regions) lookup, loaded once at start-up
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    materials: BTreeMap<String, MaterialEntry>,
}

impl MaterialRegistry {
    /// Registry shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_REGISTRY)
    }

    /// Parses a registry document of the form `{"materials": [{name, source, regions}, ...]}`
    ///
    /// Duplicate material names and materials without regions are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(json)
            .map_err(|e| ForecastError::data(format!("Invalid material registry: {}", e)))?;

        let mut materials = BTreeMap::new();
        for entry in file.materials {
            if entry.regions.is_empty() {
                return Err(ForecastError::data(format!(
                    "Material '{}' has no regions",
                    entry.name
                )));
            }
            let name = entry.name.clone();
            if materials.insert(name.clone(), entry).is_some() {
                return Err(ForecastError::data(format!(
                    "Material '{}' is registered twice",
                    name
                )));
            }
        }

        Ok(Self { materials })
    }

    /// Reads a registry document from disk, e.g. a deployment-specific override
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::data(format!(
                "Cannot read material registry {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, material: &str) -> Option<&MaterialEntry> {
        self.materials.get(material)
    }

    /// Resolves a (material, region) pair or fails with a validation error
    pub fn resolve(&self, material: &str, region: &str) -> Result<&MaterialEntry> {
        match self.get(material) {
            Some(entry) if entry.has_region(region) => Ok(entry),
            _ => Err(ForecastError::validation("Invalid material or region")),
        }
    }

    /// Listing keyed by material name with `(source, regions)` values
    pub fn listing(&self) -> BTreeMap<&str, (&str, &[String])> {
        self.materials
            .values()
            .map(|e| (e.name.as_str(), (e.source.as_str(), e.regions.as_slice())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_loads() {
        let registry = MaterialRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 5);

        let mdf = registry.get("MDF").unwrap();
        assert!(mdf.has_region("제주"));
        assert!(!mdf.has_region("인천"));
    }

    #[test]
    fn test_resolve_rejects_unknown_pairs() {
        let registry = MaterialRegistry::builtin().unwrap();
        assert!(registry.resolve("RoundSteelBars", "전주").is_ok());

        let err = registry.resolve("Unknown", "X").unwrap_err();
        assert!(err.is_validation());

        let err = registry.resolve("MDF", "인천").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_duplicate_material_is_rejected() {
        let json = r#"{"materials": [
            {"name": "A", "source": "a.csv", "regions": ["r"]},
            {"name": "A", "source": "b.csv", "regions": ["r"]}
        ]}"#;
        assert!(MaterialRegistry::from_json(json).is_err());
    }

    #[test]
    fn test_registry_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("materials.json");
        std::fs::write(
            &path,
            r#"{"materials": [{"name": "Rebar", "source": "Rebar.csv", "regions": ["부산"]}]}"#,
        )
        .unwrap();

        let registry = MaterialRegistry::from_path(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("Rebar", "부산").unwrap().source, "Rebar.csv");
        assert!(registry.resolve("MDF", "서울").is_err());

        let err = MaterialRegistry::from_path(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ForecastError::Data(_)));
        assert!(err.to_string().starts_with("Cannot read material registry"));
    }
}
