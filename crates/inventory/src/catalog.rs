//! Fixed catalog of trackable materials.

use serde::{Deserialize, Serialize};

/// One selectable material.
///
/// A material "declares sub-variants" when `subtypes` is non-empty; each
/// sub-variant is stocked in its own inventory bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<String>,
}

impl MaterialOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subtypes: Vec::new(),
        }
    }

    pub fn with_subtypes<I, S>(mut self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtypes = subtypes.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_subtypes(&self) -> bool {
        !self.subtypes.is_empty()
    }

    /// Returns the declared sub-variant equal to `subtype`, if any.
    pub fn find_subtype(&self, subtype: &str) -> Option<&str> {
        self.subtypes
            .iter()
            .map(String::as_str)
            .find(|s| *s == subtype)
    }
}

/// Catalog of materials that movements may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    materials: Vec<MaterialOption>,
}

/// Rapid-test panels stocked as separate buckets.
pub const RAPID_TEST_TYPES: [&str; 4] = [
    "Hepatitis B",
    "Hepatitis C",
    "VIH/Sífilis",
    "Antígeno Prostático",
];

impl Catalog {
    pub fn new(materials: Vec<MaterialOption>) -> Self {
        Self { materials }
    }

    pub fn materials(&self) -> &[MaterialOption] {
        &self.materials
    }

    /// Resolve a material by catalog id, falling back to its display name.
    ///
    /// Edit forms are populated from stored records, which only carry the name.
    pub fn find(&self, key: &str) -> Option<&MaterialOption> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        self.materials
            .iter()
            .find(|m| m.id == key)
            .or_else(|| self.materials.iter().find(|m| m.name == key))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            MaterialOption::new("vida-suero-oral", "Vida Suero Oral"),
            MaterialOption::new("espejos-vaginales", "Espejos Vaginales"),
            MaterialOption::new("laminillas", "Laminillas"),
            MaterialOption::new("citobrush", "Citobrush"),
            MaterialOption::new("pruebas-rapidas", "Pruebas Rápidas")
                .with_subtypes(RAPID_TEST_TYPES),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_one_material_with_subtypes() {
        let catalog = Catalog::default();
        assert_eq!(catalog.materials().len(), 5);

        let with_subtypes: Vec<_> = catalog
            .materials()
            .iter()
            .filter(|m| m.has_subtypes())
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(with_subtypes, vec!["pruebas-rapidas"]);
    }

    #[test]
    fn find_resolves_by_id_or_name() {
        let catalog = Catalog::default();
        assert_eq!(catalog.find("laminillas").map(|m| m.name.as_str()), Some("Laminillas"));
        assert_eq!(catalog.find("Laminillas").map(|m| m.id.as_str()), Some("laminillas"));
        assert!(catalog.find("").is_none());
        assert!(catalog.find("Gasas").is_none());
    }

    #[test]
    fn subtype_lookup_is_exact() {
        let catalog = Catalog::default();
        let rapid = catalog.find("pruebas-rapidas").unwrap();
        assert_eq!(rapid.find_subtype("Hepatitis C"), Some("Hepatitis C"));
        assert_eq!(rapid.find_subtype("hepatitis c"), None);
    }
}
