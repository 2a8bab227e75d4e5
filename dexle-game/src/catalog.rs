//! Creature catalog: the immutable, externally supplied set of answers.
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::CatalogLoader;

/// Category tags of one entity, first tag first.
pub type Tags = SmallVec<[String; 2]>;

/// A single catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    /// Ordered primary attribute.
    pub generation: u32,
    /// One or two category tags; order is significant.
    pub types: Tags,
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub sprite: Option<String>,
}

impl Entity {
    #[must_use]
    pub fn primary_tag(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    #[must_use]
    pub fn secondary_tag(&self) -> Option<&str> {
        self.types.get(1).map(String::as_str)
    }

    #[must_use]
    pub fn region(&self) -> Option<Region> {
        Region::for_id(self.id)
    }

    fn check(&self) -> Result<(), CatalogError> {
        let id = self.id;
        if id == 0 {
            return Err(CatalogError::InvalidId {
                name: self.name.clone(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { id });
        }
        if self.generation == 0 {
            return Err(CatalogError::Generation { id });
        }
        if !(1..=2).contains(&self.types.len()) {
            return Err(CatalogError::TagCount {
                id,
                count: self.types.len(),
            });
        }
        if self.types.iter().any(|tag| tag.trim().is_empty()) {
            return Err(CatalogError::EmptyTag { id });
        }
        if let [first, second] = self.types.as_slice()
            && first == second
        {
            return Err(CatalogError::RepeatedTag {
                id,
                tag: first.clone(),
            });
        }
        for (field, value) in [("height", self.height), ("weight", self.weight)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CatalogError::Measure { id, field, value });
            }
        }
        Ok(())
    }
}

/// Errors raised when catalog invariants are violated or the source is unreadable.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("entity {name:?} has id 0; ids must be positive")]
    InvalidId { name: String },
    #[error("id {0} appears more than once")]
    DuplicateId(u32),
    #[error("entity {id} has an empty name")]
    EmptyName { id: u32 },
    #[error("name {0:?} appears more than once (case-insensitive)")]
    DuplicateName(String),
    #[error("entity {id} has generation 0; generations start at 1")]
    Generation { id: u32 },
    #[error("entity {id} has {count} tags; expected 1 or 2")]
    TagCount { id: u32, count: usize },
    #[error("entity {id} has an empty tag")]
    EmptyTag { id: u32 },
    #[error("entity {id} repeats tag {tag:?}")]
    RepeatedTag { id: u32, tag: String },
    #[error("entity {id} has invalid {field} {value}")]
    Measure {
        id: u32,
        field: &'static str,
        value: f64,
    },
    #[error("catalog JSON is malformed")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validated, non-empty catalog with id and name indexes.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<Entity>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Validate and index a list of entities, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first violated invariant.
    pub fn new(entities: Vec<Entity>) -> Result<Self, CatalogError> {
        if entities.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut by_id = HashMap::with_capacity(entities.len());
        let mut by_name = HashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            entity.check()?;
            if by_id.insert(entity.id, idx).is_some() {
                return Err(CatalogError::DuplicateId(entity.id));
            }
            if by_name.insert(name_key(&entity.name), idx).is_some() {
                return Err(CatalogError::DuplicateName(entity.name.clone()));
            }
        }
        Ok(Self {
            entities,
            by_id,
            by_name,
        })
    }

    /// Parse a JSON array of entities.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the entities are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entities: Vec<Entity> = serde_json::from_str(json)?;
        Self::new(entities)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.by_id.get(&id).map(|idx| &self.entities[*idx])
    }

    /// Case-insensitive exact name lookup.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name
            .get(&name_key(name))
            .map(|idx| &self.entities[*idx])
    }

    /// Entities whose name starts with `prefix`, skipping `exclude`, in catalog order.
    #[must_use]
    pub fn suggest(&self, prefix: &str, exclude: &[u32], limit: usize) -> Vec<&Entity> {
        let prefix = name_key(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        self.entities
            .iter()
            .filter(|entity| !exclude.contains(&entity.id))
            .filter(|entity| entity.name.to_lowercase().starts_with(&prefix))
            .take(limit)
            .collect()
    }

    /// Summary used by the catalog validation command.
    #[must_use]
    pub fn report(&self) -> CatalogReport {
        let mut generations = BTreeMap::new();
        let mut regions = BTreeMap::new();
        let mut tags = HashSet::new();
        let mut dual_tagged = 0;
        for entity in &self.entities {
            *generations.entry(entity.generation).or_insert(0) += 1;
            if let Some(region) = entity.region() {
                *regions.entry(region).or_insert(0) += 1;
            }
            if entity.types.len() == 2 {
                dual_tagged += 1;
            }
            tags.extend(entity.types.iter().cloned());
        }
        let mut tags: Vec<String> = tags.into_iter().collect();
        tags.sort();
        CatalogReport {
            entity_count: self.entities.len(),
            dual_tagged,
            generations,
            regions,
            tags,
            first: self.entities.first().map(|e| e.name.clone()),
            highest_id: self.entities.iter().map(|e| e.id).max().unwrap_or(0),
        }
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Aggregate facts about a validated catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub entity_count: usize,
    pub dual_tagged: usize,
    pub generations: BTreeMap<u32, usize>,
    pub regions: BTreeMap<Region, usize>,
    pub tags: Vec<String>,
    pub first: Option<String>,
    pub highest_id: u32,
}

/// Named dex block an entity id falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unova,
    Kalos,
    Alola,
    Galar,
    Paldea,
}

impl Region {
    pub const ALL: [Self; 9] = [
        Self::Kanto,
        Self::Johto,
        Self::Hoenn,
        Self::Sinnoh,
        Self::Unova,
        Self::Kalos,
        Self::Alola,
        Self::Galar,
        Self::Paldea,
    ];

    /// Highest id belonging to this region.
    #[must_use]
    pub const fn last_id(self) -> u32 {
        match self {
            Self::Kanto => 151,
            Self::Johto => 251,
            Self::Hoenn => 386,
            Self::Sinnoh => 493,
            Self::Unova => 649,
            Self::Kalos => 721,
            Self::Alola => 809,
            Self::Galar => 905,
            Self::Paldea => 1025,
        }
    }

    #[must_use]
    pub fn for_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|region| id <= region.last_id())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Kanto => "Kanto",
            Self::Johto => "Johto",
            Self::Hoenn => "Hoenn",
            Self::Sinnoh => "Sinnoh",
            Self::Unova => "Unova",
            Self::Kalos => "Kalos",
            Self::Alola => "Alola",
            Self::Galar => "Galar",
            Self::Paldea => "Paldea",
        };
        f.write_str(label)
    }
}

/// Loads a catalog from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogLoader for JsonFileLoader {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::load(&self.path)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{entity, starters};
    use super::*;

    #[test]
    fn catalog_from_json_accepts_fetch_tool_output() {
        let json = r#"[
            {"id": 1, "name": "bulbasaur", "height": 0.7, "weight": 6.9,
             "types": ["grass", "poison"], "generation": 1,
             "sprite": "https://example.invalid/1.png"},
            {"id": 4, "name": "charmander", "height": 0.6, "weight": 8.5,
             "types": ["fire"], "generation": 1, "sprite": null}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().secondary_tag(), Some("poison"));
        assert_eq!(catalog.get(4).unwrap().sprite, None);
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
        let dup_id = Catalog::new(vec![
            entity(1, "a", 1, &["x"], 1.0, 1.0),
            entity(1, "b", 1, &["x"], 1.0, 1.0),
        ]);
        assert!(matches!(dup_id, Err(CatalogError::DuplicateId(1))));
        let dup_name = Catalog::new(vec![
            entity(1, "Mew", 1, &["psychic"], 0.4, 4.0),
            entity(2, "mew", 1, &["psychic"], 0.4, 4.0),
        ]);
        assert!(matches!(dup_name, Err(CatalogError::DuplicateName(name)) if name == "mew"));
    }

    #[test]
    fn rejects_entities_that_break_shape_invariants() {
        let cases = [
            entity(0, "zero", 1, &["x"], 1.0, 1.0),
            entity(1, " ", 1, &["x"], 1.0, 1.0),
            entity(1, "nogen", 0, &["x"], 1.0, 1.0),
            entity(1, "notags", 1, &[], 1.0, 1.0),
            entity(1, "three", 1, &["a", "b", "c"], 1.0, 1.0),
            entity(1, "twice", 1, &["a", "a"], 1.0, 1.0),
            entity(1, "flat", 1, &["a"], 0.0, 1.0),
            entity(1, "nan", 1, &["a"], 1.0, f64::NAN),
        ];
        for bad in cases {
            let name = bad.name.clone();
            assert!(Catalog::new(vec![bad]).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn malformed_json_surfaces_parse_error() {
        assert!(matches!(
            Catalog::from_json("{\"not\": \"an array\"}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn lookups_ignore_case_and_whitespace() {
        let catalog = starters();
        assert_eq!(catalog.find_by_name("  PikaChu ").map(|e| e.id), Some(25));
        assert!(catalog.find_by_name("mewtwo").is_none());
        assert_eq!(catalog.get(158).map(|e| e.name.as_str()), Some("totodile"));
    }

    #[test]
    fn suggestions_follow_prefix_and_skip_guessed() {
        let catalog = starters();
        let names = |hits: Vec<&Entity>| hits.into_iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(catalog.suggest("c", &[], 8)), vec!["charmander", "chikorita", "cyndaquil"]);
        assert_eq!(names(catalog.suggest("C", &[4], 8)), vec!["chikorita", "cyndaquil"]);
        assert_eq!(names(catalog.suggest("c", &[], 1)), vec!["charmander"]);
        assert!(catalog.suggest("", &[], 8).is_empty());
    }

    #[test]
    fn regions_follow_dex_blocks() {
        assert_eq!(Region::for_id(1), Some(Region::Kanto));
        assert_eq!(Region::for_id(151), Some(Region::Kanto));
        assert_eq!(Region::for_id(152), Some(Region::Johto));
        assert_eq!(Region::for_id(493), Some(Region::Sinnoh));
        assert_eq!(Region::for_id(1025), Some(Region::Paldea));
        assert_eq!(Region::for_id(1026), None);
        assert_eq!(Region::Sinnoh.to_string(), "Sinnoh");
    }

    #[test]
    fn report_counts_generations_regions_and_tags() {
        let report = starters().report();
        assert_eq!(report.entity_count, 8);
        assert_eq!(report.dual_tagged, 2);
        assert_eq!(report.generations.get(&1), Some(&5));
        assert_eq!(report.generations.get(&2), Some(&3));
        assert_eq!(report.regions.get(&Region::Johto), Some(&3));
        assert_eq!(report.first.as_deref(), Some("bulbasaur"));
        assert_eq!(report.highest_id, 158);
        assert!(report.tags.contains(&"flying".to_string()));
    }
}
