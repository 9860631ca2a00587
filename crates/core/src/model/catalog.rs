use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FormatError;
use crate::model::ids::{CategoryId, KeyError, PhaseKey, SubtopicKey};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("category {0} is defined more than once")]
    DuplicateCategory(String),

    #[error("phase {phase} is defined more than once in {category}")]
    DuplicatePhaseKey { category: String, phase: String },

    #[error("sub-topic keys under {prefix} collide with keys under {other}")]
    AmbiguousPhaseKey { prefix: String, other: String },
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// A named group of sub-topics inside one category.
///
/// Sub-topics have no identity of their own; their position in `subtopics`
/// is the index used in composite progress keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    key: PhaseKey,
    title: String,
    subtopics: Vec<String>,
}

impl Phase {
    #[must_use]
    pub fn new(key: PhaseKey, title: impl Into<String>, subtopics: Vec<String>) -> Self {
        Self {
            key,
            title: title.into(),
            subtopics,
        }
    }

    #[must_use]
    pub fn key(&self) -> &PhaseKey {
        &self.key
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtopics(&self) -> &[String] {
        &self.subtopics
    }

    #[must_use]
    pub fn subtopic_count(&self) -> usize {
        self.subtopics.len()
    }

    /// Composite key of the sub-topic at `index` when this phase lives in `category`.
    #[must_use]
    pub fn subtopic_key(&self, category: &CategoryId, index: usize) -> SubtopicKey {
        SubtopicKey::new(category.clone(), self.key.clone(), index)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryEntry {
    id: CategoryId,
    phases: Vec<Phase>,
}

/// Ordered curriculum: categories, each with an ordered list of phases.
///
/// Replaced wholesale on import, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    categories: Vec<CategoryEntry>,
}

impl Catalog {
    /// Build a catalog from ordered `(category, phases)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if a category repeats, a phase key repeats inside
    /// a category, or two phases would produce overlapping sub-topic keys.
    pub fn new(categories: Vec<(CategoryId, Vec<Phase>)>) -> Result<Self, CatalogError> {
        let catalog = Self {
            categories: categories
                .into_iter()
                .map(|(id, phases)| CategoryEntry { id, phases })
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse the catalog JSON format (`{category: [{phaseKey: {Topic, Sub-Topics}}]}`).
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Parse` for malformed JSON and
    /// `FormatError::InvalidFormat` for a structurally wrong document.
    pub fn from_json_str(raw: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Ordered category identifiers; the first one is the default selection.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryId> {
        self.categories.iter().map(|entry| &entry.id)
    }

    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn default_category(&self) -> Option<&CategoryId> {
        self.categories.first().map(|entry| &entry.id)
    }

    #[must_use]
    pub fn contains_category(&self, id: &CategoryId) -> bool {
        self.entry(id).is_some()
    }

    /// Phases of a category in display order. Unknown categories yield an empty slice.
    #[must_use]
    pub fn phases(&self, id: &CategoryId) -> &[Phase] {
        self.entry(id)
            .map(|entry| entry.phases.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn subtopic_count(&self, id: &CategoryId) -> usize {
        self.phases(id).iter().map(Phase::subtopic_count).sum()
    }

    #[must_use]
    pub fn total_subtopic_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|entry| entry.phases.iter())
            .map(Phase::subtopic_count)
            .sum()
    }

    /// Every composite key derivable from this catalog, in display order.
    pub fn subtopic_keys(&self) -> impl Iterator<Item = SubtopicKey> + '_ {
        self.categories.iter().flat_map(|entry| {
            entry.phases.iter().flat_map(move |phase| {
                (0..phase.subtopic_count()).map(move |idx| phase.subtopic_key(&entry.id, idx))
            })
        })
    }

    fn entry(&self, id: &CategoryId) -> Option<&CategoryEntry> {
        self.categories.iter().find(|entry| &entry.id == id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for entry in &self.categories {
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateCategory(entry.id.to_string()));
            }
            let mut phase_keys = HashSet::new();
            for phase in &entry.phases {
                if !phase_keys.insert(phase.key.as_str()) {
                    return Err(CatalogError::DuplicatePhaseKey {
                        category: entry.id.to_string(),
                        phase: phase.key.to_string(),
                    });
                }
            }
        }

        // Per-phase counts match by string prefix, so no phase prefix may be the
        // prefix of another one (this also catches `A` + `B-C` vs `A-B` + `C`).
        // Sorted order puts any such pair next to each other.
        let mut prefixes: Vec<String> = self
            .categories
            .iter()
            .flat_map(|entry| {
                entry
                    .phases
                    .iter()
                    .map(move |phase| SubtopicKey::phase_prefix(&entry.id, &phase.key))
            })
            .collect();
        prefixes.sort();
        for pair in prefixes.windows(2) {
            if pair[1].starts_with(pair[0].as_str()) {
                return Err(CatalogError::AmbiguousPhaseKey {
                    prefix: pair[0].clone(),
                    other: pair[1].clone(),
                });
            }
        }
        Ok(())
    }
}

//
// ─── BUILT-IN FALLBACK ─────────────────────────────────────────────────────────
//

impl Catalog {
    /// The catalog used when no external definition can be loaded.
    ///
    /// # Panics
    ///
    /// Panics if the built-in data is not a valid catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = [
            builtin_category(
                "MS_SQL",
                &[
                    (
                        "Phase-1.0",
                        "SQL Server Architecture",
                        &[
                            "SQL Server service architecture",
                            "Database engine vs SQL OS",
                            "SQLOS schedulers",
                            "Worker threads",
                            "Memory clerks",
                        ],
                    ),
                    (
                        "Phase-2.0",
                        "Storage & Files",
                        &[
                            "MDF vs LDF",
                            "Data file internals",
                            "Log file internals",
                            "VLFs",
                            "Autogrowth strategy",
                        ],
                    ),
                ],
            ),
            builtin_category(
                "ORACLE",
                &[(
                    "Phase-1.0",
                    "Oracle Architecture",
                    &[
                        "Oracle instance vs database",
                        "SGA components",
                        "PGA",
                        "Background processes",
                    ],
                )],
            ),
            builtin_category(
                "SSIS",
                &[(
                    "Phase-1.0",
                    "SSIS Fundamentals",
                    &["What SSIS is", "ETL vs ELT", "SSIS architecture"],
                )],
            ),
            builtin_category(
                "SSRS",
                &[(
                    "Phase-1.0",
                    "SSRS Fundamentals",
                    &[
                        "What SSRS is",
                        "SSRS architecture",
                        "Report Server vs Report Manager",
                    ],
                )],
            ),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, KeyError>>()
        .expect("built-in identifiers should be non-empty");
        Self::new(categories).expect("built-in catalog should be valid")
    }
}

type BuiltinPhase<'a> = (&'a str, &'a str, &'a [&'a str]);

fn builtin_category(
    id: &str,
    phases: &[BuiltinPhase<'_>],
) -> Result<(CategoryId, Vec<Phase>), KeyError> {
    let id = CategoryId::new(id)?;
    let phases = phases
        .iter()
        .map(|(key, title, subtopics)| -> Result<Phase, KeyError> {
            let subtopics = subtopics.iter().map(|s| (*s).to_owned()).collect();
            Ok(Phase::new(PhaseKey::new(*key)?, *title, subtopics))
        })
        .collect::<Result<_, KeyError>>()?;
    Ok((id, phases))
}

//
// ─── SERDE ─────────────────────────────────────────────────────────────────────
//

#[derive(Serialize, Deserialize)]
struct PhaseBody {
    #[serde(rename = "Topic")]
    title: String,
    #[serde(rename = "Sub-Topics", default)]
    subtopics: Vec<String>,
}

#[derive(Serialize)]
struct PhaseBodyRef<'a> {
    #[serde(rename = "Topic")]
    title: &'a str,
    #[serde(rename = "Sub-Topics")]
    subtopics: &'a [String],
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.key.as_str(),
            &PhaseBodyRef {
                title: &self.title,
                subtopics: &self.subtopics,
            },
        )?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PhaseVisitor)
    }
}

struct PhaseVisitor;

impl<'de> Visitor<'de> for PhaseVisitor {
    type Value = Phase;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a single-key object mapping a phase key to {Topic, Sub-Topics}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Phase, A::Error> {
        let Some((key, body)) = map.next_entry::<PhaseKey, PhaseBody>()? else {
            return Err(de::Error::custom("phase object has no key"));
        };
        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(format!(
                "phase object {key} has more than one key"
            )));
        }
        Ok(Phase::new(key, body.title, body.subtopics))
    }
}

struct PhaseList<'a>(&'a [Phase]);

impl Serialize for PhaseList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for phase in self.0 {
            seq.serialize_element(phase)?;
        }
        seq.end()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for entry in &self.categories {
            map.serialize_entry(entry.id.as_str(), &PhaseList(&entry.phases))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogVisitor)
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = Catalog;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping category identifiers to arrays of phases")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Catalog, A::Error> {
        // Visiting entries one by one keeps the document's category order.
        let mut categories = Vec::new();
        while let Some((id, phases)) = map.next_entry::<CategoryId, PhaseSeq>()? {
            categories.push((id, phases.0));
        }
        Catalog::new(categories).map_err(de::Error::custom)
    }
}

struct PhaseSeq(Vec<Phase>);

impl<'de> Deserialize<'de> for PhaseSeq {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeqVisitor;

        impl<'de> Visitor<'de> for SeqVisitor {
            type Value = PhaseSeq;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of phase objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<PhaseSeq, A::Error> {
                let mut phases = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(phase) = seq.next_element::<Phase>()? {
                    phases.push(phase);
                }
                Ok(PhaseSeq(phases))
            }
        }

        deserializer.deserialize_seq(SeqVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str) -> CategoryId {
        CategoryId::new(id).unwrap()
    }

    fn phase(key: &str, n: usize) -> Phase {
        Phase::new(
            PhaseKey::new(key).unwrap(),
            format!("{key} title"),
            (0..n).map(|i| format!("topic {i}")).collect(),
        )
    }

    #[test]
    fn builtin_catalog_is_valid_and_ordered() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        let ids: Vec<&str> = catalog.categories().map(CategoryId::as_str).collect();
        assert_eq!(ids, ["MS_SQL", "ORACLE", "SSIS", "SSRS"]);
        assert_eq!(catalog.default_category().unwrap().as_str(), "MS_SQL");
        assert_eq!(catalog.subtopic_count(&category("MS_SQL")), 10);
        assert_eq!(catalog.total_subtopic_count(), 20);
    }

    #[test]
    fn unknown_category_has_no_phases() {
        let catalog = Catalog::builtin();
        assert!(catalog.phases(&category("COBOL")).is_empty());
        assert_eq!(catalog.subtopic_count(&category("COBOL")), 0);
    }

    #[test]
    fn parses_source_format_preserving_order() {
        let raw = r#"{
            "SSRS": [{"Phase-1.0": {"Topic": "Basics", "Sub-Topics": ["a", "b"]}}],
            "AI": [
                {"Phase-2.0": {"Topic": "Later", "Sub-Topics": ["c"]}},
                {"Phase-1.0": {"Topic": "Earlier", "Sub-Topics": []}}
            ]
        }"#;
        let catalog = Catalog::from_json_str(raw).unwrap();

        let ids: Vec<&str> = catalog.categories().map(CategoryId::as_str).collect();
        assert_eq!(ids, ["SSRS", "AI"]);
        let ai_phases: Vec<&str> = catalog
            .phases(&category("AI"))
            .iter()
            .map(|p| p.key().as_str())
            .collect();
        assert_eq!(ai_phases, ["Phase-2.0", "Phase-1.0"]);
        assert_eq!(catalog.phases(&category("SSRS"))[0].title(), "Basics");
    }

    #[test]
    fn missing_subtopics_is_empty() {
        let catalog = Catalog::from_json_str(r#"{"AI": [{"P": {"Topic": "t"}}]}"#).unwrap();
        assert_eq!(catalog.subtopic_count(&category("AI")), 0);
    }

    #[test]
    fn serializes_back_to_source_format() {
        let catalog = Catalog::new(vec![(category("AI"), vec![phase("Phase-1.0", 2)])]).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "AI": [{"Phase-1.0": {"Topic": "Phase-1.0 title", "Sub-Topics": ["topic 0", "topic 1"]}}]
            })
        );
        let back: Catalog = serde_json::from_value(value).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn rejects_structurally_wrong_documents() {
        for raw in [
            r#"["MS_SQL"]"#,
            r#"{"MS_SQL": {"Phase-1.0": {}}}"#,
            r#"{"MS_SQL": [{"Phase-1.0": {"Topic": "t"}, "Phase-2.0": {"Topic": "u"}}]}"#,
            r#"{"MS_SQL": [{}]}"#,
            r#"{"MS_SQL": [{"Phase-1.0": {"Sub-Topics": []}}]}"#,
            r#"{"MS_SQL": [{"Phase-1.0": {"Topic": "t", "Sub-Topics": [1, 2]}}]}"#,
            r#"{"": []}"#,
        ] {
            let err = Catalog::from_json_str(raw).unwrap_err();
            assert!(err.is_invalid_format(), "expected InvalidFormat for {raw}: {err:?}");
        }
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let err = Catalog::from_json_str(r#"{"MS_SQL": [{"Phase"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn rejects_duplicate_phase_keys() {
        let err = Catalog::new(vec![(
            category("AI"),
            vec![phase("Phase-1.0", 1), phase("Phase-1.0", 2)],
        )])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePhaseKey { .. }));
    }

    #[test]
    fn rejects_overlapping_phase_prefixes() {
        let err = Catalog::new(vec![(
            category("AI"),
            vec![phase("Phase-1", 1), phase("Phase-1-0", 1)],
        )])
        .unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousPhaseKey { .. }));

        let err = Catalog::new(vec![
            (category("A"), vec![phase("B-C", 1)]),
            (category("A-B"), vec![phase("C", 1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousPhaseKey { .. }));
    }

    #[test]
    fn allows_numeric_neighbours_like_phase_1_and_10() {
        let catalog = Catalog::new(vec![(
            category("MS_SQL"),
            vec![phase("Phase-1.0", 1), phase("Phase-10.0", 1)],
        )]);
        assert!(catalog.is_ok());
    }

    #[test]
    fn subtopic_keys_follow_display_order() {
        let catalog = Catalog::new(vec![(category("AI"), vec![phase("P", 2)])]).unwrap();
        let keys: Vec<String> = catalog.subtopic_keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["AI-P-0", "AI-P-1"]);
    }

    #[test]
    fn bundled_topics_file_is_a_valid_catalog() {
        let catalog = Catalog::from_json_str(include_str!("../../../../data/topics.json")).unwrap();
        assert_eq!(catalog.category_count(), 7);
        assert_eq!(catalog.default_category().map(CategoryId::as_str), Some("MS_SQL"));
        assert_eq!(catalog.subtopic_count(&category("MS_SQL")), 14);
    }
}
