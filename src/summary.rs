//! Frequency-ranked summaries over product records.
//!
//! [`rank_by_field`] groups records by one field, counts each group, and
//! keeps the `top_n` largest groups. The sort is stable, so groups with equal
//! counts stay in the order their value first appeared in the input. The
//! function is pure: the same input always yields the same output.
//!
//! Descriptions come from a [`DescriptionCatalog`]; values without a curated
//! entry get [`template_description`].

use std::collections::{BTreeMap, HashMap};

use crate::models::{MaterialSummary, ProductRecord, SummaryField};

/// Number of summaries shown when nothing else is configured.
pub const DEFAULT_TOP_N: usize = 3;

/// Materials shown when the product fetch fails.
pub const FALLBACK_MATERIALS: [&str; 3] = ["Mahogany", "Oak", "Teak"];

const BUILTIN_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "Mahogany",
        "A rich reddish hardwood, carved by hand into bowls and heirloom furniture.",
    ),
    (
        "Oak",
        "Dense and durable, oak ages gracefully in tables, chairs, and cabinets.",
    ),
    (
        "Teak",
        "Naturally oily and weather resistant, teak suits both indoor and outdoor pieces.",
    ),
    (
        "Walnut",
        "Dark, fine-grained walnut brings warmth to shelving and wall art.",
    ),
    (
        "Pine",
        "Light and easy to work, pine is the base of our rustic and painted pieces.",
    ),
    (
        "Bamboo",
        "Fast-growing bamboo makes light, sustainable decor and small furniture.",
    ),
];

/// Description used for values without a curated entry.
pub fn template_description(name: &str) -> String {
    format!(
        "Handcrafted pieces made from {}, sourced from our partner workshops.",
        name
    )
}

/// Curated descriptions, looked up case-insensitively by value name.
#[derive(Debug, Clone, Default)]
pub struct DescriptionCatalog {
    entries: HashMap<String, String>,
}

impl DescriptionCatalog {
    /// An empty catalog: every value gets the template description.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the storefront.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (name, text) in BUILTIN_DESCRIPTIONS {
            catalog.insert(name, text);
        }
        catalog
    }

    /// Built-in entries with `overrides` merged on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut catalog = Self::builtin();
        for (name, text) in overrides {
            catalog.insert(name, text);
        }
        catalog
    }

    pub fn insert(&mut self, name: &str, text: &str) {
        self.entries
            .insert(name.trim().to_lowercase(), text.to_string());
    }

    pub fn curated(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Curated description, or the template when none exists.
    pub fn describe(&self, name: &str) -> String {
        self.curated(name)
            .map(str::to_string)
            .unwrap_or_else(|| template_description(name))
    }
}

/// Rank the values of `field` across `records` by frequency.
///
/// Records without a value for `field` are skipped. At most `top_n` entries
/// are returned, and fewer when fewer distinct values exist; the result is
/// never padded.
pub fn rank_by_field(
    records: &[ProductRecord],
    field: SummaryField,
    top_n: usize,
    catalog: &DescriptionCatalog,
) -> Vec<MaterialSummary> {
    let mut groups: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(value) = record.field_value(field) else {
            continue;
        };
        match index.get(value) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(value, groups.len());
                groups.push((value, 1));
            }
        }
    }

    // sort_by is stable: equal counts keep first-seen order
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(top_n);

    groups
        .into_iter()
        .map(|(name, count)| MaterialSummary {
            name: name.to_string(),
            count,
            description: catalog.describe(name),
        })
        .collect()
}

/// The three most common materials.
pub fn top_materials(
    records: &[ProductRecord],
    catalog: &DescriptionCatalog,
) -> Vec<MaterialSummary> {
    rank_by_field(records, SummaryField::Material, DEFAULT_TOP_N, catalog)
}

/// Static list rendered when the product fetch fails: generic descriptions,
/// zero counts.
pub fn fallback_summaries() -> Vec<MaterialSummary> {
    FALLBACK_MATERIALS
        .iter()
        .map(|name| MaterialSummary {
            name: name.to_string(),
            count: 0,
            description: template_description(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_materials(materials: &[Option<&str>]) -> Vec<ProductRecord> {
        materials
            .iter()
            .enumerate()
            .map(|(i, m)| ProductRecord {
                id: i.to_string(),
                name: format!("Product {}", i),
                price: 10.0,
                category: if i % 2 == 0 { "Tables" } else { "Decor" }.to_string(),
                material: m.map(str::to_string),
                image_url: String::new(),
                vendor: None,
                owner: None,
            })
            .collect()
    }

    fn names_and_counts(summaries: &[MaterialSummary]) -> Vec<(&str, u64)> {
        summaries
            .iter()
            .map(|s| (s.name.as_str(), s.count))
            .collect()
    }

    #[test]
    fn test_oak_pine_example() {
        let records = with_materials(&[Some("Oak"), Some("Pine"), Some("Oak")]);
        let summaries = top_materials(&records, &DescriptionCatalog::new());
        assert_eq!(names_and_counts(&summaries), vec![("Oak", 2), ("Pine", 1)]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = with_materials(&[
            Some("Teak"),
            Some("Bamboo"),
            Some("Walnut"),
            Some("Walnut"),
            Some("Bamboo"),
            Some("Teak"),
            Some("Olive"),
        ]);
        let summaries = top_materials(&records, &DescriptionCatalog::new());
        assert_eq!(
            names_and_counts(&summaries),
            vec![("Teak", 2), ("Bamboo", 2), ("Walnut", 2)]
        );
    }

    #[test]
    fn test_truncates_to_top_n_by_count() {
        let records = with_materials(&[
            Some("Pine"),
            Some("Oak"),
            Some("Oak"),
            Some("Teak"),
            Some("Teak"),
            Some("Teak"),
            Some("Walnut"),
            Some("Walnut"),
        ]);
        let summaries = top_materials(&records, &DescriptionCatalog::new());
        assert_eq!(
            names_and_counts(&summaries),
            vec![("Teak", 3), ("Oak", 2), ("Walnut", 2)]
        );
    }

    #[test]
    fn test_empty_and_missing_values() {
        assert!(top_materials(&[], &DescriptionCatalog::builtin()).is_empty());

        let records = with_materials(&[None, Some(""), Some("Oak"), None]);
        let summaries = top_materials(&records, &DescriptionCatalog::new());
        assert_eq!(names_and_counts(&summaries), vec![("Oak", 1)]);
    }

    #[test]
    fn test_never_exceeds_distinct_values() {
        let records = with_materials(&[Some("Oak"), Some("Pine"), Some("Oak"), Some("Pine")]);
        for top_n in 1..6 {
            let summaries =
                rank_by_field(&records, SummaryField::Material, top_n, &DescriptionCatalog::new());
            assert!(summaries.len() <= top_n);
            assert!(summaries.len() <= 2);
            assert!(summaries.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }

    #[test]
    fn test_idempotent() {
        let records = with_materials(&[Some("Oak"), Some("Teak"), Some("Pine"), Some("Teak")]);
        let catalog = DescriptionCatalog::builtin();
        assert_eq!(
            top_materials(&records, &catalog),
            top_materials(&records, &catalog)
        );
    }

    #[test]
    fn test_ranks_other_fields() {
        let records = with_materials(&[Some("Oak"), Some("Pine"), Some("Oak")]);
        let summaries =
            rank_by_field(&records, SummaryField::Category, 3, &DescriptionCatalog::new());
        assert_eq!(names_and_counts(&summaries), vec![("Tables", 2), ("Decor", 1)]);
    }

    #[test]
    fn test_descriptions_curated_or_template() {
        let records = with_materials(&[Some("oak"), Some("Acacia")]);
        let summaries = top_materials(&records, &DescriptionCatalog::builtin());
        assert!(summaries[0].description.starts_with("Dense and durable"));
        assert_eq!(summaries[1].description, template_description("Acacia"));
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let mut overrides = BTreeMap::new();
        overrides.insert("OAK".to_string(), "Our favourite.".to_string());
        let catalog = DescriptionCatalog::with_overrides(&overrides);
        assert_eq!(catalog.describe("Oak"), "Our favourite.");
        assert!(catalog.curated("Teak").is_some());
    }

    #[test]
    fn test_fallback_list() {
        let fallback = fallback_summaries();
        assert_eq!(fallback.len(), 3);
        assert!(fallback.iter().all(|s| s.count == 0));
        assert_eq!(fallback[0].description, template_description("Mahogany"));
    }
}
