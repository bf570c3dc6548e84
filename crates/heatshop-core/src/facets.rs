//! Per-category filter facets shown in the catalog sidebar, loaded from YAML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::products::Category;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    /// CSS color for swatch-style facets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FacetKind {
    Range {
        min: f64,
        max: f64,
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Multiselect {
        options: Vec<FacetOption>,
    },
    Checkbox {
        options: Vec<FacetOption>,
    },
    Color {
        options: Vec<FacetOption>,
    },
}

/// One filter control. `id` is the query parameter the control writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetConfig {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FacetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFacets {
    pub category: Category,
    pub title: String,
    pub filters: Vec<FacetConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFacets {
    pub categories: Vec<CategoryFacets>,
}

impl CatalogFacets {
    #[must_use]
    pub fn for_category(&self, category: Category) -> Option<&CategoryFacets> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Load and validate the catalog facet configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog_facets(path: &Path) -> Result<CatalogFacets, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog_facets(&content)
}

fn parse_catalog_facets(content: &str) -> Result<CatalogFacets, ConfigError> {
    let facets: CatalogFacets =
        serde_yaml::from_str(content).map_err(ConfigError::CatalogFileParse)?;

    validate_facets(&facets)?;

    Ok(facets)
}

fn validate_facets(facets: &CatalogFacets) -> Result<(), ConfigError> {
    let mut seen_categories = HashSet::new();

    for category in &facets.categories {
        if !seen_categories.insert(category.category) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{}'",
                category.category
            )));
        }

        if category.title.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have a non-empty title",
                category.category
            )));
        }

        let mut seen_ids = HashSet::new();
        for filter in &category.filters {
            if filter.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has a filter with an empty id",
                    category.category
                )));
            }

            if !seen_ids.insert(filter.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has duplicate filter id '{}'",
                    category.category, filter.id
                )));
            }

            match &filter.kind {
                FacetKind::Range { min, max, step, .. } => {
                    if min >= max {
                        return Err(ConfigError::Validation(format!(
                            "filter '{}' in '{}': min {min} must be less than max {max}",
                            filter.id, category.category
                        )));
                    }
                    if *step <= 0.0 {
                        return Err(ConfigError::Validation(format!(
                            "filter '{}' in '{}': step must be positive",
                            filter.id, category.category
                        )));
                    }
                }
                FacetKind::Multiselect { options }
                | FacetKind::Checkbox { options }
                | FacetKind::Color { options } => {
                    if options.is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "filter '{}' in '{}' has no options",
                            filter.id, category.category
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}
