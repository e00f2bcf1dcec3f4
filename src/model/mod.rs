//! Feature-model document editing.
//!
//! The feature model is the line-oriented domain language describing how
//! integrated modules compose into the product line. Instead of splicing
//! lines around literal markers, the document is parsed into a small
//! structure (a flat import list plus a tree of features and cardinality
//! groups), mutated structurally, and pretty-printed on write. A missing
//! insertion anchor is a reported [`SplmError::StructuralEdit`], never a
//! silent no-op.
//!
//! Invariant maintained across ADD/REMOVE: each integrated module's
//! feature name appears exactly once under `imports` and exactly once,
//! qualified by its feature-group name, under the project root's
//! `mandatory` group.

mod parser;

use crate::constants::{FALLBACK_ROOT_FEATURE, FEATURE_MODEL_FILE};
use crate::core::SplmError;
use crate::utils::fs::{atomic_write, read_text};
use std::path::Path;
use tracing::debug;

/// Cardinality of a feature group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Every child must be selected.
    Mandatory,
    /// Children may be selected independently.
    Optional,
    /// At least one child must be selected.
    Or,
    /// Exactly one child must be selected.
    Alternative,
}

impl Cardinality {
    /// Parse a group keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "mandatory" => Some(Self::Mandatory),
            "optional" => Some(Self::Optional),
            "or" => Some(Self::Or),
            "alternative" => Some(Self::Alternative),
            _ => None,
        }
    }

    /// The keyword used in the document.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Optional => "optional",
            Self::Or => "or",
            Self::Alternative => "alternative",
        }
    }
}

/// A feature node: a name plus its cardinality groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature name, possibly qualified (`model.Group`).
    pub name: String,
    /// Child groups, in document order.
    pub groups: Vec<Group>,
}

/// A cardinality group and its child features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The group's cardinality.
    pub cardinality: Cardinality,
    /// Child features, in document order.
    pub children: Vec<Feature>,
}

/// The parsed feature-model document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureModel {
    /// Imported model names, one per line in the `imports` section.
    pub imports: Vec<String>,
    /// Root features of the `features` section (normally exactly one).
    pub features: Vec<Feature>,
    /// Opaque tail (`constraints` section), preserved verbatim.
    trailing: Vec<String>,
}

impl FeatureModel {
    /// Parse a document from text.
    pub fn parse(content: &str, origin: &str) -> Result<Self, SplmError> {
        parser::parse(content, origin)
    }

    /// Load the document from `<project_root>/base.uvl`.
    pub fn load(project_root: &Path) -> Result<Self, SplmError> {
        let path = project_root.join(FEATURE_MODEL_FILE);
        let content = read_text(&path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Persist the document (whole-file rewrite, atomic).
    pub fn save(&self, project_root: &Path) -> Result<(), SplmError> {
        let path = project_root.join(FEATURE_MODEL_FILE);
        atomic_write(&path, self.render().as_bytes())
    }

    /// Render to canonical text.
    pub fn render(&self) -> String {
        parser::render(self)
    }

    /// Integrate a module: add `import` to the import list and `qualified`
    /// (its `featureName.featureGroupName`) to the `mandatory` group of
    /// the anchor feature.
    ///
    /// The anchor is resolved in order of preference among features
    /// carrying a `mandatory` group: a feature named exactly `anchor`, a
    /// feature whose name contains `anchor`, or the `MainSPL` fallback
    /// root. Matches without a `mandatory` group (such as qualified leaf
    /// entries) are passed over. When no candidate qualifies the edit
    /// fails with [`SplmError::StructuralEdit`] and the model is left
    /// unchanged, including the import list.
    pub fn insert_integration(
        &mut self,
        import: &str,
        qualified: &str,
        anchor: &str,
    ) -> Result<(), SplmError> {
        let root = self.resolve_anchor(anchor)?;

        let group = root
            .groups
            .iter_mut()
            .find(|g| g.cardinality == Cardinality::Mandatory)
            .ok_or_else(|| SplmError::StructuralEdit {
                reason: format!("no 'mandatory' group under the root feature '{anchor}'"),
            })?;

        if group.children.iter().any(|child| child.name == qualified) {
            debug!(feature = %qualified, "feature already present in mandatory group");
        } else {
            group.children.push(Feature { name: qualified.to_string(), groups: Vec::new() });
        }

        if self.imports.iter().any(|existing| existing == import) {
            debug!(import = %import, "import already present");
        } else {
            self.imports.push(import.to_string());
        }

        Ok(())
    }

    /// Remove every trace of a module: its import entry and any feature
    /// node equal to `feature_name` or qualified by it (`feature_name.*`).
    /// Returns true when the document changed.
    pub fn remove_integration(&mut self, feature_name: &str) -> bool {
        let imports_before = self.imports.len();
        self.imports.retain(|import| import != feature_name);
        let mut changed = self.imports.len() != imports_before;

        let qualified_prefix = format!("{feature_name}.");
        changed |= remove_features(&mut self.features, &|name| {
            name == feature_name || name.starts_with(&qualified_prefix)
        });
        changed
    }

    fn resolve_anchor(&mut self, anchor: &str) -> Result<&mut Feature, SplmError> {
        // Three passes so an exact match always wins over a substring
        // one. Candidates without a mandatory group cannot anchor an
        // insertion and are passed over, so a qualified leaf entry that
        // happens to contain the anchor text never shadows the real root.
        if find_feature(&self.features, &|f| f.name == anchor && has_mandatory(f)).is_some() {
            return Ok(find_feature_mut(&mut self.features, &|f| {
                f.name == anchor && has_mandatory(f)
            })
            .unwrap());
        }
        if find_feature(&self.features, &|f| f.name.contains(anchor) && has_mandatory(f))
            .is_some()
        {
            return Ok(find_feature_mut(&mut self.features, &|f| {
                f.name.contains(anchor) && has_mandatory(f)
            })
            .unwrap());
        }
        if find_feature(&self.features, &|f| {
            f.name == FALLBACK_ROOT_FEATURE && has_mandatory(f)
        })
        .is_some()
        {
            return Ok(find_feature_mut(&mut self.features, &|f| {
                f.name == FALLBACK_ROOT_FEATURE && has_mandatory(f)
            })
            .unwrap());
        }
        Err(SplmError::StructuralEdit {
            reason: format!(
                "no feature matching '{anchor}' (or '{FALLBACK_ROOT_FEATURE}') carries a 'mandatory' group"
            ),
        })
    }
}

fn has_mandatory(feature: &Feature) -> bool {
    feature.groups.iter().any(|g| g.cardinality == Cardinality::Mandatory)
}

fn find_feature<'a>(
    features: &'a [Feature],
    pred: &dyn Fn(&Feature) -> bool,
) -> Option<&'a Feature> {
    for feature in features {
        if pred(feature) {
            return Some(feature);
        }
        for group in &feature.groups {
            if let Some(found) = find_feature(&group.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn find_feature_mut<'a>(
    features: &'a mut [Feature],
    pred: &dyn Fn(&Feature) -> bool,
) -> Option<&'a mut Feature> {
    for feature in features {
        if pred(feature) {
            return Some(feature);
        }
        for group in &mut feature.groups {
            if let Some(found) = find_feature_mut(&mut group.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_features(features: &mut Vec<Feature>, matches: &dyn Fn(&str) -> bool) -> bool {
    let before = features.len();
    features.retain(|feature| !matches(&feature.name));
    let mut changed = features.len() != before;

    for feature in features.iter_mut() {
        for group in &mut feature.groups {
            changed |= remove_features(&mut group.children, matches);
        }
    }
    changed
}
