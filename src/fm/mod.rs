//! Feature models: a tree of features with typed relationships plus
//! cross-tree constraints.
//!
//! Models are produced by the dialect readers in [`parsers`] through
//! [`FeatureModelBuilder`], and are read-only afterwards. The root feature is
//! always at index 0.

pub mod formula;
pub mod parsers;

pub use formula::Formula;

use std::collections::HashMap;
use std::fmt;

/// Relationship and constraint kinds counted in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Mandatory,
    Optional,
    Alternative,
    Or,
    Requires,
    Excludes,
}

impl RelationshipKind {
    /// Report order.
    pub const ALL: [RelationshipKind; 6] = [
        RelationshipKind::Mandatory,
        RelationshipKind::Optional,
        RelationshipKind::Alternative,
        RelationshipKind::Or,
        RelationshipKind::Requires,
        RelationshipKind::Excludes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RelationshipKind::Mandatory => "MANDATORY",
            RelationshipKind::Optional => "OPTIONAL",
            RelationshipKind::Alternative => "ALTERNATIVE",
            RelationshipKind::Or => "OR",
            RelationshipKind::Requires => "REQUIRES",
            RelationshipKind::Excludes => "EXCLUDES",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    pub name: String,
}

/// A tree relationship. Groups are a single relationship over all members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    Mandatory { parent: usize, child: usize },
    Optional { parent: usize, child: usize },
    Alternative { parent: usize, children: Vec<usize> },
    Or { parent: usize, children: Vec<usize> },
}

impl Relationship {
    pub fn kind(&self) -> RelationshipKind {
        match self {
            Relationship::Mandatory { .. } => RelationshipKind::Mandatory,
            Relationship::Optional { .. } => RelationshipKind::Optional,
            Relationship::Alternative { .. } => RelationshipKind::Alternative,
            Relationship::Or { .. } => RelationshipKind::Or,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureModel {
    name: String,
    features: Vec<Feature>,
    relationships: Vec<Relationship>,
    constraints: Vec<Formula>,
}

impl FeatureModel {
    /// The model's name; readers use the file name it was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn constraints(&self) -> &[Formula] {
        &self.constraints
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn num_relationships(&self) -> usize {
        self.relationships.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Count relationships of a tree kind, or constraints of a cross-tree
    /// kind (REQUIRES, EXCLUDES).
    pub fn count(&self, kind: RelationshipKind) -> usize {
        match kind {
            RelationshipKind::Requires | RelationshipKind::Excludes => self
                .constraints
                .iter()
                .filter(|c| c.constraint_kind() == Some(kind))
                .count(),
            _ => self
                .relationships
                .iter()
                .filter(|r| r.kind() == kind)
                .count(),
        }
    }
}

/// Incremental construction used by the dialect readers.
#[derive(Debug, Default)]
pub struct FeatureModelBuilder {
    name: String,
    features: Vec<Feature>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    constraints: Vec<Formula>,
}

impl FeatureModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Register a feature. The first feature added is the root.
    pub fn add_feature(&mut self, id: &str, name: &str) -> Result<usize, String> {
        if self.by_id.contains_key(id) {
            return Err(format!("duplicate feature id '{id}'"));
        }
        let index = self.features.len();
        self.features.push(Feature {
            id: id.to_string(),
            name: name.to_string(),
        });
        let _ = self.by_id.insert(id.to_string(), index);
        let _ = self.by_name.entry(name.to_string()).or_insert(index);
        Ok(index)
    }

    /// Look a feature up by id, falling back to its name.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.by_id
            .get(key)
            .or_else(|| self.by_name.get(key))
            .copied()
    }

    pub fn resolve(&self, key: &str) -> Result<usize, String> {
        self.lookup(key)
            .ok_or_else(|| format!("unknown feature '{key}'"))
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    pub fn add_constraint(&mut self, constraint: Formula) {
        self.constraints.push(constraint);
    }

    pub fn build(self) -> Result<FeatureModel, String> {
        if self.features.is_empty() {
            return Err("model has no root feature".to_string());
        }
        Ok(FeatureModel {
            name: self.name,
            features: self.features,
            relationships: self.relationships,
            constraints: self.constraints,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The smartwatch product line used across the test suite: 12 features,
    /// 6 relationships and 4 cross-tree constraints.
    pub(crate) fn smartwatch() -> FeatureModel {
        let mut b = FeatureModelBuilder::new("smartwatch.sxfm");
        let names = [
            "Smartwatch",
            "Screen",
            "Touchscreen",
            "ClassicScreen",
            "Battery",
            "Camera",
            "Connectivity",
            "Bluetooth",
            "WiFi",
            "NFC",
            "Cellular",
            "GPS",
        ];
        for name in names {
            b.add_feature(name, name).unwrap();
        }
        let f = |name: &str| b.lookup(name).unwrap();
        let (root, screen, touch, classic, battery, camera, conn) = (
            f("Smartwatch"),
            f("Screen"),
            f("Touchscreen"),
            f("ClassicScreen"),
            f("Battery"),
            f("Camera"),
            f("Connectivity"),
        );
        let radios = vec![f("Bluetooth"), f("WiFi"), f("NFC"), f("Cellular"), f("GPS")];
        let (cellular, gps, bluetooth, wifi) = (f("Cellular"), f("GPS"), f("Bluetooth"), f("WiFi"));

        b.add_relationship(Relationship::Mandatory { parent: root, child: screen });
        b.add_relationship(Relationship::Alternative {
            parent: screen,
            children: vec![touch, classic],
        });
        b.add_relationship(Relationship::Mandatory { parent: root, child: battery });
        b.add_relationship(Relationship::Optional { parent: root, child: camera });
        b.add_relationship(Relationship::Optional { parent: root, child: conn });
        b.add_relationship(Relationship::Or { parent: conn, children: radios });

        b.add_constraint(Formula::implies(Formula::Var(camera), Formula::Var(touch)));
        b.add_constraint(Formula::implies(Formula::Var(cellular), Formula::Var(battery)));
        b.add_constraint(Formula::excludes(classic, camera));
        b.add_constraint(Formula::implies(
            Formula::Var(gps),
            Formula::Or(vec![Formula::Var(bluetooth), Formula::Var(wifi)]),
        ));
        b.build().unwrap()
    }

    #[test]
    fn counts_by_kind() {
        let fm = smartwatch();
        assert_eq!(fm.num_features(), 12);
        assert_eq!(fm.num_relationships(), 6);
        assert_eq!(fm.num_constraints(), 4);

        let counts: Vec<usize> = RelationshipKind::ALL.iter().map(|k| fm.count(*k)).collect();
        assert_eq!(counts, vec![2, 2, 1, 1, 2, 1]);
    }

    #[test]
    fn builder_rejects_duplicate_ids() {
        let mut b = FeatureModelBuilder::new("m");
        b.add_feature("a", "A").unwrap();
        assert!(b.add_feature("a", "Other").is_err());
    }

    #[test]
    fn lookup_falls_back_to_name() {
        let mut b = FeatureModelBuilder::new("m");
        let root = b.add_feature("_r", "Root").unwrap();
        assert_eq!(b.lookup("_r"), Some(root));
        assert_eq!(b.lookup("Root"), Some(root));
        assert!(b.resolve("Missing").is_err());
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(FeatureModelBuilder::new("empty").build().is_err());
    }

    #[test]
    fn labels_follow_report_order() {
        let labels: Vec<&str> = RelationshipKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            ["MANDATORY", "OPTIONAL", "ALTERNATIVE", "OR", "REQUIRES", "EXCLUDES"]
        );
    }
}
