//! Glencoe JSON feature models (`.json`, usually `*.gfm.json`).
//!
//! A feature's `type` describes how its children relate to it: `FEATURE`
//! children are solitary (OPTIONAL when flagged `optional`, MANDATORY
//! otherwise), `XOR` children form an alternative group and `OR` children
//! an OR group.

use super::{model_name, FeatureModelParser, FmFormat};
use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, FeatureModelBuilder, Formula, Relationship};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Document {
    features: HashMap<String, FeatureEntry>,
    tree: TreeNode,
    #[serde(default)]
    constraints: BTreeMap<String, Term>,
}

#[derive(Debug, Deserialize)]
struct FeatureEntry {
    name: Option<String>,
    #[serde(rename = "type", default = "default_feature_type")]
    kind: String,
    #[serde(default)]
    optional: bool,
}

fn default_feature_type() -> String {
    "FEATURE".to_string()
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    id: String,
    #[serde(default)]
    children: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct Term {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    operands: Vec<Operand>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Operand {
    Feature(String),
    Term(Term),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlencoeParser;

impl FeatureModelParser for GlencoeParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel> {
        let document: Document =
            serde_json::from_str(content).map_err(|e| Error::parse(path, e.to_string()))?;
        let mut builder = FeatureModelBuilder::new(model_name(path));

        add_subtree(&document.tree, &document.features, path, &mut builder)?;

        for (id, term) in &document.constraints {
            let formula = constraint(term, path, &builder)
                .map_err(|message| Error::parse(path, format!("constraint '{id}': {message}")))?;
            builder.add_constraint(formula);
        }

        builder.build().map_err(|message| Error::parse(path, message))
    }

    fn format(&self) -> FmFormat {
        FmFormat::Glencoe
    }
}

fn add_subtree(
    node: &TreeNode,
    features: &HashMap<String, FeatureEntry>,
    path: &Path,
    builder: &mut FeatureModelBuilder,
) -> Result<usize> {
    let entry = features.get(&node.id).ok_or_else(|| {
        Error::parse(path, format!("tree node '{}' has no feature entry", node.id))
    })?;
    let name = entry.name.as_deref().unwrap_or(&node.id);
    let parent = builder
        .add_feature(&node.id, name)
        .map_err(|message| Error::parse(path, message))?;

    let mut members = Vec::with_capacity(node.children.len());
    for child in &node.children {
        members.push(add_subtree(child, features, path, builder)?);
    }
    if members.is_empty() {
        return Ok(parent);
    }

    match entry.kind.as_str() {
        "FEATURE" => {
            for (child, index) in node.children.iter().zip(members) {
                let optional = features.get(&child.id).is_some_and(|f| f.optional);
                builder.add_relationship(if optional {
                    Relationship::Optional {
                        parent,
                        child: index,
                    }
                } else {
                    Relationship::Mandatory {
                        parent,
                        child: index,
                    }
                });
            }
        }
        "XOR" => builder.add_relationship(Relationship::Alternative {
            parent,
            children: members,
        }),
        "OR" => builder.add_relationship(Relationship::Or {
            parent,
            children: members,
        }),
        other => {
            return Err(Error::parse(
                path,
                format!("feature '{}' has unknown type '{other}'", node.id),
            ))
        }
    }
    Ok(parent)
}

fn constraint(
    term: &Term,
    path: &Path,
    builder: &FeatureModelBuilder,
) -> std::result::Result<Formula, String> {
    let operands = || -> std::result::Result<Vec<Formula>, String> {
        term.operands
            .iter()
            .map(|operand| match operand {
                Operand::Term(inner) => constraint(inner, path, builder),
                Operand::Feature(id) => builder.resolve(id).map(Formula::Var),
            })
            .collect()
    };
    let binary = || -> std::result::Result<(Formula, Formula), String> {
        let mut parts = operands()?;
        if parts.len() != 2 {
            return Err(format!("{} expects 2 operands, found {}", term.kind, parts.len()));
        }
        let rhs = parts.remove(1);
        Ok((parts.remove(0), rhs))
    };

    match term.kind.as_str() {
        "FeatureTerm" => match term.operands.as_slice() {
            [Operand::Feature(id)] => builder.resolve(id).map(Formula::Var),
            _ => Err("FeatureTerm expects a single feature id".to_string()),
        },
        "NotTerm" => {
            let mut parts = operands()?;
            if parts.len() != 1 {
                return Err(format!("NotTerm expects 1 operand, found {}", parts.len()));
            }
            Ok(Formula::negate(parts.remove(0)))
        }
        "AndTerm" => Ok(Formula::And(operands()?)),
        "OrTerm" => Ok(Formula::Or(operands()?)),
        "ImpliesTerm" => binary().map(|(lhs, rhs)| Formula::implies(lhs, rhs)),
        "ExcludesTerm" => binary().map(|(lhs, rhs)| {
            Formula::negate(Formula::And(vec![lhs, rhs]))
        }),
        "EquivalenceTerm" | "IffTerm" => binary().map(|(lhs, rhs)| Formula::iff(lhs, rhs)),
        other => Err(format!("unknown term type '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::RelationshipKind;
    use indoc::indoc;

    fn parse(content: &str) -> Result<FeatureModel> {
        GlencoeParser.parse_str(content, Path::new("models/car.gfm.json"))
    }

    #[test]
    fn parses_features_tree_and_terms() {
        let fm = parse(indoc! {r#"
            {
              "id": "car",
              "features": {
                "Car": {"id": "Car", "name": "Car", "type": "FEATURE", "optional": false},
                "Engine": {"id": "Engine", "name": "Engine", "type": "XOR", "optional": false},
                "Petrol": {"id": "Petrol", "name": "Petrol", "type": "FEATURE", "optional": false},
                "Electric": {"id": "Electric", "name": "Electric", "type": "FEATURE", "optional": false},
                "Extras": {"id": "Extras", "name": "Extras", "type": "OR", "optional": true},
                "Tow": {"id": "Tow", "name": "Tow bar", "type": "FEATURE", "optional": false},
                "Roof": {"id": "Roof", "name": "Roof box", "type": "FEATURE", "optional": false}
              },
              "tree": {
                "id": "Car",
                "children": [
                  {"id": "Engine", "children": [{"id": "Petrol"}, {"id": "Electric"}]},
                  {"id": "Extras", "children": [{"id": "Tow"}, {"id": "Roof"}]}
                ]
              },
              "constraints": {
                "c1": {"type": "ImpliesTerm", "operands": [
                  {"type": "FeatureTerm", "operands": ["Tow"]},
                  {"type": "FeatureTerm", "operands": ["Petrol"]}
                ]},
                "c2": {"type": "ExcludesTerm", "operands": [
                  {"type": "FeatureTerm", "operands": ["Electric"]},
                  {"type": "FeatureTerm", "operands": ["Roof"]}
                ]},
                "c3": {"type": "OrTerm", "operands": [
                  {"type": "FeatureTerm", "operands": ["Tow"]},
                  {"type": "FeatureTerm", "operands": ["Roof"]}
                ]}
              }
            }
        "#})
        .unwrap();

        assert_eq!(fm.name(), "car.gfm.json");
        assert_eq!(fm.num_features(), 7);
        assert_eq!(fm.features()[5].name, "Tow bar");
        assert_eq!(fm.num_relationships(), 4);
        assert_eq!(fm.num_constraints(), 3);
        let counts: Vec<usize> = RelationshipKind::ALL.iter().map(|k| fm.count(*k)).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn unknown_feature_in_constraint_is_rejected() {
        let err = parse(indoc! {r#"
            {
              "features": {"Root": {"name": "Root"}},
              "tree": {"id": "Root"},
              "constraints": {"c1": {"type": "FeatureTerm", "operands": ["Ghost"]}}
            }
        "#})
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error in models/car.gfm.json: constraint 'c1': unknown feature 'Ghost'"
        );
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse("{\"features\": ").unwrap_err();
        assert!(matches!(err, Error::Parse { line: None, .. }));
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn tree_node_without_entry_is_rejected() {
        let err = parse(r#"{"features": {}, "tree": {"id": "Root"}}"#).unwrap_err();
        assert!(err.to_string().contains("'Root'"), "{err}");
    }
}
