//! FeatureIDE XML feature models (`.xml`).
//!
//! The feature tree lives in `<struct>`: `and` nodes hold solitary children
//! (MANDATORY when marked `mandatory="true"`, OPTIONAL otherwise), while
//! `alt` and `or` nodes hold a single group over all their children.
//! `<constraints>` contains one `rule` per cross-tree constraint.

use super::xml::{self, XmlElement};
use super::{model_name, FeatureModelParser, FmFormat};
use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, FeatureModelBuilder, Formula, Relationship};
use std::path::Path;

/// Elements inside a `rule` that carry no formula.
const ANNOTATIONS: &[&str] = &["description", "tags", "graphics", "attribute"];

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureIdeParser;

impl FeatureModelParser for FeatureIdeParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel> {
        let document =
            xml::parse_document(content).map_err(|e| Error::parse_at(path, e.line, e.message))?;
        let mut builder = FeatureModelBuilder::new(model_name(path));

        let structure = document
            .child("struct")
            .ok_or_else(|| Error::parse(path, "missing <struct> element"))?;
        let mut roots = tree_nodes(structure);
        let root = match (roots.next(), roots.next()) {
            (Some(root), None) => root,
            (None, _) => return Err(Error::parse_at(path, structure.line, "empty <struct>")),
            (Some(_), Some(extra)) => {
                return Err(Error::parse_at(path, extra.line, "more than one root feature"))
            }
        };
        add_subtree(root, path, &mut builder)?;

        if let Some(constraints) = document.child("constraints") {
            for rule in constraints.children.iter().filter(|c| c.name == "rule") {
                let body = rule_body(rule, path)?;
                builder.add_constraint(formula(body, path, &builder)?);
            }
        }

        builder.build().map_err(|message| Error::parse(path, message))
    }

    fn format(&self) -> FmFormat {
        FmFormat::FeatureIde
    }
}

fn is_tree_node(element: &XmlElement) -> bool {
    matches!(element.name.as_str(), "and" | "alt" | "or" | "feature")
}

fn tree_nodes(element: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    element.children.iter().filter(|c| is_tree_node(c))
}

fn add_subtree(node: &XmlElement, path: &Path, builder: &mut FeatureModelBuilder) -> Result<usize> {
    let name = node
        .attr("name")
        .ok_or_else(|| Error::parse_at(path, node.line, format!("<{}> without a name", node.name)))?;
    let parent = builder
        .add_feature(name, name)
        .map_err(|message| Error::parse_at(path, node.line, message))?;

    let mut members = Vec::new();
    for child in tree_nodes(node) {
        let index = add_subtree(child, path, builder)?;
        match node.name.as_str() {
            "and" => builder.add_relationship(if child.attr("mandatory") == Some("true") {
                Relationship::Mandatory {
                    parent,
                    child: index,
                }
            } else {
                Relationship::Optional {
                    parent,
                    child: index,
                }
            }),
            "alt" | "or" => members.push(index),
            _ => {
                return Err(Error::parse_at(
                    path,
                    child.line,
                    format!("leaf feature '{name}' cannot have children"),
                ))
            }
        }
    }

    match node.name.as_str() {
        "alt" | "or" if members.is_empty() => Err(Error::parse_at(
            path,
            node.line,
            format!("group '{name}' has no members"),
        )),
        "alt" => {
            builder.add_relationship(Relationship::Alternative {
                parent,
                children: members,
            });
            Ok(parent)
        }
        "or" => {
            builder.add_relationship(Relationship::Or {
                parent,
                children: members,
            });
            Ok(parent)
        }
        _ => Ok(parent),
    }
}

fn rule_body<'a>(rule: &'a XmlElement, path: &Path) -> Result<&'a XmlElement> {
    let mut body = rule
        .children
        .iter()
        .filter(|c| !ANNOTATIONS.contains(&c.name.as_str()));
    match (body.next(), body.next()) {
        (Some(formula), None) => Ok(formula),
        (None, _) => Err(Error::parse_at(path, rule.line, "empty constraint rule")),
        (Some(_), Some(extra)) => Err(Error::parse_at(
            path,
            extra.line,
            "constraint rule has more than one formula",
        )),
    }
}

fn formula(element: &XmlElement, path: &Path, builder: &FeatureModelBuilder) -> Result<Formula> {
    let operands = |expected: Option<usize>| -> Result<Vec<Formula>> {
        let parts = element
            .children
            .iter()
            .map(|child| formula(child, path, builder))
            .collect::<Result<Vec<_>>>()?;
        match expected {
            Some(n) if parts.len() != n => Err(Error::parse_at(
                path,
                element.line,
                format!("<{}> expects {n} operands, found {}", element.name, parts.len()),
            )),
            _ => Ok(parts),
        }
    };

    match element.name.as_str() {
        "var" => builder
            .resolve(element.text.trim())
            .map(Formula::Var)
            .map_err(|message| Error::parse_at(path, element.line, message)),
        "not" => Ok(Formula::negate(operands(Some(1))?.remove(0))),
        "conj" => Ok(Formula::And(operands(None)?)),
        "disj" => Ok(Formula::Or(operands(None)?)),
        "imp" | "eq" => {
            let mut parts = operands(Some(2))?;
            let rhs = parts.remove(1);
            let lhs = parts.remove(0);
            Ok(if element.name == "imp" {
                Formula::implies(lhs, rhs)
            } else {
                Formula::iff(lhs, rhs)
            })
        }
        other => Err(Error::parse_at(
            path,
            element.line,
            format!("unknown constraint element <{other}>"),
        )),
    }
}
