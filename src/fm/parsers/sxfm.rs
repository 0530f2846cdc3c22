//! SPLOT simple XML feature models (`.sxfm`, `.splx`).
//!
//! The feature tree is an indentation-structured text block:
//!
//! ```text
//! <feature_tree>
//! :r Smartwatch (_r)
//! 	:m Screen (_r_1)
//! 		:g (_r_1_2) [1,1]
//! 			: Touchscreen (_r_1_2_3)
//! 			: ClassicScreen (_r_1_2_4)
//! 	:o Camera (_r_5)
//! </feature_tree>
//! <constraints>
//! C1:~_r_5 or _r_1_2_3
//! </constraints>
//! ```
//!
//! Constraints are CNF clauses whose literals name feature ids (or names).

use super::{model_name, FeatureModelParser, FmFormat};
use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, FeatureModelBuilder, Formula, Relationship};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static FEATURE_TREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<feature_tree>(.*?)</feature_tree>").expect("valid feature tree regex")
});
static CONSTRAINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<constraints>(.*?)</constraints>").expect("valid constraints regex")
});
static NODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^:(?P<kind>[rmog])?\s+(?P<name>[^(\[]*?)\s*(?:\((?P<id>[^)]*)\))?\s*(?:\[\s*(?P<lo>\d+)\s*,\s*(?P<hi>\d+|\*)\s*\])?$",
    )
    .expect("valid feature tree node regex")
});
static CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<label>[^:]*):)?\s*(?P<body>.+)$").expect("valid constraint regex")
});
static OR_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+or\s+").expect("valid disjunction regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct SxfmParser;

impl FeatureModelParser for SxfmParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel> {
        let mut builder = FeatureModelBuilder::new(model_name(path));

        let tree = FEATURE_TREE
            .captures(content)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| Error::parse(path, "missing <feature_tree> section"))?;
        parse_tree(
            tree.as_str(),
            line_of(content, tree.start()),
            path,
            &mut builder,
        )?;

        if let Some(section) = CONSTRAINTS.captures(content).and_then(|caps| caps.get(1)) {
            parse_constraints(
                section.as_str(),
                line_of(content, section.start()),
                path,
                &mut builder,
            )?;
        }

        builder.build().map_err(|message| Error::parse(path, message))
    }

    fn format(&self) -> FmFormat {
        FmFormat::Sxfm
    }
}

/// 1-based line number of a byte offset.
fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

#[derive(Debug, Clone, Copy)]
enum Parent {
    Feature(usize),
    Group(usize),
}

#[derive(Debug)]
struct Group {
    parent: usize,
    alternative: bool,
    children: Vec<usize>,
    line: usize,
}

fn parse_tree(
    section: &str,
    first_line: usize,
    path: &Path,
    builder: &mut FeatureModelBuilder,
) -> Result<()> {
    let mut stack: Vec<(usize, Parent)> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();

    for (offset, raw) in section.split('\n').enumerate() {
        let line = first_line + offset;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let indent = raw.len() - raw.trim_start().len();
        let caps = NODE.captures(text).ok_or_else(|| {
            Error::parse_at(path, line, format!("unrecognized feature tree line '{text}'"))
        })?;

        while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
            let _ = stack.pop();
        }
        let parent = stack.last().map(|(_, parent)| *parent);

        let kind = caps.name("kind").map_or("", |m| m.as_str());
        let name = caps.name("name").map_or("", |m| m.as_str().trim());
        let id = caps
            .name("id")
            .map(|m| m.as_str().trim())
            .filter(|id| !id.is_empty());

        let node = match (kind, parent) {
            ("r", None) if builder.num_features() == 0 => {
                Parent::Feature(add_feature(builder, id, name, path, line)?)
            }
            ("r", _) => {
                return Err(Error::parse_at(path, line, "root feature must be unique and first"))
            }
            ("m" | "o", Some(Parent::Feature(parent))) => {
                let child = add_feature(builder, id, name, path, line)?;
                builder.add_relationship(if kind == "m" {
                    Relationship::Mandatory { parent, child }
                } else {
                    Relationship::Optional { parent, child }
                });
                Parent::Feature(child)
            }
            ("g", Some(Parent::Feature(parent))) => {
                let alternative = group_kind(&caps, path, line)?;
                groups.push(Group {
                    parent,
                    alternative,
                    children: Vec::new(),
                    line,
                });
                Parent::Group(groups.len() - 1)
            }
            ("", Some(Parent::Group(group))) => {
                let child = add_feature(builder, id, name, path, line)?;
                groups[group].children.push(child);
                Parent::Feature(child)
            }
            _ => {
                return Err(Error::parse_at(
                    path,
                    line,
                    format!("'{text}' is not allowed at this position"),
                ))
            }
        };
        stack.push((indent, node));
    }

    for group in groups {
        if group.children.is_empty() {
            return Err(Error::parse_at(path, group.line, "group has no members"));
        }
        builder.add_relationship(if group.alternative {
            Relationship::Alternative {
                parent: group.parent,
                children: group.children,
            }
        } else {
            Relationship::Or {
                parent: group.parent,
                children: group.children,
            }
        });
    }

    Ok(())
}

fn add_feature(
    builder: &mut FeatureModelBuilder,
    id: Option<&str>,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<usize> {
    let (id, name) = match (id, name) {
        (None, "") => return Err(Error::parse_at(path, line, "feature has neither name nor id")),
        (Some(id), "") => (id, id),
        (Some(id), name) => (id, name),
        (None, name) => (name, name),
    };
    builder
        .add_feature(id, name)
        .map_err(|message| Error::parse_at(path, line, message))
}

/// `[1,1]` is an alternative group, `[1,*]` or `[1,n]` with `n > 1` an OR group.
fn group_kind(caps: &regex::Captures<'_>, path: &Path, line: usize) -> Result<bool> {
    let (Some(lo), Some(hi)) = (caps.name("lo"), caps.name("hi")) else {
        return Err(Error::parse_at(path, line, "group without cardinality"));
    };
    match (lo.as_str(), hi.as_str()) {
        ("1", "1") => Ok(true),
        ("1", "*") => Ok(false),
        ("1", hi) if hi.parse::<usize>().is_ok_and(|n| n > 1) => Ok(false),
        (lo, hi) => Err(Error::parse_at(
            path,
            line,
            format!("unsupported group cardinality [{lo},{hi}]"),
        )),
    }
}

fn parse_constraints(
    section: &str,
    first_line: usize,
    path: &Path,
    builder: &mut FeatureModelBuilder,
) -> Result<()> {
    for (offset, raw) in section.split('\n').enumerate() {
        let line = first_line + offset;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let body = CLAUSE
            .captures(text)
            .and_then(|caps| caps.name("body"))
            .map(|m| m.as_str().trim())
            .ok_or_else(|| Error::parse_at(path, line, format!("malformed constraint '{text}'")))?;

        let mut literals = Vec::new();
        for literal in OR_SEPARATOR.split(body) {
            let literal = literal.trim();
            let (negated, key) = match literal.strip_prefix('~') {
                Some(rest) => (true, rest.trim()),
                None => (false, literal),
            };
            if key.is_empty() {
                return Err(Error::parse_at(path, line, "empty literal in constraint"));
            }
            let feature = builder
                .resolve(key)
                .map_err(|message| Error::parse_at(path, line, message))?;
            literals.push(if negated {
                Formula::negate(Formula::Var(feature))
            } else {
                Formula::Var(feature)
            });
        }

        let formula = if literals.len() == 1 {
            literals.remove(0)
        } else {
            Formula::Or(literals)
        };
        builder.add_constraint(formula);
    }
    Ok(())
}
