//! FM4Conf textual feature models (`.fm4conf`).
//!
//! One declaration per line, `#` starts a comment:
//!
//! ```text
//! Root: Bike
//! Mandatory: Bike -> Frame
//! Optional: Bike -> Light
//! Alternative: Frame -> Road, Mountain
//! Or: Light -> Front, Rear
//! Requires: Light -> Road
//! Excludes: Mountain, Rear
//! ```
//!
//! Tree declarations introduce their children; every parent and constraint
//! operand must already be declared. Keywords are case-insensitive.

use super::{model_name, FeatureModelParser, FmFormat};
use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, FeatureModelBuilder, Formula, Relationship};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<keyword>[A-Za-z]+)\s*:\s*(?P<body>.*)$").expect("valid declaration regex")
});
static ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<lhs>.+?)\s*->\s*(?P<rhs>.+)$").expect("valid arrow regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct Fm4ConfParser;

impl FeatureModelParser for Fm4ConfParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel> {
        let mut builder = FeatureModelBuilder::new(model_name(path));

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            declaration(text, &mut builder)
                .map_err(|message| Error::parse_at(path, line, message))?;
        }

        builder.build().map_err(|message| Error::parse(path, message))
    }

    fn format(&self) -> FmFormat {
        FmFormat::Fm4Conf
    }
}

fn declaration(text: &str, builder: &mut FeatureModelBuilder) -> std::result::Result<(), String> {
    let caps = DECLARATION
        .captures(text)
        .ok_or_else(|| format!("malformed declaration '{text}'"))?;
    let keyword = caps["keyword"].to_ascii_lowercase();
    let body = caps["body"].trim();

    match keyword.as_str() {
        "root" if builder.num_features() == 0 => add(builder, body).map(|_| ()),
        "root" => Err("root feature must be unique and first".to_string()),
        "mandatory" | "optional" => {
            let (parent, child) = arrow(body)?;
            let parent = builder.resolve(parent)?;
            let child = add(builder, child)?;
            builder.add_relationship(if keyword == "mandatory" {
                Relationship::Mandatory { parent, child }
            } else {
                Relationship::Optional { parent, child }
            });
            Ok(())
        }
        "alternative" | "or" => {
            let (parent, members) = arrow(body)?;
            let parent = builder.resolve(parent)?;
            let children = names(members)
                .map(|name| add(builder, name))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if children.is_empty() {
                return Err("group has no members".to_string());
            }
            builder.add_relationship(if keyword == "alternative" {
                Relationship::Alternative { parent, children }
            } else {
                Relationship::Or { parent, children }
            });
            Ok(())
        }
        "requires" => {
            let (lhs, rhs) = arrow(body)?;
            let (lhs, rhs) = (builder.resolve(lhs)?, builder.resolve(rhs)?);
            builder.add_constraint(Formula::implies(Formula::Var(lhs), Formula::Var(rhs)));
            Ok(())
        }
        "excludes" => {
            let operands: Vec<&str> = names(body).collect();
            let [a, b] = operands.as_slice() else {
                return Err(format!("excludes expects two features, found {}", operands.len()));
            };
            let (a, b) = (builder.resolve(a)?, builder.resolve(b)?);
            builder.add_constraint(Formula::excludes(a, b));
            Ok(())
        }
        _ => Err(format!("unknown declaration '{}'", &caps["keyword"])),
    }
}

fn add(builder: &mut FeatureModelBuilder, name: &str) -> std::result::Result<usize, String> {
    if name.is_empty() {
        return Err("empty feature name".to_string());
    }
    builder.add_feature(name, name)
}

fn arrow(body: &str) -> std::result::Result<(&str, &str), String> {
    let caps = ARROW
        .captures(body)
        .ok_or_else(|| format!("expected '<feature> -> ...', found '{body}'"))?;
    match (caps.name("lhs"), caps.name("rhs")) {
        (Some(lhs), Some(rhs)) => Ok((lhs.as_str().trim(), rhs.as_str().trim())),
        _ => Err(format!("expected '<feature> -> ...', found '{body}'")),
    }
}

fn names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::RelationshipKind;
    use indoc::indoc;

    fn parse(content: &str) -> Result<FeatureModel> {
        Fm4ConfParser.parse_str(content, Path::new("models/bike.fm4conf"))
    }

    #[test]
    fn parses_tree_and_constraints() {
        let fm = parse(indoc! {"
            # city bike
            Root: Bike
            Mandatory: Bike -> Frame
            optional: Bike -> Light   # dynamo or battery
            Alternative: Frame -> Road, Mountain
            OR: Light -> Front, Rear
            Requires: Light -> Road
            Excludes: Mountain, Rear
        "})
        .unwrap();

        assert_eq!(fm.name(), "bike.fm4conf");
        assert_eq!(fm.num_features(), 7);
        assert_eq!(fm.features()[0].name, "Bike");
        assert_eq!(fm.num_relationships(), 4);
        assert_eq!(fm.num_constraints(), 2);
        let counts: Vec<usize> = RelationshipKind::ALL.iter().map(|k| fm.count(*k)).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn undeclared_parent_reports_line() {
        let err = parse(indoc! {"
            Root: Bike
            Optional: Car -> Light
        "})
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error in models/bike.fm4conf:2: unknown feature 'Car'"
        );
    }

    #[test]
    fn second_root_is_rejected() {
        let err = parse("Root: A\nRoot: B\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(2), .. }), "{err}");
    }

    #[test]
    fn excludes_needs_two_features() {
        let err = parse("Root: A\nExcludes: A\n").unwrap_err();
        assert!(err.to_string().contains("two features"), "{err}");
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let err = parse("Root: A\nCardinality: A -> B\n").unwrap_err();
        assert!(err.to_string().contains("unknown declaration 'Cardinality'"), "{err}");
    }

    #[test]
    fn empty_file_has_no_root() {
        assert!(matches!(parse("# nothing\n").unwrap_err(), Error::Parse { line: None, .. }));
    }
}
