//! EMF feature models serialized as XMI (`.xmi`).
//!
//! A `FeatureModel` element holds flat lists of `features`, typed
//! `relationships` and typed `constraints`:
//!
//! ```text
//! <fm:FeatureModel name="Bike">
//!   <features xmi:id="bike" name="Bike"/>
//!   <features xmi:id="light" name="Light"/>
//!   <relationships xsi:type="fm:OptionalRelationship" parent="bike" child="light"/>
//!   <relationships xsi:type="fm:OrRelationship" parent="bike" children="a b"/>
//!   <constraints xsi:type="fm:RequiresConstraint" from="light" to="a"/>
//! </fm:FeatureModel>
//! ```
//!
//! The first feature is the root. References name a feature's `xmi:id`, its
//! name, or its position (`//@features.3`).

use super::xml::{self, XmlElement};
use super::{model_name, FeatureModelParser, FmFormat};
use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, FeatureModelBuilder, Formula, Relationship};
use std::path::Path;

const FEATURE_PATH_PREFIX: &str = "//@features.";

#[derive(Debug, Clone, Copy, Default)]
pub struct XmiParser;

impl FeatureModelParser for XmiParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<FeatureModel> {
        let document =
            xml::parse_document(content).map_err(|e| Error::parse_at(path, e.line, e.message))?;
        let model = feature_model_element(&document)
            .ok_or_else(|| Error::parse(path, "missing FeatureModel element"))?;
        let mut builder = FeatureModelBuilder::new(model_name(path));

        for feature in model.children.iter().filter(|c| c.name == "features") {
            let name = feature
                .attr("name")
                .ok_or_else(|| Error::parse_at(path, feature.line, "feature without a name"))?;
            let id = feature.attr("xmi:id").unwrap_or(name);
            builder
                .add_feature(id, name)
                .map_err(|message| Error::parse_at(path, feature.line, message))?;
        }

        for element in &model.children {
            match element.name.as_str() {
                "relationships" => builder.add_relationship(relationship(element, path, &builder)?),
                "constraints" => builder.add_constraint(constraint(element, path, &builder)?),
                _ => {}
            }
        }

        builder.build().map_err(|message| Error::parse(path, message))
    }

    fn format(&self) -> FmFormat {
        FmFormat::Xmi
    }
}

/// The document root, or the model wrapped in an `xmi:XMI` envelope.
fn feature_model_element(document: &XmlElement) -> Option<&XmlElement> {
    std::iter::once(document)
        .chain(document.children.iter())
        .find(|element| local_name(&element.name) == "FeatureModel")
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn element_type<'a>(element: &'a XmlElement, path: &Path) -> Result<&'a str> {
    element.attr("xsi:type").map(local_name).ok_or_else(|| {
        Error::parse_at(
            path,
            element.line,
            format!("<{}> without xsi:type", element.name),
        )
    })
}

fn reference(
    element: &XmlElement,
    key: &str,
    path: &Path,
    builder: &FeatureModelBuilder,
) -> Result<usize> {
    let value = element
        .attr(key)
        .ok_or_else(|| Error::parse_at(path, element.line, format!("missing '{key}' reference")))?;
    resolve(value, builder).map_err(|message| Error::parse_at(path, element.line, message))
}

fn resolve(value: &str, builder: &FeatureModelBuilder) -> std::result::Result<usize, String> {
    match value.strip_prefix(FEATURE_PATH_PREFIX) {
        Some(index) => index
            .parse::<usize>()
            .ok()
            .filter(|&index| index < builder.num_features())
            .ok_or_else(|| format!("unknown feature '{value}'")),
        None => builder.resolve(value),
    }
}

fn relationship(
    element: &XmlElement,
    path: &Path,
    builder: &FeatureModelBuilder,
) -> Result<Relationship> {
    let kind = element_type(element, path)?;
    let parent = reference(element, "parent", path, builder)?;

    let group = || -> Result<Vec<usize>> {
        let members = element
            .attr("children")
            .unwrap_or_default()
            .split_whitespace()
            .map(|value| resolve(value, builder))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|message| Error::parse_at(path, element.line, message))?;
        if members.is_empty() {
            return Err(Error::parse_at(path, element.line, "group has no members"));
        }
        Ok(members)
    };

    match kind {
        "MandatoryRelationship" => Ok(Relationship::Mandatory {
            parent,
            child: reference(element, "child", path, builder)?,
        }),
        "OptionalRelationship" => Ok(Relationship::Optional {
            parent,
            child: reference(element, "child", path, builder)?,
        }),
        "AlternativeRelationship" => Ok(Relationship::Alternative {
            parent,
            children: group()?,
        }),
        "OrRelationship" => Ok(Relationship::Or {
            parent,
            children: group()?,
        }),
        other => Err(Error::parse_at(
            path,
            element.line,
            format!("unknown relationship type '{other}'"),
        )),
    }
}

fn constraint(element: &XmlElement, path: &Path, builder: &FeatureModelBuilder) -> Result<Formula> {
    let kind = element_type(element, path)?;
    let from = reference(element, "from", path, builder)?;
    let to = reference(element, "to", path, builder)?;
    match kind {
        "RequiresConstraint" => Ok(Formula::implies(Formula::Var(from), Formula::Var(to))),
        "ExcludesConstraint" => Ok(Formula::excludes(from, to)),
        other => Err(Error::parse_at(
            path,
            element.line,
            format!("unknown constraint type '{other}'"),
        )),
    }
}
