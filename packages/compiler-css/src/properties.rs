//! Catalog of CSS properties the editor controls know about.
//!
//! Each definition says whether the property may carry a hover value and
//! whether it may differ per breakpoint. The catalog order is also the
//! emission order of declarations in generated CSS.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tessera_document::{Breakpoint, StyleState};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Property `{property}` does not support the {state} state")]
    StateNotSupported { property: String, state: StyleState },

    #[error("Property `{property}` is not responsive and cannot be set for {breakpoint}")]
    NotResponsive { property: String, breakpoint: Breakpoint },

    #[error("Unknown property `{property}` can only be set for the normal state on desktop")]
    UnknownProperty { property: String },

    #[error("Invalid property name `{0}`")]
    InvalidName(String),

    #[error("Invalid value for `{property}`: {value}")]
    InvalidValue { property: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyGroup {
    BoxModel,
    Typography,
    Color,
    Background,
    Border,
    Size,
    Layout,
    Position,
    Effects,
    Transform,
    Transition,
    Image,
    Misc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: &'static str,
    pub group: PropertyGroup,
    pub hover: bool,
    pub responsive: bool,
}

const fn def(name: &'static str, group: PropertyGroup, hover: bool, responsive: bool) -> PropertyDefinition {
    PropertyDefinition {
        name,
        group,
        hover,
        responsive,
    }
}

use PropertyGroup::*;

const DEFINITIONS: &[PropertyDefinition] = &[
    def("display", Layout, false, true),
    def("position", Position, false, true),
    def("top", Position, false, true),
    def("right", Position, false, true),
    def("bottom", Position, false, true),
    def("left", Position, false, true),
    def("z-index", Position, false, true),
    def("margin", BoxModel, false, true),
    def("margin-top", BoxModel, false, true),
    def("margin-right", BoxModel, false, true),
    def("margin-bottom", BoxModel, false, true),
    def("margin-left", BoxModel, false, true),
    def("padding", BoxModel, false, true),
    def("padding-top", BoxModel, false, true),
    def("padding-right", BoxModel, false, true),
    def("padding-bottom", BoxModel, false, true),
    def("padding-left", BoxModel, false, true),
    def("width", Size, false, true),
    def("min-width", Size, false, true),
    def("max-width", Size, false, true),
    def("height", Size, false, true),
    def("min-height", Size, false, true),
    def("max-height", Size, false, true),
    def("flex", Layout, false, true),
    def("flex-direction", Layout, false, true),
    def("flex-wrap", Layout, false, true),
    def("flex-grow", Layout, false, true),
    def("flex-shrink", Layout, false, true),
    def("flex-basis", Layout, false, true),
    def("order", Layout, false, true),
    def("justify-content", Layout, false, true),
    def("align-items", Layout, false, true),
    def("align-content", Layout, false, true),
    def("align-self", Layout, false, true),
    def("gap", Layout, false, true),
    def("row-gap", Layout, false, true),
    def("column-gap", Layout, false, true),
    def("grid-template-columns", Layout, false, true),
    def("grid-template-rows", Layout, false, true),
    def("grid-auto-flow", Layout, false, true),
    def("grid-column", Layout, false, true),
    def("grid-row", Layout, false, true),
    def("font-family", Typography, true, true),
    def("font-size", Typography, true, true),
    def("font-weight", Typography, true, true),
    def("font-style", Typography, true, true),
    def("line-height", Typography, true, true),
    def("letter-spacing", Typography, true, true),
    def("text-align", Typography, true, true),
    def("text-transform", Typography, true, true),
    def("text-decoration", Typography, true, true),
    def("white-space", Typography, false, true),
    def("color", Color, true, false),
    def("background", Background, true, false),
    def("background-color", Color, true, false),
    def("background-image", Background, true, false),
    def("background-size", Background, true, false),
    def("background-position", Background, true, false),
    def("background-repeat", Background, true, false),
    def("border", Border, true, false),
    def("border-top", Border, true, false),
    def("border-right", Border, true, false),
    def("border-bottom", Border, true, false),
    def("border-left", Border, true, false),
    def("border-width", Border, true, false),
    def("border-style", Border, true, false),
    def("border-color", Color, true, false),
    def("border-radius", Border, true, true),
    def("box-shadow", Effects, true, false),
    def("text-shadow", Effects, true, false),
    def("opacity", Effects, true, false),
    def("filter", Effects, true, false),
    def("transform", Transform, true, false),
    def("transform-origin", Transform, true, false),
    def("transition", Transition, false, false),
    def("object-fit", Image, false, true),
    def("object-position", Image, false, true),
    def("overflow", Misc, false, true),
    def("cursor", Misc, false, false),
];

#[derive(Debug)]
pub struct PropertyCatalog {
    definitions: Vec<PropertyDefinition>,
    index: HashMap<&'static str, usize>,
}

static STANDARD: OnceLock<PropertyCatalog> = OnceLock::new();

impl PropertyCatalog {
    pub fn new(definitions: Vec<PropertyDefinition>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, i))
            .collect();
        Self { definitions, index }
    }

    /// The built-in catalog shared by the editor and the compiler
    pub fn standard() -> &'static PropertyCatalog {
        STANDARD.get_or_init(|| PropertyCatalog::new(DEFINITIONS.to_vec()))
    }

    pub fn get(&self, property: &str) -> Option<&PropertyDefinition> {
        self.index.get(property).map(|&i| &self.definitions[i])
    }

    pub fn position(&self, property: &str) -> Option<usize> {
        self.index.get(property).copied()
    }

    pub fn definitions(&self) -> &[PropertyDefinition] {
        &self.definitions
    }

    /// Whether `property` may be set for `(state, breakpoint)`
    pub fn check(&self, property: &str, state: StyleState, breakpoint: Breakpoint) -> Result<(), StyleError> {
        let Some(definition) = self.get(property) else {
            if state == StyleState::Normal && breakpoint == Breakpoint::Desktop {
                return Ok(());
            }
            return Err(StyleError::UnknownProperty {
                property: property.to_string(),
            });
        };

        if state == StyleState::Hover && !definition.hover {
            return Err(StyleError::StateNotSupported {
                property: property.to_string(),
                state,
            });
        }
        if breakpoint != Breakpoint::Desktop && !definition.responsive {
            return Err(StyleError::NotResponsive {
                property: property.to_string(),
                breakpoint,
            });
        }
        Ok(())
    }

    /// Declarations in catalog order, unknown properties last in name order
    pub fn sorted<'a>(&self, declarations: &'a BTreeMap<String, String>) -> Vec<(&'a str, &'a str)> {
        let mut sorted: Vec<(&str, &str)> = declarations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        // BTreeMap iteration is already name-ordered; the sort is stable
        sorted.sort_by_key(|(name, _)| self.position(name).unwrap_or(usize::MAX));
        sorted
    }
}

/// `fontSize` -> `font-size`; already-kebab names pass through lowercased
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.trim().chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Normalize a property name and reject anything that is not a plain identifier
pub fn normalize_property(name: &str) -> Result<String, StyleError> {
    let property = to_kebab_case(name);
    let body = property.trim_start_matches('-');
    let valid = !body.is_empty()
        && property.len() - body.len() <= 2
        && body.starts_with(|c: char| c.is_ascii_lowercase())
        && body.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(property)
    } else {
        Err(StyleError::InvalidName(name.to_string()))
    }
}

/// Values may not break out of a declaration or a `<style>` element
pub fn validate_value(property: &str, value: &str) -> Result<(), StyleError> {
    if value.trim().is_empty() || value.contains(|c| matches!(c, '{' | '}' | ';' | '<' | '>')) {
        return Err(StyleError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
