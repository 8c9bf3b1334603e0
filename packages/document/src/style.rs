//! Per-(state, breakpoint) style tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Interaction state a declaration applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleState {
    Normal,
    Hover,
}

impl StyleState {
    pub const ALL: [StyleState; 2] = [StyleState::Normal, StyleState::Hover];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleState::Normal => "normal",
            StyleState::Hover => "hover",
        }
    }

    /// Pseudo-class appended to generated selectors
    pub fn pseudo_class(self) -> &'static str {
        match self {
            StyleState::Normal => "",
            StyleState::Hover => ":hover",
        }
    }
}

impl fmt::Display for StyleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(StyleState::Normal),
            "hover" => Ok(StyleState::Hover),
            other => Err(format!("Invalid state: {}. Use: normal or hover", other)),
        }
    }
}

/// Responsive breakpoint. Desktop is the unconditional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }

    /// Upper bound of the breakpoint in CSS pixels, `None` for desktop
    pub fn max_width(self) -> Option<u32> {
        match self {
            Breakpoint::Desktop => None,
            Breakpoint::Tablet => Some(1023),
            Breakpoint::Mobile => Some(767),
        }
    }

    pub fn media_query(self) -> Option<String> {
        self.max_width()
            .map(|width| format!("@media (max-width: {}px)", width))
    }

    /// Width of the preview frame used to show this breakpoint
    pub fn preview_width(self) -> u32 {
        match self {
            Breakpoint::Desktop => 1280,
            Breakpoint::Tablet => 768,
            Breakpoint::Mobile => 375,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Breakpoint::Desktop),
            "tablet" => Ok(Breakpoint::Tablet),
            "mobile" => Ok(Breakpoint::Mobile),
            other => Err(format!(
                "Invalid viewport: {}. Use: mobile, tablet, or desktop",
                other
            )),
        }
    }
}

pub type Declarations = BTreeMap<String, String>;

/// Property tables keyed by `(state, breakpoint)`.
///
/// Serializes as `{ "normal": { "desktop": { "color": "red" } } }`. Whether a
/// property may appear outside `(normal, desktop)` is decided by the
/// property catalog in `tessera-compiler-css`, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<StyleState, BTreeMap<Breakpoint, Declarations>>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inline `style` attribute into `(normal, desktop)` declarations
    pub fn from_inline(css: &str) -> Self {
        let mut map = Self::new();
        for declaration in split_declarations(css) {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim().to_ascii_lowercase();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    map.set(StyleState::Normal, Breakpoint::Desktop, property, value);
                }
            }
        }
        map
    }

    pub fn get(&self, state: StyleState, breakpoint: Breakpoint, property: &str) -> Option<&str> {
        self.0
            .get(&state)
            .and_then(|bps| bps.get(&breakpoint))
            .and_then(|decls| decls.get(property))
            .map(String::as_str)
    }

    pub fn set(
        &mut self,
        state: StyleState,
        breakpoint: Breakpoint,
        property: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0
            .entry(state)
            .or_default()
            .entry(breakpoint)
            .or_default()
            .insert(property.into(), value.into());
    }

    /// Remove a declaration, pruning empty tables so equality stays structural
    pub fn remove(&mut self, state: StyleState, breakpoint: Breakpoint, property: &str) -> Option<String> {
        let bps = self.0.get_mut(&state)?;
        let decls = bps.get_mut(&breakpoint)?;
        let removed = decls.remove(property);
        if decls.is_empty() {
            bps.remove(&breakpoint);
        }
        if bps.is_empty() {
            self.0.remove(&state);
        }
        removed
    }

    pub fn declarations(&self, state: StyleState, breakpoint: Breakpoint) -> Option<&Declarations> {
        self.0
            .get(&state)
            .and_then(|bps| bps.get(&breakpoint))
            .filter(|decls| !decls.is_empty())
    }

    /// Every non-empty `(state, breakpoint)` slot, normal before hover
    pub fn slots(&self) -> impl Iterator<Item = (StyleState, Breakpoint, &Declarations)> {
        self.0.iter().flat_map(|(state, bps)| {
            bps.iter()
                .filter(|(_, decls)| !decls.is_empty())
                .map(move |(bp, decls)| (*state, *bp, decls))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.slots().next().is_none()
    }
}

/// Split on `;` that sit outside quotes and parentheses
fn split_declarations(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}
