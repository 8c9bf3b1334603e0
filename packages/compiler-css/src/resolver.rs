use crate::properties::to_kebab_case;
use std::collections::BTreeMap;
use tessera_document::{BlockTypeDefinition, Breakpoint, Element, StyleState};

/// Resolves the effective value of a property on one element.
///
/// Lookup order for `(state, breakpoint)`:
/// 1. the exact slot
/// 2. the same state on desktop
/// 3. the normal state at the breakpoint
/// 4. normal on desktop
/// 5. the block type's default for the element kind
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleResolver<'a> {
    block_type: Option<&'a BlockTypeDefinition>,
}

impl<'a> StyleResolver<'a> {
    pub fn new() -> Self {
        Self { block_type: None }
    }

    pub fn with_block_type(block_type: &'a BlockTypeDefinition) -> Self {
        Self {
            block_type: Some(block_type),
        }
    }

    pub fn resolve<'s>(
        &'s self,
        element: &'s Element,
        property: &str,
        state: StyleState,
        breakpoint: Breakpoint,
    ) -> Option<&'s str>
    where
        'a: 's,
    {
        let property = to_kebab_case(property);
        fallback_chain(state, breakpoint)
            .into_iter()
            .find_map(|(s, bp)| element.styles.get(s, bp, &property))
            .or_else(|| {
                self.block_type
                    .and_then(|def| def.style_default(element.kind, &property))
            })
    }

    /// Every property with a resolved value for the slot
    pub fn computed(&self, element: &Element, state: StyleState, breakpoint: Breakpoint) -> BTreeMap<String, String> {
        let mut computed = BTreeMap::new();

        if let Some(defaults) = self.block_type.and_then(|def| def.style_defaults.get(&element.kind)) {
            computed.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        // Least specific first so later slots overwrite
        for (s, bp) in fallback_chain(state, breakpoint).into_iter().rev() {
            if let Some(decls) = element.styles.declarations(s, bp) {
                computed.extend(decls.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        computed
    }
}

fn fallback_chain(state: StyleState, breakpoint: Breakpoint) -> [(StyleState, Breakpoint); 4] {
    [
        (state, breakpoint),
        (state, Breakpoint::Desktop),
        (StyleState::Normal, breakpoint),
        (StyleState::Normal, Breakpoint::Desktop),
    ]
}

/// Resolve without block type defaults
pub fn resolve<'e>(element: &'e Element, property: &str, state: StyleState, breakpoint: Breakpoint) -> Option<&'e str> {
    let property = to_kebab_case(property);
    fallback_chain(state, breakpoint)
        .into_iter()
        .find_map(|(s, bp)| element.styles.get(s, bp, &property))
}
