//! # Palette Projection
//!
//! Groups the registry's forms into display categories for the host's
//! creation menu. Each entry carries its default field values and a shadow
//! literal for every Number or String value slot, plus the per-form shadows
//! configured in `PaletteOptions::slot_shadows`.
//!
//! Categories follow the configured order. A category nobody uses is left
//! out unless it is dynamic (the host fills it itself, as with user
//! variables). Categories named by forms but not configured come last.

mod xml;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PaletteOptions, ShadowSpec};
use crate::model::{Arg, Capability, Value};
use crate::registry::{Form, Registry};

/// Icon shown for categories without a descriptor.
const FALLBACK_ICON: &str = "📋";

/// Display colour: a hue in degrees or a hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colour {
    Hue(f64),
    Hex(String),
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Hue(h) => write!(f, "{h}"),
            Colour::Hex(s) => f.write_str(s),
        }
    }
}

/// One configured category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub name: String,
    pub colour: Colour,
    #[serde(default)]
    pub icon: String,
    /// Host-provided contents (`VARIABLE`); such a category is always shown
    /// and never lists entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl CategoryDescriptor {
    pub fn new(name: &str, colour: Colour, icon: &str) -> Self {
        Self { name: name.into(), colour, icon: icon.into(), custom: None }
    }

    pub fn dynamic(mut self, custom: &str) -> Self {
        self.custom = Some(custom.into());
        self
    }

    /// The built-in category list, in display order.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("Basic", Colour::Hue(220.0), "⚡"),
            Self::new("Input", Colour::Hue(290.0), "🎮"),
            Self::new("Music", Colour::Hex("#D32F2F".into()), "🎵"),
            Self::new("Led", Colour::Hue(300.0), "💡"),
            Self::new("Logic", Colour::Hue(180.72), "🔀"),
            Self::new("Variables", Colour::Hex("#A64D79".into()), "📦").dynamic("VARIABLE"),
            Self::new("Math", Colour::Hex("#F06292".into()), "🔢"),
            Self::new("Uncategorized", Colour::Hex("#999999".into()), "📋"),
        ]
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Palette document handed to the rendering host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub categories: Vec<CatalogCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogCategory {
    pub name: String,
    pub icon: String,
    pub colour: Colour,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    pub entries: Vec<PaletteEntry>,
}

impl CatalogCategory {
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

/// One form as it appears in the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteEntry {
    pub type_name: String,
    /// Default field values, template order.
    pub fields: IndexMap<String, Value>,
    /// Shadow literal per value slot.
    pub shadows: IndexMap<String, ShadowSpec>,
}

impl Catalog {
    pub fn category(&self, name: &str) -> Option<&CatalogCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the palette for `registry`.
pub fn project(registry: &Registry, options: &PaletteOptions) -> Catalog {
    let mut groups: IndexMap<&str, Vec<&Form>> = IndexMap::new();
    for form in registry.forms() {
        let category = form.category().unwrap_or(options.default_category.as_str());
        groups.entry(category).or_default().push(form);
    }

    let mut categories: Vec<CatalogCategory> = Vec::new();
    let emitted = |categories: &Vec<CatalogCategory>, name: &str| {
        categories.iter().any(|c| c.name == name)
    };

    for descriptor in &options.categories {
        if emitted(&categories, &descriptor.name) {
            continue;
        }
        let members = groups.get(descriptor.name.as_str());
        let entries = match (&descriptor.custom, members) {
            (Some(_), _) => Vec::new(),
            (None, Some(forms)) if !forms.is_empty() => {
                forms.iter().map(|f| entry(f, options)).collect()
            }
            (None, _) => {
                debug!(category = %descriptor.name, "omitting empty category");
                continue;
            }
        };
        categories.push(CatalogCategory {
            name: descriptor.name.clone(),
            icon: descriptor.icon.clone(),
            colour: descriptor.colour.clone(),
            custom: descriptor.custom.clone(),
            entries,
        });
    }

    for (name, forms) in &groups {
        if emitted(&categories, *name) {
            continue;
        }
        categories.push(CatalogCategory {
            name: name.to_string(),
            icon: FALLBACK_ICON.to_string(),
            colour: options.default_colour.clone(),
            custom: None,
            entries: forms.iter().map(|f| entry(f, options)).collect(),
        });
    }

    Catalog { categories }
}

/// Input, number, dropdown and multiline fields carry a default; matrix,
/// icon and slider editors start from their own.
fn entry(form: &Form, options: &PaletteOptions) -> PaletteEntry {
    let template = form.template();
    let fields = template
        .args
        .iter()
        .filter(|arg| {
            matches!(
                arg,
                Arg::Text { .. } | Arg::Number { .. } | Arg::Dropdown { .. } | Arg::MultilineText { .. }
            )
        })
        .filter_map(|arg| Some((arg.name()?.to_string(), arg.default_value()?)))
        .collect();
    let overrides = options.slot_shadows.get(form.type_name());
    let shadows = template
        .value_slots()
        .filter_map(|(slot, check)| {
            if let Some(shadow) = overrides.and_then(|o| o.get(slot)) {
                return Some((slot.to_string(), shadow.clone()));
            }
            let shadow = match check? {
                Capability::Number => &options.number_shadow,
                Capability::String => &options.text_shadow,
                Capability::Boolean => return None,
            };
            Some((slot.to_string(), shadow.clone()))
        })
        .collect();
    PaletteEntry { type_name: form.type_name().to_string(), fields, shadows }
}
