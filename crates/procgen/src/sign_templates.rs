//! Named neon sign presets.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Small,
    Medium,
    Large,
    Vertical,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Small,
        TemplateKind::Medium,
        TemplateKind::Large,
        TemplateKind::Vertical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Small => "small",
            TemplateKind::Medium => "medium",
            TemplateKind::Large => "large",
            TemplateKind::Vertical => "vertical",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sign template `{0}` (expected small, medium, large or vertical)")]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateKind {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Panel size (world units) and nominal glow strength of a sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignTemplate {
    pub width: f32,
    pub height: f32,
    pub glow_intensity: f32,
}

impl SignTemplate {
    pub const fn new(width: f32, height: f32, glow_intensity: f32) -> Self {
        Self {
            width,
            height,
            glow_intensity,
        }
    }
}

/// The fixed preset table, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SignTemplateCatalog {
    templates: BTreeMap<TemplateKind, SignTemplate>,
}

impl Default for SignTemplateCatalog {
    fn default() -> Self {
        let templates = BTreeMap::from([
            (TemplateKind::Small, SignTemplate::new(3.0, 1.0, 1.1)),
            (TemplateKind::Medium, SignTemplate::new(5.0, 1.5, 1.2)),
            (TemplateKind::Large, SignTemplate::new(8.0, 2.0, 1.3)),
            (TemplateKind::Vertical, SignTemplate::new(1.5, 6.0, 1.2)),
        ]);
        Self { templates }
    }
}

impl SignTemplateCatalog {
    pub fn get(&self, kind: TemplateKind) -> SignTemplate {
        // Every kind is inserted by `default`, the map is never mutated afterwards.
        self.templates[&kind]
    }

    /// Preset kinds in stable order, for uniform random picks.
    pub fn kinds(&self) -> impl Iterator<Item = TemplateKind> + '_ {
        self.templates.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
