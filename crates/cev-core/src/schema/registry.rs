use crate::error::CevError;
use crate::schema::{
    Anchor, DerivedField, FieldKind, FieldSchema, LinePick, PageSchema, Region,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

const CEV_V2_JSON: &str = include_str!("../../../../schemas/cev-v2.json");

static REGISTRY: LazyLock<SchemaRegistry> = LazyLock::new(|| {
    SchemaRegistry::from_json(CEV_V2_JSON).expect("embedded CEV v2 schema is valid")
});

/// The embedded CEV v2 schema, loaded and checked on first use.
pub fn registry() -> &'static SchemaRegistry {
    &REGISTRY
}

/// Schema of one page of the embedded CEV v2 layout.
pub fn schema_for(page: usize) -> Result<&'static PageSchema, CevError> {
    registry().schema_for(page)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    format: String,
    version: String,
    min_pages: usize,
    anchor: Anchor,
    pages: Vec<PageDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageDef {
    page: usize,
    title: String,
    #[serde(default)]
    fields: Vec<FieldDef>,
    #[serde(default)]
    derived: Vec<DerivedField>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDef {
    key: String,
    label: String,
    region: Region,
    #[serde(default)]
    kind: FieldKind,
    #[serde(default)]
    variants: Vec<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    pick: LinePick,
    repeat: Option<RepeatDef>,
}

/// A field repeated along a row or column of a table, one copy per label.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RepeatDef {
    #[serde(default)]
    dx: f32,
    #[serde(default)]
    dy: f32,
    labels: Vec<String>,
}

impl FieldDef {
    fn expand(self, out: &mut Vec<FieldSchema>) {
        let template = FieldSchema {
            key: self.key,
            label: self.label,
            region: self.region,
            kind: self.kind,
            variants: self.variants,
            required: self.required,
            pick: self.pick,
        };
        let Some(repeat) = self.repeat else {
            out.push(template);
            return;
        };
        for (i, row_label) in repeat.labels.iter().enumerate() {
            let step = i as f32;
            out.push(FieldSchema {
                key: format!("{}_{:02}", template.key, i + 1),
                label: format!("{} - {}", template.label, row_label),
                region: template.region.offset(repeat.dx * step, repeat.dy * step),
                ..template.clone()
            });
        }
    }
}

/// Every page schema of one report layout, indexed by page number.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    format: String,
    version: String,
    min_pages: usize,
    anchor: Anchor,
    pages: Vec<PageSchema>,
}

impl SchemaRegistry {
    /// Parse, expand and check a layout definition.
    pub fn from_json(json: &str) -> Result<Self, CevError> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| CevError::Configuration(format!("schema definition: {}", e)))?;

        let pages = file
            .pages
            .into_iter()
            .map(|def| {
                let mut fields = Vec::new();
                for field in def.fields {
                    field.expand(&mut fields);
                }
                PageSchema {
                    page: def.page,
                    title: def.title,
                    fields,
                    derived: def.derived,
                }
            })
            .collect();

        let registry = SchemaRegistry {
            format: file.format,
            version: file.version,
            min_pages: file.min_pages,
            anchor: file.anchor,
            pages,
        };
        registry.validate()?;
        Ok(registry)
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Fewest pages a document may have to be a report of this layout.
    pub fn min_pages(&self) -> usize {
        self.min_pages
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn pages(&self) -> &[PageSchema] {
        &self.pages
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = usize> + '_ {
        self.pages.iter().map(|p| p.page)
    }

    pub fn schema_for(&self, page: usize) -> Result<&PageSchema, CevError> {
        self.pages
            .iter()
            .find(|p| p.page == page)
            .ok_or(CevError::UnknownPage(page))
    }

    fn validate(&self) -> Result<(), CevError> {
        let expected: Vec<usize> = (1..=self.pages.len()).collect();
        let actual: Vec<usize> = self.page_numbers().collect();
        if actual != expected {
            return Err(CevError::Configuration(format!(
                "pages must be numbered 1..={} in order, got {:?}",
                self.pages.len(),
                actual
            )));
        }
        if self.min_pages < self.pages.len() {
            return Err(CevError::Configuration(format!(
                "min_pages {} is below the {} defined pages",
                self.min_pages,
                self.pages.len()
            )));
        }

        if self.schema_for(self.anchor.page).is_err() {
            return Err(CevError::Configuration(format!(
                "anchor refers to unknown page {}",
                self.anchor.page
            )));
        }
        check_region("anchor", &self.anchor.region)?;
        if self.anchor.titles.iter().all(|t| t.trim().is_empty()) {
            return Err(CevError::Configuration(
                "anchor needs at least one title".into(),
            ));
        }

        for page in &self.pages {
            validate_page(page)?;
        }
        Ok(())
    }
}

fn check_region(what: &str, region: &Region) -> Result<(), CevError> {
    if !region.is_well_formed() || !region.within_frame() {
        return Err(CevError::Configuration(format!(
            "{} has region {:?} outside the report frame",
            what, region
        )));
    }
    Ok(())
}

fn validate_page(page: &PageSchema) -> Result<(), CevError> {
    let mut keys = HashSet::new();
    let mut labels = HashSet::new();
    let names = page
        .fields
        .iter()
        .map(|f| (&f.key, &f.label))
        .chain(page.derived.iter().map(|d| (&d.key, &d.label)));
    for (key, label) in names {
        if key.is_empty() || label.is_empty() {
            return Err(CevError::Configuration(format!(
                "page {} has a field with an empty key or label",
                page.page
            )));
        }
        if !keys.insert(key.as_str()) {
            return Err(CevError::Configuration(format!(
                "page {} defines key '{}' twice",
                page.page, key
            )));
        }
        if !labels.insert(label.as_str()) {
            return Err(CevError::Configuration(format!(
                "page {} uses label '{}' twice",
                page.page, label
            )));
        }
    }

    for (i, field) in page.fields.iter().enumerate() {
        check_region(&format!("page {} field '{}'", page.page, field.key), &field.region)?;

        if field.kind == FieldKind::Enum && field.variants.is_empty() {
            return Err(CevError::Configuration(format!(
                "page {} enum field '{}' has no variants",
                page.page, field.key
            )));
        }

        if let Some(other) = page.fields[i + 1..]
            .iter()
            .find(|other| field.region.overlaps(&other.region))
        {
            return Err(CevError::Configuration(format!(
                "page {} fields '{}' and '{}' overlap",
                page.page, field.key, other.key
            )));
        }
    }

    for derived in &page.derived {
        match page.field(&derived.source) {
            Some(source) if source.kind == FieldKind::Numeric => {}
            _ => {
                return Err(CevError::Configuration(format!(
                    "page {} derived field '{}' needs a numeric source field '{}'",
                    page.page, derived.key, derived.source
                )))
            }
        }
    }

    Ok(())
}
