pub mod registry;

pub use registry::{registry, schema_for, SchemaRegistry};

use crate::extraction::BBox;
use serde::{Deserialize, Serialize};

/// Width of the reference frame every region is declared in (mm).
pub const REPORT_WIDTH_MM: f32 = 215.9;
/// Height of the reference frame every region is declared in (mm).
pub const REPORT_HEIGHT_MM: f32 = 330.0;

/// Rectangle in millimetres on the 215.9 x 330.0 report frame, origin at
/// the top-left corner. Serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Region {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl From<[f32; 4]> for Region {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Region { x0, y0, x1, y1 }
    }
}

impl From<Region> for [f32; 4] {
    fn from(r: Region) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}

impl Region {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Region { x0, y0, x1, y1 }
    }

    pub fn is_well_formed(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }

    pub fn within_frame(&self) -> bool {
        self.x0 >= 0.0 && self.y0 >= 0.0 && self.x1 <= REPORT_WIDTH_MM && self.y1 <= REPORT_HEIGHT_MM
    }

    /// Strict overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Region {
        Region::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Scale onto a page of `width` x `height` points and clip to it.
    /// Returns `None` when nothing of the region is left on the page.
    pub fn to_page_bbox(&self, width: f32, height: f32) -> Option<BBox> {
        if !self.is_well_formed() {
            return None;
        }
        let sx = width / REPORT_WIDTH_MM;
        let sy = height / REPORT_HEIGHT_MM;
        let bbox = BBox {
            x_min: (self.x0 * sx).clamp(0.0, width),
            y_min: (self.y0 * sy).clamp(0.0, height),
            x_max: (self.x1 * sx).clamp(0.0, width),
            y_max: (self.y1 * sy).clamp(0.0, height),
        };
        (bbox.x_min < bbox.x_max && bbox.y_min < bbox.y_max).then_some(bbox)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Numeric,
    Date,
    Enum,
}

/// Which of the lines read from a region make up the raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePick {
    /// All lines joined with single spaces.
    #[default]
    Joined,
    FirstLine,
    LastLine,
    /// First line that is an integer, optionally negative.
    FirstInteger,
}

impl LinePick {
    pub fn apply(&self, lines: &[String]) -> String {
        let picked = match self {
            LinePick::Joined => return lines.join(" ").trim().to_string(),
            LinePick::FirstLine => lines.first(),
            LinePick::LastLine => lines.last(),
            LinePick::FirstInteger => lines.iter().find(|l| is_integer(l)),
        };
        picked.map(|l| l.trim().to_string()).unwrap_or_default()
    }
}

fn is_integer(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// One expanded field of a page schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub key: String,
    pub label: String,
    pub region: Region,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
    pub required: bool,
    pub pick: LinePick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// Letter grade from a savings percentage.
    EnergyGrade,
}

/// A field computed from another field of the same page instead of read
/// from a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedField {
    pub key: String,
    pub label: String,
    pub derivation: Derivation,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSchema {
    pub page: usize,
    pub title: String,
    pub fields: Vec<FieldSchema>,
    pub derived: Vec<DerivedField>,
}

impl PageSchema {
    /// Pages without fields (the chart pages) produce empty records.
    pub fn is_stub(&self) -> bool {
        self.fields.is_empty() && self.derived.is_empty()
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.field(key)
            .map(|f| f.label.as_str())
            .or_else(|| {
                self.derived
                    .iter()
                    .find(|d| d.key == key)
                    .map(|d| d.label.as_str())
            })
    }

    /// Keys in output order: region fields, then derived fields.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|f| f.key.as_str())
            .chain(self.derived.iter().map(|d| d.key.as_str()))
    }
}

/// The fixed title area used to recognise a CEV v2 report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub page: usize,
    pub region: Region,
    pub titles: Vec<String>,
}
