use bytes::Bytes;
use serde::Serialize;

use crate::layout::font_metrics::FontStyle;
use crate::layout::geometry::PageGeometry;

/// Which part of the resume a placed line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    Name,
    Contact,
    Summary,
    Education,
    Experience,
    Internships,
    Projects,
    Skills,
    Languages,
    Certificates,
    Achievements,
}

impl Section {
    /// Heading text printed above the section, if it has one.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Section::Name | Section::Contact => None,
            Section::Summary => Some("PROFESSIONAL SUMMARY"),
            Section::Education => Some("EDUCATION"),
            Section::Experience => Some("WORK EXPERIENCE"),
            Section::Internships => Some("INTERNSHIPS"),
            Section::Projects => Some("PROJECTS"),
            Section::Skills => Some("SKILLS"),
            Section::Languages => Some("LANGUAGES"),
            Section::Certificates => Some("CERTIFICATES"),
            Section::Achievements => Some("ACHIEVEMENTS & AWARDS"),
        }
    }
}

/// Layout strategy that produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrategyKind {
    /// Text placed directly with the standard fonts.
    Direct,
    /// A captured image of the resume sliced into pages.
    Snapshot,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Direct => "direct",
            StrategyKind::Snapshot => "snapshot",
        }
    }
}

/// One wrapped line of text. `baseline_mm` is measured from the page top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub section: Section,
    pub x_mm: f32,
    pub baseline_mm: f32,
    pub font_size_pt: f32,
    pub style: FontStyle,
    pub text: String,
}

/// Horizontal rule across the content width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub x1_mm: f32,
    pub x2_mm: f32,
    pub y_mm: f32,
}

/// JPEG-encoded slice of a snapshot, placed with its top-left corner at
/// (`x_mm`, `y_mm`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSlice {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    pub width_px: u32,
    pub height_px: u32,
    #[serde(skip)]
    pub jpeg: Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageItem {
    Text(TextLine),
    Rule(Rule),
    Image(ImageSlice),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(line) => Some(line),
            _ => None,
        })
    }
}

/// Output of either layout strategy, consumed by the PDF encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutDocument {
    pub strategy: StrategyKind,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|page| page.text_lines())
    }

    /// Every line placed for `section`, in page order.
    pub fn lines_in(&self, section: Section) -> Vec<&TextLine> {
        self.text_lines().filter(|line| line.section == section).collect()
    }
}
