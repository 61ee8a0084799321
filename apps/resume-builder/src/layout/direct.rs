//! Direct text layout: places the resume as wrapped Helvetica lines on A4 pages.
//!
//! Layout runs in two passes. `compose` turns the record into measured
//! blocks (each block already wrapped to the content width), then `Flow`
//! places blocks top to bottom and starts a new page whenever a whole block
//! does not fit below the cursor. A section heading is kept with its first
//! entry; a block taller than a page is split between lines.

use tracing::debug;

use crate::errors::AppError;
use crate::layout::document::{
    LaidOutDocument, Page, PageItem, Rule, Section, StrategyKind, TextLine,
};
use crate::layout::font_metrics::{encode_win_ansi, get_metrics, FontStyle};
use crate::layout::geometry::PageGeometry;
use crate::layout::wrap::wrap_text;
use crate::models::{Entry, ResumeRecord};

const NAME_PT: f32 = 20.0;
const CONTACT_PT: f32 = 10.0;
const HEADING_PT: f32 = 14.0;
const ENTRY_TITLE_PT: f32 = 12.0;
const SUBTITLE_PT: f32 = 11.0;
const BODY_PT: f32 = 11.0;
const DETAIL_PT: f32 = 10.0;

const AFTER_HEADING_MM: f32 = 5.0;
const AFTER_ENTRY_MM: f32 = 5.0;
const AFTER_LIST_SECTION_MM: f32 = 5.0;
const AFTER_PARAGRAPH_MM: f32 = 10.0;
const AFTER_LANGUAGE_MM: f32 = 3.0;

/// Slack for float drift between a block's summed height and the cursor.
const FIT_TOLERANCE_MM: f32 = 0.01;

/// Formats a start/end pair the way every dated entry shows it.
///
/// `"2020-01" / ""` gives `"2020-01 - Present"`; both blank gives `""`.
pub fn format_date_range(start: &str, end: &str) -> String {
    let (start, end) = (start.trim(), end.trim());
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => end.to_string(),
        (false, true) => format!("{start} - Present"),
        (false, false) => format!("{start} - {end}"),
    }
}

/// Lays out `record` on pages of `geometry`.
///
/// Fails with `LayoutFailure` when nothing would be printed or when some
/// text cannot be drawn with the standard fonts.
pub fn layout_direct(
    record: &ResumeRecord,
    geometry: &PageGeometry,
) -> Result<LaidOutDocument, AppError> {
    let sections = compose(record, geometry);
    if sections.is_empty() {
        return Err(AppError::LayoutFailure(
            "resume has no content to lay out".into(),
        ));
    }
    check_encodable(&sections)?;

    let mut flow = Flow::new(*geometry);
    for section in &sections {
        flow.place_section(section);
    }

    debug!(
        pages = flow.pages.len(),
        sections = sections.len(),
        "Direct layout complete"
    );

    Ok(LaidOutDocument {
        strategy: StrategyKind::Direct,
        geometry: *geometry,
        pages: flow.pages,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Row {
    Line {
        text: String,
        size: f32,
        style: FontStyle,
        advance: f32,
    },
    Gap(f32),
    Rule,
}

/// A run of rows that should stay on one page when possible.
#[derive(Debug, Clone)]
struct Block {
    section: Section,
    width_mm: f32,
    geometry: PageGeometry,
    rows: Vec<Row>,
}

impl Block {
    fn new(section: Section, geometry: &PageGeometry) -> Self {
        Self {
            section,
            width_mm: geometry.content_width_mm(),
            geometry: *geometry,
            rows: Vec::new(),
        }
    }

    /// Wrapped text; blank text adds nothing.
    fn text(mut self, text: &str, size: f32, style: FontStyle) -> Self {
        let advance = self.geometry.line_advance_mm(size);
        for line in wrap_text(text, get_metrics(style), size, self.width_mm) {
            self.rows.push(Row::Line {
                text: line,
                size,
                style,
                advance,
            });
        }
        self
    }

    fn gap(mut self, mm: f32) -> Self {
        self.rows.push(Row::Gap(mm));
        self
    }

    fn rule(mut self) -> Self {
        self.rows.push(Row::Rule);
        self
    }

    fn row_height(row: &Row) -> f32 {
        match row {
            Row::Line { advance, .. } => *advance,
            Row::Gap(mm) => *mm,
            Row::Rule => 0.0,
        }
    }

    /// Height including trailing gaps.
    fn height(&self) -> f32 {
        self.rows.iter().map(Self::row_height).sum()
    }

    /// Height up to the last printed row. Trailing gaps may spill past the
    /// bottom margin without forcing a break.
    fn content_height(&self) -> f32 {
        let last = self
            .rows
            .iter()
            .rposition(|row| !matches!(row, Row::Gap(_)));
        match last {
            Some(i) => self.rows[..=i].iter().map(Self::row_height).sum(),
            None => 0.0,
        }
    }

    fn has_lines(&self) -> bool {
        self.rows.iter().any(|row| matches!(row, Row::Line { .. }))
    }
}

/// A heading (optional), its entries and the space left after them.
#[derive(Debug, Clone)]
struct SectionBlocks {
    heading: Option<Block>,
    entries: Vec<Block>,
    trailing_gap_mm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

fn compose(record: &ResumeRecord, g: &PageGeometry) -> Vec<SectionBlocks> {
    let mut out = Vec::new();
    let info = &record.personal_info;

    let full_name = format!("{} {}", info.first_name.trim(), info.last_name.trim());
    push_plain(
        &mut out,
        Block::new(Section::Name, g)
            .text(full_name.trim(), NAME_PT, FontStyle::Bold)
            .gap(AFTER_HEADING_MM),
    );

    let contact: Vec<String> = [
        ("Email", &info.email),
        ("Phone", &info.phone),
        ("Address", &info.address),
        ("LinkedIn", &info.linkedin),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| format!("{label}: {}", value.trim()))
    .collect();
    if !contact.is_empty() {
        push_plain(
            &mut out,
            Block::new(Section::Contact, g)
                .text(&contact.join(" | "), CONTACT_PT, FontStyle::Normal)
                .gap(AFTER_PARAGRAPH_MM)
                .rule()
                .gap(AFTER_PARAGRAPH_MM),
        );
    }

    let summary = Block::new(Section::Summary, g)
        .text(&info.summary, BODY_PT, FontStyle::Normal)
        .gap(AFTER_PARAGRAPH_MM);
    push_section(&mut out, Section::Summary, g, vec![summary], 0.0);

    let education = printable(&record.education)
        .map(|edu| {
            let degree = if edu.field.trim().is_empty() {
                edu.degree.trim().to_string()
            } else {
                format!("{} in {}", edu.degree.trim(), edu.field.trim())
                    .trim()
                    .to_string()
            };
            dated_entry(
                Block::new(Section::Education, g),
                &edu.institution,
                &degree,
                &format_date_range(&edu.start_date, &edu.end_date),
                &edu.description,
            )
        })
        .collect();
    push_section(&mut out, Section::Education, g, education, AFTER_LIST_SECTION_MM);

    for (section, jobs) in [
        (Section::Experience, &record.experience),
        (Section::Internships, &record.internships),
    ] {
        let entries = printable(jobs)
            .map(|job| {
                dated_entry(
                    Block::new(section, g),
                    &job.company,
                    &job.position,
                    &format_date_range(&job.start_date, &job.end_date),
                    &job.description,
                )
            })
            .collect();
        push_section(&mut out, section, g, entries, AFTER_LIST_SECTION_MM);
    }

    let projects = printable(&record.projects)
        .map(|project| {
            let technologies = if project.technologies.trim().is_empty() {
                String::new()
            } else {
                format!("Technologies: {}", project.technologies.trim())
            };
            dated_entry(
                Block::new(Section::Projects, g),
                &project.title,
                &technologies,
                &format_date_range(&project.start_date, &project.end_date),
                &project.description,
            )
        })
        .collect();
    push_section(&mut out, Section::Projects, g, projects, AFTER_LIST_SECTION_MM);

    let skills: Vec<&str> = record
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let skills_block = Block::new(Section::Skills, g)
        .text(&skills.join(", "), BODY_PT, FontStyle::Normal)
        .gap(AFTER_PARAGRAPH_MM);
    push_section(&mut out, Section::Skills, g, vec![skills_block], 0.0);

    let languages = printable(&record.languages)
        .map(|lang| {
            let text = if lang.proficiency.trim().is_empty() {
                lang.language.trim().to_string()
            } else {
                format!("{} - {}", lang.language.trim(), lang.proficiency.trim())
            };
            Block::new(Section::Languages, g)
                .text(&text, BODY_PT, FontStyle::Normal)
                .gap(AFTER_LANGUAGE_MM)
        })
        .collect();
    push_section(&mut out, Section::Languages, g, languages, AFTER_LIST_SECTION_MM);

    let certificates = printable(&record.certificates)
        .map(|cert| {
            let issuer = if cert.issuer.trim().is_empty() {
                String::new()
            } else {
                format!("Issued by: {}", cert.issuer.trim())
            };
            dated_entry(
                Block::new(Section::Certificates, g),
                &cert.name,
                &issuer,
                &cert.date,
                "",
            )
        })
        .collect();
    push_section(&mut out, Section::Certificates, g, certificates, AFTER_LIST_SECTION_MM);

    let achievements = printable(&record.achievements)
        .map(|award| {
            dated_entry(
                Block::new(Section::Achievements, g),
                &award.title,
                "",
                &award.date,
                &award.description,
            )
        })
        .collect();
    push_section(&mut out, Section::Achievements, g, achievements, AFTER_LIST_SECTION_MM);

    out
}

/// Entries whose primary field is filled in, in collection order.
fn printable<E: Entry>(entries: &[E]) -> impl Iterator<Item = &E> {
    entries
        .iter()
        .filter(|entry| !entry.primary_field().trim().is_empty())
}

/// Title, optional italic subtitle, optional date line, optional description.
fn dated_entry(block: Block, title: &str, subtitle: &str, date: &str, description: &str) -> Block {
    block
        .text(title, ENTRY_TITLE_PT, FontStyle::Bold)
        .text(subtitle, SUBTITLE_PT, FontStyle::Italic)
        .text(date, DETAIL_PT, FontStyle::Normal)
        .text(description, DETAIL_PT, FontStyle::Normal)
        .gap(AFTER_ENTRY_MM)
}

fn push_plain(out: &mut Vec<SectionBlocks>, block: Block) {
    if block.has_lines() {
        out.push(SectionBlocks {
            heading: None,
            entries: vec![block],
            trailing_gap_mm: 0.0,
        });
    }
}

fn push_section(
    out: &mut Vec<SectionBlocks>,
    section: Section,
    g: &PageGeometry,
    entries: Vec<Block>,
    trailing_gap_mm: f32,
) {
    let entries: Vec<Block> = entries.into_iter().filter(Block::has_lines).collect();
    if entries.is_empty() {
        return;
    }
    let heading = section.heading().map(|title| {
        Block::new(section, g)
            .text(title, HEADING_PT, FontStyle::Bold)
            .gap(AFTER_HEADING_MM)
    });
    out.push(SectionBlocks {
        heading,
        entries,
        trailing_gap_mm,
    });
}

fn check_encodable(sections: &[SectionBlocks]) -> Result<(), AppError> {
    let blocks = sections
        .iter()
        .flat_map(|s| s.heading.iter().chain(s.entries.iter()));
    for block in blocks {
        for row in &block.rows {
            if let Row::Line { text, .. } = row {
                if let Err(c) = encode_win_ansi(text) {
                    return Err(AppError::LayoutFailure(format!(
                        "character '{c}' (U+{:04X}) in {:?} cannot be drawn with the standard fonts",
                        c as u32, block.section
                    )));
                }
            }
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Placement
// ────────────────────────────────────────────────────────────────────────────

struct Flow {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl Flow {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin_mm,
        }
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.geometry.margin_mm
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin_mm;
    }

    /// Starts a new page unless `height` fits below the cursor. Never breaks
    /// at the top of a page.
    fn reserve(&mut self, height: f32) {
        let limit = self.geometry.bottom_limit_mm() + FIT_TOLERANCE_MM;
        if !self.at_page_top() && self.y + height > limit {
            self.break_page();
        }
    }

    fn push(&mut self, item: PageItem) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn place_section(&mut self, section: &SectionBlocks) {
        if let Some(heading) = &section.heading {
            let with_first = heading.height()
                + section
                    .entries
                    .first()
                    .map(Block::content_height)
                    .unwrap_or(0.0);
            if with_first <= self.geometry.content_height_mm() {
                self.reserve(with_first);
            }
            self.place(heading);
        }
        for entry in &section.entries {
            self.place(entry);
        }
        self.y += section.trailing_gap_mm;
    }

    fn place(&mut self, block: &Block) {
        let height = block.content_height();
        if height <= self.geometry.content_height_mm() {
            self.reserve(height);
        }

        for row in &block.rows {
            match row {
                Row::Line {
                    text,
                    size,
                    style,
                    advance,
                } => {
                    // Only oversized blocks reach a break here.
                    self.reserve(*advance);
                    let line = TextLine {
                        section: block.section,
                        x_mm: self.geometry.margin_mm,
                        baseline_mm: self.y,
                        font_size_pt: *size,
                        style: *style,
                        text: text.clone(),
                    };
                    self.push(PageItem::Text(line));
                    self.y += advance;
                }
                Row::Gap(mm) => self.y += mm,
                Row::Rule => {
                    let rule = Rule {
                        x1_mm: self.geometry.margin_mm,
                        x2_mm: self.geometry.page_width_mm - self.geometry.margin_mm,
                        y_mm: self.y,
                    };
                    self.push(PageItem::Rule(rule));
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::MM_PER_PT;
    use crate::models::{EducationEntry, ExperienceEntry, PersonalInfo};

    fn person() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                summary: "Analyst of engines.".into(),
                ..PersonalInfo::default()
            },
            ..ResumeRecord::scaffold()
        }
    }

    fn job(id: i64, company: &str) -> ExperienceEntry {
        ExperienceEntry {
            id,
            company: company.into(),
            position: "Engineer".into(),
            start_date: "2020-01".into(),
            end_date: String::new(),
            description: "Built the analytical engine tooling and shipped it to production. "
                .repeat(4),
        }
    }

    fn texts(doc: &LaidOutDocument, section: Section) -> Vec<String> {
        doc.lines_in(section).iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn test_format_date_range_cases() {
        assert_eq!(format_date_range("2020-01", ""), "2020-01 - Present");
        assert_eq!(format_date_range("2020-01", "2022-06"), "2020-01 - 2022-06");
        assert_eq!(format_date_range("", "2022-06"), "2022-06");
        assert_eq!(format_date_range("", ""), "");
        assert_eq!(format_date_range("  ", " "), "");
    }

    #[test]
    fn test_header_and_contact_lines() {
        let doc = layout_direct(&person(), &PageGeometry::default()).unwrap();
        assert_eq!(texts(&doc, Section::Name), vec!["Ada Lovelace"]);
        assert_eq!(texts(&doc, Section::Contact), vec!["Email: ada@example.com"]);

        let first = &doc.pages[0];
        let rules = first
            .items
            .iter()
            .filter(|i| matches!(i, PageItem::Rule(_)))
            .count();
        assert_eq!(rules, 1);

        let name = &doc.lines_in(Section::Name)[0];
        assert_eq!(name.baseline_mm, 20.0);
        assert_eq!(name.style, FontStyle::Bold);
        assert_eq!(name.font_size_pt, 20.0);
    }

    #[test]
    fn test_blank_institution_suppresses_education() {
        let mut record = person();
        record.education = vec![EducationEntry {
            id: 1,
            institution: "   ".into(),
            degree: "BSc".into(),
            ..EducationEntry::default()
        }];
        let doc = layout_direct(&record, &PageGeometry::default()).unwrap();
        assert!(doc.lines_in(Section::Education).is_empty());
        assert!(!doc.text_lines().any(|l| l.text == "EDUCATION"));
    }

    #[test]
    fn test_education_subtitle_and_dates() {
        let mut record = person();
        record.education = vec![EducationEntry {
            id: 1,
            institution: "University of London".into(),
            degree: "BSc".into(),
            field: "Mathematics".into(),
            start_date: "2018-09".into(),
            end_date: "2021-06".into(),
            description: String::new(),
        }];
        let doc = layout_direct(&record, &PageGeometry::default()).unwrap();
        assert_eq!(
            texts(&doc, Section::Education),
            vec![
                "EDUCATION",
                "University of London",
                "BSc in Mathematics",
                "2018-09 - 2021-06"
            ]
        );
    }

    #[test]
    fn test_section_order_and_headings() {
        let mut record = person();
        record.experience = vec![job(1, "Analytical Engines Ltd")];
        record.skills = vec!["Rust".into(), "  ".into(), "Math".into()];
        let doc = layout_direct(&record, &PageGeometry::default()).unwrap();

        let headings: Vec<&str> = doc
            .text_lines()
            .filter(|l| l.font_size_pt == HEADING_PT)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headings, vec!["PROFESSIONAL SUMMARY", "WORK EXPERIENCE", "SKILLS"]);
        assert_eq!(texts(&doc, Section::Skills), vec!["SKILLS", "Rust, Math"]);
    }

    #[test]
    fn test_layout_is_independent_of_entry_ids() {
        let mut a = person();
        a.experience = (0..6).map(|i| job(i + 1, &format!("Company {i}"))).collect();
        let mut b = a.clone();
        for (i, entry) in b.experience.iter_mut().enumerate() {
            entry.id = 1_000 + (i as i64) * 7;
        }
        let geometry = PageGeometry::default();
        assert_eq!(
            layout_direct(&a, &geometry).unwrap(),
            layout_direct(&b, &geometry).unwrap()
        );
    }

    #[test]
    fn test_long_resume_paginates_within_margins() {
        let mut record = person();
        record.experience = (0..25).map(|i| job(i + 1, &format!("Company {i}"))).collect();
        let geometry = PageGeometry::default();
        let doc = layout_direct(&record, &geometry).unwrap();

        assert!(doc.page_count() > 1);
        for page in &doc.pages {
            assert!(page.text_lines().count() > 0, "no blank pages");
            for line in page.text_lines() {
                assert!(line.baseline_mm >= geometry.margin_mm);
                assert!(line.baseline_mm <= geometry.bottom_limit_mm());
            }
        }
    }

    #[test]
    fn test_entries_are_not_split_across_pages() {
        let mut record = person();
        record.experience = (0..25).map(|i| job(i + 1, &format!("Company {i}"))).collect();
        let doc = layout_direct(&record, &PageGeometry::default()).unwrap();

        for i in 0..25 {
            let company = format!("Company {i}");
            let page_of_title = doc
                .pages
                .iter()
                .position(|p| p.text_lines().any(|l| l.text == company))
                .unwrap();
            // Date line directly follows the title on the same page.
            let lines: Vec<&TextLine> = doc.pages[page_of_title].text_lines().collect();
            let at = lines.iter().position(|l| l.text == company).unwrap();
            assert_eq!(lines[at + 2].text, "2020-01 - Present");
        }
    }

    #[test]
    fn test_heading_kept_with_first_entry() {
        let mut record = person();
        record.experience = (0..25).map(|i| job(i + 1, &format!("Company {i}"))).collect();
        record.projects[0].title = "Difference Engine".into();
        let doc = layout_direct(&record, &PageGeometry::default()).unwrap();

        for page in &doc.pages {
            let lines: Vec<&TextLine> = page.text_lines().collect();
            if let Some(last) = lines.last() {
                assert!(
                    last.font_size_pt != HEADING_PT,
                    "heading '{}' left alone at page bottom",
                    last.text
                );
            }
        }
    }

    #[test]
    fn test_oversized_block_splits_at_line_boundaries() {
        let mut record = person();
        record.personal_info.summary = "Lorem ipsum dolor sit amet consectetur. ".repeat(400);
        let geometry = PageGeometry::default();
        let doc = layout_direct(&record, &geometry).unwrap();

        assert!(doc.page_count() >= 2);
        assert_eq!(doc.lines_in(Section::Summary)[0].text, "PROFESSIONAL SUMMARY");
        for line in doc.text_lines() {
            assert!(line.baseline_mm <= geometry.bottom_limit_mm());
        }
    }

    #[test]
    fn test_empty_record_is_layout_failure() {
        let result = layout_direct(&ResumeRecord::scaffold(), &PageGeometry::default());
        assert!(matches!(result, Err(AppError::LayoutFailure(_))));
    }

    #[test]
    fn test_unencodable_text_is_layout_failure() {
        let mut record = person();
        record.personal_info.summary = "Ships fast 🚀".into();
        let result = layout_direct(&record, &PageGeometry::default());
        assert!(matches!(result, Err(AppError::LayoutFailure(msg)) if msg.contains("U+1F680")));
    }

    #[test]
    fn test_latin1_text_is_accepted() {
        let mut record = person();
        record.personal_info.first_name = "Zoë".into();
        record.personal_info.summary = "Café owner – “best” crêpes".into();
        assert!(layout_direct(&record, &PageGeometry::default()).is_ok());
    }

    #[test]
    fn test_wide_punctuation_stays_inside_right_margin() {
        let mut record = person();
        record.personal_info.summary = "—".repeat(60);
        let geometry = PageGeometry::default();
        let doc = layout_direct(&record, &geometry).unwrap();

        let lines = doc.lines_in(Section::Summary);
        let dash_lines: Vec<_> = lines.iter().filter(|l| l.text.starts_with('—')).collect();
        assert!(dash_lines.len() > 1);
        let right_edge = geometry.page_width_mm - geometry.margin_mm;
        for line in dash_lines {
            // 1.000 em per em dash in Helvetica.
            let width = line.text.chars().count() as f32 * line.font_size_pt * MM_PER_PT;
            assert!(
                line.x_mm + width <= right_edge + 1e-3,
                "overflows by {} mm",
                line.x_mm + width - right_edge
            );
        }
    }
}
