use serde::{Deserialize, Serialize};

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;
/// Vertical advance per wrapped line, in millimetres per point of font size.
pub const LINE_HEIGHT_MM_PER_PT: f32 = 0.4;

/// Fixed page geometry shared by both layout strategies. All values in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Uniform margin on all four sides.
    pub margin_mm: f32,
}

/// A4 with the given uniform margin.
pub fn a4_geometry(margin_mm: f32) -> PageGeometry {
    PageGeometry {
        page_width_mm: A4_WIDTH_MM,
        page_height_mm: A4_HEIGHT_MM,
        margin_mm,
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        a4_geometry(20.0)
    }
}

impl PageGeometry {
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f32 {
        self.page_height_mm - 2.0 * self.margin_mm
    }

    /// Lowest y a placed line may reach before a page break.
    pub fn bottom_limit_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }

    /// Height one wrapped line at `font_size_pt` consumes.
    pub fn line_advance_mm(&self, font_size_pt: f32) -> f32 {
        font_size_pt * LINE_HEIGHT_MM_PER_PT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_sanity() {
        let g = PageGeometry::default();
        assert_eq!(g.content_width_mm(), 170.0);
        assert_eq!(g.content_height_mm(), 257.0);
        assert_eq!(g.bottom_limit_mm(), 277.0);
    }

    #[test]
    fn test_line_advance_uses_fixed_factor() {
        let g = PageGeometry::default();
        assert!((g.line_advance_mm(10.0) - 4.0).abs() < 1e-5);
        assert!((g.line_advance_mm(20.0) - 8.0).abs() < 1e-5);
    }
}
