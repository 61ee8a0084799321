//! Static font-metric tables for the PDF standard Helvetica family.
//!
//! Character widths are in em units (AFM widths ÷ 1000). The standard fonts
//! need no embedding, so the direct layout strategy measures with these
//! tables and the encoder references the fonts by name.
//! Each table covers ASCII 0x20..=0x7E (index = byte - 0x20) and the upper
//! half of WinAnsiEncoding 0x80..=0xFF (index = byte - 0x80), so every
//! character the encoder accepts is measured with its real advance width.

use serde::{Deserialize, Serialize};

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

// ────────────────────────────────────────────────────────────────────────────
// Font style enum
// ────────────────────────────────────────────────────────────────────────────

/// The three faces the resume layout uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Normal, FontStyle::Bold, FontStyle::Italic];

    /// PostScript name of the standard font backing this style.
    pub fn base_font(&self) -> &'static [u8] {
        match self {
            FontStyle::Normal => b"Helvetica",
            FontStyle::Bold => b"Helvetica-Bold",
            FontStyle::Italic => b"Helvetica-Oblique",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            FontStyle::Normal => b"F1",
            FontStyle::Bold => b"F2",
            FontStyle::Italic => b"F3",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// `widths[i]` is the width of ASCII `(i + 0x20)`; `upper[i]` is the width of
/// WinAnsi byte `(i + 0x80)`.
pub struct FontMetricTable {
    widths: [f32; 95],
    upper: [f32; 128],
    /// Width for characters the standard fonts cannot draw.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Characters outside WinAnsi fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    pub fn char_width(&self, c: char) -> f32 {
        match win_ansi_byte(c) {
            Some(byte @ 0x20..=0x7E) => self.widths[usize::from(byte - 0x20)],
            Some(byte @ 0x80..=0xFF) => self.upper[usize::from(byte - 0x80)],
            _ => self.average_char_width,
        }
    }

    /// Width of a string in millimetres at `font_size_pt`.
    pub fn measure_mm(&self, s: &str, font_size_pt: f32) -> f32 {
        self.measure_str(s) * font_size_pt * MM_PER_PT
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables (ASCII printable, then WinAnsi 0x80..=0xFF)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica. Also used for Helvetica-Oblique, which shares its advance widths.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    // Unassigned bytes (0x81, 0x8D, 0x8F, 0x90, 0x9D) never come out of the encoder.
    #[rustfmt::skip]
    upper: [
        // €      ·      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      ·      Ž      ·
        0.556, 0.556, 0.222, 0.556, 0.333, 1.000, 0.556, 0.556, 0.333, 1.000, 0.667, 0.333, 1.000, 0.556, 0.611, 0.556,
        // ·      ‘      ’      “      ”      •      –      —      ˜      ™      š      ›      œ      ·      ž      Ÿ
        0.556, 0.222, 0.222, 0.333, 0.333, 0.350, 0.556, 1.000, 0.333, 1.000, 0.500, 0.333, 0.944, 0.556, 0.500, 0.667,
        // nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.278, 0.333, 0.556, 0.556, 0.556, 0.556, 0.260, 0.556, 0.333, 0.737, 0.370, 0.556, 0.584, 0.333, 0.737, 0.333,
        // °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.584, 0.333, 0.333, 0.333, 0.556, 0.537, 0.278, 0.333, 0.333, 0.365, 0.556, 0.834, 0.834, 0.834, 0.611,
        // À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.667, 0.667, 0.667, 0.667, 0.667, 0.667, 1.000, 0.722, 0.667, 0.667, 0.667, 0.667, 0.278, 0.278, 0.278, 0.278,
        // Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.778, 0.778, 0.778, 0.778, 0.778, 0.584, 0.778, 0.722, 0.722, 0.722, 0.722, 0.667, 0.667, 0.611,
        // à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.889, 0.500, 0.556, 0.556, 0.556, 0.556, 0.278, 0.278, 0.278, 0.278,
        // ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.584, 0.611, 0.556, 0.556, 0.556, 0.556, 0.500, 0.556, 0.500,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Helvetica-Bold.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    #[rustfmt::skip]
    upper: [
        // €      ·      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      ·      Ž      ·
        0.556, 0.556, 0.278, 0.556, 0.500, 1.000, 0.556, 0.556, 0.333, 1.000, 0.667, 0.333, 1.000, 0.556, 0.611, 0.556,
        // ·      ‘      ’      “      ”      •      –      —      ˜      ™      š      ›      œ      ·      ž      Ÿ
        0.556, 0.278, 0.278, 0.500, 0.500, 0.350, 0.556, 1.000, 0.333, 1.000, 0.556, 0.333, 0.944, 0.556, 0.500, 0.667,
        // nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.278, 0.333, 0.556, 0.556, 0.556, 0.556, 0.280, 0.556, 0.333, 0.737, 0.370, 0.556, 0.584, 0.333, 0.737, 0.333,
        // °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.584, 0.333, 0.333, 0.333, 0.611, 0.556, 0.278, 0.333, 0.333, 0.365, 0.556, 0.834, 0.834, 0.834, 0.611,
        // À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 1.000, 0.722, 0.667, 0.667, 0.667, 0.667, 0.278, 0.278, 0.278, 0.278,
        // Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.778, 0.778, 0.778, 0.778, 0.778, 0.584, 0.778, 0.722, 0.722, 0.722, 0.722, 0.667, 0.667, 0.611,
        // à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.889, 0.556, 0.556, 0.556, 0.556, 0.556, 0.278, 0.278, 0.278, 0.278,
        // ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.611, 0.611, 0.611, 0.611, 0.611, 0.611, 0.611, 0.584, 0.611, 0.611, 0.611, 0.611, 0.611, 0.556, 0.611, 0.556,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Returns the static metric table for a given style.
pub fn get_metrics(style: FontStyle) -> &'static FontMetricTable {
    match style {
        FontStyle::Normal | FontStyle::Italic => &HELVETICA_TABLE,
        FontStyle::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi encoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps a character to its byte in WinAnsiEncoding (Windows-1252), the
/// encoding the standard fonts are declared with. `None` means the standard
/// fonts cannot draw it.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}

/// Encodes a whole string, or returns the first character that has no WinAnsi byte.
pub fn encode_win_ansi(s: &str) -> Result<Vec<u8>, char> {
    s.chars().map(|c| win_ansi_byte(c).ok_or(c)).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
