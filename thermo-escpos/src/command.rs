//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use serde::Deserialize;

use crate::codepage::CodePage;

/// Text alignment (ESC a n)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// The ESC a command selecting this alignment
    pub fn command(self) -> [u8; 3] {
        match self {
            Align::Left => [0x1B, 0x61, 0x00],
            Align::Center => [0x1B, 0x61, 0x01],
            Align::Right => [0x1B, 0x61, 0x02],
        }
    }
}

/// Paper cut mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Partial cut, leaves a small connection (GS V 1)
    #[default]
    Partial,
    /// Full cut (GS V 0)
    Full,
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers. Text is transcoded
/// to the currently selected [`CodePage`] as it is appended.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    codepage: CodePage,
}

impl EscPosBuilder {
    /// Create a new builder, starting with printer initialization (ESC @)
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self {
            buf,
            codepage: CodePage::default(),
        }
    }

    /// Create a builder without the leading init command
    ///
    /// Used for one-shot control sequences (beep, cut, drawer pulse) where
    /// re-initializing the printer would discard its current settings.
    pub fn bare() -> Self {
        Self {
            buf: Vec::with_capacity(16),
            codepage: CodePage::default(),
        }
    }

    // === Text Output ===

    /// Append text, transcoded to the current code page
    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = self.codepage.encode(s);
        self.buf.extend_from_slice(&encoded);
        self
    }

    /// Append text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Append a single newline
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Code Page ===

    /// Select a code page (ESC t n) and use it for subsequent text
    pub fn codepage(&mut self, page: CodePage) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x74, page.escpos_value()]);
        self.codepage = page;
        self
    }

    // === Alignment and Style ===

    /// Set text alignment (ESC a n)
    pub fn align(&mut self, align: Align) -> &mut Self {
        self.buf.extend_from_slice(&align.command());
        self
    }

    /// Enable or disable bold (ESC E n)
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, on as u8]);
        self
    }

    /// Set underline style (ESC - n): 0 off, 1 thin, 2 thick
    pub fn underline(&mut self, style: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x2D, style.min(2)]);
        self
    }

    /// Set character size multipliers (GS ! n), each 1-8
    ///
    /// The multipliers are encoded as (width-1) in the high nibble and
    /// (height-1) in the low nibble.
    pub fn size(&mut self, width: u8, height: u8) -> &mut Self {
        let w = width.clamp(1, 8) - 1;
        let h = height.clamp(1, 8) - 1;
        self.buf.extend_from_slice(&[0x1D, 0x21, (w << 4) | h]);
        self
    }

    /// Reset size, bold, underline and alignment to defaults
    pub fn reset_format(&mut self) -> &mut Self {
        self.size(1, 1);
        self.bold(false);
        self.underline(0);
        self.align(Align::Left);
        self
    }

    // === Paper Control ===

    /// Cut paper (GS V 0 / GS V 1)
    pub fn cut(&mut self, mode: CutMode) -> &mut Self {
        let m = match mode {
            CutMode::Full => 0x00,
            CutMode::Partial => 0x01,
        };
        self.buf.extend_from_slice(&[0x1D, 0x56, m]);
        self
    }

    /// Full cut after feeding n lines (GS V 66 n)
    ///
    /// Lets the printer manage cutter-to-head distance, which wastes less
    /// top margin on the next ticket than separate feed + cut commands.
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, lines]);
        self
    }

    // === Peripherals ===

    /// Buzzer (ESC B n t): n repetitions of t x 100ms
    pub fn beep(&mut self, count: u8, duration: u8) -> &mut Self {
        self.buf
            .extend_from_slice(&[0x1B, 0x42, count.clamp(1, 9), duration.clamp(1, 9)]);
        self
    }

    /// Cash drawer pulse (ESC p m t1 t2) on pin 2 (m=0) or pin 5 (m=1)
    pub fn drawer_pulse(&mut self, pin: u8, t1: u8, t2: u8) -> &mut Self {
        self.buf
            .extend_from_slice(&[0x1B, 0x70, (pin != 0) as u8, t1, t2]);
        self
    }

    // === Raw Commands ===

    /// Append raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Reset printer to default state (ESC @)
    pub fn reset(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x40]);
        self
    }

    // === Build ===

    /// Consume the builder and return the byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    /// Current buffer length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}
