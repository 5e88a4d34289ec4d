//! Printer code page selection and text transcoding
//!
//! Thermal printers interpret text through a selected code page (ESC t n).
//! UTF-8 input has to be transcoded to the matching single-byte encoding
//! before it is sent, otherwise multi-byte sequences print as garbage.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::EscposError;

/// Supported printer code pages
///
/// Each variant maps to the ESC t argument of the common Epson code page
/// table and to the encoding used for transcoding outgoing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePage {
    /// CP437 (USA, default on most printers)
    #[default]
    Cp437,
    /// CP858 (Western Europe with euro sign)
    Cp858,
    /// CP866 (Cyrillic)
    Cp866,
    /// Windows-1252 (Western Europe)
    Windows1252,
}

impl CodePage {
    /// ESC t argument selecting this code page
    pub fn escpos_value(self) -> u8 {
        match self {
            CodePage::Cp437 => 0,
            CodePage::Cp858 => 19,
            CodePage::Cp866 => 17,
            CodePage::Windows1252 => 16,
        }
    }

    /// Transcode UTF-8 text to this code page
    ///
    /// CP437/CP858 have no encoding_rs table; they pass ASCII through and
    /// replace anything else with '?'. The printer-side glyphs beyond ASCII
    /// differ per vendor anyway, so receipts that need accents should select
    /// `windows1252`.
    pub fn encode(self, s: &str) -> Vec<u8> {
        match self {
            CodePage::Cp437 | CodePage::Cp858 => s
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            CodePage::Cp866 => {
                let (bytes, _, _) = encoding_rs::IBM866.encode(s);
                bytes.into_owned()
            }
            CodePage::Windows1252 => {
                let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(s);
                bytes.into_owned()
            }
        }
    }
}

impl FromStr for CodePage {
    type Err = EscposError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cp437" => Ok(CodePage::Cp437),
            "cp858" => Ok(CodePage::Cp858),
            "cp866" => Ok(CodePage::Cp866),
            "windows1252" | "cp1252" => Ok(CodePage::Windows1252),
            other => Err(EscposError::UnknownCodePage(other.to_string())),
        }
    }
}
