//! # thermo-escpos
//!
//! ESC/POS byte sequence construction - no I/O, no spooler knowledge.
//!
//! ## Scope
//!
//! This crate handles HOW to talk ESC/POS:
//! - Command building (alignment, styling, cut, feed, beep, drawer pulse)
//! - Code page selection and single-byte text transcoding
//! - Raster image conversion (resize, dithering, GS v 0 encoding)
//!
//! WHERE the bytes go (a CUPS queue, a socket, a file) is the caller's
//! business - see the `thermo-gateway` crate.
//!
//! ## Example
//!
//! ```ignore
//! use thermo_escpos::{Align, CutMode, EscPosBuilder};
//!
//! let mut builder = EscPosBuilder::new();
//! builder.align(Align::Center);
//! builder.bold(true);
//! builder.line("RECEIPT");
//! builder.reset_format();
//! builder.feed(2);
//! builder.cut_feed(3);
//! let data = builder.build();
//! ```

mod codepage;
mod command;
mod error;
#[cfg(feature = "image")]
mod raster;

// Re-exports
pub use codepage::CodePage;
pub use command::{Align, CutMode, EscPosBuilder};
pub use error::{EscposError, EscposResult};

#[cfg(feature = "image")]
pub use raster::{Raster, RasterMode, RasterOptions, render};
