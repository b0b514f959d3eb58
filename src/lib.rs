#![warn(missing_docs)]
// Copyright 2012-2022 The Rust Project Developers and Eric Kidd and Christopher Moore.  See the
// COPYRIGHT-RUST.txt file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Cursor-style decoders and encoders for the three Unicode Transformation
//! Formats, UTF-8, UTF-16 and UTF-32, plus owned strings that convert
//! freely between them.
//!
//! Decoders never fail. Malformed input is reported as
//! [`REPLACEMENT`] (`U+FFFD`) and the cursor always moves forward by at least
//! one native unit, so every scan terminates. Encoders substitute
//! [`REPLACEMENT`] for anything that isn't a Unicode scalar value, and only
//! fail when the destination buffer runs out of room.
//!
//! ```
//! use utfstr::{Utf8Decoder, Utf16Encoder, Utf16Decoder, Mode, EOF_SYMBOL};
//!
//! let text = "aé日\u{10401}";
//! let mut units = [0u16; 8];
//!
//! let mut encoder = Utf16Encoder::with_mode(&mut units, Mode::LittleEndian);
//! encoder.assign(&Utf8Decoder::new(text.as_bytes())).unwrap();
//! assert_eq!(5, encoder.offset()); // U+10401 needs a surrogate pair
//!
//! let mut decoder = Utf16Decoder::from_encoder(&encoder);
//! assert_eq!('a' as u32, decoder.decode());
//! assert_eq!('é' as u32, decoder.decode());
//! assert_eq!('日' as u32, decoder.decode());
//! assert_eq!(0x10401, decoder.decode());
//! assert_eq!(EOF_SYMBOL, decoder.decode());
//! ```
//!
//! ### Byte order
//!
//! UTF-16 and UTF-32 units are stored in memory in the byte order named by
//! their [`Mode`]. A cursor starts out [`Mode::Unresolved`]: the first decode
//! looks for a byte order mark (`U+FEFF`, or its swapped form `U+FFFE`), picks
//! the matching byte order and skips the mark. Without a mark, big endian is
//! assumed. Forcing a mode with `set_mode` before decoding disables detection,
//! and a leading `U+FEFF` is then ordinary data.
//!
//! ### Columns
//!
//! Besides the native-unit offset, cursors keep a *column*: a visual cluster
//! index where a base character and the combining marks following it share
//! one column.
//!
//! ```
//! use utfstr::Utf32Decoder;
//!
//! let units = [0x25CC, 0x0300, 0x0301, 0x25CC];
//! let mut decoder = Utf32Decoder::with_mode(&units, utfstr::Mode::native());
//! let mut columns = Vec::new();
//! while decoder.decode() != utfstr::EOF_SYMBOL {
//!     columns.push(decoder.column().unwrap());
//! }
//! assert_eq!(vec![0, 0, 0, 1], columns);
//! ```
//!
//! ### Surrogate pairs
//!
//! The UTF-16 encoding uses "surrogate pairs" to represent Unicode code
//! points in the range from U+10000 to U+10FFFF.  These are 16-bit numbers
//! in the range 0xD800 to 0xDFFF. Surrogates are not scalar values: a
//! surrogate found on its own in any encoding decodes to `U+FFFD`, and
//! encoding one writes `U+FFFD` instead.

#![warn(missing_docs)]

mod decoding;
mod encoding;
mod error;
mod prims;
mod string;
mod string_impls;
#[rustfmt::skip]
mod unicode;


pub use crate::decoding::{Decoder, SymbolCursor, SymbolSource, Utf16Decoder, Utf32Decoder, Utf8Decoder};
pub use crate::encoding::{transcode, Encoder, SymbolSink, Utf16Encoder, Utf32Encoder, Utf8Encoder};
pub use crate::error::{Overflow, UtfError};
pub use crate::prims::{encoded_len, Encoding, Utf16, Utf32, Utf8};
pub use crate::string::{Utf16String, Utf32String, Utf8String, UtfString};
pub use crate::unicode::{
    is_combining, is_unicode, unit_length, NativeUnit, Symbol, BYTE_ORDER_MARK, EOF_SYMBOL,
    MARK_ORDER_BYTE, REPLACEMENT,
};

/// Which byte order are 16 and 32-bit native units stored in?
///
/// UTF-8 cursors carry a mode too, but never look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Not decided yet. Decoders resolve this from a leading byte order mark,
    /// encoders resolve it to [`Mode::BigEndian`] on their first write.
    #[default]
    Unresolved,

    /// Most significant byte first, the network order.
    BigEndian,

    /// Least significant byte first.
    LittleEndian,
}

impl Mode {
    /// The byte order of the running machine. Owned strings store their units this way.
    pub const fn native() -> Mode {
        if cfg!(target_endian = "big") {
            Mode::BigEndian
        } else {
            Mode::LittleEndian
        }
    }

    /// Returns true once a byte order was chosen.
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Mode::Unresolved)
    }

    /// A short display name, `"BE"`, `"LE"`, or `"RESET"` while unresolved.
    pub const fn name(&self) -> &'static str {
        match self {
            Mode::Unresolved => "RESET",
            Mode::BigEndian => "BE",
            Mode::LittleEndian => "LE",
        }
    }
}
