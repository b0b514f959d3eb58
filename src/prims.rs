use crate::unicode::{is_unicode, NativeUnit, Symbol, BYTE_ORDER_MARK, MARK_ORDER_BYTE, REPLACEMENT};
use crate::Mode;

/// Mask of the value bits of a continuation byte.
const CONT_MASK: u8 = 0b0011_1111u8;
/// Value of the tag bits (tag mask is !CONT_MASK) of a continuation byte.
const TAG_CONT_U8: u8 = 0b1000_0000u8;

const HIGH_SURROGATES: std::ops::Range<Symbol> = 0xD800..0xDC00;
const LOW_SURROGATES: std::ops::Range<Symbol> = 0xDC00..0xE000;

/// One of the three Unicode Transformation Formats: [`Utf8`], [`Utf16`] or [`Utf32`].
///
/// This trait is sealed. It exists so decoders, encoders and owned strings can
/// be written once, generic over the unit width.
pub trait Encoding: sealed::Sealed + Sized + 'static {
    /// The native storage unit.
    type Unit: NativeUnit;

    /// Display name, e.g. `"UTF-16"`.
    const NAME: &'static str;

    /// Whether units are stored in a byte order, and may start with a byte order mark.
    const HAS_BOM: bool;

    /// The most units a single code point can take.
    const MAX_WIDTH: usize;

    /// Units needed to encode `symbol`. Symbols that are not scalar values
    /// are sized as [`REPLACEMENT`], since that's what gets written.
    fn width(symbol: Symbol) -> usize;

    /// Reads the symbol starting at `units[offset]`, returning it with the
    /// number of units it covered.
    ///
    /// Malformed data yields [`REPLACEMENT`] with a width of one unit.
    /// `offset` must be in bounds. An [`Mode::Unresolved`] mode reads big endian.
    fn read(units: &[Self::Unit], offset: usize, mode: Mode) -> (Symbol, usize);

    /// Writes `symbol` to the front of `out`, returning the number of units
    /// written, or `None` (with `out` untouched) if it doesn't fit.
    fn write(symbol: Symbol, out: &mut [Self::Unit], mode: Mode) -> Option<usize>;

    /// If `first` is a byte order mark, returns the byte order it announces.
    fn detect(first: Self::Unit) -> Option<Mode>;
}

/// UTF-8, one to four bytes per code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Utf8;

/// UTF-16, one unit or a surrogate pair per code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Utf16;

/// UTF-32, one unit per code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Utf32;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Utf8 {}
    impl Sealed for super::Utf16 {}
    impl Sealed for super::Utf32 {}
}

/// Native units needed to encode `symbol` in `E`.
///
/// ```
/// use utfstr::{encoded_len, Utf8, Utf16, Utf32};
/// assert_eq!(3, encoded_len::<Utf8>(0x65E5));
/// assert_eq!(2, encoded_len::<Utf16>(0x10401));
/// assert_eq!(1, encoded_len::<Utf32>(0x10401));
/// assert_eq!(3, encoded_len::<Utf8>(0xD800)); // written as U+FFFD
/// ```
#[inline]
pub fn encoded_len<E: Encoding>(symbol: Symbol) -> usize {
    E::width(symbol)
}

#[inline]
fn scalar(symbol: Symbol) -> char {
    char::from_u32(symbol).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[inline]
fn load16(unit: u16, mode: Mode) -> u16 {
    match mode {
        Mode::LittleEndian => u16::from_le(unit),
        _ => u16::from_be(unit),
    }
}

#[inline]
fn store16(value: u16, mode: Mode) -> u16 {
    match mode {
        Mode::LittleEndian => value.to_le(),
        _ => value.to_be(),
    }
}

#[inline]
fn load32(unit: u32, mode: Mode) -> u32 {
    match mode {
        Mode::LittleEndian => u32::from_le(unit),
        _ => u32::from_be(unit),
    }
}

#[inline]
fn store32(value: u32, mode: Mode) -> u32 {
    match mode {
        Mode::LittleEndian => value.to_le(),
        _ => value.to_be(),
    }
}

impl Encoding for Utf8 {
    type Unit = u8;
    const NAME: &'static str = "UTF-8";
    const HAS_BOM: bool = false;
    const MAX_WIDTH: usize = 4;

    #[inline]
    fn width(symbol: Symbol) -> usize {
        scalar(symbol).len_utf8()
    }

    fn read(units: &[u8], offset: usize, _mode: Mode) -> (Symbol, usize) {
        let lead = units[offset];
        if lead < 0x80 {
            return (lead as Symbol, 1);
        }

        // continuation bytes, and leads of 5 and 6 byte sequences
        if lead < 0xC0 || lead > 0xF7 {
            return (REPLACEMENT, 1);
        }

        let (size, bits, min) = match lead {
            0xC0..=0xDF => (2, lead & 0x1F, 0x80),
            0xE0..=0xEF => (3, lead & 0x0F, 0x800),
            _ => (4, lead & 0x07, 0x10000),
        };

        let Some(tail) = units.get(offset + 1..offset + size) else {
            return (REPLACEMENT, 1);
        };

        let mut code = bits as Symbol;
        for &byte in tail {
            if byte & !CONT_MASK != TAG_CONT_U8 {
                return (REPLACEMENT, 1);
            }
            code = (code << 6) | (byte & CONT_MASK) as Symbol;
        }

        // overlong forms, surrogates, and anything past U+10FFFF
        if code < min || !is_unicode(code) {
            return (REPLACEMENT, 1);
        }
        (code, size)
    }

    fn write(symbol: Symbol, out: &mut [u8], _mode: Mode) -> Option<usize> {
        let ch = scalar(symbol);
        let out = out.get_mut(..ch.len_utf8())?;
        Some(ch.encode_utf8(out).len())
    }

    #[inline]
    fn detect(_first: u8) -> Option<Mode> {
        None
    }
}

impl Encoding for Utf16 {
    type Unit = u16;
    const NAME: &'static str = "UTF-16";
    const HAS_BOM: bool = true;
    const MAX_WIDTH: usize = 2;

    #[inline]
    fn width(symbol: Symbol) -> usize {
        scalar(symbol).len_utf16()
    }

    fn read(units: &[u16], offset: usize, mode: Mode) -> (Symbol, usize) {
        let high = load16(units[offset], mode) as Symbol;
        if LOW_SURROGATES.contains(&high) {
            return (REPLACEMENT, 1);
        }
        if !HIGH_SURROGATES.contains(&high) {
            return (high, 1);
        }

        match units.get(offset + 1).map(|&u| load16(u, mode) as Symbol) {
            Some(low) if LOW_SURROGATES.contains(&low) => {
                (0x10000 + (((high & 0x3FF) << 10) | (low & 0x3FF)), 2)
            }
            _ => (REPLACEMENT, 1),
        }
    }

    fn write(symbol: Symbol, out: &mut [u16], mode: Mode) -> Option<usize> {
        let ch = scalar(symbol);
        let out = out.get_mut(..ch.len_utf16())?;
        let mut pair = [0u16; 2];
        for (dst, &unit) in out.iter_mut().zip(ch.encode_utf16(&mut pair).iter()) {
            *dst = store16(unit, mode);
        }
        Some(out.len())
    }

    #[inline]
    fn detect(first: u16) -> Option<Mode> {
        match u16::from_be(first) as Symbol {
            BYTE_ORDER_MARK => Some(Mode::BigEndian),
            MARK_ORDER_BYTE => Some(Mode::LittleEndian),
            _ => None,
        }
    }
}

impl Encoding for Utf32 {
    type Unit = u32;
    const NAME: &'static str = "UTF-32";
    const HAS_BOM: bool = true;
    const MAX_WIDTH: usize = 1;

    #[inline]
    fn width(_symbol: Symbol) -> usize {
        1
    }

    fn read(units: &[u32], offset: usize, mode: Mode) -> (Symbol, usize) {
        let code = load32(units[offset], mode);
        if is_unicode(code) {
            (code, 1)
        } else {
            (REPLACEMENT, 1)
        }
    }

    fn write(symbol: Symbol, out: &mut [u32], mode: Mode) -> Option<usize> {
        let slot = out.first_mut()?;
        *slot = store32(scalar(symbol) as u32, mode);
        Some(1)
    }

    #[inline]
    fn detect(first: u32) -> Option<Mode> {
        match u32::from_be(first) {
            BYTE_ORDER_MARK => Some(Mode::BigEndian),
            m if m == BYTE_ORDER_MARK.swap_bytes() => Some(Mode::LittleEndian),
            _ => None,
        }
    }
}
