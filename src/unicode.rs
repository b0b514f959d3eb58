//! Code point classification shared by every encoding.

/// A Unicode code point, or one of the out-of-band markers below.
pub type Symbol = u32;

/// The byte order mark, `U+FEFF`.
pub const BYTE_ORDER_MARK: Symbol = 0x00FEFF;
/// The byte order mark as it reads when loaded with the wrong byte order.
pub const MARK_ORDER_BYTE: Symbol = 0x00FFFE;
/// Substituted for anything that can't be decoded or encoded, `U+FFFD`.
pub const REPLACEMENT: Symbol = 0x00FFFD;
/// Returned by decoders with no data left. Never a valid code point.
pub const EOF_SYMBOL: Symbol = 0xFFFF_FFFF;

const MAX_CODE_POINT: Symbol = 0x10FFFF;
const SURROGATES: std::ops::RangeInclusive<Symbol> = 0x00D800..=0x00DFFF;

// Combining diacritical marks, and their extended/supplement/symbol/half-mark blocks
const COMBINING: [(Symbol, Symbol); 5] = [
    (0x000300, 0x00036F),
    (0x001AB0, 0x001AFF),
    (0x001DC0, 0x001DFF),
    (0x0020D0, 0x0020FF),
    (0x00FE20, 0x00FE2F),
];

/// Returns true if `code` is a Unicode scalar value: at most `U+10FFFF`, and not a UTF-16 surrogate.
///
/// ```
/// assert!(utfstr::is_unicode(0x00D7FF));
/// assert!(!utfstr::is_unicode(0x00D800));
/// assert!(!utfstr::is_unicode(0x110000));
/// ```
#[inline]
pub const fn is_unicode(code: Symbol) -> bool {
    code <= MAX_CODE_POINT && !(code >= *SURROGATES.start() && code <= *SURROGATES.end())
}

/// Returns true if `code` is a combining mark, which shares the column of the character before it.
///
/// Only the combining diacritical mark blocks are recognized; this is not a grapheme breaker.
#[inline]
pub const fn is_combining(code: Symbol) -> bool {
    let mut i = 0;
    while i < COMBINING.len() {
        let (first, last) = COMBINING[i];
        if code >= first && code <= last {
            return true;
        }
        i += 1;
    }
    false
}

/// A storage element of one encoding: `u8`, `u16`, or `u32`.
pub trait NativeUnit: Copy + Eq + Default + std::fmt::Debug + Send + Sync + 'static + sealed::Sealed {
    /// The terminating zero unit.
    const NUL: Self;
    /// An empty nul-terminated string.
    const TERMINATOR: &'static [Self];
}

impl NativeUnit for u8 { const NUL: u8 = 0; const TERMINATOR: &'static [u8] = &[0]; }
impl NativeUnit for u16 { const NUL: u16 = 0; const TERMINATOR: &'static [u16] = &[0]; }
impl NativeUnit for u32 { const NUL: u32 = 0; const TERMINATOR: &'static [u32] = &[0]; }

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Counts the units before the first zero terminator, like `strlen`.
///
/// A slice without a terminator is entirely counted. Zero is zero in either
/// byte order, so this doesn't care about endianness.
///
/// ```
/// assert_eq!(0, utfstr::unit_length::<u16>(&[0]));
/// assert_eq!(7, utfstr::unit_length::<u32>(&[1, 2, 3, 4, 5, 6, 7, 0]));
/// assert_eq!(3, utfstr::unit_length(b"abc"));
/// ```
#[inline]
pub fn unit_length<U: NativeUnit>(units: &[U]) -> usize {
    units.iter().position(|&u| u == U::NUL).unwrap_or(units.len())
}
