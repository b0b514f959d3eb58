use crate::decoding::{from_utf8_slice, Decoder, SymbolCursor, SymbolSource};
use crate::encoding::Encoder;
use crate::error::UtfError;
use crate::prims::{Encoding, Utf16, Utf32, Utf8};
use crate::unicode::{unit_length, NativeUnit, Symbol, EOF_SYMBOL};
use crate::Mode;

/// Buffers grow in steps of this many units.
const GRANULE: usize = 16;

/// An owned, nul-terminated UTF-8 string.
pub type Utf8String = UtfString<Utf8>;
/// An owned, nul-terminated UTF-16 string, in native byte order.
pub type Utf16String = UtfString<Utf16>;
/// An owned, nul-terminated UTF-32 string, in native byte order.
pub type Utf32String = UtfString<Utf32>;

/// An owned string of encoding `E`.
///
/// Units are kept in native byte order and always followed by a zero
/// terminator, so [`as_units_with_nul`](Self::as_units_with_nul) can be
/// handed to anything expecting a C-style string. Because of that, content
/// ends at the first `U+0000` of whatever it was built from.
///
/// A string holds no buffer when it was built empty, after [`reset`](Self::reset)
/// and after [`take`](Self::take). Assigning empty content to a string that
/// already has a buffer keeps it for reuse, so an empty string may still
/// report a nonzero [`capacity`](Self::capacity).
///
/// ```
/// use utfstr::{Utf8String, Utf16String, Utf32String};
///
/// let utf8 = Utf8String::try_from("e\u{301}t\u{1F600}").unwrap();
/// let utf16 = Utf16String::try_from(&utf8).unwrap();
/// let utf32 = Utf32String::try_from(&utf16).unwrap();
///
/// assert_eq!(4, utf32.codes());
/// assert_eq!([4, 5], [utf32.units(), utf16.units()]);
/// assert_eq!(utf8, utf32);
/// assert_eq!("e\u{301}t\u{1F600}", utf16.to_string());
/// ```
pub struct UtfString<E: Encoding> {
    /// Content, terminator, then spare room. Empty when nothing is allocated.
    buf: Vec<E::Unit>,
    codes: usize,
    units: usize,
}

/// Code points and native units of `source` up to its end or first `U+0000`.
fn measure<E: Encoding, S: SymbolSource>(mut source: S) -> (usize, usize) {
    let (mut codes, mut units) = (0, 0);
    loop {
        match source.decode() {
            EOF_SYMBOL | 0 => return (codes, units),
            symbol => {
                codes += 1;
                units += E::width(symbol);
            }
        }
    }
}

impl<E: Encoding> UtfString<E> {
    /// Creates an empty string, without allocating.
    pub const fn new() -> Self {
        UtfString { buf: Vec::new(), codes: 0, units: 0 }
    }

    /// Builds a string from any decoder, encoder, or `&str`. Decoders are
    /// read from their first symbol, wherever their cursor is.
    pub fn from_cursor<'s>(source: impl Into<SymbolCursor<'s>>) -> Result<Self, UtfError> {
        let mut string = Self::new();
        string.assign_from(source)?;
        Ok(string)
    }

    /// Builds a string from native units, up to the first zero unit.
    ///
    /// ```
    /// let units = ['h' as u32, 'i' as u32, 0, 'x' as u32];
    /// let string = utfstr::Utf32String::from_terminated(&units).unwrap();
    /// assert_eq!(&units[..2], string.as_units());
    /// ```
    pub fn from_terminated(units: &[E::Unit]) -> Result<Self, UtfError> {
        let mut string = Self::new();
        string.init(Decoder::<E>::with_mode(&units[..unit_length(units)], Mode::native()))?;
        Ok(string)
    }

    /// Replaces the contents with what `source` holds, from its first symbol.
    ///
    /// The buffer is only reallocated when the new contents don't fit. If
    /// that allocation fails the string is left as it was.
    pub fn assign_from<'s>(&mut self, source: impl Into<SymbolCursor<'s>>) -> Result<(), UtfError> {
        let mut cursor = source.into();
        cursor.rewind();
        self.init(cursor)
    }

    /// Replaces the contents with the native units `units`, up to the first zero unit.
    pub fn assign_terminated(&mut self, units: &[E::Unit]) -> Result<(), UtfError> {
        self.init(Decoder::<E>::with_mode(&units[..unit_length(units)], Mode::native()))
    }

    /// Count, make room, then encode.
    pub(crate) fn init<S: SymbolSource + Clone>(&mut self, source: S) -> Result<(), UtfError> {
        let (codes, units) = measure::<E, _>(source.clone());

        if units == 0 && self.buf.is_empty() {
            self.codes = 0;
            self.units = 0;
            return Ok(());
        }

        if units >= self.buf.len() {
            self.grow((units + GRANULE) & !(GRANULE - 1))?;
        }

        let mut source = source;
        let mut encoder = Encoder::<E>::with_mode(&mut self.buf[..units], Mode::native());
        loop {
            match source.decode() {
                EOF_SYMBOL | 0 => break,
                symbol => {
                    encoder.encode(symbol)?;
                }
            }
        }
        debug_assert_eq!(units, encoder.offset(), "{} string measured and encoded differently", E::NAME);

        self.buf[units] = <E::Unit as NativeUnit>::NUL;
        self.codes = codes;
        self.units = units;
        Ok(())
    }

    /// Swaps in a zeroed buffer of `size` units. The old buffer is only
    /// dropped once the new one was allocated.
    pub(crate) fn grow(&mut self, size: usize) -> Result<(), UtfError> {
        let mut fresh = Vec::new();
        fresh
            .try_reserve_exact(size)
            .map_err(|_| UtfError::OutOfMemory { units: size })?;
        fresh.resize(size, <E::Unit as NativeUnit>::NUL);
        log::debug!("{} string buffer {} -> {} units", E::NAME, self.buf.len(), size);
        self.buf = fresh;
        Ok(())
    }

    /// Counts the code points `source` holds, up to its first `U+0000`, without allocating.
    ///
    /// ```
    /// assert_eq!(3, utfstr::Utf16String::count_codes("a\u{10401}c\0d"));
    /// ```
    pub fn count_codes<'s>(source: impl Into<SymbolCursor<'s>>) -> usize {
        let mut cursor = source.into();
        cursor.rewind();
        measure::<E, _>(cursor).0
    }

    /// Native unit offset of code point `ix` within the nul-terminated native
    /// string `units`. Indexes past the end give the end offset.
    ///
    /// ```
    /// let units = [0x61u16, 0xD801, 0xDC01, 0x62, 0];
    /// assert_eq!(3, utfstr::Utf16String::index(&units, 2));
    /// assert_eq!(4, utfstr::Utf16String::index(&units, 9));
    /// ```
    pub fn index(units: &[E::Unit], ix: usize) -> usize {
        let mut decoder = Decoder::<E>::with_mode(&units[..unit_length(units)], Mode::native());
        for _ in 0..ix {
            if decoder.decode() == EOF_SYMBOL {
                break;
            }
        }
        decoder.offset()
    }

    /// Native unit offset of code point `ix` in this string.
    pub fn offset_of(&self, ix: usize) -> usize {
        Self::index(self.as_units_with_nul(), ix)
    }

    /// Frees the buffer, leaving an empty string.
    pub fn reset(&mut self) {
        self.buf = Vec::new();
        self.codes = 0;
        self.units = 0;
    }

    /// Moves the contents out, leaving this string empty and unallocated.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Number of code points.
    #[inline]
    pub fn codes(&self) -> usize {
        self.codes
    }

    /// Number of native units, without the terminator.
    #[inline]
    pub fn units(&self) -> usize {
        self.units
    }

    /// Returns true if the string holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Allocated native units, terminator included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The native units, without the terminator.
    #[inline]
    pub fn as_units(&self) -> &[E::Unit] {
        self.buf.get(..self.units).unwrap_or(&[])
    }

    /// The native units followed by the zero terminator.
    ///
    /// An empty, unallocated string gives just the terminator.
    #[inline]
    pub fn as_units_with_nul(&self) -> &[E::Unit] {
        self.buf.get(..=self.units).unwrap_or(<E::Unit as NativeUnit>::TERMINATOR)
    }

    /// A decoder over the contents.
    #[inline]
    pub fn decoder(&self) -> Decoder<'_, E> {
        Decoder::with_mode(self.as_units(), Mode::native())
    }

    /// Decodes the contents into a standard string. Owned strings only ever
    /// hold scalar values, so nothing is lost.
    pub fn to_string_lossless(&self) -> String {
        let mut text = String::with_capacity(self.codes);
        text.extend(self.decoder().map(|symbol| char::from_u32(symbol).unwrap_or(char::REPLACEMENT_CHARACTER)));
        text
    }

    pub(crate) fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.decoder()
    }
}

impl UtfString<Utf8> {
    /// The contents as a `str`.
    ///
    /// ```
    /// let string = utfstr::Utf8String::try_from("caf\u{e9}").unwrap();
    /// assert_eq!("caf\u{e9}", string.as_str());
    /// ```
    pub fn as_str(&self) -> &str {
        from_utf8_slice(self.as_units(), "UTF-8 string holds invalid UTF-8")
    }
}

impl<E: Encoding> Default for UtfString<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoding> Clone for UtfString<E> {
    fn clone(&self) -> Self {
        UtfString { buf: self.buf.clone(), codes: self.codes, units: self.units }
    }
}

impl<E: Encoding> TryFrom<&str> for UtfString<E> {
    type Error = UtfError;

    fn try_from(text: &str) -> Result<Self, UtfError> {
        let mut string = Self::new();
        string.init(Decoder::<Utf8>::new(text.as_bytes()))?;
        Ok(string)
    }
}

impl<E: Encoding, F: Encoding> TryFrom<&UtfString<F>> for UtfString<E> {
    type Error = UtfError;

    fn try_from(other: &UtfString<F>) -> Result<Self, UtfError> {
        let mut string = Self::new();
        string.init(other.decoder())?;
        Ok(string)
    }
}
