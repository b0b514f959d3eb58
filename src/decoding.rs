use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::encoding::Encoder;
use crate::error::UtfError;
use crate::prims::{Encoding, Utf16, Utf32, Utf8};
use crate::unicode::{is_combining, unit_length, Symbol, EOF_SYMBOL};
use crate::Mode;

/// Anything that yields symbols one at a time, ending with [`EOF_SYMBOL`].
pub trait SymbolSource {
    /// Returns the next symbol and moves past it, or [`EOF_SYMBOL`] once exhausted.
    fn decode(&mut self) -> Symbol;
}

/// A UTF-8 decoder.
pub type Utf8Decoder<'a> = Decoder<'a, Utf8>;
/// A UTF-16 decoder.
pub type Utf16Decoder<'a> = Decoder<'a, Utf16>;
/// A UTF-32 decoder.
pub type Utf32Decoder<'a> = Decoder<'a, Utf32>;

/// A read cursor over borrowed native units of encoding `E`.
///
/// The cursor tracks three things: the unit `offset` of the next symbol, the
/// `column` of the last decoded symbol, and the byte order `mode`. Decoding
/// never fails; see the crate documentation for how malformed input and byte
/// order marks are handled.
pub struct Decoder<'a, E: Encoding> {
    buffer: &'a [E::Unit],
    offset: usize,
    /// Units taken by a consumed byte order mark, 0 or 1.
    origin: usize,
    column: Option<usize>,
    mode: Mode,
    _encoding: PhantomData<E>,
}

impl<'a, E: Encoding> Decoder<'a, E> {
    /// Creates a decoder over `units`, detecting the byte order from a leading mark.
    pub fn new(units: &'a [E::Unit]) -> Self {
        Self::with_mode(units, Mode::Unresolved)
    }

    /// Creates a decoder over `units` stored in the given byte order.
    ///
    /// With a resolved `mode`, a leading `U+FEFF` is decoded as data.
    pub fn with_mode(units: &'a [E::Unit], mode: Mode) -> Self {
        Decoder {
            buffer: units,
            offset: 0,
            origin: 0,
            column: None,
            mode,
            _encoding: PhantomData,
        }
    }

    /// Creates a decoder over a nul-terminated string. The terminator and
    /// anything after it are excluded.
    ///
    /// ```
    /// let units = [0x0041u16.to_be(), 0x0042u16.to_be(), 0, 0x0043u16.to_be()];
    /// let decoder = utfstr::Utf16Decoder::from_terminated(&units);
    /// assert_eq!(2, decoder.len());
    /// assert_eq!(2, decoder.symbol_count());
    /// ```
    pub fn from_terminated(units: &'a [E::Unit]) -> Self {
        Self::new(&units[..unit_length(units)])
    }

    /// Creates a decoder over everything `encoder` wrote so far.
    ///
    /// A byte order mark the encoder wrote at its head is detected and skipped.
    pub fn from_encoder(encoder: &'a Encoder<'_, E>) -> Self {
        Self::from_written(encoder.written(), encoder.mode())
    }

    pub(crate) fn from_written(written: &'a [E::Unit], mode: Mode) -> Self {
        let mode = match written.first().copied().and_then(E::detect) {
            Some(marked) if marked == mode => Mode::Unresolved,
            _ => mode,
        };
        Self::with_mode(written, mode)
    }

    /// Returns the decoder to the start of its buffer, with the byte order unresolved.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.origin = 0;
        self.column = None;
        self.mode = Mode::Unresolved;
    }

    /// Replaces the buffer, and restarts in `mode`.
    pub fn reset_with(&mut self, units: &'a [E::Unit], mode: Mode) {
        self.buffer = units;
        self.reset();
        self.mode = mode;
    }

    /// Forces the byte order, disabling byte order mark detection.
    /// [`Mode::Unresolved`] turns detection back on.
    ///
    /// Fails with [`UtfError::ModeLocked`] once decoding started.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), UtfError> {
        if self.offset != 0 || self.column.is_some() {
            return Err(UtfError::ModeLocked { offset: self.offset });
        }
        self.mode = mode;
        self.origin = 0;
        Ok(())
    }

    /// The byte order, which stays [`Mode::Unresolved`] until the first decode
    /// unless it was forced.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Native unit offset of the next symbol.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Column of the most recently decoded symbol, `None` before the first
    /// decode or after repositioning by symbol or offset.
    #[inline]
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// Total native units, including any byte order mark.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if there are no units at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The underlying units, in their stored byte order.
    #[inline]
    pub fn as_units(&self) -> &'a [E::Unit] {
        self.buffer
    }

    /// Units taken by a consumed byte order mark.
    #[inline]
    pub(crate) fn origin(&self) -> usize {
        self.origin
    }

    fn detect(&self) -> (Mode, usize) {
        match self.buffer.first().copied().and_then(E::detect) {
            Some(mode) => (mode, 1),
            None => (Mode::BigEndian, 0),
        }
    }

    /// The mode and origin in effect, without committing an unresolved mode.
    fn resolved(&self) -> (Mode, usize) {
        if E::HAS_BOM && !self.mode.is_resolved() {
            self.detect()
        } else {
            (self.mode, self.origin)
        }
    }

    fn resolve(&mut self) {
        if E::HAS_BOM && !self.mode.is_resolved() {
            let (mode, origin) = self.detect();
            log::trace!("{} decoder resolved {} byte order, origin {}", E::NAME, mode.name(), origin);
            self.mode = mode;
            self.origin = origin;
            self.offset = self.offset.max(origin);
        }
    }

    /// Back to the first symbol, keeping the resolved byte order.
    pub(crate) fn rewind(&mut self) {
        self.resolve();
        self.offset = self.origin;
        self.column = None;
    }

    /// Returns the symbol at the cursor without moving, or [`EOF_SYMBOL`] at the end.
    pub fn current(&self) -> Symbol {
        let (mode, origin) = self.resolved();
        let offset = self.offset.max(origin);
        if offset >= self.buffer.len() {
            return EOF_SYMBOL;
        }
        E::read(self.buffer, offset, mode).0
    }

    /// Returns true if the symbol at the cursor is a combining mark.
    #[inline]
    pub fn current_is_combining(&self) -> bool {
        is_combining(self.current())
    }

    /// Returns the symbol at the cursor and moves past it, or [`EOF_SYMBOL`] at the end.
    pub fn decode(&mut self) -> Symbol {
        self.resolve();
        if self.offset >= self.buffer.len() {
            return EOF_SYMBOL;
        }

        let (symbol, width) = E::read(self.buffer, self.offset, self.mode);
        self.offset += width;
        if !is_combining(symbol) || self.column.is_none() {
            self.column = Some(self.column.map_or(0, |c| c + 1));
        }
        symbol
    }

    /// Number of code points in the whole buffer, not counting a byte order mark.
    pub fn symbol_count(&self) -> usize {
        let mut scan = self.clone();
        scan.rewind();
        let mut count = 0;
        while scan.decode() != EOF_SYMBOL {
            count += 1;
        }
        count
    }

    /// Number of columns in the whole buffer.
    pub fn column_count(&self) -> usize {
        let mut scan = self.clone();
        scan.rewind();
        while scan.decode() != EOF_SYMBOL {}
        scan.column.map_or(0, |c| c + 1)
    }

    /// Decodes from the first symbol up to and including the base character
    /// of column `col`, exactly as repeated decodes would. Its combining
    /// marks, if any, come next.
    ///
    /// Returns 0, or if there is no such column, how many columns short the
    /// buffer is; the cursor is then left at the end.
    ///
    /// ```
    /// let text = "e\u{301}ta\u{300}";
    /// let mut decoder = utfstr::Utf8Decoder::new(text.as_bytes());
    /// assert_eq!(0, decoder.set_column_index(2));
    /// assert_eq!(Some(2), decoder.column());
    /// assert_eq!(0x300, decoder.decode());
    /// assert_eq!(Some(2), decoder.column());
    /// assert_eq!(2, decoder.set_column_index(4));
    /// ```
    pub fn set_column_index(&mut self, col: usize) -> usize {
        self.rewind();
        loop {
            if self.decode() == EOF_SYMBOL {
                // every column below `col` was seen, so `col >= clusters`
                let clusters = self.column.map_or(0, |c| c + 1);
                return (col - clusters).saturating_add(1);
            }
            if self.column == Some(col) {
                return 0;
            }
        }
    }

    /// Moves to code point `ix`, clearing the column.
    ///
    /// Returns 0, or how many symbols past the end `ix` is.
    pub fn set_symbol_index(&mut self, ix: usize) -> usize {
        self.rewind();
        for n in 0..ix {
            if self.decode() == EOF_SYMBOL {
                self.column = None;
                return ix - n;
            }
        }
        self.column = None;
        0
    }

    /// Moves to native unit offset `off`, clearing the column. Offsets inside
    /// a byte order mark are moved past it.
    ///
    /// Landing inside a multi-unit sequence is allowed: the next decode
    /// returns `U+FFFD`. Returns 0, or how many units past the end `off` is.
    pub fn set_offset(&mut self, off: usize) -> usize {
        self.resolve();
        self.column = None;
        let off = off.max(self.origin);
        if off <= self.buffer.len() {
            self.offset = off;
            0
        } else {
            self.offset = self.buffer.len();
            off - self.buffer.len()
        }
    }

    /// Returns a decoder over just the column at the cursor: the symbol there
    /// and the combining marks following it.
    ///
    /// ```
    /// let text = "e\u{301}\u{302}t";
    /// let decoder = utfstr::Utf8Decoder::new(text.as_bytes());
    /// let cluster = decoder.copy_column();
    /// assert_eq!(3, cluster.symbol_count());
    /// assert_eq!("e\u{301}\u{302}".as_bytes(), cluster.as_units());
    /// ```
    pub fn copy_column(&self) -> Self {
        let mut scan = self.clone();
        scan.resolve();
        let start = scan.offset;
        scan.decode();
        while scan.current_is_combining() {
            scan.decode();
        }
        Self::with_mode(&self.buffer[start..scan.offset], scan.mode)
    }
}

impl<E: Encoding> Clone for Decoder<'_, E> {
    fn clone(&self) -> Self {
        Decoder {
            buffer: self.buffer,
            offset: self.offset,
            origin: self.origin,
            column: self.column,
            mode: self.mode,
            _encoding: PhantomData,
        }
    }
}

impl<E: Encoding> fmt::Debug for Decoder<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("encoding", &E::NAME)
            .field("column", &self.column)
            .field("offset", &self.offset)
            .field("length", &self.buffer.len())
            .field("mode", &self.mode.name())
            .finish()
    }
}

impl<E: Encoding> SymbolSource for Decoder<'_, E> {
    #[inline]
    fn decode(&mut self) -> Symbol {
        Decoder::decode(self)
    }
}

impl<E: Encoding> Iterator for Decoder<'_, E> {
    type Item = Symbol;

    #[inline]
    fn next(&mut self) -> Option<Symbol> {
        match self.decode() {
            EOF_SYMBOL => None,
            symbol => Some(symbol),
        }
    }
}

impl<E: Encoding> FusedIterator for Decoder<'_, E> {}

/// A decoder of any of the three encodings.
///
/// Owned strings are built from one of these, so they can be initialized
/// from any decoder (or encoder) without being generic over its encoding.
#[derive(Debug, Clone)]
pub enum SymbolCursor<'s> {
    /// UTF-8 source.
    Utf8(Utf8Decoder<'s>),
    /// UTF-16 source.
    Utf16(Utf16Decoder<'s>),
    /// UTF-32 source.
    Utf32(Utf32Decoder<'s>),
}

impl SymbolCursor<'_> {
    pub(crate) fn rewind(&mut self) {
        match self {
            SymbolCursor::Utf8(d) => d.rewind(),
            SymbolCursor::Utf16(d) => d.rewind(),
            SymbolCursor::Utf32(d) => d.rewind(),
        }
    }
}

impl SymbolSource for SymbolCursor<'_> {
    fn decode(&mut self) -> Symbol {
        match self {
            SymbolCursor::Utf8(d) => d.decode(),
            SymbolCursor::Utf16(d) => d.decode(),
            SymbolCursor::Utf32(d) => d.decode(),
        }
    }
}

macro_rules! impl_cursor_from {
    ($($variant:ident),+) => {$(
        impl<'s> From<Decoder<'s, $variant>> for SymbolCursor<'s> {
            fn from(decoder: Decoder<'s, $variant>) -> Self {
                SymbolCursor::$variant(decoder)
            }
        }
        impl<'s> From<&Decoder<'s, $variant>> for SymbolCursor<'s> {
            fn from(decoder: &Decoder<'s, $variant>) -> Self {
                SymbolCursor::$variant(decoder.clone())
            }
        }
        impl<'s> From<&'s Encoder<'_, $variant>> for SymbolCursor<'s> {
            fn from(encoder: &'s Encoder<'_, $variant>) -> Self {
                SymbolCursor::$variant(Decoder::from_encoder(encoder))
            }
        }
    )+};
}
impl_cursor_from!(Utf8, Utf16, Utf32);

impl<'s> From<&'s str> for SymbolCursor<'s> {
    fn from(text: &'s str) -> Self {
        SymbolCursor::Utf8(Decoder::new(text.as_bytes()))
    }
}

/// Decodes a slice known to hold valid UTF-8, checking it only in debug builds.
#[inline]
#[track_caller]
pub(crate) fn from_utf8_slice<'s>(by: &'s [u8], expect_msg: &'_ str) -> &'s str {
    if cfg!(debug_assertions) {
        std::str::from_utf8(by).expect(expect_msg)
    } else {
        // SAFETY: callers only pass bytes produced by the UTF-8 encoder
        unsafe { std::str::from_utf8_unchecked(by) }
    }
}
