use std::fmt;
use std::marker::PhantomData;

use crate::decoding::{Decoder, SymbolSource};
use crate::error::{Overflow, UtfError};
use crate::prims::{Encoding, Utf16, Utf32, Utf8};
use crate::unicode::{is_combining, is_unicode, Symbol, BYTE_ORDER_MARK, EOF_SYMBOL, REPLACEMENT};
use crate::Mode;

/// Anything that accepts symbols one at a time.
pub trait SymbolSink {
    /// Writes `symbol`, returning the number of native units it took.
    fn encode(&mut self, symbol: Symbol) -> Result<usize, Overflow>;
}

/// A UTF-8 encoder.
pub type Utf8Encoder<'a> = Encoder<'a, Utf8>;
/// A UTF-16 encoder.
pub type Utf16Encoder<'a> = Encoder<'a, Utf16>;
/// A UTF-32 encoder.
pub type Utf32Encoder<'a> = Encoder<'a, Utf32>;

/// A write cursor over a caller-supplied buffer of encoding `E`.
///
/// Encoders substitute `U+FFFD` for symbols that aren't scalar values, and
/// never write part of a symbol: when the buffer is too small for the next
/// one, they return [`Overflow`] and leave everything already written alone.
pub struct Encoder<'a, E: Encoding> {
    buffer: &'a mut [E::Unit],
    offset: usize,
    column: Option<usize>,
    mode: Mode,
    _encoding: PhantomData<E>,
}

impl<'a, E: Encoding> Encoder<'a, E> {
    /// Creates an encoder writing to `buffer`. UTF-16 and UTF-32 default to
    /// big endian once something is written.
    pub fn new(buffer: &'a mut [E::Unit]) -> Self {
        Self::with_mode(buffer, Mode::Unresolved)
    }

    /// Creates an encoder writing to `buffer` in the given byte order.
    pub fn with_mode(buffer: &'a mut [E::Unit], mode: Mode) -> Self {
        Encoder {
            buffer,
            offset: 0,
            column: None,
            mode,
            _encoding: PhantomData,
        }
    }

    /// Starts over at the head of the buffer. The byte order is kept.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.column = None;
    }

    /// Starts over on a new buffer, in `mode`.
    pub fn reset_with(&mut self, buffer: &'a mut [E::Unit], mode: Mode) {
        self.buffer = buffer;
        self.reset();
        self.mode = mode;
    }

    /// Sets the byte order. Fails with [`UtfError::ModeLocked`] once anything was written.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), UtfError> {
        if self.offset != 0 {
            return Err(UtfError::ModeLocked { offset: self.offset });
        }
        self.mode = mode;
        Ok(())
    }

    /// The byte order units are written in.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Native units written so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Column of the most recently written symbol.
    #[inline]
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// Size of the buffer, in native units.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Native units still free.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// The units written so far, in the encoder's byte order.
    #[inline]
    pub fn written(&self) -> &[E::Unit] {
        &self.buffer[..self.offset]
    }

    /// Gives up the buffer, returning a decoder over what was written.
    pub fn into_decoder(self) -> Decoder<'a, E> {
        let Encoder { buffer, offset, mode, .. } = self;
        let buffer: &'a [E::Unit] = buffer;
        Decoder::from_written(&buffer[..offset], mode)
    }

    /// Encodes one symbol.
    ///
    /// A byte order mark written first thing is a mark, not a character, and
    /// doesn't open a column.
    ///
    /// ```
    /// let mut units = [0u16; 2];
    /// let mut encoder = utfstr::Utf16Encoder::new(&mut units);
    /// assert_eq!(Ok(1), encoder.encode('a' as u32));
    /// assert!(encoder.encode(0x1F600).is_err()); // needs a surrogate pair
    /// assert_eq!(Ok(1), encoder.encode(0xD800)); // written as U+FFFD
    /// assert_eq!(2, encoder.offset());
    /// ```
    pub fn encode(&mut self, symbol: Symbol) -> Result<usize, Overflow> {
        let code = if is_unicode(symbol) { symbol } else { REPLACEMENT };
        let mode = if E::HAS_BOM && !self.mode.is_resolved() { Mode::BigEndian } else { self.mode };

        let available = self.buffer.len() - self.offset;
        let Some(width) = E::write(code, &mut self.buffer[self.offset..], mode) else {
            return Err(Overflow { offset: self.offset, needed: E::width(code), available });
        };
        self.mode = mode;

        let mark = E::HAS_BOM && code == BYTE_ORDER_MARK && self.offset == 0 && self.column.is_none();
        self.offset += width;
        if !mark && (!is_combining(code) || self.column.is_none()) {
            self.column = Some(self.column.map_or(0, |c| c + 1));
        }
        Ok(width)
    }

    /// Replaces the contents with everything `source` holds, from its first
    /// symbol regardless of where its cursor is. `source` isn't moved.
    ///
    /// Returns the units now in the buffer. On [`Overflow`], the symbols
    /// that fit are kept.
    ///
    /// A byte order mark consumed by a UTF-16 or UTF-32 source is carried
    /// over to a UTF-16 or UTF-32 destination, which takes on the source's
    /// byte order if it hadn't got one. UTF-8 never gets a mark.
    pub fn assign<F: Encoding>(&mut self, source: &Decoder<'_, F>) -> Result<usize, Overflow> {
        self.reset();
        let mut copy = source.clone();
        copy.rewind();

        if E::HAS_BOM && F::HAS_BOM && copy.origin() != 0 {
            if !self.mode.is_resolved() {
                self.mode = copy.mode();
            }
            self.encode(BYTE_ORDER_MARK)?;
        }

        transcode(&mut copy, self)?;
        Ok(self.offset)
    }
}

impl<E: Encoding> SymbolSink for Encoder<'_, E> {
    #[inline]
    fn encode(&mut self, symbol: Symbol) -> Result<usize, Overflow> {
        Encoder::encode(self, symbol)
    }
}

impl<E: Encoding> fmt::Debug for Encoder<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("encoding", &E::NAME)
            .field("column", &self.column)
            .field("offset", &self.offset)
            .field("length", &self.buffer.len())
            .field("mode", &self.mode.name())
            .finish()
    }
}

/// Moves symbols from `source` to `sink` until the source is exhausted,
/// returning the native units written.
///
/// Starts wherever `source` currently is. On [`Overflow`], the symbol that
/// didn't fit has already been taken from `source`.
///
/// ```
/// use utfstr::{transcode, Utf8Decoder, Utf32Encoder, Mode};
///
/// let mut decoder = Utf8Decoder::new("héllo".as_bytes());
/// decoder.decode();
///
/// let mut units = [0u32; 8];
/// let mut encoder = Utf32Encoder::with_mode(&mut units, Mode::native());
/// assert_eq!(Ok(4), transcode(&mut decoder, &mut encoder));
/// assert_eq!(&['é' as u32, 'l' as u32, 'l' as u32, 'o' as u32], encoder.written());
/// ```
pub fn transcode<S, K>(source: &mut S, sink: &mut K) -> Result<usize, Overflow>
where
    S: SymbolSource + ?Sized,
    K: SymbolSink + ?Sized,
{
    let mut written = 0;
    loop {
        let symbol = source.decode();
        if symbol == EOF_SYMBOL {
            return Ok(written);
        }
        written += sink.encode(symbol)?;
    }
}
