use thiserror::Error;

/// An encoder ran out of room in its destination buffer.
///
/// Nothing of the symbol that didn't fit was written; everything encoded
/// before it is intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("encoding overflow at unit {offset}: needed {needed} unit(s), {available} available")]
pub struct Overflow {
    /// Encoder offset when the write was attempted.
    pub offset: usize,
    /// Units the symbol needed.
    pub needed: usize,
    /// Units that were left.
    pub available: usize,
}

/// Errors from encoders and owned strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UtfError {
    /// See [`Overflow`].
    #[error(transparent)]
    Overflow(#[from] Overflow),

    /// The buffer for an owned string couldn't be allocated. The string was not modified.
    #[error("unable to allocate {units} units")]
    OutOfMemory {
        /// Units requested, including the terminator.
        units: usize,
    },

    /// The byte order can't be changed once decoding or encoding started.
    #[error("mode change refused, already at offset {offset}")]
    ModeLocked {
        /// Cursor offset at the time of the request.
        offset: usize,
    },
}
