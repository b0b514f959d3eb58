use crate::prims::Encoding;
use crate::string::UtfString;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// Strings compare, order and hash by code point, so the same text is equal
// in every encoding.

impl<E: Encoding, F: Encoding> PartialEq<UtfString<F>> for UtfString<E> {
    fn eq(&self, other: &UtfString<F>) -> bool {
        self.codes() == other.codes() && self.symbols().eq(other.symbols())
    }
}
impl<E: Encoding> Eq for UtfString<E> {}

macro_rules! impl_str_peq {
    ($($other:ty),+) => {$(
        impl<E: Encoding> PartialEq<$other> for UtfString<E> {
            fn eq(&self, other: &$other) -> bool {
                self.symbols().eq(other.chars().map(u32::from))
            }
        }
        impl<E: Encoding> PartialEq<UtfString<E>> for $other {
            fn eq(&self, other: &UtfString<E>) -> bool {
                other == self
            }
        }
    )+};
}
impl_str_peq!(str, &str, String);

impl<E: Encoding, F: Encoding> PartialOrd<UtfString<F>> for UtfString<E> {
    fn partial_cmp(&self, other: &UtfString<F>) -> Option<Ordering> {
        Some(self.symbols().cmp(other.symbols()))
    }
}
impl<E: Encoding> Ord for UtfString<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbols().cmp(other.symbols())
    }
}

impl<E: Encoding> Hash for UtfString<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.codes());
        for symbol in self.symbols() {
            state.write_u32(symbol);
        }
    }
}

impl<E: Encoding> fmt::Debug for UtfString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossless())
    }
}

impl<E: Encoding> fmt::Display for UtfString<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossless())
    }
}

impl<E: Encoding> From<&UtfString<E>> for String {
    fn from(string: &UtfString<E>) -> String {
        string.to_string_lossless()
    }
}
impl<E: Encoding> From<UtfString<E>> for String {
    fn from(string: UtfString<E>) -> String {
        string.to_string_lossless()
    }
}

impl<E: Encoding> AsRef<[E::Unit]> for UtfString<E> {
    fn as_ref(&self) -> &[E::Unit] {
        self.as_units()
    }
}
