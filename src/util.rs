use std::ops::{Bound, RangeBounds};

pub(crate) fn from<R: RangeBounds<usize>>(range: &R) -> usize {
    match range.start_bound() {
        Bound::Unbounded => 0,
        Bound::Included(x) => *x,
        Bound::Excluded(x) => x + 1,
    }
}

pub(crate) fn to<R: RangeBounds<usize>>(range: &R, max: usize) -> usize {
    match range.end_bound() {
        Bound::Unbounded => max,
        Bound::Included(x) => x + 1,
        Bound::Excluded(x) => *x,
    }
}

/// Split a string at an offset counted in UTF-16 code units.
///
/// Offsets past the end return the whole string on the left. An offset in the
/// middle of a surrogate pair is rounded down to the start of that character.
pub(crate) fn split_at_utf16(text: &str, mut index: usize) -> (&str, &str) {
    let mut iter = text.char_indices();
    while index > 0 {
        match iter.next() {
            Some((i, c)) => {
                let l = c.len_utf16();
                if l > index {
                    return text.split_at(i);
                }
                index -= l;
            }
            None => return (text, ""),
        }
    }
    let mid = iter.next().map_or(text.len(), |(i, _)| i);
    text.split_at(mid)
}

/// A type the holds a value of A or B or both.
pub(crate) enum EitherOrBoth<A, B> {
    /// Both values
    Both(A, B),
    /// Just a value of type A
    Left(A),
    /// Just a value of type B
    Right(B),
}

impl<A, B> EitherOrBoth<A, B> {
    /// Get the left value if present
    pub fn left(&self) -> Option<&A> {
        match self {
            Self::Both(a, _) => Some(a),
            Self::Left(a) => Some(a),
            Self::Right(_) => None,
        }
    }

    /// Get the right value if present
    pub fn right(&self) -> Option<&B> {
        match self {
            Self::Both(_, b) => Some(b),
            Self::Left(_) => None,
            Self::Right(b) => Some(b),
        }
    }
}

impl<T> EitherOrBoth<T, T> {
    /// Get the right value if present, and the left otherwise
    pub fn right_or_left(&self) -> &T {
        match self {
            Self::Left(a) => a,
            Self::Right(b) => b,
            Self::Both(_a, b) => b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::split_at_utf16;

    #[test]
    fn splits_by_utf16_units() {
        assert_eq!(split_at_utf16("hello", 2), ("he", "llo"));
        assert_eq!(split_at_utf16("hello", 9), ("hello", ""));
        assert_eq!(split_at_utf16("a\u{1F60A}b", 3), ("a\u{1F60A}", "b"));
        assert_eq!(split_at_utf16("a\u{1F60A}b", 2), ("a", "\u{1F60A}b"));
    }
}
