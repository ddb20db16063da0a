//! Locale-independent string ordering.
//!
//! Every ordering decision in emitted output goes through [`byte_cmp`], so the
//! same IR produces the same bytes regardless of host locale.

use std::cmp::Ordering;

/// Compares two strings byte by byte; a strict prefix sorts first.
pub fn byte_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Stable sort of `items` by the key `name`, using [`byte_cmp`].
pub fn sort_by_name<T, F>(items: &mut [T], name: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| byte_cmp(name(a), name(b)));
}
