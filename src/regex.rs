//! Regex backend selection.
//!
//! The full `regex` crate is used by default; the `lite` feature swaps in
//! `regex-lite` for smaller binaries.

#[cfg(all(feature = "lite", not(feature = "regex")))]
pub(crate) use regex_lite::Regex;

#[cfg(feature = "regex")]
pub(crate) use regex::Regex;

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("enable either the `regex` or the `lite` feature");
