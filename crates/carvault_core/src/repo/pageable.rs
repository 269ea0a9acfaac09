//! Pagination primitives: page/size normalization and the result slice.
//!
//! # Responsibility
//! - Normalize externally supplied 1-based page parameters into the internal
//!   0-based `Pageable`.
//! - Define `Slice`, the page-of-results shape carrying the unpaginated
//!   total count.
//!
//! # Invariants
//! - A normalized `size` of exactly 0 means "unbounded": downstream query
//!   construction skips LIMIT/OFFSET entirely.
//! - `create_pageable` reproduces the historical fallback where an
//!   out-of-range size resets to the *page-number* default (0), not the size
//!   default. `create_pageable_clamped` is the corrected alternative.

use serde::{Deserialize, Serialize};

/// Page size used when none (or an unparsable one) is supplied.
pub const DEFAULT_PAGE_SIZE: i64 = 5;
/// Upper bound for an accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;
/// 0-based index of the first page.
pub const DEFAULT_PAGE_NUMBER: i64 = 0;

/// Normalized pagination window. `number` is the 0-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    pub number: i64,
    pub size: i64,
}

/// One page of results plus the total match count for the same filter,
/// ignoring the page window.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
}

/// Builds a `Pageable` from raw request parameters, faithful to the
/// historical contract.
///
/// - `number` is 1-based externally; it is parsed as an integer and shifted
///   down by one. A missing or unparsable value, or a negative result, falls
///   back to page index 0.
/// - `size` falls back to `DEFAULT_PAGE_SIZE` when missing or unparsable. A
///   parsed size outside `[1, MAX_PAGE_SIZE]` falls back to
///   `DEFAULT_PAGE_NUMBER`, the page-index constant, which downstream means
///   "unbounded". An explicit size of 0 lands on the same value, so "return
///   everything" stays expressible.
pub fn create_pageable(number: Option<&str>, size: Option<&str>) -> Pageable {
    let number = match parse_i64(number) {
        Some(parsed) => {
            let shifted = parsed - 1;
            if shifted < 0 {
                DEFAULT_PAGE_NUMBER
            } else {
                shifted
            }
        }
        None => DEFAULT_PAGE_NUMBER,
    };

    let size = match parse_i64(size) {
        Some(parsed) => {
            if parsed < 1 || parsed > MAX_PAGE_SIZE {
                DEFAULT_PAGE_NUMBER
            } else {
                parsed
            }
        }
        None => DEFAULT_PAGE_SIZE,
    };

    Pageable { number, size }
}

/// Corrected normalization: an out-of-range size resets to
/// `DEFAULT_PAGE_SIZE` instead of the page-index constant.
///
/// An explicit size of 0 still means "unbounded" and is kept distinct from
/// the invalid-size fallback.
pub fn create_pageable_clamped(number: Option<&str>, size: Option<&str>) -> Pageable {
    let faithful = create_pageable(number, size);

    let size = match parse_i64(size) {
        Some(0) => 0,
        Some(parsed) if parsed < 1 || parsed > MAX_PAGE_SIZE => DEFAULT_PAGE_SIZE,
        Some(parsed) => parsed,
        None => DEFAULT_PAGE_SIZE,
    };

    Pageable {
        number: faithful.number,
        size,
    }
}

fn parse_i64(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_both_parameters_are_missing() {
        let pageable = create_pageable(None, None);
        assert_eq!(pageable.number, DEFAULT_PAGE_NUMBER);
        assert_eq!(pageable.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_number_is_shifted_to_zero_based() {
        assert_eq!(create_pageable(Some("1"), None).number, 0);
        assert_eq!(create_pageable(Some("3"), None).number, 2);
    }

    #[test]
    fn unparsable_or_negative_page_number_falls_back_to_first_page() {
        assert_eq!(create_pageable(Some("abc"), None).number, 0);
        assert_eq!(create_pageable(Some("1.5"), None).number, 0);
        assert_eq!(create_pageable(Some("0"), None).number, 0);
        assert_eq!(create_pageable(Some("-4"), None).number, 0);
    }

    #[test]
    fn unparsable_size_falls_back_to_default_size() {
        assert_eq!(create_pageable(None, Some("lots")).size, DEFAULT_PAGE_SIZE);
        assert_eq!(create_pageable(None, Some("2.5")).size, DEFAULT_PAGE_SIZE);
    }

    // Historical quirk kept on purpose: out-of-range sizes reset to the
    // page-number constant (0), which downstream means "unbounded".
    #[test]
    fn out_of_range_size_resets_to_page_number_constant() {
        assert_eq!(create_pageable(None, Some("101")).size, DEFAULT_PAGE_NUMBER);
        assert_eq!(create_pageable(None, Some("-1")).size, DEFAULT_PAGE_NUMBER);
    }

    #[test]
    fn explicit_zero_size_stays_zero_meaning_unbounded() {
        assert_eq!(create_pageable(None, Some("0")).size, 0);
        assert_eq!(create_pageable_clamped(None, Some("0")).size, 0);
    }

    #[test]
    fn in_range_size_is_kept() {
        assert_eq!(create_pageable(None, Some("1")).size, 1);
        assert_eq!(create_pageable(None, Some("100")).size, 100);
    }

    #[test]
    fn clamped_variant_resets_out_of_range_size_to_default_size() {
        assert_eq!(
            create_pageable_clamped(None, Some("101")).size,
            DEFAULT_PAGE_SIZE
        );
        assert_eq!(
            create_pageable_clamped(None, Some("-1")).size,
            DEFAULT_PAGE_SIZE
        );
        assert_eq!(create_pageable_clamped(Some("2"), Some("20")).number, 1);
        assert_eq!(create_pageable_clamped(Some("2"), Some("20")).size, 20);
    }
}
