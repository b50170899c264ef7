// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page selection parsing ("1,3-5", "even", "odd").

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::error::{PdfpressError, Result};

/// A set of pages chosen by the user, resolved against a page count later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// Pages 2, 4, 6, ...
    Even,
    /// Pages 1, 3, 5, ...
    Odd,
    /// Explicit 1-based page ranges; a single page is a range of one.
    /// Ranges are clipped to the page count by [`PageSelection::resolve`].
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Parse user input.
    ///
    /// Tokens that are neither a number nor an `a-b` range are skipped with a
    /// warning, and a reversed range selects nothing. Input that is blank
    /// after trimming is an error.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PdfpressError::InvalidPageSelection(
                "no pages given".into(),
            ));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "even" => return Ok(Self::Even),
            "odd" => return Ok(Self::Odd),
            _ => {}
        }

        let mut pages = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                match (start.trim().parse::<u32>(), end.trim().parse::<u32>()) {
                    (Ok(start), Ok(end)) if start.max(1) <= end => pages.push(start.max(1)..=end),
                    (Ok(_), Ok(_)) => debug!(token = part, "reversed page range selects nothing"),
                    _ => warn!(token = part, "ignoring malformed page range"),
                }
            } else {
                match part.parse::<u32>() {
                    Ok(0) => warn!(token = part, "page numbers start at 1"),
                    Ok(page) => pages.push(page..=page),
                    Err(_) => warn!(token = part, "ignoring malformed page number"),
                }
            }
        }

        Ok(Self::Pages(pages))
    }

    /// Resolve to the 0-based page indices within `page_count`.
    pub fn resolve(&self, page_count: u32) -> BTreeSet<u32> {
        match self {
            Self::Even => (0..page_count).filter(|i| (i + 1) % 2 == 0).collect(),
            Self::Odd => (0..page_count).filter(|i| (i + 1) % 2 == 1).collect(),
            Self::Pages(ranges) => ranges
                .iter()
                .flat_map(|range| {
                    let end = (*range.end()).min(page_count);
                    (*range.start()).max(1)..=end
                })
                .map(|page| page - 1)
                .collect(),
        }
    }
}

impl std::str::FromStr for PageSelection {
    type Err = PdfpressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(selection: &str, count: u32) -> Vec<u32> {
        PageSelection::parse(selection)
            .unwrap()
            .resolve(count)
            .into_iter()
            .collect()
    }

    #[test]
    fn singles_and_ranges() {
        assert_eq!(indices("1,3-5", 10), vec![0, 2, 3, 4]);
    }

    #[test]
    fn even_and_odd() {
        assert_eq!(indices("even", 5), vec![1, 3]);
        assert_eq!(indices("ODD", 5), vec![0, 2, 4]);
    }

    #[test]
    fn out_of_range_pages_are_dropped() {
        assert_eq!(indices("2, 9, 4-12", 5), vec![1, 3, 4]);
    }

    #[test]
    fn malformed_tokens_are_ignored() {
        assert_eq!(indices("1,x,2-y,,3", 5), vec![0, 2]);
    }

    #[test]
    fn reversed_range_selects_nothing() {
        assert!(indices("5-3", 10).is_empty());
    }

    #[test]
    fn huge_ranges_are_clipped_to_the_document() {
        assert_eq!(indices("2-4000000000", 3), vec![1, 2]);
        assert_eq!(indices("1-4294967295, 4294967295", 2), vec![0, 1]);
        match PageSelection::parse("2-30000000").unwrap() {
            PageSelection::Pages(ranges) => assert_eq!(ranges, vec![2..=30_000_000]),
            other => panic!("unexpected selection {other:?}"),
        }
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(matches!(
            PageSelection::parse("   "),
            Err(PdfpressError::InvalidPageSelection(_))
        ));
    }
}
