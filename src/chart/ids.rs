// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Identifier allocation for sections and links.
//!
//! Ids are issued from a monotonic counter per kind (`s1`, `s2`, ... for
//! sections, `l1`, `l2`, ... for links). Loading a chart seeds the counters
//! past every id already present, so a fresh id never collides with an
//! existing one and a removed id is never handed out again.

use super::model::{LinkId, SectionId, SongChart};

const SECTION_PREFIX: char = 's';
const LINK_PREFIX: char = 'l';

/// Monotonic id allocator
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_section: u64,
    next_link: u64,
}

impl IdAllocator {
    /// Create an allocator starting at 1
    pub fn new() -> Self {
        Self {
            next_section: 1,
            next_link: 1,
        }
    }

    /// Create an allocator that cannot collide with ids in `chart`
    pub fn seeded_from(chart: &SongChart) -> Self {
        let next_section = next_after(
            SECTION_PREFIX,
            chart.sections.iter().map(|s| s.id.as_str()),
        );
        let next_link = next_after(LINK_PREFIX, chart.links.iter().map(|l| l.id.as_str()));
        Self {
            next_section,
            next_link,
        }
    }

    /// Issue a fresh section id
    pub fn section(&mut self) -> SectionId {
        let id = SectionId(format!("{}{}", SECTION_PREFIX, self.next_section));
        self.next_section += 1;
        id
    }

    /// Issue a fresh link id
    pub fn link(&mut self) -> LinkId {
        let id = LinkId(format!("{}{}", LINK_PREFIX, self.next_link));
        self.next_link += 1;
        id
    }
}

/// First counter value greater than any `<prefix><n>` id in `ids`
fn next_after<'a>(prefix: char, ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
