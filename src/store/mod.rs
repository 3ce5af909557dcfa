//! In-memory representation of the horoscope cache
//!
//! The store is a typed nested mapping `Source -> Style -> RelativeDay ->
//! DayEntry`, where a [`DayEntry`] records the absolute date a slot holds
//! and the text for each of the twelve signs. Indexing is by enum, never by
//! free-form string. Shape invariant: for every supported (Source, Style)
//! pair all three day slots exist and each carries all twelve signs; the
//! write accessors re-establish this on every mutation.
//!
//! Readers only ever call [`CacheStore::get`]; mutation is reserved for the
//! synchronizer and the seeding path.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::{RelativeDay, Sign, Source, Style};

/// A single horoscope as served to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Horoscope {
    /// Source the text came from
    pub source: Source,
    /// Style actually served (may differ from the requested one, see
    /// [`Source::supported_style`])
    pub style: Style,
    /// Relative day slot
    pub day: RelativeDay,
    /// Zodiac sign
    pub sign: Sign,
    /// Absolute date of the slot, if the slot has ever been fetched
    pub date: Option<NaiveDate>,
    /// Horoscope text; empty if the last fetch for this sign failed
    pub text: String,
}

/// One relative-day slot: its absolute date and the per-sign texts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// The absolute date this slot's content is for; `None` until the slot
    /// has been fetched successfully at least once
    pub date: Option<NaiveDate>,
    /// Horoscope text per sign
    pub signs: BTreeMap<Sign, String>,
}

impl DayEntry {
    /// Creates a dateless entry with all twelve signs present and empty
    pub fn empty() -> Self {
        let mut entry = DayEntry::default();
        entry.fill_missing_signs();
        entry
    }

    /// Inserts empty text for any sign not present
    fn fill_missing_signs(&mut self) {
        for sign in Sign::ALL {
            self.signs.entry(sign).or_default();
        }
    }
}

/// The day slots of one (Source, Style) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleBlock {
    /// Day slot -> entry
    pub days: BTreeMap<RelativeDay, DayEntry>,
}

impl StyleBlock {
    /// Creates a block with all three day slots empty
    pub fn empty() -> Self {
        let mut block = StyleBlock::default();
        block.normalize();
        block
    }

    /// Re-establishes the shape invariant on every slot
    fn normalize(&mut self) {
        for day in RelativeDay::ALL {
            self.days.entry(day).or_insert_with(DayEntry::empty);
        }
        for entry in self.days.values_mut() {
            entry.fill_missing_signs();
        }
    }

    /// Copies one day slot onto another without refetching
    ///
    /// Used by the synchronizer's rotation step; the source slot is left
    /// untouched.
    pub fn copy_day(&mut self, from: RelativeDay, to: RelativeDay) {
        if let Some(entry) = self.days.get(&from).cloned() {
            self.days.insert(to, entry);
        }
    }

    /// Replaces one day slot, re-establishing the sign shape
    pub fn put_day(&mut self, day: RelativeDay, mut entry: DayEntry) {
        entry.fill_missing_signs();
        self.days.insert(day, entry);
    }

    /// The recorded date of a day slot
    pub fn day_date(&self, day: RelativeDay) -> Option<NaiveDate> {
        self.days.get(&day).and_then(|entry| entry.date)
    }
}

/// The full nested cache structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStore {
    /// Source -> Style -> day slots
    pub sources: BTreeMap<Source, BTreeMap<Style, StyleBlock>>,
}

impl CacheStore {
    /// Creates a store with every supported slot present and empty
    pub fn with_shape() -> Self {
        let mut store = CacheStore::default();
        store.normalize();
        store
    }

    /// Re-establishes the full shape invariant
    pub fn normalize(&mut self) {
        for source in Source::ALL {
            let styles = self.sources.entry(source).or_default();
            for &style in source.styles() {
                styles.entry(style).or_insert_with(StyleBlock::empty);
            }
            for block in styles.values_mut() {
                block.normalize();
            }
        }
    }

    /// Reads a horoscope from the store
    ///
    /// Falls back to the source's default style when the requested style is
    /// not supported. Returns `None` only if the store shape is broken,
    /// which indicates a logic bug in the mutation path.
    pub fn get(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        sign: Sign,
    ) -> Option<Horoscope> {
        let style = source.supported_style(style);
        let entry = self.sources.get(&source)?.get(&style)?.days.get(&day)?;
        let text = entry.signs.get(&sign)?.clone();
        Some(Horoscope {
            source,
            style,
            day,
            sign,
            date: entry.date,
            text,
        })
    }

    /// Borrows the block for a (Source, Style) pair
    ///
    /// The style is clamped to one the source supports.
    pub fn style_block(&self, source: Source, style: Style) -> Option<&StyleBlock> {
        let style = source.supported_style(style);
        self.sources.get(&source)?.get(&style)
    }

    /// Replaces the whole block for a (Source, Style) pair
    ///
    /// This is the synchronizer's swap point: a fully built replacement
    /// block goes in atomically with respect to readers holding the store
    /// lock.
    pub fn put_style_block(&mut self, source: Source, style: Style, mut block: StyleBlock) {
        let style = source.supported_style(style);
        block.normalize();
        self.sources.entry(source).or_default().insert(style, block);
    }

    /// Replaces a single day slot
    pub fn put_day(&mut self, source: Source, style: Style, day: RelativeDay, entry: DayEntry) {
        let style = source.supported_style(style);
        let styles = self.sources.entry(source).or_default();
        let block = styles.entry(style).or_insert_with(StyleBlock::empty);
        block.put_day(day, entry);
    }

    /// The date recorded in the tomorrow slot of a (Source, Style) pair
    pub fn tomorrow_date(&self, source: Source, style: Style) -> Option<NaiveDate> {
        self.style_block(source, style)?.day_date(RelativeDay::Tomorrow)
    }

    /// True if every supported slot exists with all twelve signs
    ///
    /// This is the externally observable steady-state invariant; partial
    /// population is only ever a transient mid-repair state inside the
    /// synchronizer.
    pub fn is_fully_populated(&self) -> bool {
        Source::ALL.iter().all(|&source| {
            source.styles().iter().all(|&style| {
                self.style_block(source, style).is_some_and(|block| {
                    RelativeDay::ALL.iter().all(|day| {
                        block
                            .days
                            .get(day)
                            .is_some_and(|entry| entry.signs.len() == Sign::ALL.len())
                    })
                })
            })
        })
    }

    /// True if no slot has ever been fetched
    pub fn is_unfetched(&self) -> bool {
        self.sources
            .values()
            .flat_map(|styles| styles.values())
            .flat_map(|block| block.days.values())
            .all(|entry| entry.date.is_none())
    }
}
