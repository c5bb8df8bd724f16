//! This module derives the input equivalence classes used to key DFA
//! transition tables.
//!
//! All character sets mentioned by any pattern of a lexicon are collected in
//! the charset registry; the partitioner then computes the coarsest partition
//! of the alphabet such that every registered set is a union of partition
//! blocks. DFA transitions are keyed on the block (class) index instead of on
//! raw characters, which keeps the tables dense and small. The three anchor
//! symbols occupy reserved singleton classes in front of the character blocks.

use log::debug;
use rustc_hash::FxHashMap;

use super::{charset::char_succ, Anchor, CharSetRegistry, ClassID, SetID};

/// The class of the beginning-of-line anchor.
pub(crate) const BOL_CLASS: ClassID = ClassID::new(0);
/// The class of the end-of-line anchor.
pub(crate) const EOL_CLASS: ClassID = ClassID::new(1);
/// The class of the end-of-file anchor.
pub(crate) const EOF_CLASS: ClassID = ClassID::new(2);

const ANCHOR_CLASS_COUNT: usize = 3;

/// Returns the reserved class of an anchor symbol.
pub(crate) fn anchor_class(anchor: Anchor) -> ClassID {
    match anchor {
        Anchor::Bol => BOL_CLASS,
        Anchor::Eol => EOL_CLASS,
        Anchor::Eof => EOF_CLASS,
    }
}

/// Returns the anchor a reserved class stands for, if it is one.
pub(crate) fn anchor_of_class(class: ClassID) -> Option<Anchor> {
    match class {
        BOL_CLASS => Some(Anchor::Bol),
        EOL_CLASS => Some(Anchor::Eol),
        EOF_CLASS => Some(Anchor::Eof),
        _ => None,
    }
}

/// The character partition of a compiled lexicon.
#[derive(Debug, Clone, Default)]
pub(crate) struct CharPartition {
    /// Start of each elementary interval, sorted ascending. The first entry is
    /// always `'\0'`; interval `i` ends right before `bounds[i + 1]`.
    bounds: Vec<char>,
    /// The class of each elementary interval. Non-adjacent intervals with the
    /// same set-membership signature share one class.
    interval_classes: Vec<ClassID>,
    /// For every registered set, the sorted classes whose union it is.
    set_classes: Vec<Vec<ClassID>>,
    /// Total number of classes including the three anchor classes.
    class_count: usize,
}

impl CharPartition {
    /// Computes the partition from all sets in the registry.
    pub(crate) fn from_registry(registry: &CharSetRegistry) -> Self {
        let mut bounds: Vec<char> = vec!['\0'];
        for set in registry.sets() {
            for &(start, end) in set.ranges() {
                bounds.push(start);
                if let Some(next) = char_succ(end) {
                    bounds.push(next);
                }
            }
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut classes_by_signature: FxHashMap<Vec<SetID>, ClassID> = FxHashMap::default();
        let mut interval_classes = Vec::with_capacity(bounds.len());
        let mut set_classes = vec![Vec::new(); registry.len()];
        let mut next_class = ANCHOR_CLASS_COUNT as u32;

        for &start in bounds.iter() {
            // The interval is elementary, so membership at its start holds for
            // every character in it.
            let signature: Vec<SetID> = registry
                .sets()
                .iter()
                .enumerate()
                .filter(|(_, set)| set.contains(start))
                .map(|(index, _)| SetID::new(index as u32))
                .collect();
            let class = match classes_by_signature.get(&signature) {
                Some(&class) => class,
                None => {
                    let class = ClassID::new(next_class);
                    next_class += 1;
                    for &set_id in signature.iter() {
                        set_classes[set_id].push(class);
                    }
                    classes_by_signature.insert(signature, class);
                    class
                }
            };
            interval_classes.push(class);
        }

        let class_count = next_class as usize;
        debug!(
            "partitioned {} charsets into {} classes over {} intervals",
            registry.len(),
            class_count - ANCHOR_CLASS_COUNT,
            bounds.len()
        );

        Self {
            bounds,
            interval_classes,
            set_classes,
            class_count,
        }
    }

    /// Returns the class of a character.
    #[inline]
    pub(crate) fn class_of(&self, c: char) -> ClassID {
        let interval = self.bounds.partition_point(|&start| start <= c) - 1;
        self.interval_classes[interval]
    }

    /// Returns true if the given class is one of the blocks of the set.
    #[inline]
    pub(crate) fn set_contains_class(&self, set: SetID, class: ClassID) -> bool {
        self.set_classes[set].binary_search(&class).is_ok()
    }

    /// Returns the total number of classes, anchors included.
    #[inline]
    pub(crate) fn class_count(&self) -> usize {
        self.class_count
    }
}
