macro_rules! impl_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub(crate) struct $name(u32);

        impl $name {
            /// Create a new id.
            #[inline]
            pub(crate) const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the id as usize, e.g. for indexing.
            #[allow(dead_code)]
            #[inline]
            pub(crate) fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Get the raw id.
            #[allow(dead_code)]
            #[inline]
            pub(crate) fn id(&self) -> u32 {
                self.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                $name::new(index)
            }
        }
    };
}

impl_id!(
    StateID,
    "The ID type for automaton states. Used in both the NFA and the DFA."
);

impl_id!(
    SetID,
    "The ID type for character sets. The index of a set in the charset registry."
);

impl_id!(
    ClassID,
    "The ID type for input equivalence classes derived by the partitioner. \
     The first three classes are reserved for the BOL, EOL and EOF anchors."
);

impl_id!(
    RuleID,
    "The ID type for lexicon rules. The index of a rule within its scanner \
     state, which doubles as the rule's priority: lower ids win ties."
);

impl_id!(
    ModeID,
    "The ID type for scanner states. The index of a state in the compiled \
     lexicon; the default state `\"\"` is always index 0."
);
