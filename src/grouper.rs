// 🧺 Grouper - adjacent-run grouping
// Emits a group every time the key changes between neighbouring items. The
// input is never re-sorted, so equal keys that are not adjacent end up in
// separate groups.

use std::iter::Peekable;

pub struct GroupAdjacent<I, F>
where
    I: Iterator,
{
    items: Peekable<I>,
    key: F,
}

impl<I, F, K> Iterator for GroupAdjacent<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    K: PartialEq,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.items.next()?;
        let current = (self.key)(&first);
        let mut group = vec![first];

        while let Some(item) = self.items.peek() {
            if (self.key)(item) != current {
                break;
            }
            if let Some(item) = self.items.next() {
                group.push(item);
            }
        }

        Some(group)
    }
}

/// Lazily group `items` into runs of equal `key`
pub fn group_adjacent<I, F, K>(items: I, key: F) -> GroupAdjacent<I::IntoIter, F>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: PartialEq,
{
    GroupAdjacent {
        items: items.into_iter().peekable(),
        key,
    }
}
