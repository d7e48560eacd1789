// Affix lookup trie keyed by append characters from the outer edge of the word

use hashbrown::HashMap;

use crate::affix::{AffixEntry, AffixEntryId, Direction};

/// Handle of a node in an [`AffixIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Entries sharing one append and one strip.
#[derive(Debug, Clone)]
pub struct Bucket {
    strip: Box<[char]>,
    entries: Vec<AffixEntryId>,
}

impl Bucket {
    pub fn strip(&self) -> &[char] {
        &self.strip
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[AffixEntryId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    edges: HashMap<char, NodeId>,
    /// Sorted by strip length, then strip text.
    buckets: Vec<Bucket>,
}

/// Trie over the append material of one direction's entries.
///
/// A path from the root spells an append from the outer edge of the word
/// inward: the last character for suffixes, the first one for prefixes. The
/// search can therefore consume a word from the matching end and stop as soon
/// as an edge is missing. The node reached by a complete append holds that
/// append's entries, bucketed by strip.
#[derive(Debug, Clone)]
pub struct AffixIndex {
    direction: Direction,
    nodes: Vec<Node>,
    entry_count: usize,
}

impl AffixIndex {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            nodes: vec![Node::default()],
            entry_count: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, node: NodeId, c: char) -> Option<NodeId> {
        self.nodes[node.0 as usize].edges.get(&c).copied()
    }

    /// Buckets of entries whose append ends at `node`, shortest strip first.
    pub fn buckets(&self, node: NodeId) -> &[Bucket] {
        &self.nodes[node.0 as usize].buckets
    }

    /// Index `entry` under `id`. The entry must share the index direction.
    pub fn insert(&mut self, entry: &AffixEntry, id: AffixEntryId) {
        debug_assert_eq!(entry.direction(), self.direction);

        let mut node = self.root();
        for k in 0..entry.append_chars().len() {
            let c = entry.edge_char(k);
            node = match self.child(node, c) {
                Some(next) => next,
                None => {
                    let next = NodeId(self.nodes.len() as u32);
                    self.nodes.push(Node::default());
                    self.nodes[node.0 as usize].edges.insert(c, next);
                    next
                }
            };
        }

        let strip = entry.strip_chars();
        let buckets = &mut self.nodes[node.0 as usize].buckets;
        let at = buckets.partition_point(|b| {
            (b.strip.len(), &*b.strip) < (strip.len(), strip)
        });
        match buckets.get_mut(at) {
            Some(bucket) if &*bucket.strip == strip => bucket.entries.push(id),
            _ => buckets.insert(
                at,
                Bucket {
                    strip: strip.into(),
                    entries: vec![id],
                },
            ),
        }
        self.entry_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::{Affix, EntrySpec, LoadOptions};
    use crate::condition::ConditionPool;

    fn build(direction: Direction, rules: &[(&str, &str)]) -> (AffixIndex, Vec<AffixEntry>) {
        let affix = Affix::new('A', direction, false);
        let mut pool = ConditionPool::new();
        let mut index = AffixIndex::new(direction);
        let mut entries = Vec::new();
        for (i, (strip, append)) in rules.iter().enumerate() {
            let spec = EntrySpec::new(strip, append, vec![]);
            let e = AffixEntry::new(&affix, i, spec, &mut pool, LoadOptions::default()).unwrap();
            index.insert(&e, AffixEntryId(i));
            entries.push(e);
        }
        (index, entries)
    }

    fn walk(index: &AffixIndex, path: &str) -> Option<NodeId> {
        path.chars()
            .try_fold(index.root(), |node, c| index.child(node, c))
    }

    #[test]
    fn suffix_paths_start_at_word_end() {
        let (index, _) = build(Direction::Suffix, &[("", "s"), ("y", "ies"), ("", "es")]);
        assert_eq!(index.len(), 3);
        let s = walk(&index, "s").unwrap();
        assert_eq!(index.buckets(s).len(), 1);
        let es = walk(&index, "se").unwrap();
        assert_eq!(index.buckets(es)[0].entries(), &[AffixEntryId(2)]);
        let ies = walk(&index, "sei").unwrap();
        assert_eq!(index.buckets(ies)[0].strip(), &['y']);
        assert!(walk(&index, "es").is_none());
    }

    #[test]
    fn prefix_paths_start_at_word_start() {
        let (index, _) = build(Direction::Prefix, &[("", "un"), ("", "re")]);
        assert!(walk(&index, "un").is_some());
        assert!(walk(&index, "nu").is_none());
    }

    #[test]
    fn buckets_order_shortest_strip_first() {
        let (index, _) = build(
            Direction::Suffix,
            &[("ab", "x"), ("b", "x"), ("", "x"), ("a", "x"), ("b", "x")],
        );
        let node = walk(&index, "x").unwrap();
        let strips: Vec<String> = index
            .buckets(node)
            .iter()
            .map(|b| b.strip().iter().collect())
            .collect();
        assert_eq!(strips, vec!["", "a", "b", "ab"]);
        let b = &index.buckets(node)[2];
        assert_eq!(b.entries(), &[AffixEntryId(1), AffixEntryId(4)]);
    }

    #[test]
    fn empty_append_lives_at_root() {
        let (index, _) = build(Direction::Suffix, &[("", "")]);
        assert_eq!(index.buckets(index.root()).len(), 1);
    }
}
