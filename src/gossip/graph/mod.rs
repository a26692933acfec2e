// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod ancestors;
mod event_index;
mod event_ref;

pub(crate) use self::ancestors::Ancestors;
pub use self::event_index::EventIndex;
pub(crate) use self::event_ref::IndexedEventRef;

use super::event::{Event, LastAncestor};
use super::event_hash::EventHash;
use crate::consensus::is_more_than_two_thirds;
use crate::id::{PublicId, SecretId};
use crate::network_event::NetworkEvent;
use crate::peer_list::PeerList;
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::BTreeSet;

/// The gossip graph: an insertion-only arena of events, content-addressed through a map from
/// event hash to arena index.
#[derive(Debug)]
pub(crate) struct Graph<T: NetworkEvent, P: PublicId> {
    events: Vec<Event<T, P>>,
    indices: BTreeMap<EventHash, EventIndex>,
}

impl<T: NetworkEvent, P: PublicId> Default for Graph<T, P> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            indices: BTreeMap::new(),
        }
    }
}

impl<T: NetworkEvent, P: PublicId> Graph<T, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get index of an event with the given hash.
    pub fn get_index(&self, hash: &EventHash) -> Option<EventIndex> {
        self.indices.get(hash).cloned()
    }

    /// Checks whether this graph contains an event with the given hash.
    pub fn contains(&self, hash: &EventHash) -> bool {
        self.indices.contains_key(hash)
    }

    /// Insert new event into the graph.
    /// Returns `IndexedEventRef` to the newly inserted event.
    /// If the event was already present in the graph, does not overwrite it, just returns an
    /// `IndexedEventRef` to it.
    pub fn insert(&mut self, event: Event<T, P>) -> IndexedEventRef<T, P> {
        let index = match self.indices.entry(*event.hash()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let index = EventIndex(self.events.len());
                self.events.push(event);
                *entry.insert(index)
            }
        };

        IndexedEventRef {
            index,
            event: &self.events[index.0],
        }
    }

    /// Gets `Event` with the given `index`, if it exists.
    pub fn get(&self, index: EventIndex) -> Option<IndexedEventRef<T, P>> {
        self.events
            .get(index.0)
            .map(|event| IndexedEventRef { index, event })
    }

    /// Number of events in this graph.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Iterator over all events in this graph. Yields `IndexedEventRef`s.
    pub fn iter(&self) -> Iter<T, P> {
        self.iter_from(0)
    }

    /// Iterator over events in this graph starting at the given topological index.
    pub fn iter_from(&self, start_index: usize) -> Iter<T, P> {
        Iter {
            events: &self.events,
            index: start_index,
        }
    }

    /// Returns self-parent of the given event, if any.
    pub fn self_parent<E: AsRef<Event<T, P>>>(&self, event: E) -> Option<IndexedEventRef<T, P>> {
        event
            .as_ref()
            .self_parent()
            .and_then(|index| self.get(index))
    }

    /// Returns other-parent of the given event, if any.
    pub fn other_parent<E: AsRef<Event<T, P>>>(&self, event: E) -> Option<IndexedEventRef<T, P>> {
        event
            .as_ref()
            .other_parent()
            .and_then(|index| self.get(index))
    }

    /// Iterator over all ancestors of the given event (including itself) in reverse topological
    /// order.
    pub fn ancestors<'a>(&'a self, event: IndexedEventRef<'a, T, P>) -> Ancestors<'a, T, P> {
        let mut queue = BTreeSet::new();
        let _ = queue.insert(event);

        Ancestors {
            graph: self,
            queue,
            visited: vec![false; event.topological_index() + 1],
        }
    }

    /// Returns whether `x` is descendant of `y`.
    pub fn is_descendant(&self, x: IndexedEventRef<T, P>, y: IndexedEventRef<T, P>) -> bool {
        x.is_descendant_of(y).unwrap_or_else(|| {
            // Forks between `x` and `y` - the cheap per-event answer is unavailable and the
            // graph has to be walked.
            self.ancestors(x)
                .take_while(|e| e.topological_index() >= y.topological_index())
                .any(|e| e.topological_index() == y.topological_index())
        })
    }
}

/// Returns whether `x` strongly sees `y`: whether events by more than 2N/3 distinct creators
/// are each seen by `x` and themselves see `y`.
pub(crate) fn strongly_sees<T, P, S>(
    graph: &Graph<T, P>,
    peer_list: &PeerList<S>,
    x: IndexedEventRef<T, P>,
    y: IndexedEventRef<T, P>,
) -> bool
where
    T: NetworkEvent,
    P: PublicId,
    S: SecretId<PublicId = P>,
{
    let voter_count = peer_list.voter_count();
    let mut count = 0;

    for (peer_index, _) in peer_list.iter() {
        let last = match x.last_ancestor_by(peer_index) {
            LastAncestor::Some(index) => index,
            // No ancestor by this creator, or the creator equivocated within `x`'s ancestry;
            // either way the creator cannot contribute to the count.
            LastAncestor::None | LastAncestor::Fork => continue,
        };

        // Walk the creator's chain downwards from `x`'s last ancestor. Seeing is monotone
        // along a self-parent chain, so the walk can stop as soon as a chain event can no
        // longer reach `y` at all.
        let mut index_by_creator = last;
        'chain: loop {
            for candidate in peer_list.events_by_index(peer_index, index_by_creator) {
                let candidate = match graph.get(candidate) {
                    Some(candidate) => candidate,
                    None => continue,
                };

                if !graph.is_descendant(x, candidate) {
                    continue;
                }

                if candidate.sees(y) {
                    count += 1;
                    break 'chain;
                }

                match candidate.last_ancestor_by(y.creator()) {
                    LastAncestor::Some(seen) if seen >= y.index_by_creator() => {
                        // `y` is reachable but a fork blinds this chain event; an earlier
                        // chain event may still see `y` cleanly.
                    }
                    LastAncestor::Fork => {}
                    _ => break 'chain,
                }
            }

            if index_by_creator == 0 {
                break;
            }
            index_by_creator -= 1;
        }

        if is_more_than_two_thirds(count, voter_count) {
            return true;
        }
    }

    is_more_than_two_thirds(count, voter_count)
}

pub(crate) struct Iter<'a, T: NetworkEvent + 'a, P: PublicId + 'a> {
    events: &'a [Event<T, P>],
    index: usize,
}

impl<'a, T: NetworkEvent, P: PublicId> Iterator for Iter<'a, T, P> {
    type Item = IndexedEventRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.get(self.index)?;
        let item = IndexedEventRef {
            index: EventIndex(self.index),
            event,
        };
        self.index += 1;
        Some(item)
    }
}
