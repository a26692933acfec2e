// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::{Graph, IndexedEventRef};
use crate::id::PublicId;
use crate::network_event::NetworkEvent;
use std::collections::BTreeSet;

/// Iterator over all ancestors of an event (the event itself included) in reverse topological
/// order.
pub(crate) struct Ancestors<'a, T: NetworkEvent + 'a, P: PublicId + 'a> {
    pub(super) graph: &'a Graph<T, P>,
    pub(super) queue: BTreeSet<IndexedEventRef<'a, T, P>>,
    pub(super) visited: Vec<bool>,
}

impl<'a, T: NetworkEvent, P: PublicId> Iterator for Ancestors<'a, T, P> {
    type Item = IndexedEventRef<'a, T, P>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Take the event with the highest topological index.
            let event = self.queue.iter().next_back().cloned()?;
            let _ = self.queue.remove(&event);

            if self.visited[event.topological_index()] {
                continue;
            }
            self.visited[event.topological_index()] = true;

            if let Some(parent) = self.graph.self_parent(event) {
                let _ = self.queue.insert(parent);
            }
            if let Some(parent) = self.graph.other_parent(event) {
                let _ = self.queue.insert(parent);
            }

            return Some(event);
        }
    }
}
