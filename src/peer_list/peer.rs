// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::gossip::EventIndex;
use crate::id::PublicId;
use std::fmt::{self, Debug, Formatter};

/// Information the node tracks about another peer (or itself): its id and the indices of its
/// events in the gossip graph.
pub(crate) struct Peer<P: PublicId> {
    id: P,
    // Events by this peer, outer position = index-by-creator. A slot holds more than one event
    // only when the peer forked its self-parent chain.
    events: Vec<Vec<EventIndex>>,
    // Set once a fork by this peer has been observed. The peer's events stay in the graph, but
    // it is disqualified from witness bookkeeping from that point on.
    forked: bool,
}

impl<P: PublicId> Peer<P> {
    pub fn new(id: P) -> Self {
        Peer {
            id,
            events: Vec::new(),
            forked: false,
        }
    }

    pub fn id(&self) -> &P {
        &self.id
    }

    pub fn forked(&self) -> bool {
        self.forked
    }

    pub fn mark_forked(&mut self) {
        self.forked = true;
    }

    /// Indices of the events at the given index-by-creator (more than one on a fork).
    pub fn events_by_index(&self, index_by_creator: usize) -> impl Iterator<Item = EventIndex> + '_ {
        self.events
            .get(index_by_creator)
            .into_iter()
            .flat_map(|slot| slot.iter().cloned())
    }

    /// The latest event of this peer, if any. With a fork, the latest on the side seen first.
    pub fn last_event(&self) -> Option<EventIndex> {
        self.events
            .last()
            .and_then(|slot| slot.first())
            .cloned()
    }

    pub fn add_event(&mut self, index_by_creator: usize, event_index: EventIndex) {
        if index_by_creator < self.events.len() {
            self.events[index_by_creator].push(event_index);
        } else if index_by_creator == self.events.len() {
            self.events.push(vec![event_index]);
        } else {
            // Parents are validated before insertion, so the chain can never have gaps.
            log_or_panic!(
                "gap in event chain of {:?}: inserting at {}, len {}",
                self.id,
                index_by_creator,
                self.events.len()
            );
        }
    }
}

impl<P: PublicId> Debug for Peer<P> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "Peer{{ {:?}, events: {}, forked: {} }}",
            self.id,
            self.events.len(),
            self.forked
        )
    }
}
