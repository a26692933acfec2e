// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::is_more_than_two_thirds;
use crate::gossip::{strongly_sees, EventIndex, Graph};
use crate::id::SecretId;
use crate::network_event::NetworkEvent;
use crate::peer_list::{PeerIndex, PeerIndexMap, PeerList};
use std::cmp;
use std::collections::BTreeMap;

/// Round assignment and witness bookkeeping. An event's round is derived from its parents'
/// rounds and from how many of the parent round's witnesses it strongly sees; the first event
/// of a creator in a round is that creator's witness for the round.
pub(crate) struct RoundTable {
    // Round of every event, indexed by its topological index. Write-once.
    event_rounds: Vec<u64>,
    // round -> creator -> the creator's witness for that round.
    witnesses: BTreeMap<u64, PeerIndexMap<EventIndex>>,
}

impl RoundTable {
    pub fn new() -> Self {
        RoundTable {
            event_rounds: Vec::new(),
            witnesses: BTreeMap::new(),
        }
    }

    /// Round of the given event, if it has been assigned yet.
    pub fn round_of(&self, event_index: EventIndex) -> Option<u64> {
        self.event_rounds
            .get(event_index.topological_index())
            .cloned()
    }

    /// The witness of `creator` in `round`, if any.
    pub fn witness_of(&self, round: u64, creator: PeerIndex) -> Option<EventIndex> {
        self.witnesses
            .get(&round)
            .and_then(|slot| slot.get(creator))
            .cloned()
    }

    /// Whether the given event is a registered witness.
    pub fn is_witness(&self, event_index: EventIndex, creator: PeerIndex) -> bool {
        self.round_of(event_index)
            .and_then(|round| self.witness_of(round, creator))
            .map_or(false, |witness| witness == event_index)
    }

    /// All witnesses of `round`, in creator order.
    pub fn witnesses_of(&self, round: u64) -> impl Iterator<Item = (PeerIndex, EventIndex)> + '_ {
        self.witnesses
            .get(&round)
            .into_iter()
            .flat_map(|slot| slot.iter().map(|(creator, index)| (creator, *index)))
    }

    /// The highest round that has a witness, or 0 when the graph is empty.
    pub fn max_witness_round(&self) -> u64 {
        self.witnesses.keys().rev().next().cloned().unwrap_or(0)
    }

    /// Rounds that have witnesses, ascending.
    pub fn witness_rounds(&self) -> impl Iterator<Item = u64> + '_ {
        self.witnesses.keys().cloned()
    }

    /// Assigns a round to the given event and registers it as a witness where due. Events must
    /// be fed in insertion (topological) order; re-feeding an already assigned event is a no-op.
    pub fn assign<T, S>(
        &mut self,
        graph: &Graph<T, S::PublicId>,
        peer_list: &mut PeerList<S>,
        event_index: EventIndex,
    ) where
        T: NetworkEvent,
        S: SecretId,
    {
        if event_index.topological_index() < self.event_rounds.len() {
            return;
        }
        if event_index.topological_index() > self.event_rounds.len() {
            log_or_panic!(
                "round assignment out of order: event {:?}, table len {}",
                event_index,
                self.event_rounds.len()
            );
            return;
        }

        let event = match graph.get(event_index) {
            Some(event) => event,
            None => {
                log_or_panic!("round assignment of unknown event {:?}", event_index);
                return;
            }
        };

        let self_parent_round = event
            .self_parent()
            .and_then(|index| self.round_of(index))
            .unwrap_or(0);
        let parent_round = if event.is_genesis() {
            1
        } else {
            let other_parent_round = event
                .other_parent()
                .and_then(|index| self.round_of(index))
                .unwrap_or(0);
            cmp::max(self_parent_round, other_parent_round)
        };

        // Count the parent-round witnesses this event strongly sees, stopping once past the
        // supermajority threshold.
        let voter_count = peer_list.voter_count();
        let mut strongly_seen = 0;
        if let Some(slot) = self.witnesses.get(&parent_round) {
            for (_, witness_index) in slot.iter() {
                if is_more_than_two_thirds(strongly_seen, voter_count) {
                    break;
                }
                if let Some(witness) = graph.get(*witness_index) {
                    if strongly_sees(graph, peer_list, event, witness) {
                        strongly_seen += 1;
                    }
                }
            }
        }

        let round = if is_more_than_two_thirds(strongly_seen, voter_count) {
            parent_round + 1
        } else {
            parent_round
        };
        self.event_rounds.push(round);

        if event.is_genesis() || round > self_parent_round {
            self.register_witness(peer_list, round, event.creator(), event_index);
        }
    }

    /// Removes the creator's witnesses from `from_round` onwards. Called when the creator is
    /// caught forking: its events stay in the graph, but they no longer take part in witness
    /// bookkeeping or vote tallies.
    pub fn exclude_creator(&mut self, creator: PeerIndex, from_round: u64) {
        for (round, slot) in self.witnesses.range_mut(from_round..) {
            if slot.remove(creator).is_some() {
                debug!(
                    "removed witness of forked creator {:?} from round {}",
                    creator, round
                );
            }
        }
    }

    fn register_witness<S: SecretId>(
        &mut self,
        peer_list: &mut PeerList<S>,
        round: u64,
        creator: PeerIndex,
        event_index: EventIndex,
    ) {
        // A creator caught equivocating is disqualified from witness bookkeeping; its events
        // stay in the graph and still count for seeing.
        if peer_list.is_forked(creator) {
            debug!(
                "not registering witness of forked creator {:?} in round {}",
                creator, round
            );
            return;
        }

        let slot = self
            .witnesses
            .entry(round)
            .or_insert_with(PeerIndexMap::default);
        if let Some(existing) = slot.get(creator).cloned() {
            if existing != event_index {
                // Two first-events of one creator in one round: the creator forked.
                peer_list.mark_forked(creator);
                let _ = slot.remove(creator);
            }
            return;
        }

        let _ = slot.insert(creator, event_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gossip::{Event, UnpackedEvent};
    use crate::mock::{PeerId, Transaction};
    use crate::peer_list::PeerIndexSet;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    struct Context {
        graph: Graph<Transaction, PeerId>,
        peer_list: PeerList<PeerId>,
        rounds: RoundTable,
    }

    impl Context {
        fn new(our_id: PeerId, others: &[PeerId]) -> Self {
            let mut peer_list = PeerList::new(our_id);
            for other in others {
                let _ = peer_list.add_peer(other.clone());
            }
            Context {
                graph: Graph::new(),
                peer_list,
                rounds: RoundTable::new(),
            }
        }

        fn add(&mut self, event: Event<Transaction, PeerId>) -> EventIndex {
            let index = self.graph.insert(event).event_index();
            let indexed = unwrap!(self.graph.get(index));
            self.peer_list.add_event(indexed);
            self.rounds
                .assign(&self.graph, &mut self.peer_list, index);
            index
        }

        // Takes a foreign event and re-creates it against our graph.
        fn receive(&mut self, event: &Event<Transaction, PeerId>, src: &Context) -> EventIndex {
            let packed = unwrap!(event.pack(&src.graph, &src.peer_list));
            let hash = packed.compute_hash();
            match unwrap!(Event::unpack(
                packed,
                &hash,
                &PeerIndexSet::default(),
                &self.graph,
                &self.peer_list,
            )) {
                UnpackedEvent::New(event) => self.add(event),
                UnpackedEvent::Known(index) => index,
            }
        }
    }

    // Two peers: after a single sync the merged graph has one round-1 witness per creator and
    // the sync event stays in round 1 without becoming a witness.
    #[test]
    fn single_sync_stays_in_round_one() {
        let mut rng = XorShiftRng::seed_from_u64(51);
        let alice_id = PeerId::new("Alice", &mut rng);
        let bob_id = PeerId::new("Bob", &mut rng);

        let mut alice = Context::new(alice_id.clone(), &[bob_id.clone()]);
        let mut bob = Context::new(bob_id, &[alice_id]);

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let a_0_index = alice.add(a_0);
        let b_0 = Event::new_genesis(vec![], &bob.graph, &bob.peer_list);
        let _ = bob.add(b_0);

        // Bob receives Alice's genesis and appends his sync event.
        let a_0_in_bob = {
            let event = unwrap!(alice.graph.get(a_0_index)).inner();
            bob.receive(event, &alice)
        };
        let b_0_index = unwrap!(bob.peer_list.last_event(PeerIndex::OUR));
        let sync = unwrap!(Event::new_sync(
            b_0_index,
            a_0_in_bob,
            vec![],
            &bob.graph,
            &bob.peer_list,
            &PeerIndexSet::default(),
        ));
        let sync_index = bob.add(sync);

        assert_eq!(bob.graph.len(), 3);
        assert_eq!(bob.rounds.round_of(b_0_index), Some(1));
        assert_eq!(bob.rounds.round_of(a_0_in_bob), Some(1));
        assert_eq!(bob.rounds.round_of(sync_index), Some(1));

        // Both genesis events are round-1 witnesses; the sync event is not.
        assert_eq!(bob.rounds.witnesses_of(1).count(), 2);
        assert!(!bob.rounds.is_witness(sync_index, PeerIndex::OUR));
    }

    #[test]
    fn genesis_events_are_round_one_witnesses() {
        let mut rng = XorShiftRng::seed_from_u64(52);
        let alice_id = PeerId::new("Alice", &mut rng);
        let bob_id = PeerId::new("Bob", &mut rng);

        let mut alice = Context::new(alice_id, &[bob_id]);
        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let a_0_index = alice.add(a_0);

        assert_eq!(alice.rounds.round_of(a_0_index), Some(1));
        assert!(alice.rounds.is_witness(a_0_index, PeerIndex::OUR));
        assert_eq!(alice.rounds.max_witness_round(), 1);
    }
}
