// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::block::Block;
use crate::consensus::{FameState, OrderQueue, RoundTable};
use crate::error::{Error, Result};
use crate::gossip::{
    sort_by_dependency, Event, EventHash, EventIndex, Graph, PackedEvent, Push, UnpackedEvent,
};
use crate::id::{Proof, SecretId};
use crate::network_event::NetworkEvent;
use crate::peer_list::{PeerIndex, PeerIndexSet, PeerList};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::mem;

/// The main object which manages creating and merging gossip about the events of a fixed group
/// of peers, and which provides a sequence of consensused [Block](struct.Block.html)s by
/// applying the hashgraph algorithm.
///
/// The struct is generic with regards to two type arguments: one that represents a transaction
/// payload, and one that represents a peer ID on the network. This allows the consumer to
/// customise both what constitutes a transaction that can get consensus, and the way peers are
/// identified. The types have to implement [NetworkEvent](trait.NetworkEvent.html) and
/// [SecretId](trait.SecretId.html) traits, respectively.
///
/// A `Node` is constructed via [from_genesis](struct.Node.html#method.from_genesis) with the
/// full set of participating peers, which is fixed for the lifetime of the network.
///
/// Transactions are queued with [add_transaction](struct.Node.html#method.add_transaction) and
/// ride on the next event this node creates. To initiate a gossip exchange, pick a recipient
/// from [gossip_recipients](struct.Node.html#method.gossip_recipients) and send it the message
/// returned by [create_gossip](struct.Node.html#method.create_gossip); any message received
/// from the network layer is handed to
/// [handle_gossip](struct.Node.html#method.handle_gossip). The
/// [poll](struct.Node.html#method.poll) method yields the consensused blocks in order.
pub struct Node<T: NetworkEvent, S: SecretId> {
    // Information about other peers and the events they created.
    peer_list: PeerList<S>,
    // The gossip graph.
    graph: Graph<T, S::PublicId>,
    // Round assignments and witness bookkeeping.
    rounds: RoundTable,
    // The virtual election deciding witness fame.
    fame: FameState,
    // The append-only consensus order.
    order: OrderQueue,
    // Consensused blocks that have not been returned via `poll()` yet.
    consensused_blocks: VecDeque<Block<T, S::PublicId>>,
    // Transactions waiting to ride on the next event we create.
    pending_transactions: Vec<T>,
    // Events the merge in progress rejected, by reason; purely informational.
    rejected_events: u64,
}

impl<T: NetworkEvent, S: SecretId> Node<T, S> {
    /// Creates a new `Node` for a peer with the given secret id and genesis group (ours
    /// included), and appends our genesis event to the (so far empty) gossip graph.
    ///
    /// * `our_id` identifies and signs for the owning peer.
    /// * `genesis_group` is the set of public ids of all peers participating in the network.
    /// * `coin_period` is the coin round period of the fame election;
    ///   [DEFAULT_COIN_PERIOD](constant.DEFAULT_COIN_PERIOD.html) unless there is a reason not
    ///   to.
    pub fn from_genesis(
        our_id: S,
        genesis_group: &BTreeSet<S::PublicId>,
        coin_period: u64,
    ) -> Self {
        if !genesis_group.contains(our_id.public_id()) {
            log_or_panic!("Genesis group must contain us");
        }

        let mut peer_list = PeerList::new(our_id);
        for peer_id in genesis_group {
            if peer_id == peer_list.our_pub_id() {
                continue;
            }
            let _ = peer_list.add_peer(peer_id.clone());
        }

        let mut node = Self {
            peer_list,
            graph: Graph::new(),
            rounds: RoundTable::new(),
            fame: FameState::new(coin_period),
            order: OrderQueue::new(),
            consensused_blocks: VecDeque::new(),
            pending_transactions: Vec::new(),
            rejected_events: 0,
        };

        let genesis = Event::new_genesis(Vec::new(), &node.graph, &node.peer_list);
        if let Err(error) = node.add_event(genesis) {
            log_or_panic!(
                "{:?} initialising node failed when adding the genesis event: {:?}",
                node.our_pub_id(),
                error
            );
        }

        node
    }

    /// Returns our public ID
    pub fn our_pub_id(&self) -> &S::PublicId {
        self.peer_list.our_pub_id()
    }

    /// Queues a transaction to be carried by the next event this node creates. The subsequent
    /// gossip exchanges spread it through the network, eventually placing it in a consensused
    /// [Block](struct.Block.html).
    pub fn add_transaction(&mut self, transaction: T) {
        debug!(
            "{:?} queueing transaction {:?}",
            self.our_pub_id(),
            transaction
        );
        self.pending_transactions.push(transaction);
    }

    /// Returns an iterator with the IDs of peers the owning peer can send gossip to.
    pub fn gossip_recipients(&self) -> impl Iterator<Item = &S::PublicId> {
        self.peer_list
            .gossip_recipients()
            .map(|(_, peer)| peer.id())
    }

    /// Creates a gossip message for the given peer: our head and our whole view of the graph,
    /// signed by us.
    pub fn create_gossip(&self, peer_id: &S::PublicId) -> Result<Push<T, S::PublicId>> {
        let peer_index = self.get_peer_index(peer_id)?;
        if peer_index == PeerIndex::OUR {
            return Err(Error::UnknownPeer);
        }

        debug!(
            "{:?} creating gossip for {:?}",
            self.our_pub_id(),
            peer_id
        );

        let mut view = BTreeMap::new();
        for event in self.graph.iter() {
            let packed = event.pack(&self.graph, &self.peer_list)?;
            let _ = view.insert(*event.hash(), packed);
        }

        Ok(Push::new(self.head()?, view, self.peer_list.our_id()))
    }

    /// Handles a gossip message received from the `src` peer: verifies the outer signature,
    /// merges the unknown events in dependency order, appends our sync event joining both
    /// heads, and runs the consensus pipeline over everything new.
    ///
    /// Individually invalid events are logged and skipped while the rest of the merge proceeds;
    /// a cycle in the claimed parent links rejects the whole message with nothing inserted.
    ///
    /// If the merge exposes a creator's fork for the first time, the merge still runs to
    /// completion (the forked events stay in the graph for seeing, the creator is disqualified
    /// from witness bookkeeping) and `Err(Error::ForkDetected)` is returned afterwards, so the
    /// caller learns of the equivocation. The node's own state is consistent in that case.
    pub fn handle_gossip(&mut self, src: &S::PublicId, push: Push<T, S::PublicId>) -> Result<()> {
        debug!("{:?} received gossip from {:?}", self.our_pub_id(), src);

        let src_index = self.get_peer_index(src)?;
        if src_index == PeerIndex::OUR {
            return Err(Error::InvalidMessage);
        }

        let (sender_head, sender_view) = push.open(src)?;

        let unknown: BTreeMap<EventHash, PackedEvent<T, S::PublicId>> = sender_view
            .into_iter()
            .filter(|(hash, _)| !self.graph.contains(hash))
            .collect();
        if unknown.is_empty() {
            // Re-merging a known view is a no-op; no sync event either.
            debug!(
                "{:?} already knows everything {:?} sent",
                self.our_pub_id(),
                src
            );
            return Ok(());
        }

        let batch = sort_by_dependency(unknown)?;
        let (forking_peers, new_fork) = self.unpack_and_add_events(batch)?;
        self.create_sync_event(src_index, &sender_head, &forking_peers)?;
        self.process_consensus()?;

        if new_fork {
            return Err(Error::ForkDetected);
        }
        Ok(())
    }

    /// Returns the next consensused block, if any. The method might need to be called more than
    /// once for the caller to get all the blocks that have been consensused. A `None` value
    /// means that all the blocks consensused so far have already been returned.
    pub fn poll(&mut self) -> Option<Block<T, S::PublicId>> {
        self.consensused_blocks.pop_front()
    }

    /// The hash of our latest own event.
    pub fn head(&self) -> Result<EventHash> {
        let index = self.our_last_event_index()?;
        self.graph
            .get(index)
            .map(|event| *event.hash())
            .ok_or(Error::Logic)
    }

    /// The consensus order so far: hashes of all ordered events (payload-bearing or not),
    /// oldest first. Every peer eventually agrees on every prefix of this sequence.
    pub fn consensus_order(&self) -> &[EventHash] {
        self.order.consensus_order()
    }

    /// Number of events in our gossip graph.
    pub fn event_count(&self) -> usize {
        self.graph.len()
    }

    /// Whether our graph contains the event with the given hash.
    pub fn has_event(&self, hash: &EventHash) -> bool {
        self.graph.contains(hash)
    }

    /// The round assigned to the event with the given hash, if present.
    pub fn round_of(&self, hash: &EventHash) -> Option<u64> {
        self.graph
            .get_index(hash)
            .and_then(|index| self.rounds.round_of(index))
    }

    /// Whether the event with the given hash is a registered witness.
    pub fn is_witness(&self, hash: &EventHash) -> bool {
        self.graph
            .get_index(hash)
            .and_then(|index| self.graph.get(index).map(|event| (index, event.creator())))
            .map_or(false, |(index, creator)| {
                self.rounds.is_witness(index, creator)
            })
    }

    /// The hashes of the registered witnesses of the given round, in no particular order.
    pub fn witnesses_of(&self, round: u64) -> Vec<EventHash> {
        self.rounds
            .witnesses_of(round)
            .filter_map(|(_, index)| self.graph.get(index))
            .map(|event| *event.hash())
            .collect()
    }

    /// The fame verdict of the witness with the given hash: `None` while undecided.
    pub fn is_famous(&self, hash: &EventHash) -> Option<bool> {
        self.graph
            .get_index(hash)
            .and_then(|index| self.fame.verdict(index))
    }

    /// Ids of the peers this node has caught forking their self-parent chain. Their events stay
    /// in the graph, but they are disqualified from witness bookkeeping.
    pub fn forked_peers(&self) -> impl Iterator<Item = &S::PublicId> {
        self.peer_list.forked_peers()
    }

    /// Number of gossiped events this node has rejected as invalid so far.
    pub fn rejected_event_count(&self) -> u64 {
        self.rejected_events
    }

    fn get_peer_index(&self, peer_id: &S::PublicId) -> Result<PeerIndex> {
        self.peer_list.get_index(peer_id).ok_or(Error::UnknownPeer)
    }

    fn our_last_event_index(&self) -> Result<EventIndex> {
        self.peer_list.last_event(PeerIndex::OUR).ok_or_else(|| {
            log_or_panic!(
                "{:?} has no last event.\n{:?}\n",
                self.our_pub_id(),
                self.peer_list
            );
            Error::Logic
        })
    }

    // Validates and inserts a batch of events already sorted parent-before-child. Returns the
    // set of peers whose forks were observed during this merge, and whether any of them was
    // caught for the first time.
    fn unpack_and_add_events(
        &mut self,
        batch: Vec<(EventHash, PackedEvent<T, S::PublicId>)>,
    ) -> Result<(PeerIndexSet, bool)> {
        let mut forking_peers = PeerIndexSet::default();
        let mut new_fork = false;

        for (hash, packed_event) in batch {
            match Event::unpack(
                packed_event,
                &hash,
                &forking_peers,
                &self.graph,
                &self.peer_list,
            ) {
                Ok(UnpackedEvent::New(event)) => {
                    // A second event occupying the same position on its creator's self-parent
                    // chain is proof of a fork.
                    let sibling = self
                        .peer_list
                        .events_by_index(event.creator(), event.index_by_creator())
                        .next();
                    if let Some(sibling) = sibling {
                        if !self.peer_list.is_forked(event.creator()) {
                            new_fork = true;
                        }
                        let _ = forking_peers.insert(event.creator());
                        self.peer_list.mark_forked(event.creator());
                        // The forker loses its witnesses from the forked round onwards.
                        let fork_round = self.rounds.round_of(sibling).unwrap_or(1);
                        self.rounds.exclude_creator(event.creator(), fork_round);
                    }

                    let _ = self.add_event(event)?;
                }
                Ok(UnpackedEvent::Known(_)) => (),
                Err(error) => {
                    // Tolerated: drop the bad event, keep the rest of the merge. Descendants
                    // of the dropped event fail their parent lookup and are dropped too.
                    warn!(
                        "{:?} rejected gossiped event {:?}: {}",
                        self.our_pub_id(),
                        hash,
                        error
                    );
                    self.rejected_events += 1;
                }
            }
        }

        Ok((forking_peers, new_fork))
    }

    // Inserts a single event into the graph and assigns its round. No-op if the event is
    // already present.
    fn add_event(&mut self, event: Event<T, S::PublicId>) -> Result<EventIndex> {
        if let Some(index) = self.graph.get_index(event.hash()) {
            return Ok(index);
        }

        let event_index = {
            let event = self.graph.insert(event);
            self.peer_list.add_event(event);
            event.event_index()
        };

        self.rounds
            .assign(&self.graph, &mut self.peer_list, event_index);

        Ok(event_index)
    }

    // Appends our sync event: self-parent is our head, other-parent the sender's head. Any
    // queued transactions ride along.
    fn create_sync_event(
        &mut self,
        src_index: PeerIndex,
        sender_head: &EventHash,
        forking_peers: &PeerIndexSet,
    ) -> Result<()> {
        let other_parent = self
            .graph
            .get_index(sender_head)
            .ok_or(Error::UnknownOtherParent)?;

        // The claimed head must be the sender's own event, otherwise our sync event would be
        // malformed and we would spread it ourselves.
        let head_creator = self
            .graph
            .get(other_parent)
            .map(|event| event.creator())
            .ok_or(Error::Logic)?;
        if head_creator != src_index {
            warn!(
                "{:?} got gossip whose claimed head was not created by the sender",
                self.our_pub_id()
            );
            return Err(Error::InvalidMessage);
        }

        let self_parent = self.our_last_event_index()?;
        let transactions = mem::replace(&mut self.pending_transactions, Vec::new());
        let event = Event::new_sync(
            self_parent,
            other_parent,
            transactions,
            &self.graph,
            &self.peer_list,
            forking_peers,
        )?;
        let _ = self.add_event(event)?;

        Ok(())
    }

    // Runs decide-fame and find-order over the current graph and turns newly ordered
    // payload-bearing events into blocks.
    fn process_consensus(&mut self) -> Result<()> {
        self.fame
            .process(&self.graph, &self.peer_list, &self.rounds);

        for ordered in self.order.process(&self.graph, &self.rounds, &self.fame) {
            let event = self.graph.get(ordered.index).ok_or(Error::Logic)?;

            info!(
                "{:?} ordered event {:?} with received round {} and received time {}",
                self.peer_list.our_pub_id(),
                event.hash(),
                ordered.received_round,
                ordered.received_time
            );

            if event.transactions().is_empty() {
                continue;
            }

            let creator_id = self.peer_list.get_known(event.creator())?.id().clone();
            let block = Block::new(
                event.transactions().to_vec(),
                Proof {
                    public_id: creator_id,
                    signature: event.signature().clone(),
                },
                *event.hash(),
                ordered.received_round,
                ordered.received_time,
            );
            self.consensused_blocks.push_back(block);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::DEFAULT_COIN_PERIOD;
    use crate::dev_utils::Environment;
    use crate::mock::{create_ids, PeerId, Transaction};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn make_network(count: usize, seed: u64) -> (Vec<PeerId>, Vec<Node<Transaction, PeerId>>) {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let ids = create_ids(count, &mut rng);
        let group: BTreeSet<PeerId> = ids.iter().cloned().collect();
        let nodes = ids
            .iter()
            .map(|id| Node::from_genesis(id.clone(), &group, DEFAULT_COIN_PERIOD))
            .collect();
        (ids, nodes)
    }

    #[test]
    fn genesis_bootstrap() {
        let (_, nodes) = make_network(4, 61);

        for node in &nodes {
            assert_eq!(node.event_count(), 1);
            assert!(node.consensus_order().is_empty());

            let head = unwrap!(node.head());
            assert_eq!(node.round_of(&head), Some(1));
            assert!(node.is_witness(&head));
            assert_eq!(node.witnesses_of(1).len(), 1);
        }
    }

    #[test]
    fn gossip_merge_appends_sync_event() {
        let (ids, mut nodes) = make_network(2, 62);
        let alice_head = unwrap!(nodes[0].head());
        let bob_head = unwrap!(nodes[1].head());

        // Alice pushes to Bob.
        let push = unwrap!(nodes[0].create_gossip(&ids[1]));
        unwrap!(nodes[1].handle_gossip(&ids[0], push));

        // Bob now has both genesis events plus his sync event.
        assert_eq!(nodes[1].event_count(), 3);
        assert!(nodes[1].has_event(&alice_head));

        let sync_head = unwrap!(nodes[1].head());
        assert_ne!(sync_head, bob_head);
        // Too few witnesses to strongly see: the sync event stays in round 1 and is no witness,
        // while both genesis events are round-1 witnesses.
        assert_eq!(nodes[1].round_of(&sync_head), Some(1));
        assert!(!nodes[1].is_witness(&sync_head));
        assert_eq!(nodes[1].witnesses_of(1).len(), 2);
    }

    #[test]
    fn remerging_the_same_view_is_a_no_op() {
        let (ids, mut nodes) = make_network(2, 63);

        let push = unwrap!(nodes[0].create_gossip(&ids[1]));
        unwrap!(nodes[1].handle_gossip(&ids[0], push));
        let count = nodes[1].event_count();
        let head = unwrap!(nodes[1].head());

        // Alice hasn't learned anything new, so her next push carries a known view.
        let push = unwrap!(nodes[0].create_gossip(&ids[1]));
        unwrap!(nodes[1].handle_gossip(&ids[0], push));

        assert_eq!(nodes[1].event_count(), count);
        assert_eq!(unwrap!(nodes[1].head()), head);
    }

    #[test]
    fn gossip_from_unknown_peer_is_rejected() {
        let (ids, mut nodes) = make_network(2, 64);
        let mut rng = XorShiftRng::seed_from_u64(65);
        let mallory = PeerId::new("Mallory", &mut rng);

        let push = unwrap!(nodes[0].create_gossip(&ids[1]));
        match nodes[1].handle_gossip(&mallory, push) {
            Err(Error::UnknownPeer) => (),
            x => panic!("Expected UnknownPeer, got {:?}", x),
        }
    }

    // A creator signing two events with the same self-parent is caught on merge; its events
    // stay in the graph but its witnesses are dropped.
    #[test]
    fn fork_detection_disqualifies_the_creator() {
        let (ids, mut nodes) = make_network(3, 66);
        let (alice_id, bob_id, carol_id) = (ids[0].clone(), ids[1].clone(), ids[2].clone());

        // Carol's side runs on raw structures so she can misbehave.
        let mut carol_graph: Graph<Transaction, PeerId> = Graph::new();
        let mut carol_peers = PeerList::new(carol_id.clone());
        let _ = carol_peers.add_peer(alice_id.clone());
        let _ = carol_peers.add_peer(bob_id.clone());

        let receive = |graph: &mut Graph<Transaction, PeerId>,
                           peers: &mut PeerList<PeerId>,
                           packed: PackedEvent<Transaction, PeerId>|
         -> EventIndex {
            let hash = packed.compute_hash();
            match unwrap!(Event::unpack(
                packed,
                &hash,
                &PeerIndexSet::default(),
                graph,
                peers,
            )) {
                UnpackedEvent::New(event) => {
                    let indexed = graph.insert(event);
                    peers.add_event(indexed);
                    indexed.event_index()
                }
                UnpackedEvent::Known(index) => index,
            }
        };

        // Carol learns Alice's and Bob's genesis events.
        let (a_0, b_0) = {
            let open = |node: &Node<Transaction, PeerId>, src: &PeerId| {
                let push = unwrap!(node.create_gossip(&carol_id));
                let (_, view) = unwrap!(push.open(src));
                unwrap!(view.into_iter().next()).1
            };
            (open(&nodes[0], &alice_id), open(&nodes[1], &bob_id))
        };
        let a_0_index = receive(&mut carol_graph, &mut carol_peers, a_0);
        let b_0_index = receive(&mut carol_graph, &mut carol_peers, b_0);

        let c_0 = Event::new_genesis(vec![], &carol_graph, &carol_peers);
        let c_0_index = {
            let indexed = carol_graph.insert(c_0);
            carol_peers.add_event(indexed);
            indexed.event_index()
        };
        let c_0_hash = *unwrap!(carol_graph.get(c_0_index)).hash();

        // The fork: two sync events sharing c_0 as self-parent.
        let mut add_fork_side = |other_parent: EventIndex| -> EventIndex {
            let event = unwrap!(Event::new_sync(
                c_0_index,
                other_parent,
                vec![],
                &carol_graph,
                &carol_peers,
                &PeerIndexSet::default(),
            ));
            let indexed = carol_graph.insert(event);
            carol_peers.add_event(indexed);
            indexed.event_index()
        };
        let s_1_index = add_fork_side(a_0_index);
        let s_2_index = add_fork_side(b_0_index);

        // Carol pushes her whole poisoned view to Alice.
        let mut view = BTreeMap::new();
        for index in &[a_0_index, b_0_index, c_0_index, s_1_index, s_2_index] {
            let event = unwrap!(carol_graph.get(*index));
            let packed = unwrap!(event.pack(&carol_graph, &carol_peers));
            let _ = view.insert(*event.hash(), packed);
        }
        let head = *unwrap!(carol_graph.get(s_2_index)).hash();
        let s_1_hash = *unwrap!(carol_graph.get(s_1_index)).hash();
        let push = Push::new(head, view, &carol_id);

        // The merge completes, then the fork is surfaced to the caller.
        match nodes[0].handle_gossip(&carol_id, push) {
            Err(Error::ForkDetected) => (),
            x => panic!("Expected ForkDetected, got {:?}", x),
        }

        // The fork is on record, the events themselves are kept.
        assert!(nodes[0].forked_peers().any(|id| *id == carol_id));
        assert!(nodes[0].has_event(&c_0_hash));
        assert!(nodes[0].has_event(&s_1_hash));
        assert!(nodes[0].has_event(&head));

        // Carol is out of the witness table: only Alice's and Bob's witnesses remain.
        assert!(!nodes[0].is_witness(&c_0_hash));
        assert!(nodes[0]
            .witnesses_of(1)
            .iter()
            .all(|witness| *witness != c_0_hash));
    }

    // Upper bound on gossip pushes before a simulated run is declared stuck. Random uniform
    // gossip over four honest peers advances a round roughly every couple dozen pushes, so
    // these bounds leave a wide margin.
    const MAX_PUSHES: usize = 4000;
    const BATCH: usize = 20;

    #[test]
    fn rounds_advance_with_gossip() {
        let mut env = Environment::new(4, 1402);
        let ids = env.network.ids();

        let mut pushed = 0;
        loop {
            env.network.execute_random_pushes(&mut env.rng, BATCH);
            pushed += BATCH;

            let advanced = ids.iter().any(|id| {
                let node = env.network.peer(id);
                let head = unwrap!(node.head());
                node.round_of(&head).map_or(false, |round| round >= 2)
            });
            if advanced {
                break;
            }
            assert!(pushed < MAX_PUSHES, "no round advance after {} pushes", pushed);
        }

        // A round advance means a round-2 witness was registered somewhere.
        assert!(ids
            .iter()
            .any(|id| !env.network.peer(id).witnesses_of(2).is_empty()));
    }

    #[test]
    fn fame_gets_decided() {
        let mut env = Environment::new(4, 1403);
        let ids = env.network.ids();
        let genesis_hashes: Vec<EventHash> = ids
            .iter()
            .map(|id| unwrap!(env.network.peer(id).head()))
            .collect();

        let observer = ids[0].clone();
        let mut pushed = 0;
        loop {
            env.network.execute_random_pushes(&mut env.rng, BATCH);
            pushed += BATCH;

            let node = env.network.peer(&observer);
            let all_decided = genesis_hashes
                .iter()
                .all(|hash| node.is_famous(hash).is_some());
            if all_decided {
                break;
            }
            assert!(pushed < MAX_PUSHES, "fame undecided after {} pushes", pushed);
        }

        // Verdicts are final: more gossip must not change them.
        let verdicts: Vec<Option<bool>> = genesis_hashes
            .iter()
            .map(|hash| env.network.peer(&observer).is_famous(hash))
            .collect();
        env.network.execute_random_pushes(&mut env.rng, 5 * BATCH);
        for (hash, verdict) in genesis_hashes.iter().zip(&verdicts) {
            assert_eq!(env.network.peer(&observer).is_famous(hash), *verdict);
        }
    }

    #[test]
    fn deterministic_consensus_order() {
        let mut env = Environment::new(4, 1404);
        let ids = env.network.ids();

        env.network
            .peer_mut(&ids[0])
            .add_transaction(Transaction::new("one"));
        env.network
            .peer_mut(&ids[1])
            .add_transaction(Transaction::new("two"));

        let mut polled: BTreeMap<_, Vec<Transaction>> = ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut previous_orders: BTreeMap<_, Vec<EventHash>> = ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();

        let mut pushed = 0;
        loop {
            env.network.execute_random_pushes(&mut env.rng, BATCH);
            pushed += BATCH;

            // Every pair of peers agrees on the common prefix of their orders at all times.
            unwrap!(env.network.check_consensus_prefixes());

            // The order only ever grows; the already appended prefix never changes.
            for id in &ids {
                let node = env.network.peer(id);
                let previous = unwrap!(previous_orders.get_mut(id));
                let current = node.consensus_order();
                assert!(current.len() >= previous.len());
                assert_eq!(&current[..previous.len()], &previous[..]);
                *previous = current.to_vec();
            }

            for (id, blocks) in env.network.poll_blocks() {
                unwrap!(polled.get_mut(&id)).extend(
                    blocks
                        .iter()
                        .flat_map(|block| block.payload().iter().cloned()),
                );
            }

            let everyone_has_both = polled.values().all(|transactions| {
                transactions.contains(&Transaction::new("one"))
                    && transactions.contains(&Transaction::new("two"))
            });
            if everyone_has_both {
                break;
            }
            assert!(
                pushed < MAX_PUSHES,
                "transactions not consensused after {} pushes",
                pushed
            );
        }

        // Every peer consensused each transaction exactly once, and the block sequences agree
        // on their common prefix.
        let sequences: Vec<&Vec<Transaction>> = polled.values().collect();
        for transactions in &sequences {
            for tag in &["one", "two"] {
                let occurrences = transactions
                    .iter()
                    .filter(|transaction| **transaction == Transaction::new(tag))
                    .count();
                assert_eq!(occurrences, 1, "{} consensused {} times", tag, occurrences);
            }
        }
        for window in sequences.windows(2) {
            let common = window[0].len().min(window[1].len());
            assert_eq!(&window[0][..common], &window[1][..common]);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        // Any interleaving of pushes keeps the peers' consensus orders prefix-consistent.
        #[test]
        fn consensus_prefixes_agree_under_random_schedules(seed in 0u64..u64::max_value()) {
            let mut env = Environment::new(4, seed);
            let ids = env.network.ids();
            env.network
                .peer_mut(&ids[0])
                .add_transaction(Transaction::new("payload"));

            env.network.execute_random_pushes(&mut env.rng, 150);

            prop_assert!(env.network.check_consensus_prefixes().is_ok());
        }
    }
}
