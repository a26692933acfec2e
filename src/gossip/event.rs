// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::cause::{
    other_parent_hash, other_parent_index, self_parent_hash, self_parent_index, Cause,
};
use super::content::Content;
use super::event_hash::EventHash;
use super::graph::{EventIndex, Graph};
use super::packed_event::PackedEvent;
use crate::error::Error;
use crate::hash::Hash;
use crate::id::{PublicId, SecretId};
use crate::network_event::NetworkEvent;
use crate::peer_list::{PeerIndex, PeerIndexMap, PeerIndexSet, PeerList};
use crate::serialise;
use std::cmp;
use std::fmt::{self, Debug, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) struct Event<T: NetworkEvent, P: PublicId> {
    content: Content<T, EventIndex, PeerIndex>,
    // Creator's signature of the packed `content`.
    signature: P::Signature,
    cache: Cache,
}

impl<T: NetworkEvent, P: PublicId> Event<T, P> {
    // Creates our genesis event: this creator's first event, with no parents.
    pub fn new_genesis<S: SecretId<PublicId = P>>(
        transactions: Vec<T>,
        graph: &Graph<T, P>,
        peer_list: &PeerList<S>,
    ) -> Self {
        let timestamp = now_millis();
        let packed_content = Content {
            creator: peer_list.our_pub_id().clone(),
            timestamp,
            transactions,
            cause: Cause::Genesis,
        };
        let (hash, signature) =
            compute_event_hash_and_signature(&packed_content, peer_list.our_id());

        let Content { transactions, .. } = packed_content;
        let content = Content {
            creator: PeerIndex::OUR,
            timestamp,
            transactions,
            cause: Cause::Genesis,
        };

        Self::new(
            hash,
            signature,
            content,
            graph,
            peer_list,
            &PeerIndexSet::default(),
        )
    }

    // Creates a new sync event as the result of merging a peer's view: its self-parent is our
    // current head, its other-parent the head of the peer whose view we merged.
    pub fn new_sync<S: SecretId<PublicId = P>>(
        self_parent: EventIndex,
        other_parent: EventIndex,
        transactions: Vec<T>,
        graph: &Graph<T, P>,
        peer_list: &PeerList<S>,
        forking_peers: &PeerIndexSet,
    ) -> Result<Self, Error> {
        let timestamp = now_millis();
        let packed_content = Content {
            creator: peer_list.our_pub_id().clone(),
            timestamp,
            transactions,
            cause: Cause::Sync {
                self_parent: self_parent_hash(graph, self_parent)?,
                other_parent: other_parent_hash(graph, other_parent)?,
            },
        };
        let (hash, signature) =
            compute_event_hash_and_signature(&packed_content, peer_list.our_id());

        let Content { transactions, .. } = packed_content;
        let content = Content {
            creator: PeerIndex::OUR,
            timestamp,
            transactions,
            cause: Cause::Sync {
                self_parent,
                other_parent,
            },
        };

        Ok(Self::new(
            hash,
            signature,
            content,
            graph,
            peer_list,
            forking_peers,
        ))
    }

    fn new<S: SecretId<PublicId = P>>(
        hash: EventHash,
        signature: P::Signature,
        content: Content<T, EventIndex, PeerIndex>,
        graph: &Graph<T, P>,
        peer_list: &PeerList<S>,
        forking_peers: &PeerIndexSet,
    ) -> Self {
        let cache = Cache::new(hash, &content, graph, peer_list, forking_peers);
        Self {
            content,
            signature,
            cache,
        }
    }

    // Creates an event from a `PackedEvent` delivered under `claimed_hash`.
    //
    // Returns:
    //   - `Ok(UnpackedEvent::Known(index))` if the event is already in the graph
    //   - `Err(Error::HashMismatch)` if the event does not hash to `claimed_hash`
    //   - `Err(Error::SignatureFailure)` if signature validation fails
    //   - `Err(Error::UnknownSelfParent)` / `Err(Error::UnknownOtherParent)` if a parent is not
    //     in the graph
    //   - `Err(Error::MalformedParents)` if the parents' creator relations are wrong
    //
    // Validation is purely local and mutates nothing.
    pub(crate) fn unpack<S: SecretId<PublicId = P>>(
        packed_event: PackedEvent<T, P>,
        claimed_hash: &EventHash,
        forking_peers: &PeerIndexSet,
        graph: &Graph<T, P>,
        peer_list: &PeerList<S>,
    ) -> Result<UnpackedEvent<T, P>, Error> {
        let hash = packed_event.compute_hash();
        if hash != *claimed_hash {
            return Err(Error::HashMismatch);
        }

        let serialised_content = serialise(&packed_event.content);
        if !packed_event
            .content
            .creator
            .verify_signature(&packed_event.signature, &serialised_content)
        {
            return Err(Error::SignatureFailure);
        }

        if let Some(index) = graph.get_index(&hash) {
            return Ok(UnpackedEvent::Known(index));
        }

        let PackedEvent { content, signature } = packed_event;
        let Content {
            creator,
            timestamp,
            transactions,
            cause,
        } = content;

        let creator = peer_list.get_index(&creator).ok_or(Error::UnknownPeer)?;
        let cause = match cause {
            Cause::Genesis => Cause::Genesis,
            Cause::Sync {
                ref self_parent,
                ref other_parent,
            } => {
                let self_parent = self_parent_index(graph, self_parent)?;
                let other_parent = other_parent_index(graph, other_parent)?;

                let self_parent_event =
                    graph.get(self_parent).ok_or(Error::UnknownSelfParent)?;
                let other_parent_event =
                    graph.get(other_parent).ok_or(Error::UnknownOtherParent)?;
                if self_parent_event.creator() != creator
                    || other_parent_event.creator() == creator
                {
                    return Err(Error::MalformedParents);
                }

                Cause::Sync {
                    self_parent,
                    other_parent,
                }
            }
        };

        let content = Content {
            creator,
            timestamp,
            transactions,
            cause,
        };
        let cache = Cache::new(hash, &content, graph, peer_list, forking_peers);

        Ok(UnpackedEvent::New(Self {
            content,
            signature,
            cache,
        }))
    }

    // Creates a `PackedEvent` from this `Event`.
    pub(crate) fn pack<S: SecretId<PublicId = P>>(
        &self,
        graph: &Graph<T, P>,
        peer_list: &PeerList<S>,
    ) -> Result<PackedEvent<T, P>, Error> {
        let creator = peer_list.get_known(self.creator())?.id().clone();
        let cause = match self.content.cause {
            Cause::Genesis => Cause::Genesis,
            Cause::Sync {
                self_parent,
                other_parent,
            } => Cause::Sync {
                self_parent: self_parent_hash(graph, self_parent)?,
                other_parent: other_parent_hash(graph, other_parent)?,
            },
        };

        Ok(PackedEvent {
            content: Content {
                creator,
                timestamp: self.content.timestamp,
                transactions: self.content.transactions.clone(),
                cause,
            },
            signature: self.signature.clone(),
        })
    }

    // Returns whether this event sees `other`, i.e. whether there's a directed path from `other`
    // to `self` in the graph, and this event has not observed a fork by `other`'s creator.
    pub fn sees<E: AsRef<Event<T, P>>>(&self, other: E) -> bool {
        self.is_descendant_of(other).unwrap_or(false)
    }

    // Returns whether this event is descendant of `other`. If there are forks between this event
    // and `other` the answer cannot be determined from the events themselves and graph traversal
    // is required. `None` is returned in that case. Otherwise returns `Some` with the correct
    // answer.
    pub fn is_descendant_of<E: AsRef<Event<T, P>>>(&self, other: E) -> Option<bool> {
        match self.last_ancestor_by(other.as_ref().creator()) {
            LastAncestor::Some(last_index) => Some(last_index >= other.as_ref().index_by_creator()),
            LastAncestor::None => Some(false),
            LastAncestor::Fork => None,
        }
    }

    // Returns the index-by-creator of the last ancestor of this event created by the given peer.
    pub fn last_ancestor_by(&self, peer_index: PeerIndex) -> LastAncestor {
        if self.is_forking_peer(peer_index) {
            LastAncestor::Fork
        } else {
            self.cache
                .last_ancestors
                .get(peer_index)
                .map(|last_index| LastAncestor::Some(*last_index))
                .unwrap_or(LastAncestor::None)
        }
    }

    pub(crate) fn is_forking_peer(&self, peer_index: PeerIndex) -> bool {
        self.cache.forking_peers.contains(peer_index)
    }

    pub fn creator(&self) -> PeerIndex {
        self.content.creator
    }

    pub fn self_parent(&self) -> Option<EventIndex> {
        self.content.self_parent().cloned()
    }

    pub fn other_parent(&self) -> Option<EventIndex> {
        self.content.other_parent().cloned()
    }

    pub fn hash(&self) -> &EventHash {
        &self.cache.hash
    }

    pub fn signature(&self) -> &P::Signature {
        &self.signature
    }

    // Creator's wall clock at creation, in milliseconds since the unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.content.timestamp
    }

    pub fn transactions(&self) -> &[T] {
        &self.content.transactions
    }

    // Index of this event relative to other events by the same creator.
    pub fn index_by_creator(&self) -> usize {
        self.cache.index_by_creator
    }

    pub fn last_ancestors(&self) -> &PeerIndexMap<usize> {
        &self.cache.last_ancestors
    }

    pub fn is_genesis(&self) -> bool {
        if let Cause::Genesis = self.content.cause {
            true
        } else {
            false
        }
    }

    pub fn is_sync(&self) -> bool {
        if let Cause::Sync { .. } = self.content.cause {
            true
        } else {
            false
        }
    }
}

impl<T: NetworkEvent, P: PublicId> PartialEq for Event<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content && self.signature == other.signature
    }
}

impl<T: NetworkEvent, P: PublicId> Eq for Event<T, P> {}

impl<T: NetworkEvent, P: PublicId> Debug for Event<T, P> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Event{{")?;
        write!(formatter, " {:?}", self.hash())?;
        write!(formatter, ", {:?}", self.content.cause)?;
        write!(
            formatter,
            ", creator: {:?}, index_by_creator: {}",
            self.content.creator, self.cache.index_by_creator
        )?;
        write!(
            formatter,
            ", last_ancestors: {:?}",
            self.cache.last_ancestors
        )?;
        write!(formatter, " }}")
    }
}

impl<T: NetworkEvent, P: PublicId> AsRef<Self> for Event<T, P> {
    fn as_ref(&self) -> &Self {
        self
    }
}

#[derive(Debug)]
pub(crate) enum UnpackedEvent<T: NetworkEvent, P: PublicId> {
    // Event is already in our gossip graph
    Known(EventIndex),
    // Event is not yet in our gossip graph
    New(Event<T, P>),
}

pub(crate) enum LastAncestor {
    // There are no forks and the ancestor exists.
    Some(usize),
    // Ancestor doesn't exist.
    None,
    // Fork detected. Ancestor cannot be determined from the events only. Graph traversal required.
    Fork,
}

// Properties of `Event` that can be computed from its `Content`.
struct Cache {
    // Hash of the full event (content and signature).
    hash: EventHash,
    // Index of this event relative to other events by the same creator.
    index_by_creator: usize,
    // Index of each peer's latest event that is an ancestor of this event.
    last_ancestors: PeerIndexMap<usize>,
    // Peers with a fork having both sides seen by this event.
    forking_peers: PeerIndexSet,
}

impl Cache {
    fn new<T: NetworkEvent, S: SecretId>(
        hash: EventHash,
        content: &Content<T, EventIndex, PeerIndex>,
        graph: &Graph<T, S::PublicId>,
        peer_list: &PeerList<S>,
        forking_peers: &PeerIndexSet,
    ) -> Self {
        let self_parent = content.self_parent().and_then(|index| graph.get(*index));
        let other_parent = content.other_parent().and_then(|index| graph.get(*index));

        let (index_by_creator, last_ancestors) = index_by_creator_and_last_ancestors(
            content.creator,
            self_parent.map(|e| e.inner()),
            other_parent.map(|e| e.inner()),
            peer_list,
        );
        let forking_peers = join_forking_peers(
            self_parent.map(|e| e.inner()),
            other_parent.map(|e| e.inner()),
            forking_peers,
        );

        Self {
            hash,
            index_by_creator,
            last_ancestors,
            forking_peers,
        }
    }
}

fn index_by_creator_and_last_ancestors<T: NetworkEvent, S: SecretId>(
    creator: PeerIndex,
    self_parent: Option<&Event<T, S::PublicId>>,
    other_parent: Option<&Event<T, S::PublicId>>,
    peer_list: &PeerList<S>,
) -> (usize, PeerIndexMap<usize>) {
    let (index_by_creator, mut last_ancestors) = if let Some(self_parent) = self_parent {
        (
            self_parent.index_by_creator() + 1,
            self_parent.last_ancestors().clone(),
        )
    } else {
        // Genesis event
        (0, PeerIndexMap::default())
    };

    if let Some(other_parent) = other_parent {
        for (peer_index, _) in peer_list.iter() {
            if let Some(other_index) = other_parent.last_ancestors().get(peer_index) {
                if let Some(existing_index) = last_ancestors.get_mut(peer_index) {
                    *existing_index = cmp::max(*existing_index, *other_index);
                } else {
                    let _ = last_ancestors.insert(peer_index, *other_index);
                }
            }
        }
    }

    let _ = last_ancestors.insert(creator, index_by_creator);

    (index_by_creator, last_ancestors)
}

// An event's forking_peers list is a union inherited from its self_parent and other_parent,
// extended with the forks observed during the merge that created this event.
fn join_forking_peers<T: NetworkEvent, P: PublicId>(
    self_parent: Option<&Event<T, P>>,
    other_parent: Option<&Event<T, P>>,
    prev_forking_peers: &PeerIndexSet,
) -> PeerIndexSet {
    let mut forking_peers = PeerIndexSet::default();
    forking_peers.extend(
        self_parent
            .into_iter()
            .flat_map(|parent| parent.cache.forking_peers.iter()),
    );
    forking_peers.extend(
        other_parent
            .into_iter()
            .flat_map(|parent| parent.cache.forking_peers.iter()),
    );
    forking_peers.extend(prev_forking_peers.iter());
    forking_peers
}

fn compute_event_hash_and_signature<T: NetworkEvent, S: SecretId>(
    content: &Content<T, EventHash, S::PublicId>,
    our_id: &S,
) -> (EventHash, <S::PublicId as PublicId>::Signature) {
    let serialised_content = serialise(content);
    let signature = our_id.sign_detached(&serialised_content);
    let hash = EventHash(Hash::from(serialise(&(content, &signature)).as_slice()));

    (hash, signature)
}

fn now_millis() -> u64 {
    let elapsed = unwrap!(
        SystemTime::now().duration_since(UNIX_EPOCH),
        "wall clock is before the unix epoch"
    );
    elapsed.as_secs() * 1000 + u64::from(elapsed.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{PeerId, Transaction};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    struct Context {
        graph: Graph<Transaction, PeerId>,
        peer_list: PeerList<PeerId>,
    }

    impl Context {
        fn new(our_id: PeerId) -> Self {
            Self {
                graph: Graph::new(),
                peer_list: PeerList::new(our_id),
            }
        }
    }

    fn create_two_contexts() -> (Context, Context) {
        let mut rng = XorShiftRng::seed_from_u64(11387);
        let alice_id = PeerId::new("Alice", &mut rng);
        let bob_id = PeerId::new("Bob", &mut rng);

        let mut alice = Context::new(alice_id.clone());
        let _ = alice.peer_list.add_peer(bob_id.clone());
        let mut bob = Context::new(bob_id);
        let _ = bob.peer_list.add_peer(alice_id);

        (alice, bob)
    }

    // Packs `event` in the `src` context and unpacks it into the `dst` context.
    fn convert_event(
        event: &Event<Transaction, PeerId>,
        src: &Context,
        dst: &Context,
    ) -> Event<Transaction, PeerId> {
        let packed = unwrap!(event.pack(&src.graph, &src.peer_list));
        let hash = packed.compute_hash();
        match unwrap!(Event::unpack(
            packed,
            &hash,
            &PeerIndexSet::default(),
            &dst.graph,
            &dst.peer_list,
        )) {
            UnpackedEvent::New(event) => event,
            UnpackedEvent::Known(_) => panic!("Unexpected known event"),
        }
    }

    #[test]
    fn event_construction_genesis() {
        let (alice, _) = create_two_contexts();
        let genesis = Event::new_genesis(
            vec![Transaction::new("zero")],
            &alice.graph,
            &alice.peer_list,
        );

        assert!(genesis.is_genesis());
        assert!(!genesis.is_sync());
        assert!(genesis.self_parent().is_none());
        assert!(genesis.other_parent().is_none());
        assert_eq!(genesis.index_by_creator(), 0);
        assert_eq!(genesis.transactions(), &[Transaction::new("zero")]);
    }

    #[test]
    fn event_construction_sync() {
        let (mut alice, bob) = create_two_contexts();

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let b_0 = Event::new_genesis(vec![], &bob.graph, &bob.peer_list);
        let b_0 = convert_event(&b_0, &bob, &alice);

        let a_0_index = alice.graph.insert(a_0).event_index();
        let b_0_index = alice.graph.insert(b_0).event_index();

        let sync = unwrap!(Event::new_sync(
            a_0_index,
            b_0_index,
            vec![],
            &alice.graph,
            &alice.peer_list,
            &PeerIndexSet::default(),
        ));

        assert!(sync.is_sync());
        assert!(!sync.is_genesis());
        assert_eq!(sync.self_parent(), Some(a_0_index));
        assert_eq!(sync.other_parent(), Some(b_0_index));
        assert_eq!(sync.index_by_creator(), 1);
    }

    #[test]
    fn event_construction_sync_with_phony_self_parent() {
        let (mut alice, bob) = create_two_contexts();

        let b_0 = Event::new_genesis(vec![], &bob.graph, &bob.peer_list);
        let b_0 = convert_event(&b_0, &bob, &alice);
        let b_0_index = alice.graph.insert(b_0).event_index();

        match Event::new_sync(
            EventIndex::PHONY,
            b_0_index,
            vec![],
            &alice.graph,
            &alice.peer_list,
            &PeerIndexSet::default(),
        ) {
            Err(Error::UnknownSelfParent) => (),
            x => panic!("Unexpected {:?}", x.map(|_| ())),
        }
    }

    #[test]
    fn event_construction_unpack() {
        let (mut alice, _) = create_two_contexts();

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let packed = unwrap!(a_0.pack(&alice.graph, &alice.peer_list));
        let hash = packed.compute_hash();

        let unpacked = match unwrap!(Event::unpack(
            packed.clone(),
            &hash,
            &PeerIndexSet::default(),
            &alice.graph,
            &alice.peer_list,
        )) {
            UnpackedEvent::New(event) => event,
            UnpackedEvent::Known(_) => panic!("Unexpected known event"),
        };

        assert_eq!(a_0, unpacked);

        let _ = alice.graph.insert(unpacked);
        match unwrap!(Event::unpack(
            packed,
            &hash,
            &PeerIndexSet::default(),
            &alice.graph,
            &alice.peer_list,
        )) {
            UnpackedEvent::New(_) => panic!("Unexpected new event"),
            UnpackedEvent::Known(_) => (),
        }
    }

    #[test]
    fn event_construction_unpack_fail_with_wrong_hash() {
        let (alice, _) = create_two_contexts();

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let packed = unwrap!(a_0.pack(&alice.graph, &alice.peer_list));

        match Event::unpack(
            packed,
            &EventHash::ZERO,
            &PeerIndexSet::default(),
            &alice.graph,
            &alice.peer_list,
        ) {
            Err(Error::HashMismatch) => (),
            x => panic!("Expected HashMismatch, got {:?}", x.map(|_| ())),
        }
    }

    #[test]
    fn event_construction_unpack_fail_with_wrong_signature() {
        let (alice, _) = create_two_contexts();

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let mut packed = unwrap!(a_0.pack(&alice.graph, &alice.peer_list));
        packed.signature = alice.peer_list.our_id().sign_detached(&[123]);
        let hash = packed.compute_hash();

        match Event::unpack(
            packed,
            &hash,
            &PeerIndexSet::default(),
            &alice.graph,
            &alice.peer_list,
        ) {
            Err(Error::SignatureFailure) => (),
            x => panic!("Expected SignatureFailure, got {:?}", x.map(|_| ())),
        }
    }

    #[test]
    fn event_construction_unpack_fail_with_malformed_parents() {
        let (mut alice, bob) = create_two_contexts();

        let a_0 = Event::new_genesis(vec![], &alice.graph, &alice.peer_list);
        let b_0 = Event::new_genesis(vec![], &bob.graph, &bob.peer_list);
        let b_0 = convert_event(&b_0, &bob, &alice);

        let a_0_hash = *a_0.hash();
        let b_0_hash = *b_0.hash();
        let _ = alice.graph.insert(a_0);
        let _ = alice.graph.insert(b_0);

        // Self-parent by a different creator: sign a content whose self-parent is Bob's event.
        let content = Content {
            creator: alice.peer_list.our_pub_id().clone(),
            timestamp: 0,
            transactions: Vec::<Transaction>::new(),
            cause: Cause::Sync {
                self_parent: b_0_hash,
                other_parent: a_0_hash,
            },
        };
        let signature = alice
            .peer_list
            .our_id()
            .sign_detached(&serialise(&content));
        let packed = PackedEvent { content, signature };
        let hash = packed.compute_hash();

        match Event::unpack(
            packed,
            &hash,
            &PeerIndexSet::default(),
            &alice.graph,
            &alice.peer_list,
        ) {
            Err(Error::MalformedParents) => (),
            x => panic!("Expected MalformedParents, got {:?}", x.map(|_| ())),
        }
    }
}
