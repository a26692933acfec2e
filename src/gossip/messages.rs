// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::event_hash::EventHash;
use super::packed_event::PackedEvent;
use crate::error::Error;
use crate::id::{PublicId, SecretId};
use crate::network_event::NetworkEvent;
use crate::{deserialise, serialise};
use std::collections::{BTreeMap, BTreeSet};

// Bumped on every incompatible change of the payload layout.
pub(crate) const PROTOCOL_VERSION: u32 = 1;

/// A gossip push: the sender's signed view of its gossip graph.
///
/// The payload carries the protocol version, the hash of the sender's latest own event (its
/// head) and the sender's whole `hash -> event` view. The outer signature covers the serialized
/// payload and authenticates the sender; it says nothing about the honesty of the contained
/// events, which are each validated separately on merge.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Push<T: NetworkEvent, P: PublicId> {
    payload: PushPayload<T, P>,
    signature: P::Signature,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct PushPayload<T: NetworkEvent, P: PublicId> {
    version: u32,
    head: EventHash,
    view: BTreeMap<EventHash, PackedEvent<T, P>>,
}

impl<T: NetworkEvent, P: PublicId> Push<T, P> {
    pub(crate) fn new<S: SecretId<PublicId = P>>(
        head: EventHash,
        view: BTreeMap<EventHash, PackedEvent<T, P>>,
        our_id: &S,
    ) -> Self {
        let payload = PushPayload {
            version: PROTOCOL_VERSION,
            head,
            view,
        };
        let signature = our_id.sign_detached(&serialise(&payload));

        Push { payload, signature }
    }

    /// Checks the outer signature under the claimed sender `src` and the protocol version, then
    /// releases the payload.
    pub(crate) fn open(
        self,
        src: &P,
    ) -> Result<(EventHash, BTreeMap<EventHash, PackedEvent<T, P>>), Error> {
        if !src.verify_signature(&self.signature, &serialise(&self.payload)) {
            return Err(Error::SignatureFailure);
        }
        if self.payload.version != PROTOCOL_VERSION {
            debug!(
                "rejecting gossip with protocol version {}",
                self.payload.version
            );
            return Err(Error::InvalidMessage);
        }

        Ok((self.payload.head, self.payload.view))
    }

    /// Encodes this message for the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialise(self)
    }

    /// Decodes a message received from the wire. Fails with `InvalidMessage` on anything that
    /// is not a well-formed encoding; the signature and version checks happen later, in
    /// [`Node::handle_gossip`](../struct.Node.html#method.handle_gossip).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        deserialise(bytes)
    }
}

/// Sorts a batch of packed events so that every parent precedes its children, considering only
/// dependencies within the batch. Ties resolve in hash order, so any two nodes sort the same
/// batch identically.
///
/// The parent links are attacker-controlled claims at this point, so they can form a cycle; in
/// that case the whole batch is rejected and nothing is inserted.
pub(crate) fn sort_by_dependency<T: NetworkEvent, P: PublicId>(
    mut batch: BTreeMap<EventHash, PackedEvent<T, P>>,
) -> Result<Vec<(EventHash, PackedEvent<T, P>)>, Error> {
    let mut in_degree: BTreeMap<EventHash, usize> =
        batch.keys().map(|hash| (*hash, 0)).collect();
    let mut dependants: BTreeMap<EventHash, Vec<EventHash>> = BTreeMap::new();

    for (hash, event) in &batch {
        let parents = event
            .self_parent()
            .into_iter()
            .chain(event.other_parent().into_iter());
        for parent in parents {
            if batch.contains_key(parent) {
                if let Some(degree) = in_degree.get_mut(hash) {
                    *degree += 1;
                }
                dependants.entry(*parent).or_insert_with(Vec::new).push(*hash);
            }
        }
    }

    let mut ready: BTreeSet<EventHash> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(hash, _)| *hash)
        .collect();
    let mut sorted_hashes = Vec::with_capacity(batch.len());

    while let Some(hash) = ready.iter().next().cloned() {
        let _ = ready.remove(&hash);
        sorted_hashes.push(hash);

        for dependant in dependants.get(&hash).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependant) {
                *degree -= 1;
                if *degree == 0 {
                    let _ = ready.insert(*dependant);
                }
            }
        }
    }

    if sorted_hashes.len() != batch.len() {
        return Err(Error::CycleDetected);
    }

    Ok(sorted_hashes
        .into_iter()
        .map(|hash| {
            let event = unwrap!(batch.remove(&hash));
            (hash, event)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::cause::Cause;
    use super::super::content::Content;
    use super::*;
    use crate::hash::Hash;
    use crate::mock::{PeerId, Transaction};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn fake_hash(tag: &[u8]) -> EventHash {
        EventHash(Hash::from(tag))
    }

    // A packed event with the given claimed parents; the signature only needs to exist, the
    // dependency sort never checks it.
    fn packed(
        id: &PeerId,
        cause: Cause<EventHash>,
    ) -> PackedEvent<Transaction, PeerId> {
        let content = Content {
            creator: id.clone(),
            timestamp: 0,
            transactions: Vec::new(),
            cause,
        };
        let signature = id.sign_detached(&serialise(&content));
        PackedEvent { content, signature }
    }

    #[test]
    fn sort_parents_before_children() {
        let mut rng = XorShiftRng::seed_from_u64(91);
        let alice = PeerId::new("Alice", &mut rng);
        let bob = PeerId::new("Bob", &mut rng);

        let h_a0 = fake_hash(b"a0");
        let h_b0 = fake_hash(b"b0");
        let h_b1 = fake_hash(b"b1");
        let h_b2 = fake_hash(b"b2");

        let mut batch = BTreeMap::new();
        let _ = batch.insert(
            h_b2,
            packed(
                &bob,
                Cause::Sync {
                    self_parent: h_b1,
                    other_parent: h_a0,
                },
            ),
        );
        let _ = batch.insert(
            h_b1,
            packed(
                &bob,
                Cause::Sync {
                    self_parent: h_b0,
                    other_parent: h_a0,
                },
            ),
        );
        let _ = batch.insert(h_b0, packed(&bob, Cause::Genesis));
        let _ = batch.insert(h_a0, packed(&alice, Cause::Genesis));

        let sorted = unwrap!(sort_by_dependency(batch));
        let order: Vec<_> = sorted.iter().map(|(hash, _)| *hash).collect();

        let position =
            |hash| unwrap!(order.iter().position(|h| *h == hash));
        assert_eq!(order.len(), 4);
        assert!(position(h_b0) < position(h_b1));
        assert!(position(h_b1) < position(h_b2));
        assert!(position(h_a0) < position(h_b1));
        assert!(position(h_a0) < position(h_b2));
    }

    #[test]
    fn sort_rejects_cycle() {
        let mut rng = XorShiftRng::seed_from_u64(92);
        let alice = PeerId::new("Alice", &mut rng);
        let bob = PeerId::new("Bob", &mut rng);

        let h_x = fake_hash(b"x");
        let h_y = fake_hash(b"y");

        // Two events claiming each other as self-parent. Only a Byzantine sender can produce
        // this shape, since honest hashes cannot be known before the parent exists.
        let mut batch = BTreeMap::new();
        let _ = batch.insert(
            h_x,
            packed(
                &alice,
                Cause::Sync {
                    self_parent: h_y,
                    other_parent: fake_hash(b"z"),
                },
            ),
        );
        let _ = batch.insert(
            h_y,
            packed(
                &bob,
                Cause::Sync {
                    self_parent: h_x,
                    other_parent: fake_hash(b"z"),
                },
            ),
        );

        match sort_by_dependency(batch) {
            Err(Error::CycleDetected) => (),
            x => panic!("Expected CycleDetected, got {:?}", x.map(|_| ())),
        }
    }

    #[test]
    fn push_survives_the_wire() {
        let mut rng = XorShiftRng::seed_from_u64(94);
        let alice = PeerId::new("Alice", &mut rng);

        let head = fake_hash(b"head");
        let mut view = BTreeMap::new();
        let _ = view.insert(head, packed(&alice, Cause::Genesis));
        let push = Push::new(head, view, &alice);

        let bytes = push.to_bytes();
        let decoded: Push<Transaction, PeerId> = unwrap!(Push::from_bytes(&bytes));
        let (decoded_head, decoded_view) = unwrap!(decoded.open(&alice));
        assert_eq!(decoded_head, head);
        assert_eq!(decoded_view.len(), 1);

        match Push::<Transaction, PeerId>::from_bytes(b"not a message") {
            Err(Error::InvalidMessage) => (),
            x => panic!("Expected InvalidMessage, got {:?}", x.map(|_| ())),
        }
    }

    #[test]
    fn push_roundtrip_and_tamper() {
        let mut rng = XorShiftRng::seed_from_u64(93);
        let alice = PeerId::new("Alice", &mut rng);
        let bob = PeerId::new("Bob", &mut rng);

        let head = fake_hash(b"head");
        let mut view = BTreeMap::new();
        let _ = view.insert(head, packed(&alice, Cause::Genesis));

        let push = Push::new(head, view.clone(), &alice);
        let (opened_head, opened_view) = unwrap!(push.open(&alice));
        assert_eq!(opened_head, head);
        assert_eq!(opened_view.len(), 1);

        // Claiming the wrong sender fails the outer signature.
        let push = Push::new(head, view.clone(), &alice);
        match push.open(&bob) {
            Err(Error::SignatureFailure) => (),
            x => panic!("Expected SignatureFailure, got {:?}", x.map(|_| ())),
        }

        // A re-signed payload with a foreign version number is rejected.
        let mut push = Push::new(head, view, &alice);
        push.payload.version = PROTOCOL_VERSION + 1;
        push.signature = alice.sign_detached(&serialise(&push.payload));
        match push.open(&alice) {
            Err(Error::InvalidMessage) => (),
            x => panic!("Expected InvalidMessage, got {:?}", x.map(|_| ())),
        }
    }
}
