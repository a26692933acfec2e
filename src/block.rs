// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::gossip::EventHash;
use crate::id::{Proof, PublicId};
use crate::network_event::NetworkEvent;

/// A batch of transactions that has reached its final place in the consensus order, together
/// with the consensus metadata that put it there and the creator's proof over the carrying
/// event.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
#[serde(bound = "")]
pub struct Block<T: NetworkEvent, P: PublicId> {
    payload: Vec<T>,
    proof: Proof<P>,
    event_hash: EventHash,
    received_round: u64,
    received_time: u64,
}

impl<T: NetworkEvent, P: PublicId> Block<T, P> {
    pub(crate) fn new(
        payload: Vec<T>,
        proof: Proof<P>,
        event_hash: EventHash,
        received_round: u64,
        received_time: u64,
    ) -> Self {
        Block {
            payload,
            proof,
            event_hash,
            received_round,
            received_time,
        }
    }

    /// The transactions of this block, in the order their carrying event listed them.
    pub fn payload(&self) -> &[T] {
        &self.payload
    }

    /// The creator's id and signature over the carrying event.
    pub fn proof(&self) -> &Proof<P> {
        &self.proof
    }

    /// The hash of the event that carried this payload.
    pub fn event_hash(&self) -> &EventHash {
        &self.event_hash
    }

    /// The round in which every famous witness had seen the carrying event.
    pub fn received_round(&self) -> u64 {
        self.received_round
    }

    /// The median of the timestamps at which the famous witnesses' creators first saw the
    /// carrying event, in milliseconds since the unix epoch.
    pub fn received_time(&self) -> u64 {
        self.received_time
    }

    /// Is this block created and signed by the given peer?
    pub fn is_signed_by(&self, peer_id: &P) -> bool {
        self.proof.public_id() == peer_id
    }
}
