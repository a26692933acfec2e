// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::id::{PublicId, SecretId};
use crate::key::{FullId, PublicKeyId, Signature};
use crate::network_event::NetworkEvent;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

const NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Eric", "Fred", "Gina", "Hank", "Iris", "Judy", "Kent",
    "Lucy", "Mike", "Nina", "Oran", "Paul", "Quin", "Rose", "Stan", "Tina",
];

/// **NOT FOR PRODUCTION USE**: Mock type implementing `PublicId` and `SecretId` traits. For
/// non-mocks, these two traits must be implemented by two separate types; a public key and secret
/// key respectively. Unlike a production id, a `PeerId` carries a human-readable name; its keys
/// and signatures are nevertheless real Ed25519 ones.
#[derive(Clone, Serialize, Deserialize)]
pub struct PeerId {
    id: String,
    pub_key: PublicKeyId,
    // The secret half is never serialized; a PeerId deserialized from the wire can only verify.
    #[serde(skip)]
    full_id: Option<FullId>,
}

impl PeerId {
    /// Creates a named id with a keypair drawn from `rng`.
    pub fn new<R: Rng>(id: &str, rng: &mut R) -> Self {
        let full_id = FullId::new(rng);
        PeerId {
            id: id.to_string(),
            pub_key: *full_id.public_id(),
            full_id: Some(full_id),
        }
    }

    /// The human-readable name of this id.
    pub fn name(&self) -> &str {
        &self.id
    }
}

impl PartialEq for PeerId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.pub_key == other.pub_key
    }
}

impl Eq for PeerId {}

impl PartialOrd for PeerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PeerId {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.id, &self.pub_key).cmp(&(&other.id, &other.pub_key))
    }
}

impl Hash for PeerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.pub_key.hash(state);
    }
}

impl Debug for PeerId {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.id)
    }
}

impl PublicId for PeerId {
    type Signature = Signature;

    fn verify_signature(&self, signature: &Self::Signature, data: &[u8]) -> bool {
        self.pub_key.verify_signature(signature, data)
    }
}

impl SecretId for PeerId {
    type PublicId = PeerId;

    fn public_id(&self) -> &Self::PublicId {
        self
    }

    fn sign_detached(&self, data: &[u8]) -> Signature {
        unwrap!(
            self.full_id.as_ref(),
            "{:?} has no secret key (deserialized mock id?)",
            self
        )
        .sign_detached(data)
    }
}

/// **NOT FOR PRODUCTION USE**: Mock type implementing `NetworkEvent` trait.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Transaction(String);

impl Transaction {
    /// Creates a transaction with the given label.
    pub fn new(id: &str) -> Self {
        Transaction(id.to_string())
    }
}

impl NetworkEvent for Transaction {}

impl Display for Transaction {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Transaction({})", self.0)
    }
}

impl Debug for Transaction {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// **NOT FOR PRODUCTION USE**: Returns a collection of mock node IDs with human-readable names.
pub fn create_ids<R: Rng>(count: usize, rng: &mut R) -> Vec<PeerId> {
    assert!(count <= NAMES.len());
    NAMES
        .iter()
        .take(count)
        .map(|name| PeerId::new(name, rng))
        .collect()
}
