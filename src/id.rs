// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// The public identity of a peer. It provides functionality to verify signatures created by the
/// corresponding secret key.
pub trait PublicId: Clone + Debug + Eq + Ord + Hash + Serialize + DeserializeOwned {
    /// The signature type produced by the corresponding [`SecretId`](trait.SecretId.html).
    type Signature: Clone + Debug + Eq + Ord + Hash + Serialize + DeserializeOwned;

    /// Verifies `signature` against `data` using this public id.
    fn verify_signature(&self, signature: &Self::Signature, data: &[u8]) -> bool;
}

/// The secret identity of the peer owning a node. It provides functionality to sign data on the
/// peer's behalf.
pub trait SecretId {
    /// The public counterpart of this id.
    type PublicId: PublicId;

    /// Returns the public counterpart of this id.
    fn public_id(&self) -> &Self::PublicId;

    /// Signs `data` with the secret key of this id.
    fn sign_detached(&self, data: &[u8]) -> <Self::PublicId as PublicId>::Signature;
}

/// A signature bundled with the public id of its signer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug)]
#[serde(bound = "")]
pub struct Proof<P: PublicId> {
    pub(crate) public_id: P,
    pub(crate) signature: P::Signature,
}

impl<P: PublicId> Proof<P> {
    /// Returns the id of the signer.
    pub fn public_id(&self) -> &P {
        &self.public_id
    }

    /// Returns the signature.
    pub fn signature(&self) -> &P::Signature {
        &self.signature
    }

    /// Verifies this proof against `data`.
    pub fn is_valid(&self, data: &[u8]) -> bool {
        self.public_id.verify_signature(&self.signature, data)
    }
}
