// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::id::{PublicId, SecretId};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};

/// Number of bytes of an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Number of bytes of a key seed.
pub const SEED_LEN: usize = 32;

/// An Ed25519 public key identifying a peer on the network.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKeyId([u8; PUBLIC_KEY_LEN]);

impl PublicKeyId {
    /// Returns the raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl Debug for PublicKeyId {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "PublicKeyId({:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2]
        )
    }
}

impl PublicId for PublicKeyId {
    type Signature = Signature;

    fn verify_signature(&self, signature: &Self::Signature, data: &[u8]) -> bool {
        VerifyingKey::from_bytes(&self.0)
            .map(|key| key.verify(data, &signature.0).is_ok())
            .unwrap_or(false)
    }
}

/// A detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Returns the raw signature bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl Debug for Signature {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(
            formatter,
            "Signature({:02x}{:02x}{:02x}..)",
            bytes[0], bytes[1], bytes[2]
        )
    }
}

/// A peer's own Ed25519 keypair, implementing [`SecretId`](trait.SecretId.html).
#[derive(Clone)]
pub struct FullId {
    signing: SigningKey,
    public: PublicKeyId,
}

impl FullId {
    /// Generates a keypair from the given randomness source.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self::from_seed(rng.gen())
    }

    /// Derives a keypair deterministically from `seed`. The seed must be random and kept secret.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> Self {
        let signing = SigningKey::from_bytes(&seed);
        let public = PublicKeyId(signing.verifying_key().to_bytes());
        FullId { signing, public }
    }
}

impl Debug for FullId {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "FullId({:?})", self.public)
    }
}

impl SecretId for FullId {
    type PublicId = PublicKeyId;

    fn public_id(&self) -> &PublicKeyId {
        &self.public
    }

    fn sign_detached(&self, data: &[u8]) -> Signature {
        Signature(self.signing.sign(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn sign_and_verify() {
        let mut rng = XorShiftRng::seed_from_u64(42);
        let alice = FullId::new(&mut rng);
        let bob = FullId::new(&mut rng);

        let signature = alice.sign_detached(b"hello");

        assert!(alice.public_id().verify_signature(&signature, b"hello"));
        assert!(!alice.public_id().verify_signature(&signature, b"hullo"));
        assert!(!bob.public_id().verify_signature(&signature, b"hello"));
    }

    #[test]
    fn seeded_keys_are_deterministic() {
        let a = FullId::from_seed([7; SEED_LEN]);
        let b = FullId::from_seed([7; SEED_LEN]);

        assert_eq!(a.public_id(), b.public_id());
        assert_eq!(a.sign_detached(b"data"), b.sign_detached(b"data"));
    }
}
