// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use ring::constant_time;
use ring::digest::{digest, SHA256};
use std::fmt::{self, Debug, Formatter};

/// Number of bytes of a `Hash` digest.
pub const HASH_LEN: usize = 32;

/// A SHA-256 digest.
#[derive(Clone, Copy, Default, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Self = Hash([0; HASH_LEN]);

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl<'a> From<&'a [u8]> for Hash {
    fn from(data: &'a [u8]) -> Self {
        let mut bytes = [0; HASH_LEN];
        bytes.copy_from_slice(digest(&SHA256, data).as_ref());
        Hash(bytes)
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }
}

// Hashes are compared in constant time: they name attacker-supplied events, and equality checks
// against them happen before any other validation.
impl PartialEq for Hash {
    fn eq(&self, other: &Self) -> bool {
        constant_time::verify_slices_are_equal(&self.0, &other.0).is_ok()
    }
}

impl Eq for Hash {}

impl Debug for Hash {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "{:02x}{:02x}{:02x}..",
            self.0[0], self.0[1], self.0[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = Hash::from(&b"hashgraph"[..]);
        let b = Hash::from(&b"hashgraph"[..]);
        let c = Hash::from(&b"hashgrapi"[..]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Hash::ZERO);
    }
}
