// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::collections::{BTreeMap, BTreeSet};
use std::iter::FromIterator;

/// Index of a peer in the `PeerList`. Instead of using the full public ids to refer to peers, we
/// use these indices, for space and performance reasons.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct PeerIndex(pub(super) usize);

impl PeerIndex {
    /// Index of our own peer.
    pub const OUR: Self = PeerIndex(0);
}

/// Map keyed by peer indices. Iteration order follows the index order, which is the same on a
/// given node but not across nodes; nothing consensus-relevant may depend on it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct PeerIndexMap<T>(BTreeMap<PeerIndex, T>);

impl<T> PeerIndexMap<T> {
    pub fn get(&self, index: PeerIndex) -> Option<&T> {
        self.0.get(&index)
    }

    pub fn get_mut(&mut self, index: PeerIndex) -> Option<&mut T> {
        self.0.get_mut(&index)
    }

    pub fn insert(&mut self, index: PeerIndex, value: T) -> Option<T> {
        self.0.insert(index, value)
    }

    pub fn remove(&mut self, index: PeerIndex) -> Option<T> {
        self.0.remove(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeerIndex, &T)> {
        self.0.iter().map(|(index, value)| (*index, value))
    }
}

impl<T> Default for PeerIndexMap<T> {
    fn default() -> Self {
        PeerIndexMap(BTreeMap::new())
    }
}

impl<T> FromIterator<(PeerIndex, T)> for PeerIndexMap<T> {
    fn from_iter<I: IntoIterator<Item = (PeerIndex, T)>>(iter: I) -> Self {
        PeerIndexMap(iter.into_iter().collect())
    }
}

/// Set of peer indices.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub(crate) struct PeerIndexSet(BTreeSet<PeerIndex>);

impl PeerIndexSet {
    pub fn insert(&mut self, index: PeerIndex) -> bool {
        self.0.insert(index)
    }

    pub fn contains(&self, index: PeerIndex) -> bool {
        self.0.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PeerIndex> + '_ {
        self.0.iter().cloned()
    }
}

impl Extend<PeerIndex> for PeerIndexSet {
    fn extend<I: IntoIterator<Item = PeerIndex>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl FromIterator<PeerIndex> for PeerIndexSet {
    fn from_iter<I: IntoIterator<Item = PeerIndex>>(iter: I) -> Self {
        PeerIndexSet(iter.into_iter().collect())
    }
}
