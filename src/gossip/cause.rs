// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::event_hash::EventHash;
use super::graph::{EventIndex, Graph};
use crate::error::Error;
use crate::id::PublicId;
use crate::network_event::NetworkEvent;

/// The parent shape of an event, generic over the parent identifier: `EventHash` on the wire,
/// `EventIndex` once the event is stored in the graph.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub(crate) enum Cause<E> {
    // The creator's first event. Has no parents.
    Genesis,
    // Event appended after merging a peer's view: identifiers of the creator's latest event and
    // of the latest event of the peer whose view was merged.
    Sync { self_parent: E, other_parent: E },
}

impl<E> Cause<E> {
    pub fn self_parent(&self) -> Option<&E> {
        match *self {
            Cause::Genesis => None,
            Cause::Sync {
                ref self_parent, ..
            } => Some(self_parent),
        }
    }

    pub fn other_parent(&self) -> Option<&E> {
        match *self {
            Cause::Genesis => None,
            Cause::Sync {
                ref other_parent, ..
            } => Some(other_parent),
        }
    }
}

pub(super) fn self_parent_hash<T: NetworkEvent, P: PublicId>(
    graph: &Graph<T, P>,
    index: EventIndex,
) -> Result<EventHash, Error> {
    graph
        .get(index)
        .map(|event| *event.hash())
        .ok_or(Error::UnknownSelfParent)
}

pub(super) fn other_parent_hash<T: NetworkEvent, P: PublicId>(
    graph: &Graph<T, P>,
    index: EventIndex,
) -> Result<EventHash, Error> {
    graph
        .get(index)
        .map(|event| *event.hash())
        .ok_or(Error::UnknownOtherParent)
}

pub(super) fn self_parent_index<T: NetworkEvent, P: PublicId>(
    graph: &Graph<T, P>,
    hash: &EventHash,
) -> Result<EventIndex, Error> {
    graph.get_index(hash).ok_or_else(|| {
        debug!("unknown self-parent with hash {:?}", hash);
        Error::UnknownSelfParent
    })
}

pub(super) fn other_parent_index<T: NetworkEvent, P: PublicId>(
    graph: &Graph<T, P>,
    hash: &EventHash,
) -> Result<EventIndex, Error> {
    graph.get_index(hash).ok_or_else(|| {
        debug!("unknown other-parent with hash {:?}", hash);
        Error::UnknownOtherParent
    })
}
