// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::cause::Cause;
use serde::{Deserialize, Serialize};

/// Everything an event's creator signs: creator identity, creation time, payload and parents.
/// Generic over the parent identifier `E` (`EventHash` on the wire, `EventIndex` in the graph)
/// and the creator identifier `C` (a `PublicId` on the wire, a `PeerIndex` in the graph).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, E: Serialize, C: Serialize",
    deserialize = "T: Deserialize<'de>, E: Deserialize<'de>, C: Deserialize<'de>"
))]
pub(crate) struct Content<T, E, C> {
    // Creator of the event.
    pub creator: C,
    // Creator's wall clock at creation, in milliseconds since the unix epoch.
    pub timestamp: u64,
    // Transactions carried by this event. Possibly empty.
    pub transactions: Vec<T>,
    // Parents: genesis events have none, sync events have a self-parent and an other-parent.
    pub cause: Cause<E>,
}

impl<T, E, C> Content<T, E, C> {
    pub fn self_parent(&self) -> Option<&E> {
        self.cause.self_parent()
    }

    pub fn other_parent(&self) -> Option<&E> {
        self.cause.other_parent()
    }
}
