// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod cause;
mod content;
mod event;
mod event_hash;
mod graph;
mod messages;
mod packed_event;

pub use self::event_hash::EventHash;
pub use self::graph::EventIndex;
pub use self::messages::Push;
pub use self::packed_event::PackedEvent;

pub(crate) use self::event::{Event, UnpackedEvent};
pub(crate) use self::graph::{strongly_sees, Graph, IndexedEventRef};
pub(crate) use self::messages::sort_by_dependency;
