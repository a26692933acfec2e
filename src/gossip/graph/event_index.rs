// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

/// Index of an event in the graph arena. Assigned in insertion order, which is always a
/// topological order, so parents compare less than their children.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventIndex(pub(super) usize);

impl EventIndex {
    /// Index that references no event. For tests that need a dangling parent.
    #[cfg(test)]
    pub(crate) const PHONY: Self = EventIndex(usize::max_value());

    /// Position of this event in the graph's insertion order.
    pub fn topological_index(self) -> usize {
        self.0
    }
}
