// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::fame::FameState;
use super::rounds::RoundTable;
use crate::gossip::{EventHash, EventIndex, Graph, IndexedEventRef};
use crate::id::PublicId;
use crate::network_event::NetworkEvent;
use crate::serialise;
use std::collections::BTreeSet;

/// The append-only consensus order.
///
/// Rounds are consumed in ascending order once every one of their witnesses has a fame verdict.
/// An event is received by the first consumed round whose famous witnesses all see it; within a
/// round, events order by received time (the median of the timestamps at which each famous
/// witness's creator first saw the event), then by whitened signature.
pub(crate) struct OrderQueue {
    order: Vec<EventHash>,
    ordered: BTreeSet<EventIndex>,
    // The next round whose famous witnesses have not been used for ordering yet.
    next_round: u64,
}

/// An event that has just been assigned its place in the consensus order.
pub(crate) struct OrderedEvent {
    pub index: EventIndex,
    pub received_round: u64,
    pub received_time: u64,
}

impl OrderQueue {
    pub fn new() -> Self {
        OrderQueue {
            order: Vec::new(),
            ordered: BTreeSet::new(),
            next_round: 1,
        }
    }

    /// The consensus order so far: event hashes, oldest first. Only ever appended to.
    pub fn consensus_order(&self) -> &[EventHash] {
        &self.order
    }

    /// Consumes every round that is fully decided and orders the events it receives. Returns
    /// the newly ordered events in consensus order.
    pub fn process<T, P>(
        &mut self,
        graph: &Graph<T, P>,
        rounds: &RoundTable,
        fame: &FameState,
    ) -> Vec<OrderedEvent>
    where
        T: NetworkEvent,
        P: PublicId,
    {
        let mut newly_ordered = Vec::new();

        while self.next_round <= rounds.max_witness_round() {
            let round = self.next_round;
            let witnesses: Vec<EventIndex> =
                rounds.witnesses_of(round).map(|(_, index)| index).collect();
            if witnesses.is_empty()
                || !witnesses.iter().all(|witness| fame.is_decided(*witness))
            {
                break;
            }

            let famous: Vec<IndexedEventRef<T, P>> = witnesses
                .iter()
                .filter(|witness| fame.verdict(**witness) == Some(true))
                .filter_map(|witness| graph.get(*witness))
                .collect();
            if famous.is_empty() {
                // Nothing can be received by an empty famous set; the round orders nothing.
                debug!("round {} decided with no famous witnesses", round);
                self.next_round += 1;
                continue;
            }

            // Events received by this round: not yet ordered, assigned no later than this
            // round, and seen by every famous witness.
            let whitener = signature_whitener(&famous);
            let mut batch: Vec<(u64, Vec<u8>, EventHash, EventIndex)> = graph
                .iter()
                .filter(|event| !self.ordered.contains(&event.event_index()))
                .filter(|event| {
                    rounds
                        .round_of(event.event_index())
                        .map_or(false, |event_round| event_round <= round)
                })
                .filter(|event| famous.iter().all(|witness| witness.sees(*event)))
                .map(|event| {
                    (
                        received_time(graph, &famous, event),
                        whiten(serialise(event.signature()), &whitener),
                        *event.hash(),
                        event.event_index(),
                    )
                })
                .collect();
            batch.sort();

            for (received_time, _, hash, index) in batch {
                let _ = self.ordered.insert(index);
                self.order.push(hash);
                newly_ordered.push(OrderedEvent {
                    index,
                    received_round: round,
                    received_time,
                });
            }

            self.next_round += 1;
        }

        newly_ordered
    }
}

// The median of the timestamps at which each famous witness's creator first saw `event`: walk
// every famous witness's self-parent chain down to the earliest event that still sees `event`.
fn received_time<T, P>(
    graph: &Graph<T, P>,
    famous: &[IndexedEventRef<T, P>],
    event: IndexedEventRef<T, P>,
) -> u64
where
    T: NetworkEvent,
    P: PublicId,
{
    let mut timestamps: Vec<u64> = famous
        .iter()
        .map(|witness| {
            let mut first_seeing = *witness;
            while let Some(parent) = graph.self_parent(first_seeing) {
                if !parent.sees(event) {
                    break;
                }
                first_seeing = parent;
            }
            first_seeing.timestamp()
        })
        .collect();

    timestamps.sort();
    timestamps[(timestamps.len() - 1) / 2]
}

// XOR of the serialized signatures of the famous witnesses of a round.
fn signature_whitener<T, P>(famous: &[IndexedEventRef<T, P>]) -> Vec<u8>
where
    T: NetworkEvent,
    P: PublicId,
{
    famous.iter().fold(Vec::new(), |whitener, witness| {
        whiten(whitener, &serialise(witness.signature()))
    })
}

// XOR of two byte strings; the shorter one is zero-extended.
fn whiten(mut bytes: Vec<u8>, whitener: &[u8]) -> Vec<u8> {
    if whitener.len() > bytes.len() {
        bytes.resize(whitener.len(), 0);
    }
    for (byte, white) in bytes.iter_mut().zip(whitener) {
        *byte ^= white;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitening_is_commutative_xor() {
        let a = vec![0b1010, 0b0110];
        let b = vec![0b0011];

        assert_eq!(whiten(a.clone(), &b), vec![0b1001, 0b0110]);
        assert_eq!(whiten(b, &a), vec![0b1001, 0b0110]);
        assert_eq!(whiten(Vec::new(), &[]), Vec::<u8>::new());
    }

    #[test]
    fn median_timestamp_is_lower_middle() {
        let mut timestamps = vec![40, 10, 30, 20];
        timestamps.sort();
        assert_eq!(timestamps[(timestamps.len() - 1) / 2], 20);

        let mut timestamps = vec![40, 10, 30];
        timestamps.sort();
        assert_eq!(timestamps[(timestamps.len() - 1) / 2], 30);
    }
}
