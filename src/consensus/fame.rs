// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::is_more_than_two_thirds;
use super::rounds::RoundTable;
use crate::gossip::{strongly_sees, EventIndex, Graph, IndexedEventRef};
use crate::id::{PublicId, SecretId};
use crate::network_event::NetworkEvent;
use crate::peer_list::PeerList;
use crate::serialise;
use fnv::FnvHashMap;
use std::cmp;
use std::collections::BTreeMap;

/// The virtual election deciding which witnesses are famous.
///
/// Witnesses of later rounds vote on every earlier undecided witness: the first round of voters
/// votes by direct sight, later rounds adopt the majority among the previous-round witnesses
/// they strongly see, and a supermajority faction in a regular round decides the election. In
/// every `coin_period`-th round a voter that sees no supermajority flips a pseudorandom coin
/// derived from its own signature instead, which breaks the rare adversarial stalemates.
///
/// Votes only depend on the voter's ancestry, so a memoized vote never has to be revised when
/// more events arrive; the whole procedure is a monotonic fixpoint.
pub(crate) struct FameState {
    // Memoized votes: (voter witness, target witness) -> vote. Scratch state; rows of decided
    // targets are pruned.
    votes: FnvHashMap<(EventIndex, EventIndex), bool>,
    // Fame verdicts. Monotonic, never overwritten.
    verdicts: BTreeMap<EventIndex, bool>,
    coin_period: u64,
}

impl FameState {
    pub fn new(coin_period: u64) -> Self {
        assert!(coin_period > 1, "coin period must exceed 1");
        FameState {
            votes: FnvHashMap::default(),
            verdicts: BTreeMap::new(),
            coin_period,
        }
    }

    /// The fame verdict of the given witness, if decided.
    pub fn verdict(&self, witness: EventIndex) -> Option<bool> {
        self.verdicts.get(&witness).cloned()
    }

    pub fn is_decided(&self, witness: EventIndex) -> bool {
        self.verdicts.contains_key(&witness)
    }

    /// Runs the election to a fixpoint over the current witness table. May be called after
    /// every merge; votes already cast are never recomputed.
    pub fn process<T, S>(
        &mut self,
        graph: &Graph<T, S::PublicId>,
        peer_list: &PeerList<S>,
        rounds: &RoundTable,
    ) where
        T: NetworkEvent,
        S: SecretId,
    {
        let max_round = rounds.max_witness_round();
        let target_rounds: Vec<u64> = rounds.witness_rounds().collect();

        for target_round in target_rounds {
            let targets: Vec<EventIndex> = rounds
                .witnesses_of(target_round)
                .map(|(_, index)| index)
                .collect();

            for target in targets {
                if self.is_decided(target) {
                    continue;
                }

                'election: for voter_round in (target_round + 1)..=max_round {
                    for (_, voter) in rounds.witnesses_of(voter_round) {
                        if self.votes.contains_key(&(voter, target)) {
                            continue;
                        }
                        if self.compute_vote(
                            graph,
                            peer_list,
                            rounds,
                            voter,
                            voter_round,
                            target,
                            target_round,
                        ) {
                            // Fame latches at the first deciding voter.
                            break 'election;
                        }
                    }
                }
            }
        }
    }

    // Computes and memoizes `voter`'s vote on `target`. Returns whether the vote decided the
    // target's fame.
    fn compute_vote<T, S>(
        &mut self,
        graph: &Graph<T, S::PublicId>,
        peer_list: &PeerList<S>,
        rounds: &RoundTable,
        voter: EventIndex,
        voter_round: u64,
        target: EventIndex,
        target_round: u64,
    ) -> bool
    where
        T: NetworkEvent,
        S: SecretId,
    {
        let voter_ref = match graph.get(voter) {
            Some(event) => event,
            None => {
                log_or_panic!("unknown voter {:?}", voter);
                return false;
            }
        };

        let distance = voter_round - target_round;
        if distance == 1 {
            // Bootstrap round: vote whether the voter sees the target.
            let vote = match graph.get(target) {
                Some(target_ref) => voter_ref.sees(target_ref),
                None => {
                    log_or_panic!("unknown election target {:?}", target);
                    false
                }
            };
            let _ = self.votes.insert((voter, target), vote);
            return false;
        }

        // Tally the votes of the previous-round witnesses the voter strongly sees.
        let mut yes = 0;
        let mut no = 0;
        for (_, prev) in rounds.witnesses_of(voter_round - 1) {
            let prev_ref = match graph.get(prev) {
                Some(event) => event,
                None => continue,
            };
            if !strongly_sees(graph, peer_list, voter_ref, prev_ref) {
                continue;
            }
            match self.votes.get(&(prev, target)) {
                Some(true) => yes += 1,
                Some(false) => no += 1,
                None => {
                    // Earlier rounds vote first; a strongly seen witness is an ancestor of the
                    // voter and therefore already voted.
                    log_or_panic!(
                        "missing vote of {:?} on {:?} while tallying for {:?}",
                        prev,
                        target,
                        voter
                    );
                }
            }
        }

        let vote = yes >= no;
        let faction = cmp::max(yes, no);
        let voter_count = peer_list.voter_count();
        let supermajority = is_more_than_two_thirds(faction, voter_count);

        if distance % self.coin_period == 0 {
            // Coin round: carry a supermajority vote forward, otherwise flip the voter's coin.
            let vote = if supermajority {
                vote
            } else {
                coin_flip(voter_ref)
            };
            let _ = self.votes.insert((voter, target), vote);
            false
        } else {
            let _ = self.votes.insert((voter, target), vote);
            if supermajority {
                self.decide(target, vote);
                true
            } else {
                false
            }
        }
    }

    fn decide(&mut self, target: EventIndex, famous: bool) {
        debug!("witness {:?} decided: famous = {}", target, famous);
        let _ = self.verdicts.insert(target, famous);
        self.votes.retain(|(_, decided), _| *decided != target);
    }
}

// The pseudorandom coin of a voter: the low bit of the middle byte of its signature.
fn coin_flip<T, P>(voter: IndexedEventRef<T, P>) -> bool
where
    T: NetworkEvent,
    P: PublicId,
{
    let bytes = serialise(voter.signature());
    if bytes.is_empty() {
        return false;
    }
    bytes[bytes.len() / 2] & 1 == 1
}
