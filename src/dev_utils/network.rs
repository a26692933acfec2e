// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::block::Block;
use crate::consensus::DEFAULT_COIN_PERIOD;
use crate::error::Result;
use crate::gossip::EventHash;
use crate::mock::{PeerId, Transaction};
use crate::node::Node;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp;
use std::collections::{BTreeMap, BTreeSet};
use std::result;

/// A deterministic in-memory network of nodes: gossip messages are routed directly between
/// peers, and all randomness comes from an injected RNG.
pub struct Network {
    /// The nodes, keyed by their ids.
    pub peers: BTreeMap<PeerId, Node<Transaction, PeerId>>,
}

/// Disagreement between peers found by the consensus checks.
#[derive(Debug)]
pub enum ConsensusError {
    /// Two peers ordered events differently within their common prefix.
    DifferingBlocksOrder {
        /// First peer.
        peer_1: PeerId,
        /// First peer's consensus order.
        order_1: Vec<EventHash>,
        /// Second peer.
        peer_2: PeerId,
        /// Second peer's consensus order.
        order_2: Vec<EventHash>,
    },
}

impl Network {
    /// Creates a network with one node per id; every node knows the whole genesis group.
    pub fn new(ids: &[PeerId]) -> Self {
        let genesis: BTreeSet<PeerId> = ids.iter().cloned().collect();
        let peers = ids
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    Node::from_genesis(id.clone(), &genesis, DEFAULT_COIN_PERIOD),
                )
            })
            .collect();

        Network { peers }
    }

    /// Ids of all peers.
    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.keys().cloned().collect()
    }

    /// The node owned by the given peer.
    pub fn peer(&self, id: &PeerId) -> &Node<Transaction, PeerId> {
        unwrap!(self.peers.get(id), "{:?} is not in the network", id)
    }

    /// The node owned by the given peer, mutably.
    pub fn peer_mut(&mut self, id: &PeerId) -> &mut Node<Transaction, PeerId> {
        unwrap!(self.peers.get_mut(id), "{:?} is not in the network", id)
    }

    /// One gossip exchange: `sender` pushes its whole view to `recipient`.
    pub fn send_gossip(&mut self, sender: &PeerId, recipient: &PeerId) -> Result<()> {
        let push = self.peer(sender).create_gossip(recipient)?;
        self.peer_mut(recipient).handle_gossip(sender, push)
    }

    /// Runs `count` pushes between uniformly chosen ordered pairs of distinct peers. This is
    /// the protocol's random gossip, driven by the test RNG.
    pub fn execute_random_pushes<R: Rng>(&mut self, rng: &mut R, count: usize) {
        let ids = self.ids();
        assert!(ids.len() > 1);

        for _ in 0..count {
            let sender = unwrap!(ids.choose(rng)).clone();
            let recipient = loop {
                let candidate = unwrap!(ids.choose(rng));
                if *candidate != sender {
                    break candidate.clone();
                }
            };
            unwrap!(self.send_gossip(&sender, &recipient));
        }
    }

    /// Has every peer push to every other peer, `rounds` times.
    pub fn execute_full_sweeps(&mut self, rounds: usize) {
        let ids = self.ids();
        for _ in 0..rounds {
            for sender in &ids {
                for recipient in &ids {
                    if sender == recipient {
                        continue;
                    }
                    unwrap!(self.send_gossip(sender, recipient));
                }
            }
        }
    }

    /// Checks that every pair of peers agrees on the common prefix of their consensus orders.
    pub fn check_consensus_prefixes(&self) -> result::Result<(), ConsensusError> {
        let peers: Vec<_> = self.peers.iter().collect();

        for (position, (id_1, node_1)) in peers.iter().enumerate() {
            for (id_2, node_2) in peers.iter().skip(position + 1) {
                let order_1 = node_1.consensus_order();
                let order_2 = node_2.consensus_order();
                let common = cmp::min(order_1.len(), order_2.len());

                if order_1[..common] != order_2[..common] {
                    return Err(ConsensusError::DifferingBlocksOrder {
                        peer_1: (*id_1).clone(),
                        order_1: order_1.to_vec(),
                        peer_2: (*id_2).clone(),
                        order_2: order_2.to_vec(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The length of the shortest consensus order across all peers.
    pub fn min_consensus_length(&self) -> usize {
        self.peers
            .values()
            .map(|node| node.consensus_order().len())
            .min()
            .unwrap_or(0)
    }

    /// Drains every peer's consensused blocks.
    pub fn poll_blocks(&mut self) -> BTreeMap<PeerId, Vec<Block<Transaction, PeerId>>> {
        self.peers
            .iter_mut()
            .map(|(id, node)| {
                let mut blocks = Vec::new();
                while let Some(block) = node.poll() {
                    blocks.push(block);
                }
                (id.clone(), blocks)
            })
            .collect()
    }
}
