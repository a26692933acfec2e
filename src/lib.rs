// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! # Hashgraph
//!
//! An implementation of the Swirlds hashgraph consensus algorithm: a leaderless, asynchronous
//! Byzantine-fault-tolerant agreement protocol for a fixed set of peers.
//!
//! Each peer maintains a gossip graph of signed events. An event records its creator, the
//! creator's wall clock at creation, an opaque batch of transactions, and (except for the
//! creator's first, "genesis", event) two parent hashes: the creator's previous event and the
//! latest event of the peer it last heard from. Peers exchange their graphs via gossip: the
//! [`Node::create_gossip`](struct.Node.html#method.create_gossip) message carries the sender's
//! whole view, and [`Node::handle_gossip`](struct.Node.html#method.handle_gossip) merges the
//! unknown events in dependency order, then appends a new sync event joining both heads.
//!
//! From the graph alone, every peer deterministically derives the same total order of
//! transactions:
//!
//! 1. *divide rounds* assigns every event a round number and marks the first event of each
//!    creator in each round as a witness,
//! 2. *decide fame* runs a virtual election in which later witnesses vote on whether earlier
//!    witnesses are seen by a supermajority of the network, and
//! 3. *find order* stamps every event with the round and median time at which all famous
//!    witnesses first saw it, yielding the consensus order.
//!
//! Consensused transaction batches are returned as [`Block`](struct.Block.html)s from
//! [`Node::poll`](struct.Node.html#method.poll).
//!
//! The crate is generic over the transaction payload
//! ([`NetworkEvent`](trait.NetworkEvent.html)) and the peer identity
//! ([`SecretId`](trait.SecretId.html) / [`PublicId`](trait.PublicId.html)). A production
//! Ed25519 identity is provided by [`FullId`](struct.FullId.html); the transport connecting
//! peers, key storage and the driver loop deciding when to gossip are left to the consumer.

#![doc(test(attr(forbid(warnings))))]
#![deny(unsafe_code)]
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate unwrap;

#[macro_use]
mod macros;

mod block;
mod consensus;
/// **NOT FOR PRODUCTION USE**: in-memory network simulator for tests and examples.
pub mod dev_utils;
mod error;
mod gossip;
mod hash;
mod id;
mod key;
/// **NOT FOR PRODUCTION USE**: mock types for tests and examples.
pub mod mock;
mod network_event;
mod node;
mod peer_list;

pub use crate::block::Block;
pub use crate::consensus::DEFAULT_COIN_PERIOD;
pub use crate::error::{Error, Result};
pub use crate::gossip::{EventHash, PackedEvent, Push};
pub use crate::hash::Hash;
pub use crate::id::{Proof, PublicId, SecretId};
pub use crate::key::{FullId, PublicKeyId, Signature};
pub use crate::network_event::NetworkEvent;
pub use crate::node::Node;

use serde::de::DeserializeOwned;
use serde::Serialize;

// Canonical encoding used for event hashing and signing, and for the wire payload. Fixed-width
// little-endian integers, field order as declared; every peer must use the same encoder.
pub(crate) fn serialise<T: Serialize>(data: &T) -> Vec<u8> {
    unwrap!(bincode::serialize(data))
}

pub(crate) fn deserialise<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    bincode::deserialize(data).map_err(|_| Error::InvalidMessage)
}
