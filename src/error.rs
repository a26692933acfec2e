// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::fmt::{self, Display, Formatter};
use std::result;

/// Hashgraph error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The hash an event was delivered under differs from the recomputed one.
    HashMismatch,
    /// Failed to verify signature.
    SignatureFailure,
    /// The event's parents break the genesis/sync shape or the self/other creator relations.
    MalformedParents,
    /// The event's self-parent is unknown to our node.
    UnknownSelfParent,
    /// The event's other-parent is unknown to our node.
    UnknownOtherParent,
    /// Peer is not known to our node.
    UnknownPeer,
    /// A creator signed two events occupying the same position on its self-parent chain.
    ForkDetected,
    /// The claimed parent links of a received batch form a cycle.
    CycleDetected,
    /// The transport layer failed to deliver a gossip exchange.
    TransportFailure,
    /// The gossip message is malformed or uses an unsupported protocol version.
    InvalidMessage,
    /// Logic error.
    Logic,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Error::HashMismatch => write!(
                f,
                "The hash the event was delivered under doesn't match its contents."
            ),
            Error::SignatureFailure => write!(
                f,
                "The message or signature might be corrupted, or the signer is wrong."
            ),
            Error::MalformedParents => write!(
                f,
                "The event's parents break the genesis/sync shape or the creator relations."
            ),
            Error::UnknownSelfParent => {
                write!(f, "The event's self-parent is unknown to this node.")
            }
            Error::UnknownOtherParent => {
                write!(f, "The event's other-parent is unknown to this node.")
            }
            Error::UnknownPeer => write!(f, "The peer_id is not known to our node's peer_list."),
            Error::ForkDetected => write!(
                f,
                "The creator signed two events occupying the same self-parent chain position."
            ),
            Error::CycleDetected => {
                write!(f, "The claimed parent links of the received batch form a cycle.")
            }
            Error::TransportFailure => {
                write!(f, "The transport layer failed to deliver the exchange.")
            }
            Error::InvalidMessage => write!(
                f,
                "The gossip message is malformed or uses an unsupported protocol version."
            ),
            Error::Logic => write!(f, "This is a logic error and represents a flaw in the code."),
        }
    }
}

/// A specialised `Result` type for hashgraph operations.
pub type Result<T> = result::Result<T, Error>;
