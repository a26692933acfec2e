// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// This represents the type of transaction payloads for which consensus is reached. The payload
/// is opaque to the consensus core; it only needs to be serializable and totally ordered so that
/// it can travel inside events and live in deterministic collections.
pub trait NetworkEvent:
    Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Serialize + DeserializeOwned + Debug
{
}
