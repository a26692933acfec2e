// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::network::Network;
use crate::mock::create_ids;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

/// Test environment: the network under test plus the seeded RNG every random choice is drawn
/// from, so that any failing run can be replayed from its seed.
pub struct Environment {
    /// The simulated network.
    pub network: Network,
    /// Source of all randomness in the test.
    pub rng: XorShiftRng,
}

impl Environment {
    /// Creates `count` named peers and the network connecting them, all derived from `seed`.
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let ids = create_ids(count, &mut rng);
        let network = Network::new(&ids);

        Environment { network, rng }
    }
}
