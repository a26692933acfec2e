// Copyright 2018 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod fame;
mod order;
mod rounds;

pub(crate) use self::fame::FameState;
pub(crate) use self::order::OrderQueue;
pub(crate) use self::rounds::RoundTable;

/// The default coin round period: in every `DEFAULT_COIN_PERIOD`-th voting round an undecided
/// election falls back to a pseudorandom coin flip, which guarantees termination.
pub const DEFAULT_COIN_PERIOD: u64 = 10;

/// Returns whether `count` is strictly more than two thirds of `total`.
pub(crate) fn is_more_than_two_thirds(count: usize, total: usize) -> bool {
    3 * count > 2 * total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supermajority_threshold() {
        assert!(!is_more_than_two_thirds(2, 4));
        assert!(!is_more_than_two_thirds(2, 3));
        assert!(is_more_than_two_thirds(3, 4));
        assert!(is_more_than_two_thirds(4, 4));
        assert!(is_more_than_two_thirds(5, 7));
        assert!(!is_more_than_two_thirds(4, 7));
    }
}
