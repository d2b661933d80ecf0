multiversx_sc::imports!();

/// Fixed-point scale for reduction rates: 1e18 = 1.0 (no reduction).
pub const RATE_DENOMINATOR: u64 = 1_000_000_000_000_000_000;

/// Recipient shares and commissions are expressed in basis points.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Origin scores are bounded to 0..=100.
pub const MAX_ORIGIN_SCORE: u64 = 100;

#[multiversx_sc::module]
pub trait ConfigModule {
    /// The protocol's discrete time unit. Round transitions are driven
    /// by the chain, not by this contract.
    fn current_round(&self) -> u64 {
        self.blockchain().get_block_epoch()
    }

    fn rate_one(&self) -> BigUint {
        BigUint::from(RATE_DENOMINATOR)
    }

    // ── Configuration storage ──

    /// Group-token collection of the external ownership registry.
    /// Group id = token nonce; the holder of the nonce is the owner.
    #[storage_mapper("groupToken")]
    fn group_token(&self) -> SingleValueMapper<TokenIdentifier>;

    /// Parent staking protocol, trusted to push governance weights.
    #[storage_mapper("stakingAddress")]
    fn staking_address(&self) -> SingleValueMapper<ManagedAddress>;

    /// Reward-pool oracle, trusted to report and fund round rewards.
    #[storage_mapper("oracleAddress")]
    fn oracle_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("minActivationStake")]
    fn min_activation_stake(&self) -> SingleValueMapper<BigUint>;

    /// Extension-wide per-account deposit cap; 0 means unlimited.
    #[storage_mapper("maxJoinAmount")]
    fn max_join_amount(&self) -> SingleValueMapper<BigUint>;

    /// Capacity granted per staked token unit.
    #[storage_mapper("stakeCapacityRatio")]
    fn stake_capacity_ratio(&self) -> SingleValueMapper<u64>;

    /// Capacity granted per unit of governance weight.
    #[storage_mapper("weightCapacityRatio")]
    fn weight_capacity_ratio(&self) -> SingleValueMapper<u64>;

    // ── Views ──

    #[view(getCurrentRound)]
    fn get_current_round(&self) -> u64 {
        self.current_round()
    }

    #[view(getGroupToken)]
    fn get_group_token(&self) -> TokenIdentifier {
        self.group_token().get()
    }
}
