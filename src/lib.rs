#![no_std]

multiversx_sc::imports!();

pub mod config;
pub mod group_join;
pub mod group_manager;
pub mod group_verify;
pub mod history;
pub mod reward;
pub mod types;

// ============================================================
// Group Rewards — round-indexed group participation bookkeeping
//
// Owners stake collateral to activate capacity-bounded groups;
// members deposit into them; a verifier submits per-member
// quality scores each round; an external oracle reports the
// round's reward, which is split across groups by verified
// score and across members by score x amount. Every query is
// answerable "as of round R" through the checkpoint layer.
//
// External collaborators (interfaces only): the group-token
// collection acts as the ownership registry (group id = token
// nonce), the parent staking protocol pushes governance weight
// and drives the round clock via epochs, and the reward oracle
// reports and funds finished rounds.
// ============================================================

#[multiversx_sc::contract]
pub trait GroupRewards:
    config::ConfigModule
    + history::HistoryModule
    + group_manager::GroupManagerModule
    + group_join::GroupJoinModule
    + group_verify::GroupVerifyModule
    + reward::RewardModule
{
    #[init]
    fn init(
        &self,
        group_token: TokenIdentifier,
        staking_address: ManagedAddress,
        oracle_address: ManagedAddress,
        min_activation_stake: BigUint,
        max_join_amount: BigUint,
        stake_capacity_ratio: u64,
        weight_capacity_ratio: u64,
    ) {
        require!(
            group_token.is_valid_esdt_identifier(),
            "invalid group token identifier"
        );
        require!(!staking_address.is_zero(), "invalid staking address");
        require!(!oracle_address.is_zero(), "invalid oracle address");
        require!(
            min_activation_stake > 0u64,
            "activation stake must be non-zero"
        );
        require!(stake_capacity_ratio > 0, "invalid stake capacity ratio");
        require!(weight_capacity_ratio > 0, "invalid weight capacity ratio");

        self.group_token().set(&group_token);
        self.staking_address().set(&staking_address);
        self.oracle_address().set(&oracle_address);
        self.min_activation_stake().set(&min_activation_stake);
        self.max_join_amount().set(&max_join_amount);
        self.stake_capacity_ratio().set(stake_capacity_ratio);
        self.weight_capacity_ratio().set(weight_capacity_ratio);
    }

    #[upgrade]
    fn upgrade(&self) {}

    /// Deployer-only knob for the global protocol parameters.
    /// Collaborator addresses and the group token are fixed at init.
    #[only_owner]
    #[endpoint(updateConfig)]
    fn update_config(
        &self,
        min_activation_stake: BigUint,
        max_join_amount: BigUint,
        stake_capacity_ratio: u64,
        weight_capacity_ratio: u64,
    ) {
        require!(
            min_activation_stake > 0u64,
            "activation stake must be non-zero"
        );
        require!(stake_capacity_ratio > 0, "invalid stake capacity ratio");
        require!(weight_capacity_ratio > 0, "invalid weight capacity ratio");

        self.min_activation_stake().set(&min_activation_stake);
        self.max_join_amount().set(&max_join_amount);
        self.stake_capacity_ratio().set(stake_capacity_ratio);
        self.weight_capacity_ratio().set(weight_capacity_ratio);

        self.config_updated_event(&min_activation_stake, &max_join_amount);
    }

    #[event("configUpdated")]
    fn config_updated_event(
        &self,
        #[indexed] min_activation_stake: &BigUint,
        max_join_amount: &BigUint,
    );
}
