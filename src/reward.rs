multiversx_sc::imports!();

use crate::config::BPS_DENOMINATOR;
use crate::types::{RecipientConfig, RecipientShare, SubmissionStatus};

// ============================================================
// RewardDistribution — proportional split of a round's reward
//
// All reward math is pure view computation over round-frozen
// state; the only mutation is the per-(round, account) claimed
// flag. Integer division truncates everywhere, so the total
// paid for a round is <= the reported reward — dust stays in
// the pool, never over-distribution.
// ============================================================

#[multiversx_sc::module]
pub trait RewardModule:
    crate::config::ConfigModule
    + crate::history::HistoryModule
    + crate::group_manager::GroupManagerModule
    + crate::group_join::GroupJoinModule
    + crate::group_verify::GroupVerifyModule
{
    // ========================================================
    // ENDPOINT: depositRoundReward
    // The external oracle reports a finished round's reward and
    // funds the pool in the same call.
    // ========================================================

    #[payable("EGLD")]
    #[endpoint(depositRoundReward)]
    fn deposit_round_reward(&self, round: u64) {
        let caller = self.blockchain().get_caller();
        let amount = self.call_value().egld_value().clone_value();

        require!(
            caller == self.oracle_address().get(),
            "only the reward oracle may report"
        );
        require!(round < self.current_round(), "round not finished");
        require!(
            self.round_reward(round).is_empty(),
            "round reward already reported"
        );
        require!(amount > 0u64, "reward must be non-zero");

        self.round_reward(round).set(&amount);
        self.round_reward_event(round, &amount);
    }

    // ========================================================
    // ENDPOINT: setRecipients
    // Round-versioned secondary distribution config. An empty
    // list clears the config from this round forward.
    // ========================================================

    #[endpoint(setRecipients)]
    fn set_recipients(
        &self,
        group_id: u64,
        recipients: MultiValueEncoded<MultiValue2<ManagedAddress, u64>>,
    ) {
        let owner = self.require_group_owner(group_id);
        let round = self.current_round();

        let mut shares: ManagedVec<RecipientShare<Self::Api>> = ManagedVec::new();
        let mut total_bps = 0u64;
        for pair in recipients {
            let (recipient, share_bps) = pair.into_tuple();
            require!(share_bps > 0, "recipient share must be non-zero");
            require!(!recipient.is_zero(), "invalid recipient address");
            for existing in shares.iter() {
                require!(
                    existing.recipient != recipient,
                    "duplicate recipient address"
                );
            }
            total_bps += share_bps;
            require!(
                total_bps <= BPS_DENOMINATOR,
                "recipient shares exceed 100%"
            );
            // Once named for a group, an account stays indexed so it
            // can still claim rounds governed by older config versions.
            self.recipient_groups(&recipient).insert(group_id);
            shares.push(RecipientShare {
                recipient,
                share_bps,
            });
        }

        let config = RecipientConfig {
            round,
            shares,
        };
        let mut configs = self.recipient_configs(group_id);
        let len = configs.len();
        if len > 0 {
            let last = configs.get(len);
            require!(round >= last.round, "checkpoint round regression");
            if last.round == round {
                configs.set(len, &config);
            } else {
                configs.push(&config);
            }
        } else {
            configs.push(&config);
        }

        self.recipients_set_event(group_id, &owner, round, total_bps);
    }

    /// Config version live at `round`, or None if none was set yet.
    fn recipient_config_at(
        &self,
        group_id: u64,
        round: u64,
    ) -> Option<ManagedVec<RecipientShare<Self::Api>>> {
        let configs = self.recipient_configs(group_id);
        let len = configs.len();
        if len == 0 || configs.get(1).round > round {
            return None;
        }
        let mut low = 1usize;
        let mut high = len;
        while low < high {
            let mid = (low + high + 1) / 2;
            if configs.get(mid).round <= round {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        Some(configs.get(low).shares)
    }

    // ========================================================
    // Reward math — pure views
    // ========================================================

    /// Group's slice of the round reward, proportional to its share
    /// of the round's aggregate score.
    #[view(getGroupReward)]
    fn group_reward(&self, round: u64, group_id: u64) -> BigUint {
        let reward = self.round_reward(round).get();
        if reward == 0u64 {
            return BigUint::zero();
        }
        let total_score = self.round_score(round);
        if total_score == 0u64 {
            return BigUint::zero();
        }
        reward * self.group_score(round, group_id) / total_score
    }

    /// Owner commission taken off the top of the group reward; the
    /// remainder is the member pool.
    fn group_commission(&self, round: u64, group_id: u64) -> BigUint {
        self.group_reward(round, group_id) * self.commission_bps_at(group_id, round)
            / BPS_DENOMINATOR
    }

    /// Member's slice of the member pool, proportional to
    /// origin score x deposited amount over the frozen roster.
    #[view(getMemberReward)]
    fn member_reward(&self, round: u64, group_id: u64, account: &ManagedAddress) -> BigUint {
        let submission_mapper = self.score_submission(round, group_id);
        if submission_mapper.is_empty()
            || submission_mapper.get().status != SubmissionStatus::Complete
        {
            return BigUint::zero();
        }
        let score = self.origin_score(round, group_id, account).get();
        if score == 0 {
            return BigUint::zero();
        }
        let amount = self.account_amount_at(account, round);
        if amount == 0u64 {
            return BigUint::zero();
        }

        let mut denominator = BigUint::zero();
        for member in self.round_roster(round, group_id).iter() {
            let member_score = self.origin_score(round, group_id, &member).get();
            if member_score == 0 {
                continue;
            }
            denominator += self.account_amount_at(&member, round) * member_score;
        }
        if denominator == 0u64 {
            return BigUint::zero();
        }

        let pool = self.group_reward(round, group_id) - self.group_commission(round, group_id);
        pool * (amount * score) / denominator
    }

    /// What stays with the owner after the configured recipients took
    /// their shares of the group commission.
    fn owner_commission_remainder(&self, round: u64, group_id: u64) -> BigUint {
        let commission = self.group_commission(round, group_id);
        if commission == 0u64 {
            return commission;
        }
        let mut remainder = commission.clone();
        if let Some(shares) = self.recipient_config_at(group_id, round) {
            for share in shares.iter() {
                remainder -= &commission * share.share_bps / BPS_DENOMINATOR;
            }
        }
        remainder
    }

    fn recipient_share_amount(
        &self,
        round: u64,
        group_id: u64,
        account: &ManagedAddress,
    ) -> BigUint {
        let commission = self.group_commission(round, group_id);
        if commission == 0u64 {
            return commission;
        }
        if let Some(shares) = self.recipient_config_at(group_id, round) {
            for share in shares.iter() {
                if &share.recipient == account {
                    return commission * share.share_bps / BPS_DENOMINATOR;
                }
            }
        }
        BigUint::zero()
    }

    /// Everything the account may claim for the round: its member
    /// reward, the commission remainder on groups it owned and
    /// verified, and its recipient shares.
    #[view(getClaimable)]
    fn claimable(&self, round: u64, account: &ManagedAddress) -> BigUint {
        let mut total = BigUint::zero();

        let group_id = self.group_of_at(account, round);
        if group_id != 0 {
            total += self.member_reward(round, group_id, account);
        }
        for owned_group in self.verified_groups_of_owner(round, account).iter() {
            total += self.owner_commission_remainder(round, owned_group);
        }
        for recipient_group in self.recipient_groups(account).iter() {
            total += self.recipient_share_amount(round, recipient_group, account);
        }
        total
    }

    // ========================================================
    // ENDPOINT: claimReward
    // Idempotent per (round, account): the second claim fails.
    // ========================================================

    #[endpoint(claimReward)]
    fn claim_reward(&self, round: u64) {
        let caller = self.blockchain().get_caller();

        require!(round < self.current_round(), "round not finished");
        require!(
            !self.round_reward(round).is_empty(),
            "round reward not reported"
        );
        require!(!self.claimed(round, &caller).get(), "already claimed");

        let amount = self.claimable(round, &caller);
        require!(amount > 0u64, "nothing to claim");

        self.claimed(round, &caller).set(true);
        self.send().direct_egld(&caller, &amount);
        self.reward_claimed_event(round, &caller, &amount);
    }

    // ========================================================
    // Views
    // ========================================================

    #[view(getRoundReward)]
    fn get_round_reward(&self, round: u64) -> BigUint {
        self.round_reward(round).get()
    }

    #[view(hasClaimed)]
    fn has_claimed(&self, round: u64, account: &ManagedAddress) -> bool {
        self.claimed(round, account).get()
    }

    #[view(getRecipients)]
    fn get_recipients(
        &self,
        group_id: u64,
    ) -> MultiValueEncoded<MultiValue2<ManagedAddress, u64>> {
        let mut result = MultiValueEncoded::new();
        let configs = self.recipient_configs(group_id);
        let len = configs.len();
        if len > 0 {
            for share in configs.get(len).shares.iter() {
                result.push((share.recipient.clone(), share.share_bps).into());
            }
        }
        result
    }

    #[view(getRecipientsByRound)]
    fn get_recipients_by_round(
        &self,
        group_id: u64,
        round: u64,
    ) -> MultiValueEncoded<MultiValue2<ManagedAddress, u64>> {
        let mut result = MultiValueEncoded::new();
        if let Some(shares) = self.recipient_config_at(group_id, round) {
            for share in shares.iter() {
                result.push((share.recipient.clone(), share.share_bps).into());
            }
        }
        result
    }

    // ========================================================
    // Events
    // ========================================================

    #[event("roundRewardReported")]
    fn round_reward_event(&self, #[indexed] round: u64, amount: &BigUint);

    #[event("recipientsSet")]
    fn recipients_set_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        #[indexed] round: u64,
        total_bps: u64,
    );

    #[event("rewardClaimed")]
    fn reward_claimed_event(
        &self,
        #[indexed] round: u64,
        #[indexed] claimant: &ManagedAddress,
        amount: &BigUint,
    );

    // ========================================================
    // Storage
    // ========================================================

    /// Total reward reported for a round by the oracle.
    #[storage_mapper("roundReward")]
    fn round_reward(&self, round: u64) -> SingleValueMapper<BigUint>;

    #[storage_mapper("claimed")]
    fn claimed(&self, round: u64, account: &ManagedAddress) -> SingleValueMapper<bool>;

    /// Round-versioned recipient configs per group.
    #[storage_mapper("recipientConfigs")]
    fn recipient_configs(&self, group_id: u64) -> VecMapper<RecipientConfig<Self::Api>>;

    /// Groups an account has ever been named a recipient of.
    #[storage_mapper("recipientGroups")]
    fn recipient_groups(&self, account: &ManagedAddress) -> UnorderedSetMapper<u64>;
}
