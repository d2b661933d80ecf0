multiversx_sc::imports!();

use crate::config::MAX_ORIGIN_SCORE;
use crate::types::{DistrustVote, GroupStatus, ScoreSubmission, SubmissionStatus};

// ============================================================
// GroupVerify — per-round score submission and distrust votes
//
// The verifier, the owner of record and the membership roster
// are frozen on the first batch of a round, so a later
// ownership or membership change can never rewrite a past
// round's score. Reduction factors are derived on read from
// round-scoped checkpoints only.
// ============================================================

#[multiversx_sc::module]
pub trait GroupVerifyModule:
    crate::config::ConfigModule
    + crate::history::HistoryModule
    + crate::group_manager::GroupManagerModule
    + crate::group_join::GroupJoinModule
{
    // ========================================================
    // ENDPOINT: setGroupDelegatedVerifier
    // ========================================================

    #[endpoint(setGroupDelegatedVerifier)]
    fn set_group_delegated_verifier(&self, group_id: u64, delegate: ManagedAddress) {
        let owner = self.require_group_owner(group_id);
        if delegate.is_zero() {
            self.delegated_verifier(group_id).clear();
        } else {
            self.delegated_verifier(group_id).set(&delegate);
        }
        self.verifier_delegated_event(group_id, &owner, &delegate);
    }

    // ========================================================
    // ENDPOINT: updateGovernanceWeight
    // Pushed by the parent staking protocol; checkpointed per
    // round so "weight as of round R" stays answerable.
    // ========================================================

    #[endpoint(updateGovernanceWeight)]
    fn update_governance_weight(&self, account: ManagedAddress, weight: BigUint) {
        let caller = self.blockchain().get_caller();
        require!(
            caller == self.staking_address().get(),
            "only the staking protocol may push weights"
        );
        let round = self.current_round();
        self.record_checkpoint(
            self.governance_weight_history(&account),
            round,
            weight.clone(),
        );
        self.governance_weight_event(&account, round, &weight);
    }

    // ========================================================
    // ENDPOINT: submitOriginScore
    // Batched submission over the frozen roster; the caller
    // drives progress across calls with start_index.
    // ========================================================

    #[endpoint(submitOriginScore)]
    fn submit_origin_score(
        &self,
        group_id: u64,
        start_index: u64,
        scores: MultiValueEncoded<u64>,
    ) {
        let caller = self.blockchain().get_caller();
        let round = self.current_round();

        require!(!self.group_info(group_id).is_empty(), "group not found");
        let info = self.group_info(group_id).get();
        require!(info.status == GroupStatus::Active, "group not active");

        let is_owner = self.holds_group_token(&caller, group_id);
        let delegate_mapper = self.delegated_verifier(group_id);
        let is_delegate = !delegate_mapper.is_empty() && delegate_mapper.get() == caller;
        require!(is_owner || is_delegate, "not an authorized verifier");
        let owner = self.group_owner(group_id).get();

        let submission_mapper = self.score_submission(round, group_id);
        let mut submission = if submission_mapper.is_empty() {
            self.freeze_round_submission(round, group_id, &caller, &owner)
        } else {
            let existing = submission_mapper.get();
            require!(
                existing.verifier == caller,
                "verifier is frozen for this round"
            );
            require!(
                existing.status != SubmissionStatus::Complete,
                "scores already submitted"
            );
            existing
        };

        require!(
            start_index == submission.submitted_count,
            "batch must resume at the next index"
        );

        let mut index = submission.submitted_count;
        let mut batch_len = 0u64;
        for score in scores {
            require!(score <= MAX_ORIGIN_SCORE, "score exceeds maximum");
            require!(index < submission.member_count, "score index out of range");
            let member = self.round_roster(round, group_id).get((index as usize) + 1);
            self.origin_score(round, group_id, &member).set(score);
            index += 1;
            batch_len += 1;
        }
        // An empty batch is only meaningful for an empty roster, where
        // it completes the submission at zero members.
        require!(
            batch_len > 0 || submission.member_count == 0,
            "empty score batch"
        );

        submission.submitted_count = index;
        submission.status = if index == submission.member_count {
            SubmissionStatus::Complete
        } else {
            SubmissionStatus::PartiallySubmitted
        };
        submission_mapper.set(&submission);

        self.scores_submitted_event(
            round,
            group_id,
            &caller,
            start_index,
            batch_len,
            submission.status == SubmissionStatus::Complete,
        );
    }

    /// First batch of a (round, group): freezes the verifier, the
    /// owner of record and the membership roster, and counts the
    /// verifier's round weight into the round's verify total (once
    /// per verifier per round).
    fn freeze_round_submission(
        &self,
        round: u64,
        group_id: u64,
        verifier: &ManagedAddress,
        owner: &ManagedAddress,
    ) -> ScoreSubmission<Self::Api> {
        let mut roster = self.round_roster(round, group_id);
        for member in self.group_members(group_id).iter() {
            roster.push(&member);
        }
        let member_count = roster.len() as u64;

        if !self.has_verified(round, verifier).get() {
            self.has_verified(round, verifier).set(true);
            let weight = self.governance_weight_at(verifier, round);
            if weight > 0u64 {
                self.total_verify_weight(round)
                    .update(|total| *total += &weight);
            }
        }
        self.scored_groups(round).insert(group_id);
        self.verified_groups_of_owner(round, owner).insert(group_id);

        ScoreSubmission {
            verifier: verifier.clone(),
            owner: owner.clone(),
            member_count,
            submitted_count: 0,
            status: SubmissionStatus::NotSubmitted,
        }
    }

    // ========================================================
    // ENDPOINT: distrustVote
    // Only accounts that verified this round may vote, capped by
    // their governance weight at this round.
    // ========================================================

    #[endpoint(distrustVote)]
    fn distrust_vote(&self, target_owner: ManagedAddress, amount: BigUint, reason: ManagedBuffer) {
        let caller = self.blockchain().get_caller();
        let round = self.current_round();

        require!(amount > 0u64, "distrust amount must be non-zero");
        require!(
            self.has_verified(round, &caller).get(),
            "caller has not verified this round"
        );
        let weight = self.governance_weight_at(&caller, round);
        let spent = self.distrust_spent(round, &caller).get();
        require!(&spent + &amount <= weight, "exceeds verify weight");

        self.distrust_spent(round, &caller).set(spent + &amount);
        self.distrust_against_owner(round, &target_owner)
            .update(|total| *total += &amount);
        self.distrust_votes(round, &target_owner).push(&DistrustVote {
            voter: caller.clone(),
            amount: amount.clone(),
            reason,
        });

        self.distrust_vote_event(round, &target_owner, &caller, &amount);
    }

    // ========================================================
    // Derived reads — reduction factors and scores
    // ========================================================

    /// Owner frozen for the round if scores were submitted, else the
    /// current owner of record.
    fn round_owner_of(&self, round: u64, group_id: u64) -> ManagedAddress {
        let submission_mapper = self.score_submission(round, group_id);
        if submission_mapper.is_empty() {
            self.group_owner(group_id).get()
        } else {
            submission_mapper.get().owner
        }
    }

    /// 1e18 unless the group's committed amount at `round` exceeded
    /// the capacity permitted at that round (group capacity
    /// checkpoint, further bounded by the owner's weight-implied
    /// maximum), in which case it scales down proportionally.
    #[view(getCapacityReductionRate)]
    fn capacity_reduction_rate(&self, round: u64, group_id: u64) -> BigUint {
        let committed = self.checkpoint_value_at(self.group_total_history(group_id), round);
        if committed == 0u64 {
            return self.rate_one();
        }
        let capacity = self.checkpoint_value_at(self.capacity_history(group_id), round);
        let owner = self.round_owner_of(round, group_id);
        let owner_max =
            self.governance_weight_at(&owner, round) * self.weight_capacity_ratio().get();
        let permitted = core::cmp::min(capacity, owner_max);
        if permitted >= committed {
            self.rate_one()
        } else {
            permitted * self.rate_one() / committed
        }
    }

    /// (totalVerifyWeight - distrustAgainstOwner) / totalVerifyWeight,
    /// clamped to [0, 1e18]. 1e18 when no verify weight was recorded.
    #[view(getDistrustReduction)]
    fn distrust_reduction(&self, round: u64, group_id: u64) -> BigUint {
        let total = self.total_verify_weight(round).get();
        if total == 0u64 {
            return self.rate_one();
        }
        let owner = self.round_owner_of(round, group_id);
        let distrust = self.distrust_against_owner(round, &owner).get();
        if distrust >= total {
            return BigUint::zero();
        }
        (&total - &distrust) * self.rate_one() / total
    }

    /// Committed amount x distrust reduction x capacity reduction.
    /// Zero unless the round's submission completed.
    #[view(getGroupScore)]
    fn group_score(&self, round: u64, group_id: u64) -> BigUint {
        let submission_mapper = self.score_submission(round, group_id);
        if submission_mapper.is_empty()
            || submission_mapper.get().status != SubmissionStatus::Complete
        {
            return BigUint::zero();
        }
        let committed = self.checkpoint_value_at(self.group_total_history(group_id), round);
        committed * self.distrust_reduction(round, group_id)
            * self.capacity_reduction_rate(round, group_id)
            / self.rate_one()
            / self.rate_one()
    }

    /// Aggregate score across all groups verified in the round.
    #[view(getScore)]
    fn round_score(&self, round: u64) -> BigUint {
        let mut total = BigUint::zero();
        for group_id in self.scored_groups(round).iter() {
            total += self.group_score(round, group_id);
        }
        total
    }

    fn commission_bps_at(&self, group_id: u64, round: u64) -> u64 {
        self.checkpoint_value_at(self.commission_history(group_id), round)
            .to_u64()
            .unwrap_or_default()
    }

    // ========================================================
    // Views
    // ========================================================

    #[view(getOriginScore)]
    fn get_origin_score(&self, round: u64, group_id: u64, account: &ManagedAddress) -> u64 {
        self.origin_score(round, group_id, account).get()
    }

    #[view(getScoreSubmission)]
    fn get_score_submission(&self, round: u64, group_id: u64) -> ScoreSubmission<Self::Api> {
        require!(
            !self.score_submission(round, group_id).is_empty(),
            "no submission for this round"
        );
        self.score_submission(round, group_id).get()
    }

    #[view(getSubmissionStatus)]
    fn get_submission_status(&self, round: u64, group_id: u64) -> SubmissionStatus {
        let submission_mapper = self.score_submission(round, group_id);
        if submission_mapper.is_empty() {
            SubmissionStatus::NotSubmitted
        } else {
            submission_mapper.get().status
        }
    }

    #[view(getRoundVerifier)]
    fn get_round_verifier(&self, round: u64, group_id: u64) -> ManagedAddress {
        require!(
            !self.score_submission(round, group_id).is_empty(),
            "no submission for this round"
        );
        self.score_submission(round, group_id).get().verifier
    }

    #[view(getRoundRoster)]
    fn get_round_roster(&self, round: u64, group_id: u64) -> MultiValueEncoded<ManagedAddress> {
        let mut result = MultiValueEncoded::new();
        for member in self.round_roster(round, group_id).iter() {
            result.push(member);
        }
        result
    }

    #[view(getDelegatedVerifier)]
    fn get_delegated_verifier(&self, group_id: u64) -> ManagedAddress {
        self.delegated_verifier(group_id).get()
    }

    #[view(getGovernanceWeight)]
    fn get_governance_weight(&self, account: &ManagedAddress) -> BigUint {
        self.latest_governance_weight(account)
    }

    #[view(getGovernanceWeightByRound)]
    fn get_governance_weight_by_round(&self, account: &ManagedAddress, round: u64) -> BigUint {
        self.governance_weight_at(account, round)
    }

    #[view(getTotalVerifyWeight)]
    fn get_total_verify_weight(&self, round: u64) -> BigUint {
        self.total_verify_weight(round).get()
    }

    #[view(getDistrustAgainstOwner)]
    fn get_distrust_against_owner(&self, round: u64, owner: &ManagedAddress) -> BigUint {
        self.distrust_against_owner(round, owner).get()
    }

    /// Derived from the owner-level total, the quantity scoring uses,
    /// so a vote cast before the group's submission froze still counts.
    #[view(getDistrustAgainstGroup)]
    fn get_distrust_against_group(&self, round: u64, group_id: u64) -> BigUint {
        let owner = self.round_owner_of(round, group_id);
        self.distrust_against_owner(round, &owner).get()
    }

    #[view(getDistrustVotes)]
    fn get_distrust_votes(
        &self,
        round: u64,
        owner: &ManagedAddress,
    ) -> MultiValueEncoded<DistrustVote<Self::Api>> {
        let mut result = MultiValueEncoded::new();
        for vote in self.distrust_votes(round, owner).iter() {
            result.push(vote);
        }
        result
    }

    // ========================================================
    // Events
    // ========================================================

    #[event("verifierDelegated")]
    fn verifier_delegated_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        delegate: &ManagedAddress,
    );

    #[event("governanceWeight")]
    fn governance_weight_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] round: u64,
        weight: &BigUint,
    );

    #[event("scoresSubmitted")]
    fn scores_submitted_event(
        &self,
        #[indexed] round: u64,
        #[indexed] group_id: u64,
        #[indexed] verifier: &ManagedAddress,
        #[indexed] start_index: u64,
        #[indexed] batch_len: u64,
        complete: bool,
    );

    #[event("distrustVote")]
    fn distrust_vote_event(
        &self,
        #[indexed] round: u64,
        #[indexed] target_owner: &ManagedAddress,
        #[indexed] voter: &ManagedAddress,
        amount: &BigUint,
    );

    // ========================================================
    // Storage
    // ========================================================

    #[storage_mapper("delegatedVerifier")]
    fn delegated_verifier(&self, group_id: u64) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("scoreSubmission")]
    fn score_submission(
        &self,
        round: u64,
        group_id: u64,
    ) -> SingleValueMapper<ScoreSubmission<Self::Api>>;

    /// Membership snapshot frozen at the first batch of the round.
    #[storage_mapper("roundRoster")]
    fn round_roster(&self, round: u64, group_id: u64) -> VecMapper<ManagedAddress>;

    #[storage_mapper("originScore")]
    fn origin_score(
        &self,
        round: u64,
        group_id: u64,
        account: &ManagedAddress,
    ) -> SingleValueMapper<u64>;

    #[storage_mapper("hasVerified")]
    fn has_verified(&self, round: u64, account: &ManagedAddress) -> SingleValueMapper<bool>;

    /// Governance weight of all accounts that verified in the round.
    #[storage_mapper("totalVerifyWeight")]
    fn total_verify_weight(&self, round: u64) -> SingleValueMapper<BigUint>;

    /// Groups with a submission (complete or partial) in the round.
    #[storage_mapper("scoredGroups")]
    fn scored_groups(&self, round: u64) -> UnorderedSetMapper<u64>;

    /// Groups frozen under an owner in the round; routes distrust
    /// votes and owner-level claims.
    #[storage_mapper("verifiedGroupsOfOwner")]
    fn verified_groups_of_owner(
        &self,
        round: u64,
        owner: &ManagedAddress,
    ) -> UnorderedSetMapper<u64>;

    #[storage_mapper("distrustAgainstOwner")]
    fn distrust_against_owner(
        &self,
        round: u64,
        owner: &ManagedAddress,
    ) -> SingleValueMapper<BigUint>;

    /// Cumulative distrust spent by a voter in the round.
    #[storage_mapper("distrustSpent")]
    fn distrust_spent(&self, round: u64, voter: &ManagedAddress) -> SingleValueMapper<BigUint>;

    #[storage_mapper("distrustVotes")]
    fn distrust_votes(
        &self,
        round: u64,
        owner: &ManagedAddress,
    ) -> VecMapper<DistrustVote<Self::Api>>;
}
