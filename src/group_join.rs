multiversx_sc::imports!();

use crate::types::{Checkpoint, GroupStatus};

// ============================================================
// GroupJoin — member deposits and withdrawals
//
// Every validation runs before the first state write, so a
// rejected call leaves no trace and moves no tokens. All
// amounts are written through round checkpoints so any past
// round stays answerable.
// ============================================================

#[multiversx_sc::module]
pub trait GroupJoinModule:
    crate::config::ConfigModule
    + crate::history::HistoryModule
    + crate::group_manager::GroupManagerModule
{
    // ========================================================
    // ENDPOINT: join
    // ========================================================

    #[payable("EGLD")]
    #[endpoint(join)]
    fn join(&self, group_id: u64, verification_info: ManagedBuffer) {
        let caller = self.blockchain().get_caller();
        let payment = self.call_value().egld_value().clone_value();
        let round = self.current_round();

        require!(payment > 0u64, "join amount must be non-zero");
        require!(!self.group_info(group_id).is_empty(), "group not found");
        let info = self.group_info(group_id).get();
        require!(info.status == GroupStatus::Active, "group not active");

        let current_group = self.current_group_of(&caller);
        require!(
            current_group == 0 || current_group == group_id,
            "already joined another group"
        );
        let first_join = current_group == 0;

        if first_join {
            require!(
                payment >= info.min_join_amount,
                "below minimum join amount"
            );
            if info.max_accounts > 0 {
                require!(
                    (self.group_members(group_id).len() as u64) < info.max_accounts,
                    "group account limit reached"
                );
            }
        }

        let current_amount = self.latest_checkpoint_value(self.account_amount_history(&caller));
        let new_amount = &current_amount + &payment;
        if info.max_join_amount > 0u64 {
            require!(
                new_amount <= info.max_join_amount,
                "exceeds account join limit"
            );
        }
        let global_max = self.max_join_amount().get();
        if global_max > 0u64 {
            require!(new_amount <= global_max, "exceeds global join limit");
        }

        let owner = self.group_owner(group_id).get();
        let capacity = self.derived_group_capacity(&info, &owner);
        let group_total = self.latest_checkpoint_value(self.group_total_history(group_id));
        require!(
            &group_total + &payment <= capacity,
            "group capacity exceeded"
        );
        let owner_max = self.max_capacity_for_owner(&owner);
        let owner_total = self.latest_checkpoint_value(self.owner_total_history(&owner));
        require!(
            &owner_total + &payment <= owner_max,
            "owner capacity exceeded"
        );

        // Effects — all checks passed.
        if first_join {
            self.joined_round(&caller).set(round);
            self.record_checkpoint(
                self.account_group_history(&caller),
                round,
                BigUint::from(group_id),
            );
            self.add_set_member(group_id, &caller, round);
        }
        self.record_checkpoint(self.account_amount_history(&caller), round, new_amount.clone());
        self.increase_checkpoint(self.group_total_history(group_id), round, &payment);
        self.increase_checkpoint(self.owner_total_history(&owner), round, &payment);
        self.increase_checkpoint(self.total_joined_history(), round, &payment);

        self.member_joined_event(group_id, &caller, round, &verification_info, &new_amount);
    }

    // ========================================================
    // ENDPOINT: exit
    // Allowed regardless of group status — deactivation never
    // locks member funds.
    // ========================================================

    #[endpoint(exit)]
    fn exit(&self, group_id: u64) {
        let caller = self.blockchain().get_caller();
        let round = self.current_round();

        let current_group = self.current_group_of(&caller);
        require!(
            group_id != 0 && current_group == group_id,
            "not a member of this group"
        );

        let amount = self.latest_checkpoint_value(self.account_amount_history(&caller));
        require!(amount > 0u64, "nothing to withdraw");

        self.joined_round(&caller).clear();
        self.record_checkpoint(self.account_amount_history(&caller), round, BigUint::zero());
        self.record_checkpoint(self.account_group_history(&caller), round, BigUint::zero());
        self.remove_set_member(group_id, &caller, round);

        let owner = self.group_owner(group_id).get();
        self.decrease_checkpoint(self.group_total_history(group_id), round, &amount);
        self.decrease_checkpoint(self.owner_total_history(&owner), round, &amount);
        self.decrease_checkpoint(self.total_joined_history(), round, &amount);

        self.send().direct_egld(&caller, &amount);
        self.member_exited_event(group_id, &caller, round, &amount);
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    /// Group the account currently belongs to, 0 if none.
    fn current_group_of(&self, account: &ManagedAddress) -> u64 {
        self.latest_checkpoint_value(self.account_group_history(account))
            .to_u64()
            .unwrap_or_default()
    }

    fn group_of_at(&self, account: &ManagedAddress, round: u64) -> u64 {
        self.checkpoint_value_at(self.account_group_history(account), round)
            .to_u64()
            .unwrap_or_default()
    }

    fn account_amount_at(&self, account: &ManagedAddress, round: u64) -> BigUint {
        self.checkpoint_value_at(self.account_amount_history(account), round)
    }

    // ========================================================
    // Views
    // ========================================================

    #[view(getJoinedRound)]
    fn get_joined_round(&self, account: &ManagedAddress) -> u64 {
        self.joined_round(account).get()
    }

    #[view(getAccountAmount)]
    fn get_account_amount(&self, account: &ManagedAddress) -> BigUint {
        self.latest_checkpoint_value(self.account_amount_history(account))
    }

    #[view(getAccountAmountByRound)]
    fn get_account_amount_by_round(&self, account: &ManagedAddress, round: u64) -> BigUint {
        self.account_amount_at(account, round)
    }

    #[view(getAccountGroup)]
    fn get_account_group(&self, account: &ManagedAddress) -> u64 {
        self.current_group_of(account)
    }

    #[view(getAccountGroupByRound)]
    fn get_account_group_by_round(&self, account: &ManagedAddress, round: u64) -> u64 {
        self.group_of_at(account, round)
    }

    #[view(getGroupTotal)]
    fn get_group_total(&self, group_id: u64) -> BigUint {
        self.latest_checkpoint_value(self.group_total_history(group_id))
    }

    #[view(getGroupTotalByRound)]
    fn get_group_total_by_round(&self, group_id: u64, round: u64) -> BigUint {
        self.checkpoint_value_at(self.group_total_history(group_id), round)
    }

    #[view(getOwnerTotal)]
    fn get_owner_total(&self, owner: &ManagedAddress) -> BigUint {
        self.latest_checkpoint_value(self.owner_total_history(owner))
    }

    #[view(getOwnerTotalByRound)]
    fn get_owner_total_by_round(&self, owner: &ManagedAddress, round: u64) -> BigUint {
        self.checkpoint_value_at(self.owner_total_history(owner), round)
    }

    #[view(getTotalJoined)]
    fn get_total_joined(&self) -> BigUint {
        self.latest_checkpoint_value(self.total_joined_history())
    }

    #[view(getTotalJoinedByRound)]
    fn get_total_joined_by_round(&self, round: u64) -> BigUint {
        self.checkpoint_value_at(self.total_joined_history(), round)
    }

    // ========================================================
    // Events
    // ========================================================

    #[event("memberJoined")]
    fn member_joined_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] member: &ManagedAddress,
        #[indexed] round: u64,
        #[indexed] verification_info: &ManagedBuffer,
        new_amount: &BigUint,
    );

    #[event("memberExited")]
    fn member_exited_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] member: &ManagedAddress,
        #[indexed] round: u64,
        amount: &BigUint,
    );

    // ========================================================
    // Storage
    // ========================================================

    /// Round of the account's current join, 0 when not joined.
    #[storage_mapper("joinedRound")]
    fn joined_round(&self, account: &ManagedAddress) -> SingleValueMapper<u64>;

    /// Deposited amount per account, checkpointed per round.
    #[storage_mapper("accountAmountHistory")]
    fn account_amount_history(
        &self,
        account: &ManagedAddress,
    ) -> VecMapper<Checkpoint<Self::Api>>;

    /// Group id the account belongs to, checkpointed per round.
    /// Detects "is in another group" and answers historical splits.
    #[storage_mapper("accountGroupHistory")]
    fn account_group_history(
        &self,
        account: &ManagedAddress,
    ) -> VecMapper<Checkpoint<Self::Api>>;

    /// Extension-wide committed total, checkpointed per round.
    #[storage_mapper("totalJoinedHistory")]
    fn total_joined_history(&self) -> VecMapper<Checkpoint<Self::Api>>;
}
