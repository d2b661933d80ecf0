multiversx_sc::imports!();

use crate::types::{Checkpoint, GroupInfo, GroupStatus};

// ============================================================
// GroupManager — lifecycle state machine and capacity arithmetic
//
// Group ownership lives in the external group-token collection:
// group id = token nonce, owner = current holder. The holder
// proves ownership by placing the token in contract custody
// (registerGroup); owner-gated endpoints check the registered
// owner-of-record, and releaseGroup hands the token back. A
// transfer re-points the record when the new holder registers.
// ============================================================

#[multiversx_sc::module]
pub trait GroupManagerModule:
    crate::config::ConfigModule + crate::history::HistoryModule
{
    // ========================================================
    // ENDPOINT: registerGroup / releaseGroup
    // Custody of the group token is the ownership proof.
    // ========================================================

    #[payable("*")]
    #[endpoint(registerGroup)]
    fn register_group(&self) {
        let caller = self.blockchain().get_caller();
        let payment = self.call_value().single_esdt();

        require!(
            payment.token_identifier == self.group_token().get(),
            "invalid group token"
        );
        require!(
            payment.amount == 1u64,
            "exactly one group token required"
        );
        let group_id = payment.token_nonce;
        require!(group_id > 0, "invalid group id");
        require!(
            !self.group_registered(group_id).get(),
            "group token already registered"
        );

        let stored = self.group_owner(group_id).get();
        if !stored.is_zero() && stored != caller {
            self.sync_group_owner(group_id, &stored, &caller);
        } else {
            self.group_owner(group_id).set(&caller);
        }
        self.group_registered(group_id).set(true);

        self.group_registered_event(group_id, &caller);
    }

    #[endpoint(releaseGroup)]
    fn release_group(&self, group_id: u64) {
        let caller = self.blockchain().get_caller();
        require!(
            self.group_registered(group_id).get(),
            "group token not registered"
        );
        require!(
            self.group_owner(group_id).get() == caller,
            "caller is not the registered group owner"
        );

        self.group_registered(group_id).clear();
        self.send().direct_esdt(
            &caller,
            &self.group_token().get(),
            group_id,
            &BigUint::from(1u64),
        );

        self.group_released_event(group_id, &caller);
    }

    // ========================================================
    // ENDPOINT: activateGroup
    // ========================================================

    #[payable("EGLD")]
    #[endpoint(activateGroup)]
    fn activate_group(
        &self,
        group_id: u64,
        description: ManagedBuffer,
        min_join_amount: BigUint,
        max_join_amount: BigUint,
        max_accounts: u64,
        commission_bps: u64,
    ) {
        let caller = self.blockchain().get_caller();
        let stake = self.call_value().egld_value().clone_value();
        let round = self.current_round();

        require!(group_id > 0, "invalid group id");
        require!(
            self.holds_group_token(&caller, group_id),
            "caller is not the registered group owner"
        );

        let info_mapper = self.group_info(group_id);
        if !info_mapper.is_empty() {
            let existing = info_mapper.get();
            require!(
                existing.status != GroupStatus::Active,
                "group already active"
            );
            require!(
                existing.status != GroupStatus::Deactivated,
                "group was deactivated"
            );
        }

        require!(
            stake >= self.min_activation_stake().get(),
            "stake below activation minimum"
        );
        if max_join_amount > 0u64 {
            require!(
                min_join_amount <= max_join_amount,
                "min join amount exceeds max"
            );
        }
        require!(
            commission_bps <= crate::config::BPS_DENOMINATOR,
            "commission exceeds 100%"
        );

        let info = GroupInfo {
            status: GroupStatus::Active,
            description,
            staked_amount: stake.clone(),
            capacity_override: BigUint::zero(),
            min_join_amount,
            max_join_amount,
            max_accounts,
            commission_bps,
            activated_round: round,
            deactivated_round: 0,
        };
        info_mapper.set(&info);

        self.group_owner(group_id).set(&caller);
        self.active_groups().insert(group_id);
        self.owner_groups(&caller).insert(group_id);
        self.owner_staked_total(&caller)
            .update(|total| *total += &stake);

        let capacity = self.derived_group_capacity(&info, &caller);
        self.record_checkpoint(self.capacity_history(group_id), round, capacity.clone());
        self.record_checkpoint(
            self.commission_history(group_id),
            round,
            BigUint::from(info.commission_bps),
        );

        self.group_activated_event(group_id, &caller, round, &stake, &capacity);
    }

    // ========================================================
    // ENDPOINT: expandGroup
    // Adds stake; capacity is re-derived and checkpointed, clamped
    // by the owner-level maximum from governance weight.
    // ========================================================

    #[payable("EGLD")]
    #[endpoint(expandGroup)]
    fn expand_group(&self, group_id: u64) {
        let additional_stake = self.call_value().egld_value().clone_value();
        require!(additional_stake > 0u64, "stake amount must be non-zero");

        let owner = self.require_group_owner(group_id);
        let round = self.current_round();
        let info_mapper = self.group_info(group_id);
        let mut info = info_mapper.get();
        require!(info.status == GroupStatus::Active, "group not active");

        info.staked_amount += &additional_stake;
        info_mapper.set(&info);
        self.owner_staked_total(&owner)
            .update(|total| *total += &additional_stake);

        let capacity = self.derived_group_capacity(&info, &owner);
        self.record_checkpoint(self.capacity_history(group_id), round, capacity.clone());

        self.group_expanded_event(group_id, &owner, round, &additional_stake, &capacity);
    }

    // ========================================================
    // ENDPOINT: updateGroupInfo
    // Mutable fields only; never touches stake or status.
    // ========================================================

    #[endpoint(updateGroupInfo)]
    fn update_group_info(
        &self,
        group_id: u64,
        description: ManagedBuffer,
        min_join_amount: BigUint,
        max_join_amount: BigUint,
        max_accounts: u64,
        capacity_override: BigUint,
        commission_bps: u64,
    ) {
        let owner = self.require_group_owner(group_id);
        let round = self.current_round();
        let info_mapper = self.group_info(group_id);
        let mut info = info_mapper.get();
        require!(info.status == GroupStatus::Active, "group not active");

        if max_join_amount > 0u64 {
            require!(
                min_join_amount <= max_join_amount,
                "min join amount exceeds max"
            );
        }
        require!(
            commission_bps <= crate::config::BPS_DENOMINATOR,
            "commission exceeds 100%"
        );

        info.description = description;
        info.min_join_amount = min_join_amount;
        info.max_join_amount = max_join_amount;
        info.max_accounts = max_accounts;
        info.commission_bps = commission_bps;

        if capacity_override > 0u64 {
            let derived = self.base_group_capacity(&info, &owner);
            require!(
                capacity_override <= derived,
                "capacity override above derived capacity"
            );
        }
        info.capacity_override = capacity_override;
        info_mapper.set(&info);

        let capacity = self.derived_group_capacity(&info, &owner);
        self.record_checkpoint(self.capacity_history(group_id), round, capacity.clone());
        self.record_checkpoint(
            self.commission_history(group_id),
            round,
            BigUint::from(info.commission_bps),
        );

        self.group_updated_event(group_id, &owner, round, &capacity);
    }

    // ========================================================
    // ENDPOINT: deactivateGroup
    // Forbidden in the activation round to close the flash
    // activate/deactivate race. Returns the stake. Terminal.
    // ========================================================

    #[endpoint(deactivateGroup)]
    fn deactivate_group(&self, group_id: u64) {
        let owner = self.require_group_owner(group_id);
        let round = self.current_round();
        let info_mapper = self.group_info(group_id);
        let mut info = info_mapper.get();
        require!(info.status == GroupStatus::Active, "group not active");
        require!(
            round > info.activated_round,
            "cannot deactivate in the activation round"
        );

        info.status = GroupStatus::Deactivated;
        info.deactivated_round = round;
        let stake = info.staked_amount.clone();
        info.staked_amount = BigUint::zero();
        info_mapper.set(&info);

        self.active_groups().swap_remove(&group_id);
        self.owner_groups(&owner).swap_remove(&group_id);
        self.owner_staked_total(&owner)
            .update(|total| *total -= &stake);

        self.send().direct_egld(&owner, &stake);
        self.group_deactivated_event(group_id, &owner, round, &stake);
    }

    // ========================================================
    // INTERNAL: ownership resolution
    // ========================================================

    /// Ownership proof: the account registered the group token and is
    /// the current owner of record.
    fn holds_group_token(&self, account: &ManagedAddress, group_id: u64) -> bool {
        self.group_registered(group_id).get() && self.group_owner(group_id).get() == *account
    }

    fn require_group_owner(&self, group_id: u64) -> ManagedAddress {
        require!(!self.group_info(group_id).is_empty(), "group not found");
        let caller = self.blockchain().get_caller();
        require!(
            self.holds_group_token(&caller, group_id),
            "caller is not the registered group owner"
        );
        caller
    }

    /// Moves a group's index entries and aggregate totals from the
    /// previous owner to the new holder after an ownership transfer.
    fn sync_group_owner(
        &self,
        group_id: u64,
        previous: &ManagedAddress,
        current: &ManagedAddress,
    ) {
        let round = self.current_round();
        self.owner_groups(previous).swap_remove(&group_id);
        self.owner_groups(current).insert(group_id);
        self.group_owner(group_id).set(current);

        let staked = self.group_info(group_id).get().staked_amount;
        if staked > 0u64 {
            self.owner_staked_total(previous)
                .update(|total| *total -= &staked);
            self.owner_staked_total(current)
                .update(|total| *total += &staked);
        }

        let committed = self.latest_checkpoint_value(self.group_total_history(group_id));
        if committed > 0u64 {
            self.decrease_checkpoint(self.owner_total_history(previous), round, &committed);
            self.increase_checkpoint(self.owner_total_history(current), round, &committed);
        }

        self.group_owner_synced_event(group_id, previous, current, round);
    }

    // ========================================================
    // INTERNAL: capacity arithmetic
    // ========================================================

    fn governance_weight_at(&self, account: &ManagedAddress, round: u64) -> BigUint {
        self.checkpoint_value_at(self.governance_weight_history(account), round)
    }

    fn latest_governance_weight(&self, account: &ManagedAddress) -> BigUint {
        self.latest_checkpoint_value(self.governance_weight_history(account))
    }

    /// Theoretical maximum an owner may hold across all their groups,
    /// derived from their current governance weight.
    #[view(getMaxCapacityForOwner)]
    fn max_capacity_for_owner(&self, owner: &ManagedAddress) -> BigUint {
        self.latest_governance_weight(owner) * self.weight_capacity_ratio().get()
    }

    /// Stake- and weight-derived capacity, ignoring any override.
    fn base_group_capacity(&self, info: &GroupInfo<Self::Api>, owner: &ManagedAddress) -> BigUint {
        let from_stake = &info.staked_amount * self.stake_capacity_ratio().get();
        let owner_max = self.max_capacity_for_owner(owner);
        core::cmp::min(from_stake, owner_max)
    }

    fn derived_group_capacity(
        &self,
        info: &GroupInfo<Self::Api>,
        owner: &ManagedAddress,
    ) -> BigUint {
        let base = self.base_group_capacity(info, owner);
        if info.capacity_override > 0u64 && info.capacity_override < base {
            info.capacity_override.clone()
        } else {
            base
        }
    }

    /// Current capacity of a group, re-derived from live stake,
    /// weight and override state.
    #[view(getGroupCapacity)]
    fn group_capacity(&self, group_id: u64) -> BigUint {
        require!(!self.group_info(group_id).is_empty(), "group not found");
        let info = self.group_info(group_id).get();
        let owner = self.group_owner(group_id).get();
        self.derived_group_capacity(&info, &owner)
    }

    #[view(getGroupCapacityByRound)]
    fn group_capacity_by_round(&self, group_id: u64, round: u64) -> BigUint {
        self.checkpoint_value_at(self.capacity_history(group_id), round)
    }

    // ========================================================
    // Views
    // ========================================================

    #[view(getGroupInfo)]
    fn get_group_info(&self, group_id: u64) -> GroupInfo<Self::Api> {
        require!(!self.group_info(group_id).is_empty(), "group not found");
        self.group_info(group_id).get()
    }

    #[view(getGroupOwner)]
    fn get_group_owner(&self, group_id: u64) -> ManagedAddress {
        require!(!self.group_info(group_id).is_empty(), "group not found");
        self.group_owner(group_id).get()
    }

    #[view(getActiveGroups)]
    fn get_active_groups(&self) -> MultiValueEncoded<u64> {
        let mut result = MultiValueEncoded::new();
        for group_id in self.active_groups().iter() {
            result.push(group_id);
        }
        result
    }

    #[view(getActiveGroupCount)]
    fn active_group_count(&self) -> u64 {
        self.active_groups().len() as u64
    }

    #[view(getOwnerGroups)]
    fn get_owner_groups(&self, owner: &ManagedAddress) -> MultiValueEncoded<u64> {
        let mut result = MultiValueEncoded::new();
        for group_id in self.owner_groups(owner).iter() {
            result.push(group_id);
        }
        result
    }

    #[view(getOwnerStakedTotal)]
    fn get_owner_staked_total(&self, owner: &ManagedAddress) -> BigUint {
        self.owner_staked_total(owner).get()
    }

    // ========================================================
    // Events
    // ========================================================

    #[event("groupRegistered")]
    fn group_registered_event(&self, #[indexed] group_id: u64, owner: &ManagedAddress);

    #[event("groupReleased")]
    fn group_released_event(&self, #[indexed] group_id: u64, owner: &ManagedAddress);

    #[event("groupActivated")]
    fn group_activated_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        #[indexed] round: u64,
        #[indexed] stake: &BigUint,
        capacity: &BigUint,
    );

    #[event("groupExpanded")]
    fn group_expanded_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        #[indexed] round: u64,
        #[indexed] additional_stake: &BigUint,
        capacity: &BigUint,
    );

    #[event("groupUpdated")]
    fn group_updated_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        #[indexed] round: u64,
        capacity: &BigUint,
    );

    #[event("groupDeactivated")]
    fn group_deactivated_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] owner: &ManagedAddress,
        #[indexed] round: u64,
        stake_returned: &BigUint,
    );

    #[event("groupOwnerSynced")]
    fn group_owner_synced_event(
        &self,
        #[indexed] group_id: u64,
        #[indexed] previous: &ManagedAddress,
        #[indexed] current: &ManagedAddress,
        round: u64,
    );

    // ========================================================
    // Storage
    // ========================================================

    #[storage_mapper("groupInfo")]
    fn group_info(&self, group_id: u64) -> SingleValueMapper<GroupInfo<Self::Api>>;

    /// Owner-of-record index key. Authority always comes from the live
    /// token lookup, never from this mapper.
    #[storage_mapper("groupOwner")]
    fn group_owner(&self, group_id: u64) -> SingleValueMapper<ManagedAddress>;

    /// Whether the group token currently sits in contract custody.
    #[storage_mapper("groupRegistered")]
    fn group_registered(&self, group_id: u64) -> SingleValueMapper<bool>;

    #[storage_mapper("activeGroups")]
    fn active_groups(&self) -> UnorderedSetMapper<u64>;

    #[storage_mapper("ownerGroups")]
    fn owner_groups(&self, owner: &ManagedAddress) -> UnorderedSetMapper<u64>;

    #[storage_mapper("ownerStakedTotal")]
    fn owner_staked_total(&self, owner: &ManagedAddress) -> SingleValueMapper<BigUint>;

    /// Group capacity, checkpointed per round.
    #[storage_mapper("capacityHistory")]
    fn capacity_history(&self, group_id: u64) -> VecMapper<Checkpoint<Self::Api>>;

    /// Commission (basis points), checkpointed per round.
    #[storage_mapper("commissionHistory")]
    fn commission_history(&self, group_id: u64) -> VecMapper<Checkpoint<Self::Api>>;

    /// Governance weight pushed by the parent staking protocol,
    /// checkpointed per round.
    #[storage_mapper("governanceWeightHistory")]
    fn governance_weight_history(
        &self,
        account: &ManagedAddress,
    ) -> VecMapper<Checkpoint<Self::Api>>;

    /// Committed member deposits per group, checkpointed per round.
    /// Written by the join layer.
    #[storage_mapper("groupTotalHistory")]
    fn group_total_history(&self, group_id: u64) -> VecMapper<Checkpoint<Self::Api>>;

    /// Committed member deposits aggregated per owner, checkpointed
    /// per round. Written by the join layer.
    #[storage_mapper("ownerTotalHistory")]
    fn owner_total_history(&self, owner: &ManagedAddress) -> VecMapper<Checkpoint<Self::Api>>;
}
