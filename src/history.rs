multiversx_sc::imports!();

use crate::types::{Checkpoint, MembershipStamp};

// ============================================================
// RoundHistory — round-indexed checkpoint store
//
// Scalar histories are ordered (round, value) lists; "value at
// round r" is the latest checkpoint with round <= r. The set
// variant replays membership from per-account add/remove stamps
// so no per-round snapshot is ever stored.
// ============================================================

#[multiversx_sc::module]
pub trait HistoryModule {
    // ========================================================
    // Scalar histories
    // ========================================================

    /// Appends a checkpoint. A write at the latest recorded round
    /// replaces it in place (same-round accumulation); a write at an
    /// earlier round is a monotonicity violation and aborts.
    fn record_checkpoint(
        &self,
        mut history: VecMapper<Checkpoint<Self::Api>>,
        round: u64,
        value: BigUint,
    ) {
        let len = history.len();
        if len > 0 {
            let last = history.get(len);
            require!(round >= last.round, "checkpoint round regression");
            if last.round == round {
                history.set(len, &Checkpoint { round, value });
                return;
            }
        }
        history.push(&Checkpoint { round, value });
    }

    fn increase_checkpoint(
        &self,
        history: VecMapper<Checkpoint<Self::Api>>,
        round: u64,
        delta: &BigUint,
    ) {
        let len = history.len();
        let current = if len == 0 {
            BigUint::zero()
        } else {
            history.get(len).value
        };
        self.record_checkpoint(history, round, current + delta);
    }

    fn decrease_checkpoint(
        &self,
        history: VecMapper<Checkpoint<Self::Api>>,
        round: u64,
        delta: &BigUint,
    ) {
        let len = history.len();
        let current = if len == 0 {
            BigUint::zero()
        } else {
            history.get(len).value
        };
        require!(&current >= delta, "checkpoint underflow");
        self.record_checkpoint(history, round, current - delta);
    }

    fn latest_checkpoint_value(&self, history: VecMapper<Checkpoint<Self::Api>>) -> BigUint {
        let len = history.len();
        if len == 0 {
            return BigUint::zero();
        }
        history.get(len).value
    }

    /// Binary search for the greatest checkpoint round <= `round`.
    /// Returns zero if the history starts after `round`.
    fn checkpoint_value_at(
        &self,
        history: VecMapper<Checkpoint<Self::Api>>,
        round: u64,
    ) -> BigUint {
        let len = history.len();
        if len == 0 || history.get(1).round > round {
            return BigUint::zero();
        }
        let mut low = 1usize;
        let mut high = len;
        while low < high {
            let mid = (low + high + 1) / 2;
            if history.get(mid).round <= round {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        history.get(low).value
    }

    // ========================================================
    // Set histories — group membership
    // ========================================================

    fn add_set_member(&self, group_id: u64, account: &ManagedAddress, round: u64) {
        require!(
            self.group_members(group_id).insert(account.clone()),
            "already a member"
        );
        let mut stamps = self.member_stamps(group_id, account);
        let len = stamps.len();
        if len == 0 {
            self.ever_members(group_id).push(account);
        } else {
            let last = stamps.get(len);
            require!(
                last.removed != 0 && round >= last.removed,
                "membership stamp regression"
            );
        }
        stamps.push(&MembershipStamp {
            added: round,
            removed: 0,
        });
    }

    fn remove_set_member(&self, group_id: u64, account: &ManagedAddress, round: u64) {
        require!(
            self.group_members(group_id).swap_remove(account),
            "not a member"
        );
        let mut stamps = self.member_stamps(group_id, account);
        let len = stamps.len();
        let mut last = stamps.get(len);
        require!(
            last.removed == 0 && round >= last.added,
            "membership stamp regression"
        );
        last.removed = round;
        stamps.set(len, &last);
    }

    /// Membership interval check: added <= r and (still open or r
    /// before removal). An account that joined and exited within the
    /// same round was never a member of it — its amount checkpoint for
    /// that round is zero either way.
    fn is_member_at(&self, group_id: u64, account: &ManagedAddress, round: u64) -> bool {
        for stamp in self.member_stamps(group_id, account).iter() {
            if stamp.added <= round && (stamp.removed == 0 || round < stamp.removed) {
                return true;
            }
        }
        false
    }

    fn member_count_at(&self, group_id: u64, round: u64) -> u64 {
        let mut count = 0u64;
        for account in self.ever_members(group_id).iter() {
            if self.is_member_at(group_id, &account, round) {
                count += 1;
            }
        }
        count
    }

    // ========================================================
    // Views
    // ========================================================

    #[view(getGroupMemberCount)]
    fn group_member_count(&self, group_id: u64) -> u64 {
        self.group_members(group_id).len() as u64
    }

    #[view(getGroupMemberCountByRound)]
    fn group_member_count_by_round(&self, group_id: u64, round: u64) -> u64 {
        self.member_count_at(group_id, round)
    }

    #[view(getGroupMembers)]
    fn get_group_members(&self, group_id: u64) -> MultiValueEncoded<ManagedAddress> {
        let mut result = MultiValueEncoded::new();
        for account in self.group_members(group_id).iter() {
            result.push(account);
        }
        result
    }

    #[view(getGroupMembersByRound)]
    fn get_group_members_by_round(
        &self,
        group_id: u64,
        round: u64,
    ) -> MultiValueEncoded<ManagedAddress> {
        let mut result = MultiValueEncoded::new();
        for account in self.ever_members(group_id).iter() {
            if self.is_member_at(group_id, &account, round) {
                result.push(account);
            }
        }
        result
    }

    #[view(getGroupMemberAtIndex)]
    fn group_member_at_index(&self, group_id: u64, index: u64) -> ManagedAddress {
        let members = self.group_members(group_id);
        require!(index < members.len() as u64, "member index out of range");
        members.get_by_index((index + 1) as usize)
    }

    #[view(getGroupMemberAtIndexByRound)]
    fn group_member_at_index_by_round(
        &self,
        group_id: u64,
        index: u64,
        round: u64,
    ) -> ManagedAddress {
        let mut remaining = index;
        for account in self.ever_members(group_id).iter() {
            if self.is_member_at(group_id, &account, round) {
                if remaining == 0 {
                    return account;
                }
                remaining -= 1;
            }
        }
        sc_panic!("member index out of range");
    }

    #[view(isGroupMember)]
    fn is_group_member(&self, group_id: u64, account: &ManagedAddress) -> bool {
        self.group_members(group_id).contains(account)
    }

    #[view(isGroupMemberByRound)]
    fn is_group_member_by_round(
        &self,
        group_id: u64,
        account: &ManagedAddress,
        round: u64,
    ) -> bool {
        self.is_member_at(group_id, account, round)
    }

    // ========================================================
    // Storage
    // ========================================================

    /// Current members of a group.
    #[storage_mapper("groupMembers")]
    fn group_members(&self, group_id: u64) -> UnorderedSetMapper<ManagedAddress>;

    /// Every account that has ever joined the group, in first-join
    /// order. Drives historical replay.
    #[storage_mapper("everMembers")]
    fn ever_members(&self, group_id: u64) -> VecMapper<ManagedAddress>;

    /// Membership intervals per (group, account).
    #[storage_mapper("memberStamps")]
    fn member_stamps(
        &self,
        group_id: u64,
        account: &ManagedAddress,
    ) -> VecMapper<MembershipStamp>;
}
