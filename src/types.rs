multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Group Status — lifecycle states
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum GroupStatus {
    /// Never activated. No joins, no scores.
    Inactive,
    /// Owner staked collateral. Members may join, scores may be submitted.
    Active,
    /// Stake returned, terminal. Historical rounds stay queryable,
    /// members may still exit, but no new joins or submissions.
    Deactivated,
}

// ============================================================
// Group Info — the core lifecycle record
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct GroupInfo<M: ManagedTypeApi> {
    pub status: GroupStatus,
    pub description: ManagedBuffer<M>,
    pub staked_amount: BigUint<M>,
    /// Explicit capacity cap; 0 means "derived from stake and weight".
    pub capacity_override: BigUint<M>,
    pub min_join_amount: BigUint<M>,
    /// Per-account deposit cap; 0 means unlimited.
    pub max_join_amount: BigUint<M>,
    /// Member slot cap; 0 means unlimited.
    pub max_accounts: u64,
    /// Owner commission on the group reward, in basis points.
    pub commission_bps: u64,
    pub activated_round: u64,
    /// Round of deactivation (0 while still Active).
    pub deactivated_round: u64,
}

// ============================================================
// Round-indexed checkpoints
// ============================================================

/// One entry of a scalar round history. Entries are strictly
/// increasing in round; a same-round write replaces the last entry.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Checkpoint<M: ManagedTypeApi> {
    pub round: u64,
    pub value: BigUint<M>,
}

/// One membership interval of the set-valued history.
/// `removed == 0` means the account is still a member.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub struct MembershipStamp {
    pub added: u64,
    pub removed: u64,
}

// ============================================================
// Score submission — per (round, group) state machine
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum SubmissionStatus {
    NotSubmitted,
    PartiallySubmitted,
    Complete,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct ScoreSubmission<M: ManagedTypeApi> {
    /// Frozen on the first batch of the round; later batches must come
    /// from the same account.
    pub verifier: ManagedAddress<M>,
    /// Owner of record at submission time. A later ownership transfer
    /// cannot re-point a past round's score or distrust mapping.
    pub owner: ManagedAddress<M>,
    /// Membership snapshot size frozen on the first batch.
    pub member_count: u64,
    pub submitted_count: u64,
    pub status: SubmissionStatus,
}

// ============================================================
// Distrust vote
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct DistrustVote<M: ManagedTypeApi> {
    pub voter: ManagedAddress<M>,
    pub amount: BigUint<M>,
    pub reason: ManagedBuffer<M>,
}

// ============================================================
// Recipient distribution config
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone, Debug)]
pub struct RecipientShare<M: ManagedTypeApi> {
    pub recipient: ManagedAddress<M>,
    pub share_bps: u64,
}

/// One round-stamped version of a group's recipient list. Versions are
/// appended under the same monotonicity rule as scalar checkpoints, so
/// past distributions stay reconstructible after a reconfiguration.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct RecipientConfig<M: ManagedTypeApi> {
    pub round: u64,
    pub shares: ManagedVec<M, RecipientShare<M>>,
}
