use super::*;

pub type ContractResult<A> = Result<A, CustomContractError>;

/// Amount of carbon credits, counted in whole credit units.
pub type CreditAmount = u64;

/// Identifier of a fixed-price listing. Allocated from a monotone counter,
/// identifiers are never reused once a listing is gone.
pub type ListingId = u64;

/// Identifier of an auction. Allocated from a monotone counter, identifiers
/// are never reused once an auction is gone.
pub type AuctionId = u64;
