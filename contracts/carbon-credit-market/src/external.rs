use commons::{CreditAmount, ListingId};
use concordium_std::*;

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    /// Hard ceiling on the total credit supply for the contract's lifetime.
    pub max_supply: CreditAmount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct MintParams {
    /// Address credited with the fresh credits.
    pub recipient: Address,
    pub amount: CreditAmount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct TransferParams {
    /// Address receiving the credits. The sender is debited.
    pub to: Address,
    pub amount: CreditAmount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct RetireParams {
    /// Credits to permanently remove from the sender's balance.
    pub amount: CreditAmount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ListParams {
    /// Credits to move under escrow for sale.
    pub amount: CreditAmount,
    /// Price per credit unit.
    pub unit_price: Amount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct BuyParams {
    pub listing_id: ListingId,
    /// Credits to buy. Buying less than listed leaves the rest for sale.
    pub amount: CreditAmount,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct CreateAuctionParams {
    /// Credits to move under escrow for the auction's lifetime.
    pub amount: CreditAmount,
    /// Advertised opening price.
    pub start_price: Amount,
    /// Smallest winning bid. Below it the credits return to the seller.
    pub reserve_price: Amount,
    /// Length of the bidding window, measured from the creation slot time.
    pub duration: Duration,
}

/// Return type of the `viewListing` entrypoint.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ListingView {
    pub seller: AccountAddress,
    pub amount: CreditAmount,
    pub unit_price: Amount,
}

/// Return type of the `viewAuction` entrypoint.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct AuctionView {
    pub seller: AccountAddress,
    pub amount: CreditAmount,
    pub start_price: Amount,
    pub reserve_price: Amount,
    pub end: Timestamp,
    pub highest_bid: Amount,
    pub highest_bidder: Option<AccountAddress>,
}

/// Return type of the `viewSupply` entrypoint.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct SupplyView {
    /// Credits in circulation, escrowed credits included.
    pub total_supply: CreditAmount,
    /// Fixed supply ceiling.
    pub max_supply: CreditAmount,
    /// Credits ever retired, summed over all addresses.
    pub total_retired: CreditAmount,
}
