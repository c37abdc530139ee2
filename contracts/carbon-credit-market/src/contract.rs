use commons::{AuctionId, ContractResult, CreditAmount, CustomContractError, ListingId};
use concordium_std::*;

use crate::events::MarketEvent;
use crate::external::*;
use crate::state::{AuctionOutcome, State};

/// Initialize the market with an empty ledger. The deploying account becomes
/// the minter; the supply cap is fixed for the contract's lifetime.
#[init(contract = "CarbonCreditMarket", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;
    Ok(State::new(state_builder, ctx.init_origin(), params.max_supply))
}

/// Mint fresh credits to the recipient, growing the total supply.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - Sender is not the minter fixed on initialization.
/// - The amount is zero.
/// - The new supply would exceed the fixed maximum.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "mint",
    parameter = "MintParams",
    enable_logger
)]
fn mint<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: MintParams = ctx.parameter_cursor().get()?;

    ensure!(
        ctx.sender().matches_account(&host.state().minter),
        CustomContractError::Unauthorized
    );

    host.state_mut().mint(&params.recipient, params.amount)?;

    logger.log(&MarketEvent::mint(&params.recipient, params.amount))?;

    Ok(())
}

/// Move credits from the sender to another address. The total supply is
/// untouched.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - The amount is zero.
/// - The sender balance is too small.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "transfer",
    parameter = "TransferParams",
    enable_logger
)]
fn transfer<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: TransferParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    host.state_mut()
        .transfer_credits(&sender, &params.to, params.amount)?;

    logger.log(&MarketEvent::transfer(&sender, &params.to, params.amount))?;

    Ok(())
}

/// Permanently remove credits from the sender's balance as proof of offset.
/// The retired amount is recorded against the sender and never decreases.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - The amount is zero.
/// - The sender balance is too small.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "retire",
    parameter = "RetireParams",
    enable_logger
)]
fn retire<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: RetireParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    host.state_mut().retire(&sender, params.amount)?;

    logger.log(&MarketEvent::retire(&sender, params.amount))?;

    Ok(())
}

/// Escrow credits of the sender and open a fixed-price listing. Returns the
/// fresh listing identifier.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract address.
/// - The amount is zero or the unit price is zero.
/// - The sender balance is too small.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "listCredits",
    parameter = "ListParams",
    return_value = "ListingId",
    enable_logger
)]
fn list_credits<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<ListingId> {
    let params: ListParams = ctx.parameter_cursor().get()?;
    let seller = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
    };
    let escrow = Address::Contract(ctx.self_address());

    let listing_id =
        host.state_mut()
            .list_credits(seller, &escrow, params.amount, params.unit_price)?;

    logger.log(&MarketEvent::list(
        listing_id,
        &seller,
        params.amount,
        params.unit_price,
    ))?;

    Ok(listing_id)
}

/// Withdraw a listing, releasing the remaining escrowed credits back to the
/// seller.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - No listing exists under this identifier.
/// - Sender is not the seller.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "unlistCredits",
    parameter = "ListingId",
    enable_logger
)]
fn unlist_credits<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let listing_id: ListingId = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    let escrow = Address::Contract(ctx.self_address());

    let listing = host
        .state_mut()
        .unlist_credits(listing_id, &sender, &escrow)?;

    logger.log(&MarketEvent::unlist(
        listing_id,
        &listing.seller,
        listing.amount,
    ))?;

    Ok(())
}

/// Buy credits from a listing at its unit price, paying with the attached
/// CCD. Buying less than the listed amount leaves the rest for sale under
/// the same identifier and price. Any CCD above the cost returns to the
/// buyer.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract address.
/// - No listing exists under this identifier.
/// - The amount is zero or exceeds the listed amount.
/// - The attached CCD does not cover the cost.
#[receive(
    mutable,
    payable,
    contract = "CarbonCreditMarket",
    name = "buyCredits",
    parameter = "BuyParams",
    enable_logger
)]
fn buy_credits<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: BuyParams = ctx.parameter_cursor().get()?;
    let buyer = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
    };
    let escrow = Address::Contract(ctx.self_address());

    let (seller, cost) =
        host.state_mut()
            .buy_credits(params.listing_id, buyer, params.amount, amount, &escrow)?;

    logger.log(&MarketEvent::buy(
        params.listing_id,
        &seller,
        &buyer,
        params.amount,
        cost,
    ))?;

    // Pay the seller.
    host.invoke_transfer(&seller, cost)?;

    // Return remaining funds to the buyer.
    let remaining_funds = amount - cost;
    if remaining_funds > Amount::zero() {
        host.invoke_transfer(&buyer, remaining_funds)?;
    }

    Ok(())
}

/// Escrow credits of the sender and open an auction. Returns the fresh
/// auction identifier. The end of the bidding window is fixed here and
/// never moves.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract address.
/// - The amount or the duration is zero.
/// - The start price is zero or the reserve price exceeds it.
/// - The end of the bidding window overflows the timestamp type.
/// - The sender balance is too small.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "createAuction",
    parameter = "CreateAuctionParams",
    return_value = "AuctionId",
    enable_logger
)]
fn create_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<AuctionId> {
    let params: CreateAuctionParams = ctx.parameter_cursor().get()?;
    let seller = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
    };
    let escrow = Address::Contract(ctx.self_address());
    let slot_time = ctx.metadata().slot_time();

    let (auction_id, end) = host
        .state_mut()
        .create_auction(seller, &escrow, &params, slot_time)?;

    logger.log(&MarketEvent::auction(
        auction_id,
        &seller,
        params.amount,
        params.start_price,
        params.reserve_price,
        end,
    ))?;

    Ok(auction_id)
}

/// Place a bid on an active auction. The attached CCD is the whole bid, not
/// an increment, and must strictly exceed the current highest bid. The
/// displaced bid is refunded in the same invocation, so at most one bidder's
/// funds ever sit in the contract per auction.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - Sender is a contract address.
/// - No auction exists under this identifier.
/// - The bidding window has closed.
/// - The bid does not exceed the current highest bid.
#[receive(
    mutable,
    payable,
    contract = "CarbonCreditMarket",
    name = "placeBid",
    parameter = "AuctionId",
    enable_logger
)]
fn place_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;
    let bidder = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
    };
    let slot_time = ctx.metadata().slot_time();

    let previous_bid = host
        .state_mut()
        .place_bid(auction_id, bidder, amount, slot_time)?;

    logger.log(&MarketEvent::bid(auction_id, &bidder, amount))?;

    // Refund the displaced bid.
    if let Some(bid) = previous_bid {
        host.invoke_transfer(&bid.account, bid.amount)?;
    }

    Ok(())
}

/// Settle an auction whose bidding window has closed. Anyone may call this.
/// If the reserve was met the escrowed credits go to the winner and the
/// winning bid is paid to the seller; otherwise the credits return to the
/// seller and the highest bid, if any, is refunded.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - No auction exists under this identifier.
/// - The bidding window is still open.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "endAuction",
    parameter = "AuctionId",
    enable_logger
)]
fn end_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;
    let escrow = Address::Contract(ctx.self_address());
    let slot_time = ctx.metadata().slot_time();

    let outcome = host
        .state_mut()
        .finalize_auction(auction_id, slot_time, &escrow)?;

    match outcome {
        AuctionOutcome::Settled {
            seller,
            winner,
            amount,
            price,
        } => {
            logger.log(&MarketEvent::settle(
                auction_id, &seller, &winner, amount, price,
            ))?;
            // The winning bid leaves the contract towards the seller.
            host.invoke_transfer(&seller, price)?;
        }
        AuctionOutcome::Returned {
            seller,
            amount,
            refund,
        } => {
            logger.log(&MarketEvent::returned(auction_id, &seller, amount))?;
            if let Some(bid) = refund {
                host.invoke_transfer(&bid.account, bid.amount)?;
            }
        }
    }

    Ok(())
}

/// Call off an auction while its bidding window is still open, releasing the
/// escrowed credits back to the seller. The highest bid, if any, is
/// refunded.
///
/// Rejects if:
/// - It fails to parse the parameter.
/// - No auction exists under this identifier.
/// - Sender is not the seller.
/// - The bidding window has closed.
#[receive(
    mutable,
    contract = "CarbonCreditMarket",
    name = "cancelAuction",
    parameter = "AuctionId",
    enable_logger
)]
fn cancel_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    let escrow = Address::Contract(ctx.self_address());
    let slot_time = ctx.metadata().slot_time();

    let (auction, refund) =
        host.state_mut()
            .cancel_auction(auction_id, &sender, slot_time, &escrow)?;

    logger.log(&MarketEvent::cancel(
        auction_id,
        &auction.seller,
        auction.amount,
    ))?;

    if let Some(bid) = refund {
        host.invoke_transfer(&bid.account, bid.amount)?;
    }

    Ok(())
}

/// Get the credit balance of an address. Unknown addresses hold zero.
#[receive(
    contract = "CarbonCreditMarket",
    name = "getBalance",
    parameter = "Address",
    return_value = "CreditAmount"
)]
fn get_balance<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<CreditAmount> {
    let address: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().balance_of(&address))
}

/// Get the total credit supply, escrowed credits included.
#[receive(
    contract = "CarbonCreditMarket",
    name = "getTotalSupply",
    return_value = "CreditAmount"
)]
fn get_total_supply<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<CreditAmount> {
    Ok(host.state().total_supply)
}

/// Get the credits an address has retired over its lifetime.
#[receive(
    contract = "CarbonCreditMarket",
    name = "getRetiredCredits",
    parameter = "Address",
    return_value = "CreditAmount"
)]
fn get_retired_credits<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<CreditAmount> {
    let address: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().retired_of(&address))
}

/// View an open listing.
#[receive(
    contract = "CarbonCreditMarket",
    name = "viewListing",
    parameter = "ListingId",
    return_value = "ListingView"
)]
fn view_listing<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<ListingView> {
    let listing_id: ListingId = ctx.parameter_cursor().get()?;
    let state = host.state();
    let listing = state
        .listings
        .get(&listing_id)
        .ok_or(CustomContractError::ListingNotFound)?;
    Ok(ListingView {
        seller: listing.seller,
        amount: listing.amount,
        unit_price: listing.unit_price,
    })
}

/// View an open auction.
#[receive(
    contract = "CarbonCreditMarket",
    name = "viewAuction",
    parameter = "AuctionId",
    return_value = "AuctionView"
)]
fn view_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<AuctionView> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;
    let state = host.state();
    let auction = state
        .auctions
        .get(&auction_id)
        .ok_or(CustomContractError::AuctionNotFound)?;
    Ok(AuctionView {
        seller: auction.seller,
        amount: auction.amount,
        start_price: auction.start_price,
        reserve_price: auction.reserve_price,
        end: auction.end,
        highest_bid: auction.highest_bid,
        highest_bidder: auction.highest_bidder,
    })
}

/// View the supply figures: circulating supply, the fixed ceiling and the
/// credits retired over the contract's lifetime.
#[receive(
    contract = "CarbonCreditMarket",
    name = "viewSupply",
    return_value = "SupplyView"
)]
fn view_supply<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<SupplyView> {
    let state = host.state();
    let total_retired = state.retired.iter().map(|(_, amount)| *amount).sum();
    Ok(SupplyView {
        total_supply: state.total_supply,
        max_supply: state.max_supply,
        total_retired,
    })
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::{MINT_TAG, SETTLE_TAG};
    use core::fmt::Debug;
    use test_infrastructure::*;

    const MINTER: AccountAddress = AccountAddress([0u8; 32]);
    const SELLER: AccountAddress = AccountAddress([1u8; 32]);
    const BUYER: AccountAddress = AccountAddress([2u8; 32]);
    const ALICE: AccountAddress = AccountAddress([3u8; 32]);
    const BOB: AccountAddress = AccountAddress([4u8; 32]);
    const MARKET: ContractAddress = ContractAddress {
        index: 7,
        subindex: 0,
    };

    const MAX_SUPPLY: CreditAmount = 100_000;

    fn escrow() -> Address {
        Address::Contract(MARKET)
    }

    fn micro(amount: u64) -> Amount {
        Amount::from_micro_ccd(amount)
    }

    fn new_ctx<'a>(sender: AccountAddress, slot_time: u64) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(sender));
        ctx.set_self_address(MARKET);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_time));
        ctx
    }

    fn fresh_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, MINTER, MAX_SUPPLY);
        TestHost::new(state, state_builder)
    }

    fn mint_to(
        host: &mut TestHost<State<TestStateApi>>,
        recipient: AccountAddress,
        amount: CreditAmount,
    ) {
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(recipient),
            amount,
        });
        let mut ctx = new_ctx(MINTER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        mint(&ctx, host, &mut logger).expect_report("Minting should succeed");
    }

    fn list_from(
        host: &mut TestHost<State<TestStateApi>>,
        seller: AccountAddress,
        amount: CreditAmount,
        unit_price: Amount,
    ) -> ListingId {
        let parameter_bytes = to_bytes(&ListParams { amount, unit_price });
        let mut ctx = new_ctx(seller, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        list_credits(&ctx, host, &mut logger).expect_report("Listing should succeed")
    }

    fn auction_from(
        host: &mut TestHost<State<TestStateApi>>,
        seller: AccountAddress,
        amount: CreditAmount,
        start_price: Amount,
        reserve_price: Amount,
        duration_millis: u64,
    ) -> AuctionId {
        let parameter_bytes = to_bytes(&CreateAuctionParams {
            amount,
            start_price,
            reserve_price,
            duration: Duration::from_millis(duration_millis),
        });
        let mut ctx = new_ctx(seller, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        create_auction(&ctx, host, &mut logger).expect_report("Auction creation should succeed")
    }

    fn bid_on(
        host: &mut TestHost<State<TestStateApi>>,
        auction_id: AuctionId,
        bidder: AccountAddress,
        amount: Amount,
        slot_time: u64,
    ) -> ContractResult<()> {
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(bidder, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        place_bid(&ctx, host, amount, &mut logger)
    }

    fn balance_of(host: &TestHost<State<TestStateApi>>, address: Address) -> CreditAmount {
        host.state().balance_of(&address)
    }

    fn expect_error<T: Debug>(result: ContractResult<T>, err: CustomContractError, msg: &str) {
        let actual = result.expect_err_report(msg);
        claim_eq!(actual, err);
    }

    /// Check the core ledger invariant: the total supply always equals the
    /// sum over the balance map, escrow entry included.
    fn claim_supply_conserved(host: &TestHost<State<TestStateApi>>) {
        let state = host.state();
        let balance_sum: CreditAmount = state.balances.iter().map(|(_, amount)| *amount).sum();
        claim_eq!(
            balance_sum,
            state.total_supply,
            "Total supply must equal the sum of all balances"
        );
    }

    #[concordium_test]
    fn test_init() {
        let parameter_bytes = to_bytes(&InitParams {
            max_supply: MAX_SUPPLY,
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(MINTER);
        ctx.set_parameter(&parameter_bytes);
        let mut state_builder = TestStateBuilder::new();

        let state = init(&ctx, &mut state_builder).expect_report("Init should succeed");

        claim_eq!(state.minter, MINTER);
        claim_eq!(state.max_supply, MAX_SUPPLY);
        claim_eq!(state.total_supply, 0);
        claim_eq!(state.next_listing_id, 0);
        claim_eq!(state.next_auction_id, 0);
    }

    #[concordium_test]
    fn test_mint_increases_supply_and_balance() {
        let mut host = fresh_host();
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(SELLER),
            amount: 1_000,
        });
        let mut ctx = new_ctx(MINTER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        mint(&ctx, &mut host, &mut logger).expect_report("Minting should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(host.state().total_supply, 1_000);
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], MINT_TAG);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_mint_requires_minter() {
        let mut host = fresh_host();
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(SELLER),
            amount: 1_000,
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        expect_error(
            mint(&ctx, &mut host, &mut logger),
            CustomContractError::Unauthorized,
            "Minting by a non-minter should fail",
        );
        claim_eq!(host.state().total_supply, 0);
    }

    #[concordium_test]
    fn test_mint_enforces_max_supply() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();

        // Zero amounts are rejected before the cap is even considered.
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(SELLER),
            amount: 0,
        });
        let mut ctx = new_ctx(MINTER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            mint(&ctx, &mut host, &mut logger),
            CustomContractError::InvalidAmount,
            "Minting zero credits should fail",
        );

        // Filling the cap exactly is fine.
        mint_to(&mut host, SELLER, MAX_SUPPLY);
        claim_eq!(host.state().total_supply, MAX_SUPPLY);

        // One credit above the cap is not.
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(SELLER),
            amount: 1,
        });
        let mut ctx = new_ctx(MINTER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            mint(&ctx, &mut host, &mut logger),
            CustomContractError::MaxSupplyExceeded,
            "Minting above the cap should fail",
        );
        claim_eq!(host.state().total_supply, MAX_SUPPLY);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_mint_rejects_supply_overflow() {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, MINTER, u64::MAX);
        let mut host = TestHost::new(state, state_builder);
        mint_to(&mut host, SELLER, u64::MAX - 1);
        let mut logger = TestLogger::init();

        // Another 5 credits would wrap the supply counter before the cap
        // check is ever reached.
        let parameter_bytes = to_bytes(&MintParams {
            recipient: Address::Account(SELLER),
            amount: 5,
        });
        let mut ctx = new_ctx(MINTER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            mint(&ctx, &mut host, &mut logger),
            CustomContractError::MaxSupplyExceeded,
            "Overflowing the supply counter should fail",
        );
        claim_eq!(host.state().total_supply, u64::MAX - 1);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_transfer_moves_credits() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);

        let parameter_bytes = to_bytes(&TransferParams {
            to: Address::Account(BUYER),
            amount: 400,
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        transfer(&ctx, &mut host, &mut logger).expect_report("Transfer should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 600);
        claim_eq!(balance_of(&host, Address::Account(BUYER)), 400);
        claim_eq!(host.state().total_supply, 1_000);
        claim_eq!(logger.logs.len(), 1);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_transfer_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 100);
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&TransferParams {
            to: Address::Account(BUYER),
            amount: 0,
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            transfer(&ctx, &mut host, &mut logger),
            CustomContractError::InvalidAmount,
            "Transferring zero credits should fail",
        );

        let parameter_bytes = to_bytes(&TransferParams {
            to: Address::Account(BUYER),
            amount: 101,
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            transfer(&ctx, &mut host, &mut logger),
            CustomContractError::InsufficientBalance,
            "Overdrawing the balance should fail",
        );

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 100);
        claim_eq!(balance_of(&host, Address::Account(BUYER)), 0);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_retire_is_permanent() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&RetireParams { amount: 300 });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        retire(&ctx, &mut host, &mut logger).expect_report("Retiring should succeed");

        let parameter_bytes = to_bytes(&RetireParams { amount: 200 });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        retire(&ctx, &mut host, &mut logger).expect_report("Retiring should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 500);
        claim_eq!(host.state().total_supply, 500);
        claim_eq!(
            host.state().retired_of(&Address::Account(SELLER)),
            500,
            "Retired credits must accumulate"
        );
        claim_supply_conserved(&host);

        // The receipt survives a failed attempt to retire more than held.
        let parameter_bytes = to_bytes(&RetireParams { amount: 600 });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            retire(&ctx, &mut host, &mut logger),
            CustomContractError::InsufficientBalance,
            "Retiring more than the balance should fail",
        );
        claim_eq!(host.state().retired_of(&Address::Account(SELLER)), 500);
        claim_eq!(host.state().total_supply, 500);

        // Retired credits free headroom under the cap for fresh mints.
        mint_to(&mut host, SELLER, MAX_SUPPLY - 500);
        claim_eq!(host.state().total_supply, MAX_SUPPLY);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_get_views_report_ledger() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);

        let parameter_bytes = to_bytes(&RetireParams { amount: 250 });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        retire(&ctx, &mut host, &mut logger).expect_report("Retiring should succeed");

        let parameter_bytes = to_bytes(&Address::Account(SELLER));
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(get_balance(&ctx, &host), Ok(750));
        claim_eq!(get_retired_credits(&ctx, &host), Ok(250));

        // Unknown addresses hold zero.
        let parameter_bytes = to_bytes(&Address::Account(BOB));
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(get_balance(&ctx, &host), Ok(0));
        claim_eq!(get_retired_credits(&ctx, &host), Ok(0));

        let ctx = new_ctx(BUYER, 0);
        claim_eq!(get_total_supply(&ctx, &host), Ok(750));

        let supply = view_supply(&ctx, &host).expect_report("Supply view should succeed");
        claim_eq!(supply.total_supply, 750);
        claim_eq!(supply.max_supply, MAX_SUPPLY);
        claim_eq!(supply.total_retired, 250);
    }

    #[concordium_test]
    fn test_list_credits_escrows() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);

        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        claim_eq!(listing_id, 0);
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 600);
        claim_eq!(balance_of(&host, escrow()), 400);
        claim_eq!(host.state().total_supply, 1_000);
        claim_supply_conserved(&host);

        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_listing(&ctx, &host).expect_report("Listing view should succeed");
        claim_eq!(view.seller, SELLER);
        claim_eq!(view.amount, 400);
        claim_eq!(view.unit_price, micro(5));
    }

    #[concordium_test]
    fn test_list_credits_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&ListParams {
            amount: 0,
            unit_price: micro(5),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            list_credits(&ctx, &mut host, &mut logger),
            CustomContractError::InvalidAmount,
            "Listing zero credits should fail",
        );

        let parameter_bytes = to_bytes(&ListParams {
            amount: 100,
            unit_price: Amount::zero(),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            list_credits(&ctx, &mut host, &mut logger),
            CustomContractError::InvalidPrice,
            "Listing at a zero price should fail",
        );

        let parameter_bytes = to_bytes(&ListParams {
            amount: 2_000,
            unit_price: micro(5),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            list_credits(&ctx, &mut host, &mut logger),
            CustomContractError::InsufficientBalance,
            "Listing more credits than held should fail",
        );

        let parameter_bytes = to_bytes(&ListParams {
            amount: 100,
            unit_price: micro(5),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_sender(Address::Contract(ContractAddress {
            index: 9,
            subindex: 0,
        }));
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            list_credits(&ctx, &mut host, &mut logger),
            CustomContractError::OnlyAccountAddress,
            "Listing from a contract address should fail",
        );

        // Nothing moved under escrow.
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(balance_of(&host, escrow()), 0);
        claim_eq!(host.state().next_listing_id, 0);
    }

    #[concordium_test]
    fn test_buy_credits_partial_fill() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 150,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(750));

        buy_credits(&ctx, &mut host, micro(750), &mut logger)
            .expect_report("Buying should succeed");

        claim_eq!(balance_of(&host, Address::Account(BUYER)), 150);
        claim_eq!(balance_of(&host, escrow()), 250);
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 600);
        claim_eq!(host.state().total_supply, 1_000);
        claim_eq!(host.get_transfers(), [(SELLER, micro(750))]);
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::buy(
            listing_id,
            &SELLER,
            &BUYER,
            150,
            micro(750)
        ))));
        claim_supply_conserved(&host);

        // The remainder stays listed under the same identifier and price.
        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_listing(&ctx, &host).expect_report("Listing view should succeed");
        claim_eq!(view.seller, SELLER);
        claim_eq!(view.amount, 250);
        claim_eq!(view.unit_price, micro(5));
    }

    #[concordium_test]
    fn test_buy_credits_full_fill_removes_listing() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 400,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(2_000));

        buy_credits(&ctx, &mut host, micro(2_000), &mut logger)
            .expect_report("Buying should succeed");

        claim_eq!(balance_of(&host, Address::Account(BUYER)), 400);
        claim_eq!(balance_of(&host, escrow()), 0);

        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            view_listing(&ctx, &host),
            CustomContractError::ListingNotFound,
            "A fully filled listing should be gone",
        );

        // Spent identifiers are never handed out again.
        let next_id = list_from(&mut host, SELLER, 100, micro(1));
        claim_eq!(next_id, 1);
    }

    #[concordium_test]
    fn test_buy_credits_returns_excess() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 10,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(80));

        buy_credits(&ctx, &mut host, micro(80), &mut logger)
            .expect_report("Buying should succeed");

        // The seller gets the cost, the buyer the difference.
        claim_eq!(
            host.get_transfers(),
            [(SELLER, micro(50)), (BUYER, micro(30))]
        );
    }

    #[concordium_test]
    fn test_buy_credits_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(10_000));

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id: 77,
            amount: 10,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            buy_credits(&ctx, &mut host, micro(10_000), &mut logger),
            CustomContractError::ListingNotFound,
            "Buying from an unknown listing should fail",
        );

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 0,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            buy_credits(&ctx, &mut host, micro(10_000), &mut logger),
            CustomContractError::InvalidAmount,
            "Buying zero credits should fail",
        );

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 401,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            buy_credits(&ctx, &mut host, micro(10_000), &mut logger),
            CustomContractError::InvalidAmount,
            "Buying more than listed should fail",
        );

        // 150 credits at 5 micro CCD cost 750, only 749 attached.
        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 150,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            buy_credits(&ctx, &mut host, micro(749), &mut logger),
            CustomContractError::InsufficientAmount,
            "Underpaying should fail",
        );

        // No partial effects: escrow, listing and payments are untouched.
        claim_eq!(balance_of(&host, escrow()), 400);
        claim_eq!(balance_of(&host, Address::Account(BUYER)), 0);
        claim!(host.get_transfers().is_empty());
        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_listing(&ctx, &host).expect_report("Listing view should succeed");
        claim_eq!(view.amount, 400);
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_buy_credits_rejects_cost_overflow() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(u64::MAX / 2));

        // Three credits at that price do not fit in the cost type.
        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 3,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(u64::MAX));

        expect_error(
            buy_credits(&ctx, &mut host, micro(u64::MAX), &mut logger),
            CustomContractError::InvalidPrice,
            "Overflowing the cost computation should fail",
        );

        // No partial effects: escrow, listing and payments are untouched.
        claim_eq!(balance_of(&host, escrow()), 400);
        claim_eq!(balance_of(&host, Address::Account(BUYER)), 0);
        claim!(host.get_transfers().is_empty());
        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_listing(&ctx, &host).expect_report("Listing view should succeed");
        claim_eq!(view.amount, 400);
        claim_eq!(view.unit_price, micro(u64::MAX / 2));
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_unlist_credits_releases_escrow() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        unlist_credits(&ctx, &mut host, &mut logger).expect_report("Unlisting should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(balance_of(&host, escrow()), 0);
        claim_eq!(logger.logs.len(), 1);
        claim_supply_conserved(&host);

        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            unlist_credits(&ctx, &mut host, &mut logger),
            CustomContractError::ListingNotFound,
            "Unlisting twice should fail",
        );
    }

    #[concordium_test]
    fn test_unlist_requires_seller() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let listing_id = list_from(&mut host, SELLER, 400, micro(5));

        let parameter_bytes = to_bytes(&listing_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        expect_error(
            unlist_credits(&ctx, &mut host, &mut logger),
            CustomContractError::Unauthorized,
            "Unlisting someone else's listing should fail",
        );
        claim_eq!(balance_of(&host, escrow()), 400);
    }

    #[concordium_test]
    fn test_create_auction_escrows() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);

        let parameter_bytes = to_bytes(&CreateAuctionParams {
            amount: 500,
            start_price: micro(100),
            reserve_price: micro(50),
            duration: Duration::from_millis(10),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let auction_id = create_auction(&ctx, &mut host, &mut logger)
            .expect_report("Auction creation should succeed");

        claim_eq!(auction_id, 0);
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 500);
        claim_eq!(balance_of(&host, escrow()), 500);
        // The event advertises the window end fixed at creation.
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::auction(
            auction_id,
            &SELLER,
            500,
            micro(100),
            micro(50),
            Timestamp::from_timestamp_millis(10),
        ))));
        claim_supply_conserved(&host);

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_auction(&ctx, &host).expect_report("Auction view should succeed");
        claim_eq!(view.seller, SELLER);
        claim_eq!(view.amount, 500);
        claim_eq!(view.start_price, micro(100));
        claim_eq!(view.reserve_price, micro(50));
        claim_eq!(view.end, Timestamp::from_timestamp_millis(10));
        claim_eq!(view.highest_bid, Amount::zero());
        claim_eq!(view.highest_bidder, None);
    }

    #[concordium_test]
    fn test_create_auction_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let mut logger = TestLogger::init();

        let cases: [(CreateAuctionParams, CustomContractError, &str); 5] = [
            (
                CreateAuctionParams {
                    amount: 0,
                    start_price: micro(100),
                    reserve_price: micro(50),
                    duration: Duration::from_millis(10),
                },
                CustomContractError::InvalidAmount,
                "Auctioning zero credits should fail",
            ),
            (
                CreateAuctionParams {
                    amount: 500,
                    start_price: micro(100),
                    reserve_price: micro(50),
                    duration: Duration::from_millis(0),
                },
                CustomContractError::InvalidAmount,
                "A zero duration should fail",
            ),
            (
                CreateAuctionParams {
                    amount: 500,
                    start_price: Amount::zero(),
                    reserve_price: Amount::zero(),
                    duration: Duration::from_millis(10),
                },
                CustomContractError::InvalidPrice,
                "A zero start price should fail",
            ),
            (
                CreateAuctionParams {
                    amount: 500,
                    start_price: micro(100),
                    reserve_price: micro(101),
                    duration: Duration::from_millis(10),
                },
                CustomContractError::InvalidPrice,
                "A reserve above the start price should fail",
            ),
            (
                CreateAuctionParams {
                    amount: 2_000,
                    start_price: micro(100),
                    reserve_price: micro(50),
                    duration: Duration::from_millis(10),
                },
                CustomContractError::InsufficientBalance,
                "Auctioning more credits than held should fail",
            ),
        ];

        for (params, err, msg) in cases {
            let parameter_bytes = to_bytes(&params);
            let mut ctx = new_ctx(SELLER, 0);
            ctx.set_parameter(&parameter_bytes);
            expect_error(create_auction(&ctx, &mut host, &mut logger), err, msg);
        }

        // A bidding window outgrowing the timestamp type is rejected.
        let parameter_bytes = to_bytes(&CreateAuctionParams {
            amount: 500,
            start_price: micro(100),
            reserve_price: micro(50),
            duration: Duration::from_millis(u64::MAX),
        });
        let mut ctx = new_ctx(SELLER, 1);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            create_auction(&ctx, &mut host, &mut logger),
            CustomContractError::InvalidDuration,
            "An overflowing end time should fail",
        );

        // A reserve equal to the start price is allowed.
        let parameter_bytes = to_bytes(&CreateAuctionParams {
            amount: 500,
            start_price: micro(100),
            reserve_price: micro(100),
            duration: Duration::from_millis(10),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);
        create_auction(&ctx, &mut host, &mut logger)
            .expect_report("A reserve equal to the start price should be accepted");

        claim_eq!(balance_of(&host, escrow()), 500);
        claim_supply_conserved(&host);
    }

    /// The reserve is met:
    /// 0. The seller auctions 500 credits, start price 100, reserve 50,
    ///    for 10 milliseconds.
    /// 1. Alice bids 120 before the window closes. It is accepted.
    /// 2. Anyone settles the auction after the window. Alice receives the
    ///    500 credits and the seller is paid 120.
    /// 3. Settling again fails, the auction is gone.
    #[concordium_test]
    fn test_auction_winner_settlement() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);

        bid_on(&mut host, auction_id, ALICE, micro(120), 5)
            .expect_report("A bid above the start price should be accepted");

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 11);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(micro(120));

        end_auction(&ctx, &mut host, &mut logger).expect_report("Settlement should succeed");

        claim_eq!(balance_of(&host, Address::Account(ALICE)), 500);
        claim_eq!(balance_of(&host, escrow()), 0);
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 500);
        claim_eq!(host.state().total_supply, 1_000);
        claim_eq!(host.get_transfers(), [(SELLER, micro(120))]);
        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], SETTLE_TAG);
        claim_supply_conserved(&host);

        let mut ctx = new_ctx(BUYER, 12);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            end_auction(&ctx, &mut host, &mut logger),
            CustomContractError::AuctionNotFound,
            "Settling twice should fail",
        );
    }

    /// Outbidding refunds the displaced bidder immediately, so at most one
    /// bidder's funds sit in the contract per auction.
    #[concordium_test]
    fn test_auction_outbid_refunds_previous_bidder() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);
        host.set_self_balance(micro(120) + micro(150));

        bid_on(&mut host, auction_id, ALICE, micro(120), 3)
            .expect_report("The first bid should be accepted");
        claim!(host.get_transfers().is_empty());

        bid_on(&mut host, auction_id, BOB, micro(150), 5)
            .expect_report("A higher bid should be accepted");
        claim_eq!(
            host.get_transfers(),
            [(ALICE, micro(120))],
            "Outbidding must refund the previous bidder at once"
        );

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_auction(&ctx, &host).expect_report("Auction view should succeed");
        claim_eq!(view.highest_bid, micro(150));
        claim_eq!(view.highest_bidder, Some(BOB));

        let mut ctx = new_ctx(BUYER, 11);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        end_auction(&ctx, &mut host, &mut logger).expect_report("Settlement should succeed");

        claim_eq!(balance_of(&host, Address::Account(BOB)), 500);
        claim_eq!(balance_of(&host, Address::Account(ALICE)), 0);
        claim_eq!(
            host.get_transfers(),
            [(ALICE, micro(120)), (SELLER, micro(150))]
        );
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_auction_no_bids_returns_credits() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 11);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        end_auction(&ctx, &mut host, &mut logger).expect_report("Settlement should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(balance_of(&host, escrow()), 0);
        claim!(host.get_transfers().is_empty(), "Nobody is owed anything");
        claim!(logger.logs.contains(&to_bytes(&MarketEvent::returned(
            auction_id, &SELLER, 500
        ))));
        claim_supply_conserved(&host);
    }

    /// A highest bid below the reserve price loses: the credits return to
    /// the seller and the bid is refunded on settlement.
    #[concordium_test]
    fn test_auction_reserve_not_met() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);
        host.set_self_balance(micro(30));

        // Below the reserve, yet above the current highest bid of zero.
        bid_on(&mut host, auction_id, ALICE, micro(30), 5)
            .expect_report("A bid below the reserve is still a valid bid");

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 11);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        end_auction(&ctx, &mut host, &mut logger).expect_report("Settlement should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(balance_of(&host, Address::Account(ALICE)), 0);
        claim_eq!(
            host.get_transfers(),
            [(ALICE, micro(30))],
            "The losing bid must be refunded"
        );
        claim_supply_conserved(&host);
    }

    #[concordium_test]
    fn test_place_bid_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);

        expect_error(
            bid_on(&mut host, 77, ALICE, micro(120), 5),
            CustomContractError::AuctionNotFound,
            "Bidding on an unknown auction should fail",
        );

        expect_error(
            bid_on(&mut host, auction_id, ALICE, Amount::zero(), 5),
            CustomContractError::BidTooLow,
            "A zero bid should fail",
        );

        bid_on(&mut host, auction_id, ALICE, micro(120), 5)
            .expect_report("The first bid should be accepted");

        expect_error(
            bid_on(&mut host, auction_id, BOB, micro(120), 6),
            CustomContractError::BidTooLow,
            "Matching the highest bid should fail",
        );

        expect_error(
            bid_on(&mut host, auction_id, BOB, micro(100), 6),
            CustomContractError::BidTooLow,
            "A lower bid should fail",
        );

        // The window spans [creation, end). A bid exactly at the end time
        // comes too late.
        expect_error(
            bid_on(&mut host, auction_id, BOB, micro(200), 10),
            CustomContractError::AuctionEnded,
            "Bidding at the end time should fail",
        );

        // The highest bid is unchanged by the rejected attempts.
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let view = view_auction(&ctx, &host).expect_report("Auction view should succeed");
        claim_eq!(view.highest_bid, micro(120));
        claim_eq!(view.highest_bidder, Some(ALICE));
    }

    #[concordium_test]
    fn test_end_auction_before_expiry() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 9);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        expect_error(
            end_auction(&ctx, &mut host, &mut logger),
            CustomContractError::AuctionStillActive,
            "Settling before the end time should fail",
        );
        claim_eq!(balance_of(&host, escrow()), 500);

        // The end time itself is past the window.
        let mut ctx = new_ctx(BUYER, 10);
        ctx.set_parameter(&parameter_bytes);
        end_auction(&ctx, &mut host, &mut logger)
            .expect_report("Settling at the end time should succeed");
        claim_eq!(balance_of(&host, escrow()), 0);
    }

    #[concordium_test]
    fn test_cancel_auction_refunds_bidder() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);
        host.set_self_balance(micro(120));

        bid_on(&mut host, auction_id, ALICE, micro(120), 3)
            .expect_report("The first bid should be accepted");

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(SELLER, 5);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        cancel_auction(&ctx, &mut host, &mut logger).expect_report("Cancelling should succeed");

        claim_eq!(balance_of(&host, Address::Account(SELLER)), 1_000);
        claim_eq!(balance_of(&host, escrow()), 0);
        claim_eq!(host.get_transfers(), [(ALICE, micro(120))]);
        claim_supply_conserved(&host);

        let mut ctx = new_ctx(SELLER, 6);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            cancel_auction(&ctx, &mut host, &mut logger),
            CustomContractError::AuctionNotFound,
            "Cancelling twice should fail",
        );
    }

    #[concordium_test]
    fn test_cancel_auction_validation() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let auction_id = auction_from(&mut host, SELLER, 500, micro(100), micro(50), 10);
        let parameter_bytes = to_bytes(&auction_id);
        let mut logger = TestLogger::init();

        let mut ctx = new_ctx(BUYER, 5);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            cancel_auction(&ctx, &mut host, &mut logger),
            CustomContractError::Unauthorized,
            "Cancelling someone else's auction should fail",
        );

        let mut ctx = new_ctx(SELLER, 10);
        ctx.set_parameter(&parameter_bytes);
        expect_error(
            cancel_auction(&ctx, &mut host, &mut logger),
            CustomContractError::AuctionEnded,
            "Cancelling after the window should fail",
        );

        claim_eq!(balance_of(&host, escrow()), 500);
        claim_supply_conserved(&host);
    }

    /// The ledger invariant holds across a whole market lifecycle: minting,
    /// listing, buying, auctioning, outbidding, settling and retiring.
    #[concordium_test]
    fn test_supply_conservation_over_full_flow() {
        let mut host = fresh_host();
        host.set_self_balance(micro(100_000));

        mint_to(&mut host, SELLER, 1_000);
        mint_to(&mut host, BUYER, 500);
        claim_supply_conserved(&host);

        let listing_id = list_from(&mut host, SELLER, 300, micro(2));
        claim_supply_conserved(&host);

        let parameter_bytes = to_bytes(&BuyParams {
            listing_id,
            amount: 100,
        });
        let mut ctx = new_ctx(BUYER, 0);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();
        buy_credits(&ctx, &mut host, micro(200), &mut logger)
            .expect_report("Buying should succeed");
        claim_supply_conserved(&host);

        let auction_id = auction_from(&mut host, SELLER, 200, micro(100), micro(50), 10);
        claim_supply_conserved(&host);

        bid_on(&mut host, auction_id, ALICE, micro(60), 2)
            .expect_report("The first bid should be accepted");
        bid_on(&mut host, auction_id, BOB, micro(90), 4)
            .expect_report("A higher bid should be accepted");
        claim_supply_conserved(&host);

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BUYER, 11);
        ctx.set_parameter(&parameter_bytes);
        end_auction(&ctx, &mut host, &mut logger).expect_report("Settlement should succeed");
        claim_supply_conserved(&host);

        let parameter_bytes = to_bytes(&RetireParams { amount: 150 });
        let mut ctx = new_ctx(BUYER, 12);
        ctx.set_parameter(&parameter_bytes);
        retire(&ctx, &mut host, &mut logger).expect_report("Retiring should succeed");
        claim_supply_conserved(&host);

        // 1500 minted, 150 retired.
        claim_eq!(host.state().total_supply, 1_350);
        claim_eq!(balance_of(&host, Address::Account(SELLER)), 500);
        claim_eq!(balance_of(&host, Address::Account(BUYER)), 450);
        claim_eq!(balance_of(&host, Address::Account(BOB)), 200);
        claim_eq!(balance_of(&host, escrow()), 200);

        let ctx = new_ctx(BUYER, 13);
        let supply = view_supply(&ctx, &host).expect_report("Supply view should succeed");
        claim_eq!(supply.total_retired, 150);
    }

    /// Listing and auction identifiers come from independent monotone
    /// counters and are never reused.
    #[concordium_test]
    fn test_identifiers_never_reused() {
        let mut host = fresh_host();
        mint_to(&mut host, SELLER, 1_000);
        let mut logger = TestLogger::init();

        let first = auction_from(&mut host, SELLER, 100, micro(10), micro(5), 10);
        claim_eq!(first, 0);

        let parameter_bytes = to_bytes(&first);
        let mut ctx = new_ctx(SELLER, 5);
        ctx.set_parameter(&parameter_bytes);
        cancel_auction(&ctx, &mut host, &mut logger).expect_report("Cancelling should succeed");

        let second = auction_from(&mut host, SELLER, 100, micro(10), micro(5), 10);
        claim_eq!(second, 1, "A spent auction identifier must not come back");

        let listing = list_from(&mut host, SELLER, 100, micro(1));
        claim_eq!(listing, 0, "Listing identifiers count independently");
    }
}
