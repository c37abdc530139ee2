use commons::{AuctionId, CreditAmount, CustomContractError, ListingId};
use concordium_std::*;

use crate::external::CreateAuctionParams;

/// An open fixed-price listing. Credits equal to `amount` are held by the
/// escrow entry until they are bought or the listing is withdrawn.
#[derive(Debug, Serialize, SchemaType)]
pub struct Listing {
    /// Seller account address.
    pub seller: AccountAddress,
    /// Credits still for sale.
    pub amount: CreditAmount,
    /// Price per credit unit. Partial fills never change it.
    pub unit_price: Amount,
}

/// An open auction. Credits equal to `amount` are held by the escrow entry
/// for the whole bidding window.
#[derive(Debug, Serialize, SchemaType)]
pub struct Auction {
    /// Seller account address.
    pub seller: AccountAddress,
    /// Credits under the hammer.
    pub amount: CreditAmount,
    /// Advertised opening price.
    pub start_price: Amount,
    /// Smallest bid that wins. Below it the credits return to the seller.
    pub reserve_price: Amount,
    /// End of the bidding window. Fixed on creation and never moves.
    pub end: Timestamp,
    /// Current highest bid. Zero until the first bid arrives.
    pub highest_bid: Amount,
    /// Account holding the current highest bid.
    pub highest_bidder: Option<AccountAddress>,
}

impl Auction {
    /// Get auction activity at the given slot time. Activity is derived from
    /// the clock, never stored.
    pub fn is_active(&self, slot_time: Timestamp) -> bool {
        slot_time < self.end
    }
}

/// Displaced highest bid. On overbid, cancellation or a missed reserve it
/// must be refunded to the bidder.
#[must_use]
pub struct LastBid {
    pub account: AccountAddress,
    pub amount: Amount,
}

/// Auction settlement outcome. Carries the payment legs the caller must
/// execute; the credit movements already happened.
#[must_use]
pub enum AuctionOutcome {
    /// The reserve was met. The seller is owed the winning bid.
    Settled {
        seller: AccountAddress,
        winner: AccountAddress,
        amount: CreditAmount,
        price: Amount,
    },
    /// No bids, or the reserve was missed. The credits went back to the
    /// seller and the last bid, if any, must be refunded.
    Returned {
        seller: AccountAddress,
        amount: CreditAmount,
        refund: Option<LastBid>,
    },
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// The only account permitted to mint. Fixed on initialization.
    pub minter: AccountAddress,
    /// Hard ceiling on `total_supply`. Fixed on initialization.
    pub max_supply: CreditAmount,
    /// Credits in circulation, escrowed credits included. Always equals the
    /// sum over `balances`.
    pub total_supply: CreditAmount,
    /// Credit balances. A missing entry means a zero balance. Credits under
    /// escrow sit in the entry keyed by the contract's own address.
    pub balances: StateMap<Address, CreditAmount, S>,
    /// Credits ever retired per address. Entries never decrease.
    pub retired: StateMap<Address, CreditAmount, S>,
    /// Identifier handed to the next listing. Never reused.
    pub next_listing_id: ListingId,
    /// Open fixed-price listings.
    pub listings: StateMap<ListingId, Listing, S>,
    /// Identifier handed to the next auction. Never reused.
    pub next_auction_id: AuctionId,
    /// Open auctions.
    pub auctions: StateMap<AuctionId, Auction, S>,
}

impl<S: HasStateApi> State<S> {
    /// Create a state with an empty ledger and no open trades.
    pub fn new(
        state_builder: &mut StateBuilder<S>,
        minter: AccountAddress,
        max_supply: CreditAmount,
    ) -> Self {
        State {
            minter,
            max_supply,
            total_supply: 0,
            balances: state_builder.new_map(),
            retired: state_builder.new_map(),
            next_listing_id: 0,
            listings: state_builder.new_map(),
            next_auction_id: 0,
            auctions: state_builder.new_map(),
        }
    }

    pub fn balance_of(&self, address: &Address) -> CreditAmount {
        self.balances.get(address).map(|amount| *amount).unwrap_or(0)
    }

    pub fn retired_of(&self, address: &Address) -> CreditAmount {
        self.retired.get(address).map(|amount| *amount).unwrap_or(0)
    }

    /// Mint `amount` fresh credits to `recipient`, growing the total supply.
    /// Authorization is on the caller.
    pub fn mint(
        &mut self,
        recipient: &Address,
        amount: CreditAmount,
    ) -> Result<(), CustomContractError> {
        ensure!(amount > 0, CustomContractError::InvalidAmount);
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(CustomContractError::MaxSupplyExceeded)?;
        ensure!(
            supply <= self.max_supply,
            CustomContractError::MaxSupplyExceeded
        );
        self.credit(recipient, amount);
        self.total_supply = supply;
        Ok(())
    }

    /// Move `amount` credits between two ledger entries. The total supply is
    /// untouched. Listing, buying, auctioning and settling all funnel their
    /// credit movements through here.
    pub fn transfer_credits(
        &mut self,
        from: &Address,
        to: &Address,
        amount: CreditAmount,
    ) -> Result<(), CustomContractError> {
        ensure!(amount > 0, CustomContractError::InvalidAmount);
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Burn `amount` credits of `account` and record them as permanently
    /// retired. The only operation that shrinks the total supply.
    pub fn retire(
        &mut self,
        account: &Address,
        amount: CreditAmount,
    ) -> Result<(), CustomContractError> {
        ensure!(amount > 0, CustomContractError::InvalidAmount);
        let retired = self
            .retired_of(account)
            .checked_add(amount)
            .ok_or(CustomContractError::InvalidAmount)?;
        self.debit(account, amount)?;
        self.total_supply -= amount;
        self.retired.insert(*account, retired);
        Ok(())
    }

    /// Escrow `amount` of the seller's credits and open a listing at
    /// `unit_price` per credit. Returns the fresh listing identifier.
    pub fn list_credits(
        &mut self,
        seller: AccountAddress,
        escrow: &Address,
        amount: CreditAmount,
        unit_price: Amount,
    ) -> Result<ListingId, CustomContractError> {
        ensure!(amount > 0, CustomContractError::InvalidAmount);
        ensure!(
            unit_price > Amount::zero(),
            CustomContractError::InvalidPrice
        );
        self.transfer_credits(&Address::Account(seller), escrow, amount)?;
        let listing_id = self.next_listing_id;
        self.next_listing_id += 1;
        self.listings.insert(
            listing_id,
            Listing {
                seller,
                amount,
                unit_price,
            },
        );
        Ok(listing_id)
    }

    /// Withdraw a listing on behalf of its seller, releasing the remaining
    /// escrowed credits. Returns the released data for the event.
    pub fn unlist_credits(
        &mut self,
        listing_id: ListingId,
        sender: &Address,
        escrow: &Address,
    ) -> Result<Listing, CustomContractError> {
        {
            let listing = self
                .listings
                .get(&listing_id)
                .ok_or(CustomContractError::ListingNotFound)?;
            ensure!(
                sender.matches_account(&listing.seller),
                CustomContractError::Unauthorized
            );
        }
        let listing = self
            .listings
            .remove_and_get(&listing_id)
            .ok_or(CustomContractError::ListingNotFound)?;
        self.transfer_credits(escrow, &Address::Account(listing.seller), listing.amount)?;
        Ok(listing)
    }

    /// Fill `amount` credits of a listing, moving them from escrow to the
    /// buyer. A partial fill keeps the listing under the same identifier,
    /// seller and price; a full fill removes it. Returns the seller and the
    /// cost the caller must pay out.
    pub fn buy_credits(
        &mut self,
        listing_id: ListingId,
        buyer: AccountAddress,
        amount: CreditAmount,
        paid: Amount,
        escrow: &Address,
    ) -> Result<(AccountAddress, Amount), CustomContractError> {
        let (seller, unit_price, cost, remaining) = {
            let listing = self
                .listings
                .get(&listing_id)
                .ok_or(CustomContractError::ListingNotFound)?;
            ensure!(
                amount > 0 && amount <= listing.amount,
                CustomContractError::InvalidAmount
            );
            let cost = listing
                .unit_price
                .micro_ccd
                .checked_mul(amount)
                .map(Amount::from_micro_ccd)
                .ok_or(CustomContractError::InvalidPrice)?;
            ensure!(paid >= cost, CustomContractError::InsufficientAmount);
            (
                listing.seller,
                listing.unit_price,
                cost,
                listing.amount - amount,
            )
        };
        self.transfer_credits(escrow, &Address::Account(buyer), amount)?;
        if remaining == 0 {
            self.listings.remove(&listing_id);
        } else {
            self.listings.insert(
                listing_id,
                Listing {
                    seller,
                    amount: remaining,
                    unit_price,
                },
            );
        }
        Ok((seller, cost))
    }

    /// Escrow `amount` of the seller's credits and open an auction. The end
    /// of the bidding window is fixed here. Returns the fresh auction
    /// identifier together with that end.
    pub fn create_auction(
        &mut self,
        seller: AccountAddress,
        escrow: &Address,
        params: &CreateAuctionParams,
        slot_time: Timestamp,
    ) -> Result<(AuctionId, Timestamp), CustomContractError> {
        ensure!(params.amount > 0, CustomContractError::InvalidAmount);
        ensure!(
            params.duration > Duration::from_millis(0),
            CustomContractError::InvalidAmount
        );
        ensure!(
            params.start_price > Amount::zero(),
            CustomContractError::InvalidPrice
        );
        ensure!(
            params.reserve_price <= params.start_price,
            CustomContractError::InvalidPrice
        );
        let end = slot_time
            .checked_add(params.duration)
            .ok_or(CustomContractError::InvalidDuration)?;
        self.transfer_credits(&Address::Account(seller), escrow, params.amount)?;
        let auction_id = self.next_auction_id;
        self.next_auction_id += 1;
        self.auctions.insert(
            auction_id,
            Auction {
                seller,
                amount: params.amount,
                start_price: params.start_price,
                reserve_price: params.reserve_price,
                end,
                highest_bid: Amount::zero(),
                highest_bidder: None,
            },
        );
        Ok((auction_id, end))
    }

    /// Record a strictly improving bid. Returns the displaced bid that the
    /// caller MUST refund, so at most one bidder's funds stay in escrow.
    pub fn place_bid(
        &mut self,
        auction_id: AuctionId,
        bidder: AccountAddress,
        amount: Amount,
        slot_time: Timestamp,
    ) -> Result<Option<LastBid>, CustomContractError> {
        let mut entry = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(CustomContractError::AuctionNotFound)?;
        let auction = entry.get_mut();

        ensure!(
            auction.is_active(slot_time),
            CustomContractError::AuctionEnded
        );
        ensure!(amount > auction.highest_bid, CustomContractError::BidTooLow);

        // Record the displaced bid before overwriting it.
        let previous = auction
            .highest_bidder
            .replace(bidder)
            .map(|account| LastBid {
                account,
                amount: auction.highest_bid,
            });
        auction.highest_bid = amount;
        Ok(previous)
    }

    /// Settle an auction past its end time. Credits move from escrow to the
    /// winner when the reserve was met and back to the seller otherwise.
    pub fn finalize_auction(
        &mut self,
        auction_id: AuctionId,
        slot_time: Timestamp,
        escrow: &Address,
    ) -> Result<AuctionOutcome, CustomContractError> {
        {
            let auction = self
                .auctions
                .get(&auction_id)
                .ok_or(CustomContractError::AuctionNotFound)?;
            ensure!(
                !auction.is_active(slot_time),
                CustomContractError::AuctionStillActive
            );
        }
        let auction = self
            .auctions
            .remove_and_get(&auction_id)
            .ok_or(CustomContractError::AuctionNotFound)?;

        match auction.highest_bidder {
            Some(winner) if auction.highest_bid >= auction.reserve_price => {
                self.transfer_credits(escrow, &Address::Account(winner), auction.amount)?;
                Ok(AuctionOutcome::Settled {
                    seller: auction.seller,
                    winner,
                    amount: auction.amount,
                    price: auction.highest_bid,
                })
            }
            highest_bidder => {
                self.transfer_credits(escrow, &Address::Account(auction.seller), auction.amount)?;
                Ok(AuctionOutcome::Returned {
                    seller: auction.seller,
                    amount: auction.amount,
                    refund: highest_bidder.map(|account| LastBid {
                        account,
                        amount: auction.highest_bid,
                    }),
                })
            }
        }
    }

    /// Call off an auction on behalf of its seller while the bidding window
    /// is still open. Returns the withdrawn auction and the displaced bid
    /// that the caller MUST refund.
    pub fn cancel_auction(
        &mut self,
        auction_id: AuctionId,
        sender: &Address,
        slot_time: Timestamp,
        escrow: &Address,
    ) -> Result<(Auction, Option<LastBid>), CustomContractError> {
        {
            let auction = self
                .auctions
                .get(&auction_id)
                .ok_or(CustomContractError::AuctionNotFound)?;
            ensure!(
                sender.matches_account(&auction.seller),
                CustomContractError::Unauthorized
            );
            ensure!(
                auction.is_active(slot_time),
                CustomContractError::AuctionEnded
            );
        }
        let auction = self
            .auctions
            .remove_and_get(&auction_id)
            .ok_or(CustomContractError::AuctionNotFound)?;
        self.transfer_credits(escrow, &Address::Account(auction.seller), auction.amount)?;
        let refund = auction.highest_bidder.map(|account| LastBid {
            account,
            amount: auction.highest_bid,
        });
        Ok((auction, refund))
    }

    fn credit(&mut self, address: &Address, amount: CreditAmount) {
        let balance = self.balance_of(address);
        self.balances.insert(*address, balance + amount);
    }

    fn debit(&mut self, address: &Address, amount: CreditAmount) -> Result<(), CustomContractError> {
        let balance = self.balance_of(address);
        ensure!(balance >= amount, CustomContractError::InsufficientBalance);
        if balance == amount {
            self.balances.remove(address);
        } else {
            self.balances.insert(*address, balance - amount);
        }
        Ok(())
    }
}
