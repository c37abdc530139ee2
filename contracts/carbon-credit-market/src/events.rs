use commons::{
    AuctionId, CreditAmount, ListingId, AUCTION_TAG, BID_TAG, BUY_TAG, CANCEL_TAG, LISTING_TAG,
    MINT_TAG, RETIRE_TAG, RETURN_TAG, SETTLE_TAG, TRANSFER_TAG, UNLISTING_TAG,
};
use concordium_std::*;

/// Credit mint event data.
#[derive(Debug, Serial)]
pub struct MintEvent<'a> {
    /// Address credited with the fresh credits.
    pub recipient: &'a Address,
    /// Minted amount.
    pub amount: CreditAmount,
}

/// Credit transfer event data.
#[derive(Debug, Serial)]
pub struct TransferEvent<'a> {
    /// Address the credits left.
    pub from: &'a Address,
    /// Address the credits arrived at.
    pub to: &'a Address,
    /// Moved amount.
    pub amount: CreditAmount,
}

/// Credit retirement event data.
#[derive(Debug, Serial)]
pub struct RetireEvent<'a> {
    /// Address whose credits were retired.
    pub account: &'a Address,
    /// Retired amount.
    pub amount: CreditAmount,
}

/// Listing creation event data.
#[derive(Debug, Serial)]
pub struct ListEvent<'a> {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Credits put up for sale.
    pub amount: CreditAmount,
    /// Price per credit unit.
    pub unit_price: Amount,
}

/// Listing withdrawal event data.
#[derive(Debug, Serial)]
pub struct UnlistEvent<'a> {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Credits released from escrow.
    pub amount: CreditAmount,
}

/// Purchase event data.
#[derive(Debug, Serial)]
pub struct BuyEvent<'a> {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Buyer account address.
    pub buyer: &'a AccountAddress,
    /// Credits bought.
    pub amount: CreditAmount,
    /// Total paid to the seller.
    pub cost: Amount,
}

/// Auction creation event data.
#[derive(Debug, Serial)]
pub struct AuctionEvent<'a> {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Credits under the hammer.
    pub amount: CreditAmount,
    /// Advertised opening price.
    pub start_price: Amount,
    /// Smallest winning bid.
    pub reserve_price: Amount,
    /// End of the bidding window.
    pub end: Timestamp,
}

/// Bid event data.
#[derive(Debug, Serial)]
pub struct BidEvent<'a> {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// Bidder account address.
    pub bidder: &'a AccountAddress,
    /// Bid amount.
    pub amount: Amount,
}

/// Auction settlement event data.
#[derive(Debug, Serial)]
pub struct SettleEvent<'a> {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Address of the auction winner.
    pub winner: &'a AccountAddress,
    /// Credits handed to the winner.
    pub amount: CreditAmount,
    /// Winning bid paid to the seller.
    pub price: Amount,
}

/// Auction return event data. The reserve was missed or nobody bid.
#[derive(Debug, Serial)]
pub struct ReturnEvent<'a> {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// Seller account address the credits went back to.
    pub seller: &'a AccountAddress,
    /// Credits released from escrow.
    pub amount: CreditAmount,
}

/// Auction cancellation event data.
#[derive(Debug, Serial)]
pub struct CancelEvent<'a> {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Credits released from escrow.
    pub amount: CreditAmount,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug)]
pub enum MarketEvent<'a> {
    Mint(MintEvent<'a>),
    Transfer(TransferEvent<'a>),
    Retire(RetireEvent<'a>),
    List(ListEvent<'a>),
    Unlist(UnlistEvent<'a>),
    Buy(BuyEvent<'a>),
    Auction(AuctionEvent<'a>),
    Bid(BidEvent<'a>),
    Settle(SettleEvent<'a>),
    Return(ReturnEvent<'a>),
    Cancel(CancelEvent<'a>),
}

impl<'a> MarketEvent<'a> {
    pub fn mint(recipient: &'a Address, amount: CreditAmount) -> Self {
        Self::Mint(MintEvent { recipient, amount })
    }

    pub fn transfer(from: &'a Address, to: &'a Address, amount: CreditAmount) -> Self {
        Self::Transfer(TransferEvent { from, to, amount })
    }

    pub fn retire(account: &'a Address, amount: CreditAmount) -> Self {
        Self::Retire(RetireEvent { account, amount })
    }

    pub fn list(
        listing_id: ListingId,
        seller: &'a AccountAddress,
        amount: CreditAmount,
        unit_price: Amount,
    ) -> Self {
        Self::List(ListEvent {
            listing_id,
            seller,
            amount,
            unit_price,
        })
    }

    pub fn unlist(listing_id: ListingId, seller: &'a AccountAddress, amount: CreditAmount) -> Self {
        Self::Unlist(UnlistEvent {
            listing_id,
            seller,
            amount,
        })
    }

    pub fn buy(
        listing_id: ListingId,
        seller: &'a AccountAddress,
        buyer: &'a AccountAddress,
        amount: CreditAmount,
        cost: Amount,
    ) -> Self {
        Self::Buy(BuyEvent {
            listing_id,
            seller,
            buyer,
            amount,
            cost,
        })
    }

    pub fn auction(
        auction_id: AuctionId,
        seller: &'a AccountAddress,
        amount: CreditAmount,
        start_price: Amount,
        reserve_price: Amount,
        end: Timestamp,
    ) -> Self {
        Self::Auction(AuctionEvent {
            auction_id,
            seller,
            amount,
            start_price,
            reserve_price,
            end,
        })
    }

    pub fn bid(auction_id: AuctionId, bidder: &'a AccountAddress, amount: Amount) -> Self {
        Self::Bid(BidEvent {
            auction_id,
            bidder,
            amount,
        })
    }

    pub fn settle(
        auction_id: AuctionId,
        seller: &'a AccountAddress,
        winner: &'a AccountAddress,
        amount: CreditAmount,
        price: Amount,
    ) -> Self {
        Self::Settle(SettleEvent {
            auction_id,
            seller,
            winner,
            amount,
            price,
        })
    }

    pub fn returned(auction_id: AuctionId, seller: &'a AccountAddress, amount: CreditAmount) -> Self {
        Self::Return(ReturnEvent {
            auction_id,
            seller,
            amount,
        })
    }

    pub fn cancel(auction_id: AuctionId, seller: &'a AccountAddress, amount: CreditAmount) -> Self {
        Self::Cancel(CancelEvent {
            auction_id,
            seller,
            amount,
        })
    }
}

impl<'a> Serial for MarketEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            MarketEvent::Mint(event) => {
                out.write_u8(MINT_TAG)?;
                event.serial(out)
            }
            MarketEvent::Transfer(event) => {
                out.write_u8(TRANSFER_TAG)?;
                event.serial(out)
            }
            MarketEvent::Retire(event) => {
                out.write_u8(RETIRE_TAG)?;
                event.serial(out)
            }
            MarketEvent::List(event) => {
                out.write_u8(LISTING_TAG)?;
                event.serial(out)
            }
            MarketEvent::Unlist(event) => {
                out.write_u8(UNLISTING_TAG)?;
                event.serial(out)
            }
            MarketEvent::Buy(event) => {
                out.write_u8(BUY_TAG)?;
                event.serial(out)
            }
            MarketEvent::Auction(event) => {
                out.write_u8(AUCTION_TAG)?;
                event.serial(out)
            }
            MarketEvent::Bid(event) => {
                out.write_u8(BID_TAG)?;
                event.serial(out)
            }
            MarketEvent::Settle(event) => {
                out.write_u8(SETTLE_TAG)?;
                event.serial(out)
            }
            MarketEvent::Return(event) => {
                out.write_u8(RETURN_TAG)?;
                event.serial(out)
            }
            MarketEvent::Cancel(event) => {
                out.write_u8(CANCEL_TAG)?;
                event.serial(out)
            }
        }
    }
}
