/// Tag for the Mint event.
pub const MINT_TAG: u8 = u8::MAX - 5;

/// Tag for the Transfer event.
pub const TRANSFER_TAG: u8 = u8::MAX - 6;

/// Tag for the Retire event.
pub const RETIRE_TAG: u8 = u8::MAX - 7;

/// Tag for the Listing event.
pub const LISTING_TAG: u8 = u8::MAX - 8;

/// Tag for the Unlisting event.
pub const UNLISTING_TAG: u8 = u8::MAX - 9;

/// Tag for the Buy event.
pub const BUY_TAG: u8 = u8::MAX - 10;

/// Tag for the Auction creation event.
pub const AUCTION_TAG: u8 = u8::MAX - 11;

/// Tag for the Bid event.
pub const BID_TAG: u8 = u8::MAX - 12;

/// Tag for the auction Settle event.
pub const SETTLE_TAG: u8 = u8::MAX - 13;

/// Tag for the auction Return event.
pub const RETURN_TAG: u8 = u8::MAX - 14;

/// Tag for the auction Cancel event.
pub const CANCEL_TAG: u8 = u8::MAX - 15;
