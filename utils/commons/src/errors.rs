use super::*;

/// The custom errors the contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Sender is not permitted to perform this action (Error code: -4).
    Unauthorized,
    /// Credit amount is zero or exceeds the quantity the operation may touch
    /// (Error code: -5).
    InvalidAmount,
    /// Price is zero, the reserve price exceeds the start price, or a total
    /// cost overflows the currency type (Error code: -6).
    InvalidPrice,
    /// Sender balance is smaller than the requested movement (Error code: -7).
    InsufficientBalance,
    /// Minting this amount would push the total supply above the fixed
    /// maximum (Error code: -8).
    MaxSupplyExceeded,
    /// Listing with this identifier does not exist (Error code: -9).
    ListingNotFound,
    /// Auction with this identifier does not exist (Error code: -10).
    AuctionNotFound,
    /// Raised if a bid or cancellation arrives after the bidding window
    /// closed (Error code: -11).
    AuctionEnded,
    /// Raised if there is an attempt to finalize the auction before its
    /// expiry (Error code: -12).
    AuctionStillActive,
    /// Raised if bid does not exceed the current highest bid (Error code: -13).
    BidTooLow,
    /// The attached amount does not cover the cost (Error code: -14).
    InsufficientAmount,
    /// End of the bidding window does not fit the clock type (Error code: -15).
    InvalidDuration,
    /// Only account addresses can trade credits (Error code: -16).
    OnlyAccountAddress,
    /// Failed to invoke a transfer (Error code: -17).
    InvokeTransferError,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to transfer invocations to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::InvokeTransferError
    }
}
