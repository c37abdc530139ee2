//! It keeps a single ledger of fungible carbon credits with a fixed supply
//! cap and exposes functions for minting, transferring and retiring credits,
//! for selling them at a fixed price and for auctioning them off.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod state;
