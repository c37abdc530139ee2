//! It exposes the types, errors and event tags shared by the carbon credit
//! market contract and its tests.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{constants::*, errors::*, types::*};
use concordium_std::*;

mod constants;
mod errors;
mod types;
