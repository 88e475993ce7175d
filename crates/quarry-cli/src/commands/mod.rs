// crates/quarry-cli/src/commands/mod.rs
//
// Command module declarations for the quarry CLI.

pub mod airdrop;
pub mod fixture;
pub mod mint;
pub mod quarry;
pub mod rewarder;
pub mod status;
pub mod wallet;
