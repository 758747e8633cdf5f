pub mod address;
pub mod config;
pub mod item;
pub mod ledger;
pub mod output;
pub mod scanner;
pub mod toncenter;
