pub mod cache;
pub mod capture;
pub mod correlator;
pub mod error;
pub mod exclusion;
pub mod grid;
pub mod ledger;
pub mod password;
pub mod position;
pub mod timestamp;
pub mod webgpsmap;
