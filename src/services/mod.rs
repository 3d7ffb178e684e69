pub mod catalog;
pub mod profile;
pub mod watchlist;
