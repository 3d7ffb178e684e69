pub mod profile;
pub mod show;

pub use profile::Profile;
pub use show::{validate_rating, NewShow, Show, ShowView, MAX_RATING};
