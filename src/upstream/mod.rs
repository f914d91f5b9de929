//! The grocery-list service behind the relay: the session contract the
//! relay drives, and the Mealime implementation of it.

pub mod base;
pub mod mealime;

pub use base::{AddResult, UpstreamError, UpstreamSession};
pub use mealime::MealimeClient;
