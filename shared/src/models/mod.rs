//! Domain models for the Canteen Inventory Platform

mod category;
mod material;
mod notification;
mod receipt;
mod recipe;
mod report;
mod sale;
mod supplier;

pub use category::*;
pub use material::*;
pub use notification::*;
pub use receipt::*;
pub use recipe::*;
pub use report::*;
pub use sale::*;
pub use supplier::*;
