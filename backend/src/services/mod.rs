//! Business logic services for the canteen engine

pub mod category;
pub mod material;
pub mod notification;
pub mod production;
pub mod profitability;
pub mod sale;
pub mod supplier;

pub use category::CategoryService;
pub use material::MaterialService;
pub use notification::{
    Delivery, DispatchReport, FallbackNotifier, LogNotifier, NotificationError,
    NotificationService, Notifier, SupplyRequest,
};
pub use production::ProductionService;
pub use profitability::ProfitabilityService;
pub use sale::SaleService;
pub use supplier::SupplierService;
