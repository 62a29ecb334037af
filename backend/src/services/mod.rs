//! Business logic services for the Shop ERP Platform

pub mod assistant;
pub mod auth;
pub mod cache;
pub mod expense;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod settings;

pub use assistant::AssistantService;
pub use auth::AuthService;
pub use cache::ReportCache;
pub use expense::ExpenseService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use report::ReportService;
pub use sale::SaleService;
pub use settings::SettingsService;
