// Stock, rejections, inspections and transactions
pub mod inventory;
pub mod returns;

// Analytics and Reporting
pub mod analytics;
pub mod live_analytics;
