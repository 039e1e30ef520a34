pub mod context;
pub mod health_service;
pub mod todo_service;

pub use context::ServiceContext;
