pub mod database_service;
