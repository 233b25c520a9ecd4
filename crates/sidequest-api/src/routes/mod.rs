pub mod capture;
pub mod health;
pub mod page_info;
pub mod preferences;
pub mod requests;
pub mod threads;
