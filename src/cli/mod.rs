pub mod audit;
pub mod login;
