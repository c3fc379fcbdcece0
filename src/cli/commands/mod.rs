pub mod add;
pub mod delete_account;
pub mod generate;
pub mod get;
pub mod list;
pub mod login;
pub mod modify;
pub mod register;
pub mod remove;
