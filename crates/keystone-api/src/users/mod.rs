//! User account management

pub mod repository;
pub mod service;

pub use repository::{UserInfo, UserRepository};
pub use service::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserPage, UsersService};
