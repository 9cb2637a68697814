//! Account handlers: registration, login and profile updates.

mod create_user;
mod login_user;
mod update_details;

pub use create_user::CreateUserHandler;
pub use login_user::{BindSessionHandler, LoginUserHandler};
pub use update_details::UpdateDetailsHandler;
