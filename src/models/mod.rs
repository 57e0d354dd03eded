mod user;
mod forms;
mod task;

pub use user::{User, validate_credentials};
pub use forms::{LoginForm, RegisterForm, PageQuery};
pub use task::{Task, NewTask};
