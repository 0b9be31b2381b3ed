pub mod filters;
pub mod todo;
pub mod validator;

pub use filters::{Filters, Metadata};
pub use todo::Todo;
pub use validator::Validator;
