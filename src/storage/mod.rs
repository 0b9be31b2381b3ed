pub mod todo;

pub use todo::{InMemoryTodoStore, PostgresTodoStore, StoreError, TodoStore};
