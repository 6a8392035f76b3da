pub mod auth;
pub mod board;
pub mod database_validator;
pub mod kanban;
pub mod social;

#[cfg(test)]
pub(crate) mod test_support;
