//! HTTP API for tasktalk.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/todos` - List todos (`?filter=all|pending|completed`)
//! - `POST /api/todos` - Create a todo
//! - `GET /api/todos/:id` - Get a todo
//! - `PUT /api/todos/:id` - Update a todo
//! - `DELETE /api/todos/:id` - Delete a todo
//! - `POST /api/chat` - Interpret a natural-language command and execute it

mod chat;
mod routes;
pub mod task_store;
mod todos;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
