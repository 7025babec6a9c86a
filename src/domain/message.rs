use serde::{Deserialize, Serialize};

use super::todo::Todo;

/// Frames a client may send. Tagged by `message_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ClientMessage {
    AddTodo { todo: Todo },
    RemoveTodo { todo: Todo },
    ToggleTodoCompletion { todo: Todo },
}

/// Frames the server pushes to every client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ServerMessage {
    AllTodos { todos: Vec<Todo> },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::AddTodo { .. } => "add_todo",
            ClientMessage::RemoveTodo { .. } => "remove_todo",
            ClientMessage::ToggleTodoCompletion { .. } => "toggle_todo_completion",
        }
    }
}
