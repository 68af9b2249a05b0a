//! Input parsing and output formatting for the chat loop.

use std::fmt::Write as _;

use agent_core::{Message, Role, ToolCallRecord};
use todo_assistant::Task;

pub const HELP: &str =
    "Commands: /tasks lists your tasks, /history shows the conversation, /help shows this text, /quit exits.";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    History,
    Tasks,
    Help,
    Unknown(&'a str),
    Empty,
    Message(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/history" => Self::History,
            "/tasks" => Self::Tasks,
            "/help" | "/?" => Self::Help,
            cmd if cmd.starts_with('/') => Self::Unknown(cmd),
            text => Self::Message(text),
        }
    }
}

/// One line per executed tool: name, arguments and outcome
pub fn format_tool_calls(records: &[ToolCallRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let params = serde_json::to_string(&record.parameters).unwrap_or_default();
        let outcome = record
            .error()
            .map_or_else(|| "ok".to_string(), |e| format!("error: {e}"));
        let _ = writeln!(out, "  ↳ {}({params}) → {outcome}", record.tool_name);
    }
    out
}

/// Numbered task list with status marks
pub fn format_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "(no tasks)\n".into();
    }

    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        let mark = if task.completed { "✅" } else { "⏳" };
        let _ = writeln!(out, "{}. {} {mark} [#{} {}]", i + 1, task.title, task.id, task.priority);
    }
    out
}

/// Stored conversation, oldest first
pub fn format_history(history: &[Message]) -> String {
    if history.is_empty() {
        return "(no messages yet)\n".into();
    }

    let mut out = String::new();
    for message in history {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        };
        let _ = writeln!(
            out,
            "[{}] {speaker}: {}",
            message.timestamp.format("%H:%M:%S"),
            message.content
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::Arguments;
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  /quit "), Command::Quit);
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(Command::parse("/tasks"), Command::Tasks);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("/frobnicate"), Command::Unknown("/frobnicate"));
        assert_eq!(
            Command::parse("Add a task to buy groceries\n"),
            Command::Message("Add a task to buy groceries")
        );
    }

    #[test]
    fn test_format_tool_calls() {
        let mut params = Arguments::new();
        params.insert("task_id".into(), json!(3));
        let records = vec![
            ToolCallRecord::success("complete_task", params.clone(), json!({"id": 3})),
            ToolCallRecord::failure("delete_task", params, "Task 3 not found"),
        ];

        let out = format_tool_calls(&records);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("complete_task({\"task_id\":3}) → ok"));
        assert!(lines[1].ends_with("error: Task 3 not found"));
    }

    #[test]
    fn test_format_tasks() {
        assert_eq!(format_tasks(&[]), "(no tasks)\n");

        let now = chrono::Utc::now();
        let task = Task {
            id: 4,
            title: "Call mom".into(),
            description: None,
            priority: todo_assistant::Priority::High,
            completed: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(format_tasks(&[task]), "1. Call mom ✅ [#4 high]\n");
    }

    #[test]
    fn test_format_history() {
        assert_eq!(format_history(&[]), "(no messages yet)\n");

        let out = format_history(&[Message::user("hi"), Message::assistant("Hello!")]);
        assert!(out.contains("you: hi"));
        assert!(out.contains("assistant: Hello!"));
    }
}
