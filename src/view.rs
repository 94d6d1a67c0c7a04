// Terminal rendering and prompts

use crate::filter::FilterMode;
use crate::store::Confirm;
use crate::task::Task;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

const INDENT: &str = "    ";

/// Render a filtered listing: selector line, then one block per task
pub fn render(tasks: &[&Task], mode: FilterMode, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_selector(mode));
    let _ = writeln!(out);

    if tasks.is_empty() {
        let _ = writeln!(out, "{}", "No tasks".dimmed());
        return out;
    }

    for task in tasks {
        out.push_str(&render_task(task, now));
    }
    out
}

/// `[All]  Active  Completed` with the current mode highlighted
pub fn render_selector(mode: FilterMode) -> String {
    FilterMode::ALL
        .iter()
        .map(|m| {
            if *m == mode {
                format!("[{}]", m.label()).blue().bold().to_string()
            } else {
                m.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_task(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let (marker, text) = if task.completed {
        ("[x]", task.text.strikethrough().dimmed().to_string())
    } else {
        ("[ ]", task.text.normal().to_string())
    };
    let _ = writeln!(out, "{} {} {}", task.id.to_string().cyan(), marker, text);
    let _ = writeln!(out, "{}Created: {}", INDENT, format_created(task));

    if !task.due_date.is_empty() {
        let due = format!("Due: {}", task.due_date);
        let due = if task.is_overdue(now) {
            due.red().bold()
        } else {
            due.yellow()
        };
        let _ = writeln!(out, "{}{}", INDENT, due);
    }
    out
}

/// Creation time in local time, or the raw value when it does not parse
pub fn format_created(task: &Task) -> String {
    match task.created() {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => task.created_at.clone(),
    }
}

/// Line-based yes/no prompt
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt on stderr, answer on stdin
pub type TerminalConfirm = PromptConfirm<io::StdinLock<'static>, io::Stderr>;

impl TerminalConfirm {
    pub fn stdio() -> Self {
        PromptConfirm::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{} [y/N] ", prompt).and_then(|_| self.output.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn plain() {
        colored::control::set_override(false);
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_render_empty() {
        plain();
        let out = render(&[], FilterMode::Active, now());
        assert_eq!(out, "All  [Active]  Completed\n\nNo tasks\n");
    }

    #[test]
    fn test_render_task_lines() {
        plain();
        let mut task = Task::new(17, "Call Bob", "2025-01-01", now());
        let out = render_task(&task, now());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "17 [ ] Call Bob");
        assert!(lines[1].starts_with("    Created: 2025-"));
        assert_eq!(lines[2], "    Due: 2025-01-01");

        task.completed = true;
        task.due_date.clear();
        let out = render_task(&task, now());
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("17 [x] Call Bob"));
    }

    #[test]
    fn test_render_preserves_order() {
        plain();
        let a = Task::new(2, "second", "", now());
        let b = Task::new(1, "first", "", now());
        let out = render(&[&a, &b], FilterMode::All, now());
        let second = out.find("second").unwrap();
        let first = out.find("first").unwrap();
        assert!(second < first);
        assert!(out.starts_with("[All]  Active  Completed"));
    }

    #[test]
    fn test_format_created_fallback() {
        let mut task = Task::new(1, "x", "", now());
        task.created_at = "yesterday".to_string();
        assert_eq!(format_created(&task), "yesterday");
    }

    #[test]
    fn test_prompt_confirm_answers() {
        for (input, expected) in [("y\n", true), ("YES\n", true), (" yes \n", true), ("n\n", false), ("\n", false), ("", false)] {
            let mut output = Vec::new();
            let mut confirm = PromptConfirm::new(Cursor::new(input), &mut output);
            assert_eq!(confirm.confirm("Delete?"), expected, "input {:?}", input);
            assert_eq!(String::from_utf8(output).unwrap(), "Delete? [y/N] ");
        }
    }
}
