// View-mode filtering over the task sequence

use crate::task::Task;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which tasks a listing shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,    // not completed
    Completed, // completed
}

impl FilterMode {
    /// Modes in selector order
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    /// Project `tasks` onto the ones this mode shows, keeping their order
    pub fn apply(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }

    /// Capitalized label for the selector
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::All => write!(f, "all"),
            FilterMode::Active => write!(f, "active"),
            FilterMode::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for FilterMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            other => Err(eyre!("Unknown filter mode: {} (expected all, active or completed)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Task> {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut tasks = vec![
            Task::new(4, "four", "", now),
            Task::new(3, "three", "", now),
            Task::new(2, "two", "", now),
            Task::new(1, "one", "", now),
        ];
        tasks[1].completed = true;
        tasks[3].completed = true;
        tasks
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_filter_all_is_identity() {
        let tasks = sample();
        let all = FilterMode::All.apply(&tasks);
        assert_eq!(ids(&all), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_filter_partitions() {
        let tasks = sample();
        let active = FilterMode::Active.apply(&tasks);
        let completed = FilterMode::Completed.apply(&tasks);

        assert_eq!(ids(&active), vec![4, 2]);
        assert_eq!(ids(&completed), vec![3, 1]);
        assert!(active.iter().all(|t| !t.completed));
        assert!(completed.iter().all(|t| t.completed));

        // Disjoint and exhaustive
        assert_eq!(active.len() + completed.len(), tasks.len());
        assert!(active.iter().all(|a| completed.iter().all(|c| a.id != c.id)));
    }

    #[test]
    fn test_filter_empty() {
        for mode in FilterMode::ALL {
            assert!(mode.apply(&[]).is_empty());
        }
    }

    #[test]
    fn test_filter_mode_display_and_parse() {
        for mode in FilterMode::ALL {
            assert_eq!(mode.to_string().parse::<FilterMode>().unwrap(), mode);
        }
        assert_eq!("Active".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert!("done".parse::<FilterMode>().is_err());
    }

    #[test]
    fn test_filter_mode_serialization() {
        let json = serde_json::to_string(&FilterMode::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(FilterMode::Completed.label(), "Completed");
    }
}
