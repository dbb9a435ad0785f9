//! In-memory task board: a fixed task list grouped by status into four fixed
//! columns. No persistence, no storage calls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ready,
    Working,
    Done,
    Stuck,
}

impl TaskStatus {
    /// Column order on the board; every column is present even when empty.
    pub const COLUMNS: [TaskStatus; 4] = [
        TaskStatus::Ready,
        TaskStatus::Working,
        TaskStatus::Done,
        TaskStatus::Stuck,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Ready => "Pronto para Subir",
            TaskStatus::Working => "Trabalhando",
            TaskStatus::Done => "Pronto",
            TaskStatus::Stuck => "Travado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Assignee initials.
    pub assignee: String,
    pub due_date: String,
    pub project: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub label: &'static str,
    pub tasks: Vec<Task>,
}

/// The agency's fixed task list.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".to_string(),
            title: "Campanha Facebook - CMYK".to_string(),
            status: TaskStatus::Working,
            priority: TaskPriority::High,
            assignee: "RO".to_string(),
            due_date: "2025-01-15".to_string(),
            project: "Tráfego Shows: CMYK".to_string(),
        },
        Task {
            id: "2".to_string(),
            title: "Relatório Mensal - Cliente XYZ".to_string(),
            status: TaskStatus::Ready,
            priority: TaskPriority::Medium,
            assignee: "JS".to_string(),
            due_date: "2025-01-20".to_string(),
            project: "Relatórios".to_string(),
        },
        Task {
            id: "3".to_string(),
            title: "Setup Google Ads - Novo Cliente".to_string(),
            status: TaskStatus::Done,
            priority: TaskPriority::High,
            assignee: "MK".to_string(),
            due_date: "2025-01-10".to_string(),
            project: "Tráfego Shows: Novo".to_string(),
        },
        Task {
            id: "4".to_string(),
            title: "Análise de Performance Q4".to_string(),
            status: TaskStatus::Stuck,
            priority: TaskPriority::Low,
            assignee: "AL".to_string(),
            due_date: "2025-01-25".to_string(),
            project: "Análises".to_string(),
        },
    ]
}

/// Group tasks into the four fixed columns, preserving column order and task
/// order within each column.
pub fn board(tasks: Vec<Task>) -> Vec<BoardColumn> {
    TaskStatus::COLUMNS
        .iter()
        .map(|&status| BoardColumn {
            status,
            label: status.label(),
            tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
        })
        .collect()
}
