use domain::{completion_percentage, Employee, Task, TaskStatistics, TaskStatus};
use infrastructure::AdminApi;
use shared::ClientError;
use std::cmp::Ordering;
use std::str::FromStr;

/// チーム一覧の並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamSort {
    #[default]
    Name,
    /// 完了率の高い順
    Progress,
}

impl FromStr for TeamSort {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(TeamSort::Name),
            "progress" => Ok(TeamSort::Progress),
            other => Err(ClientError::Configuration(format!("Unknown sort key: {other}"))),
        }
    }
}

/// 検索条件
#[derive(Debug, Clone, Default)]
pub struct TeamQuery {
    /// 氏名・部署の部分一致（大文字小文字を区別しない）
    pub search: String,
    /// `None` は全部署
    pub department: Option<String>,
    pub sort: TeamSort,
}

/// 従業員ごとの集計
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSummary {
    pub employee: Employee,
    pub tasks: Vec<Task>,
    pub statistics: TaskStatistics,
}

impl MemberSummary {
    pub fn progress(&self) -> u8 {
        self.statistics.overall_progress
    }

    fn completion_ratio(&self) -> f64 {
        if self.statistics.total == 0 {
            return 0.0;
        }
        self.statistics.completed as f64 / self.statistics.total as f64
    }

    fn matches(&self, query: &TeamQuery) -> bool {
        let search = query.search.trim().to_lowercase();
        let matches_search = search.is_empty()
            || self.employee.name.to_lowercase().contains(&search)
            || self.employee.department.to_lowercase().contains(&search);
        let matches_department = query
            .department
            .as_deref()
            .map_or(true, |department| self.employee.department == department);
        matches_search && matches_department
    }
}

/// チーム全体の合計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamTotals {
    pub employees: usize,
    pub tasks: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub delayed: usize,
    pub overall_progress: u8,
}

/// チーム概要
///
/// 従業員一覧とタスク一覧から導出し、担当者のIDまたは氏名でタスクを対応付ける。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamOverview {
    members: Vec<MemberSummary>,
}

impl TeamOverview {
    pub fn build(employees: Vec<Employee>, tasks: &[Task]) -> Self {
        let members = employees
            .into_iter()
            .map(|employee| {
                let assigned: Vec<Task> = tasks
                    .iter()
                    .filter(|task| {
                        task.assigned_employee.as_ref().is_some_and(|assignee| {
                            assignee.matches(employee.id.value(), &employee.name)
                        })
                    })
                    .cloned()
                    .collect();
                MemberSummary {
                    statistics: TaskStatistics::from_tasks(&assigned),
                    tasks: assigned,
                    employee,
                }
            })
            .collect();
        Self { members }
    }

    pub async fn load(api: &AdminApi) -> Result<Self, ClientError> {
        let (employees, tasks) = tokio::try_join!(api.employees(), api.tasks())?;
        Ok(Self::build(employees, &tasks))
    }

    pub fn members(&self) -> &[MemberSummary] {
        &self.members
    }

    pub fn query(&self, query: &TeamQuery) -> Vec<&MemberSummary> {
        let mut members: Vec<&MemberSummary> = self
            .members
            .iter()
            .filter(|member| member.matches(query))
            .collect();

        members.sort_by(|a, b| match query.sort {
            TeamSort::Name => compare_names(a, b),
            TeamSort::Progress => b
                .completion_ratio()
                .partial_cmp(&a.completion_ratio())
                .unwrap_or(Ordering::Equal)
                .then_with(|| compare_names(a, b)),
        });
        members
    }

    pub fn departments(&self) -> Vec<String> {
        let mut departments: Vec<String> = self
            .members
            .iter()
            .map(|member| member.employee.department.clone())
            .filter(|department| !department.is_empty())
            .collect();
        departments.sort();
        departments.dedup();
        departments
    }

    pub fn totals(&self) -> TeamTotals {
        let mut totals = TeamTotals {
            employees: self.members.len(),
            ..Default::default()
        };
        for member in &self.members {
            totals.tasks += member.statistics.total;
            totals.completed += member.statistics.completed;
            totals.in_progress += member.statistics.count(TaskStatus::InProgress);
            totals.delayed += member.statistics.count(TaskStatus::Delayed);
        }
        totals.overall_progress = completion_percentage(totals.completed, totals.tasks);
        totals
    }
}

fn compare_names(a: &MemberSummary, b: &MemberSummary) -> Ordering {
    a.employee
        .name
        .to_lowercase()
        .cmp(&b.employee.name.to_lowercase())
}
