use anyhow::{anyhow, bail};
use dashboard::{
    format_date, format_task_name, Confirmation, Dashboard, Route, TeamQuery, TASK_LABEL_MAX,
};
use domain::{
    EmployeeId, EmployeeUpdate, LoginForm, NewEmployee, NewTask, ProfileUpdate, Progress, TaskId,
    TaskStatus, TaskStatusUpdate,
};
use shared::{ClientError, Surface};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// 画面表示用のエラーに変換
fn present(error: ClientError) -> anyhow::Error {
    if error.surface() == Surface::ForcedLogout {
        warn!("セッションが失効しました");
    }
    anyhow!(error.user_message())
}

/// ルートガードを通過できなければエラー
fn guard(app: &Dashboard, route: Route) -> anyhow::Result<()> {
    match app.router().resolve(route) {
        resolved if resolved == route => Ok(()),
        Route::Login => bail!("Not signed in. Run `team-dashboard login` first."),
        _ => bail!("Administrator access required."),
    }
}

/// 標準入力で確認を取る
struct Prompt {
    assume_yes: bool,
}

impl Confirmation for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

pub async fn login(
    app: &Dashboard,
    email: String,
    password: String,
    remember: bool,
) -> anyhow::Result<()> {
    if app.router().state().is_authenticated() {
        app.logout();
    }
    let form = LoginForm::new(email, password, remember);
    let route = app.login_flow().submit(&form).await.map_err(present)?;
    println!("Signed in. Landing page: {route}");
    Ok(())
}

pub fn whoami(app: &Dashboard) -> anyhow::Result<()> {
    let state = app.router().state();
    match app.credentials().user_info() {
        Some(user) if state.is_authenticated() => {
            println!("{} <{}> ({state})", user.name, user.email);
        }
        _ => println!("{state}"),
    }
    Ok(())
}

pub async fn user_dashboard(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::Home)?;
    let summary = app.user_dashboard().await.map_err(present)?;
    println!("Total tasks:  {}", summary.total_tasks);
    println!("Completed:    {}", summary.completed_tasks);
    println!("In progress:  {}", summary.in_progress_tasks);
    println!("Pending:      {}", summary.pending_tasks);
    println!("Overdue:      {}", summary.overdue_tasks);
    Ok(())
}

pub async fn list_my_tasks(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::MyTasks)?;
    let reconciler = app.reconciler();
    let tasks = reconciler.refresh().await.map_err(present)?;

    for task in &tasks {
        println!(
            "#{:<5} {:<24} {:<12} {:>4}  due {}",
            task.id,
            format_task_name(&task.task_name, TASK_LABEL_MAX),
            task.status.label(),
            task.progress_percentage,
            format_date(task.due_date),
        );
    }
    let stats = reconciler.statistics();
    println!(
        "{} tasks, {} completed, {} in progress, {} pending, {} delayed. Overall {}%",
        stats.total,
        stats.completed,
        stats.in_progress,
        stats.pending,
        stats.delayed,
        stats.overall_progress
    );
    Ok(())
}

pub async fn commit_progress(app: &Dashboard, id: i64, value: i64) -> anyhow::Result<()> {
    guard(app, Route::MyTasks)?;
    let reconciler = app.reconciler();
    reconciler.refresh().await.map_err(present)?;

    let stats = reconciler
        .commit(TaskId(id), value)
        .await
        .map_err(present)?;
    let committed = reconciler.committed(TaskId(id)).unwrap_or(Progress::ZERO);
    println!("Task #{id} is now at {committed}. Overall {}%", stats.overall_progress);
    if reconciler.is_stale() {
        println!("Saved, but the task list could not be reloaded. Run `team-dashboard tasks` to refresh.");
    }
    Ok(())
}

pub async fn show_profile(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::Profile)?;
    let profile = app.profile_editor().load().await.map_err(present)?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

pub async fn update_profile(
    app: &Dashboard,
    name: String,
    email: String,
    department: String,
    photo: Option<String>,
) -> anyhow::Result<()> {
    guard(app, Route::Profile)?;
    let update = ProfileUpdate {
        name,
        email,
        department,
        photo,
    };
    let user = app
        .profile_editor()
        .update(&update)
        .await
        .map_err(present)?;
    println!("Profile updated for {}", user.name);
    Ok(())
}

pub async fn progress_overview(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::AdminProgress)?;
    let report = app.progress_overview().load().await.map_err(present)?;

    let overview = &report.overview;
    println!("Employees: {}", overview.total_employees);
    println!("Tasks:     {}", overview.total_tasks);
    println!(
        "Completed: {}  In progress: {}  Overdue: {}",
        overview.task_statistics.completed,
        overview.task_statistics.in_progress,
        overview.task_statistics.overdue
    );
    println!("Overall progress: {}%", report.overall_progress());
    println!();
    for (row, label) in report.rows.iter().zip(report.chart_labels()) {
        println!(
            "{:<16} {:<24} {:<10} {:>4}",
            row.employee_name.as_deref().unwrap_or("-"),
            label,
            format_date(row.display_date()),
            row.progress_percentage,
        );
    }
    Ok(())
}

pub async fn team_overview(
    app: &Dashboard,
    search: String,
    department: String,
    sort: &str,
) -> anyhow::Result<()> {
    guard(app, Route::Team)?;
    let team = app.team_overview().await.map_err(present)?;
    let query = TeamQuery {
        search,
        department: Some(department).filter(|d| !d.eq_ignore_ascii_case("all")),
        sort: sort.parse().map_err(present)?,
    };

    let totals = team.totals();
    println!(
        "{} employees, {}/{} tasks completed, {} in progress, {} delayed. Team progress {}%",
        totals.employees,
        totals.completed,
        totals.tasks,
        totals.in_progress,
        totals.delayed,
        totals.overall_progress
    );
    for member in team.query(&query) {
        println!(
            "{:<20} {:<16} {:>2}/{:<2} {:>3}%",
            member.employee.name,
            member.employee.department,
            member.statistics.completed,
            member.statistics.total,
            member.progress()
        );
    }
    Ok(())
}

pub async fn list_employees(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::AdminEmployees)?;
    let employees = app.employee_directory().load().await.map_err(present)?;
    for employee in employees {
        println!(
            "#{:<5} {:<20} {:<16} {}",
            employee.id, employee.name, employee.department, employee.email
        );
    }
    Ok(())
}

pub async fn add_employee(app: &Dashboard, employee: NewEmployee) -> anyhow::Result<()> {
    guard(app, Route::AdminEmployees)?;
    let created = app
        .employee_directory()
        .create(&employee)
        .await
        .map_err(present)?;
    println!("Created employee #{} {}", created.id, created.name);
    Ok(())
}

pub async fn update_employee(
    app: &Dashboard,
    id: i64,
    update: EmployeeUpdate,
) -> anyhow::Result<()> {
    guard(app, Route::AdminEmployees)?;
    let updated = app
        .employee_directory()
        .update(EmployeeId(id), &update)
        .await
        .map_err(present)?;
    println!("Updated employee #{} {}", updated.id, updated.name);
    Ok(())
}

pub async fn delete_employee(app: &Dashboard, id: i64, yes: bool) -> anyhow::Result<()> {
    guard(app, Route::AdminEmployees)?;
    let deleted = app
        .employee_directory()
        .delete(EmployeeId(id), &Prompt { assume_yes: yes })
        .await
        .map_err(present)?;
    if deleted {
        println!("Deleted employee #{id}");
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

pub async fn task_board(app: &Dashboard) -> anyhow::Result<()> {
    guard(app, Route::AdminTasks)?;
    let board = app.task_board();
    board.load().await.map_err(present)?;

    for column in board.columns() {
        println!("== {} ({})", column.title, column.tasks.len());
        for task in column.tasks {
            let assignee = task
                .assigned_employee
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  #{:<5} {:<24} {:<12} {:>4}  due {}",
                task.id,
                format_task_name(&task.task_name, TASK_LABEL_MAX),
                assignee,
                task.progress_percentage,
                format_date(task.due_date)
            );
        }
    }
    Ok(())
}

pub async fn add_task(app: &Dashboard, task: NewTask) -> anyhow::Result<()> {
    guard(app, Route::AdminTasks)?;
    let created = app.task_board().create(&task).await.map_err(present)?;
    println!("Created task #{} {}", created.id, created.task_name);
    Ok(())
}

pub async fn update_task(
    app: &Dashboard,
    id: i64,
    status: TaskStatus,
    progress: i64,
) -> anyhow::Result<()> {
    guard(app, Route::AdminTasks)?;
    let update = TaskStatusUpdate {
        status,
        progress_percentage: Progress::clamped(progress),
    };
    app.task_board()
        .update(TaskId(id), update)
        .await
        .map_err(present)?;
    println!("Task #{id} set to {} at {}", status.label(), update.progress_percentage);
    Ok(())
}

pub async fn delete_task(app: &Dashboard, id: i64, yes: bool) -> anyhow::Result<()> {
    guard(app, Route::AdminTasks)?;
    let deleted = app
        .task_board()
        .delete(TaskId(id), &Prompt { assume_yes: yes })
        .await
        .map_err(present)?;
    if deleted {
        println!("Deleted task #{id}");
    } else {
        println!("Cancelled.");
    }
    Ok(())
}
