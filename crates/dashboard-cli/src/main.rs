mod commands;

use clap::{Parser, Subcommand};
use dashboard::Dashboard;
use shared::{init_tracing, Config};
use tracing::info;

/// チーム管理ダッシュボードの端末クライアント
#[derive(Parser, Debug)]
#[command(name = "team-dashboard", about = "Team management dashboard client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in. Without --remember the session ends with this process.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Keep the credential in the durable store.
        #[arg(long)]
        remember: bool,
    },

    /// Sign out and clear stored credentials.
    Logout,

    /// Show the current session.
    Whoami,

    /// Employee dashboard summary.
    Dashboard,

    /// My tasks.
    Tasks {
        #[command(subcommand)]
        action: Option<TaskAction>,
    },

    /// My profile.
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Administrator views.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    /// List tasks with statistics.
    List,
    /// Commit a progress value (0-100) for a task.
    Progress { id: i64, value: i64 },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long)]
        photo: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Totals and per-task progress.
    Overview,
    /// Team overview with search, filter and sort.
    Team {
        #[arg(long, default_value = "")]
        search: String,
        /// Department name, or "All".
        #[arg(long, default_value = "All")]
        department: String,
        /// "name" or "progress".
        #[arg(long, default_value = "name")]
        sort: String,
    },
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    Tasks {
        #[command(subcommand)]
        action: AdminTaskAction,
    },
}

#[derive(Subcommand, Debug)]
enum EmployeeAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        photo: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        photo: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AdminTaskAction {
    /// Board grouped by status.
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Employee id or name.
        #[arg(long)]
        assignee: String,
        /// YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "in_progress")]
        status: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        status: String,
        #[arg(long)]
        progress: i64,
    },
    Delete {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(config.log_format).map_err(|e| anyhow::anyhow!(e))?;
    info!(environment = %config.environment, "team-dashboard を起動します");

    let app = Dashboard::from_config(config)?;
    app.restore();

    match cli.command {
        Commands::Login {
            email,
            password,
            remember,
        } => commands::login(&app, email, password, remember).await,
        Commands::Logout => {
            app.logout();
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => commands::whoami(&app),
        Commands::Dashboard => commands::user_dashboard(&app).await,
        Commands::Tasks { action } => match action.unwrap_or(TaskAction::List) {
            TaskAction::List => commands::list_my_tasks(&app).await,
            TaskAction::Progress { id, value } => commands::commit_progress(&app, id, value).await,
        },
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => commands::show_profile(&app).await,
            ProfileAction::Update {
                name,
                email,
                department,
                photo,
            } => commands::update_profile(&app, name, email, department, photo).await,
        },
        Commands::Admin { action } => match action {
            AdminAction::Overview => commands::progress_overview(&app).await,
            AdminAction::Team {
                search,
                department,
                sort,
            } => commands::team_overview(&app, search, department, &sort).await,
            AdminAction::Employees { action } => match action {
                EmployeeAction::List => commands::list_employees(&app).await,
                EmployeeAction::Add {
                    name,
                    department,
                    email,
                    password,
                    photo,
                } => {
                    let employee = domain::NewEmployee {
                        name,
                        department,
                        email,
                        password,
                        photo,
                    };
                    commands::add_employee(&app, employee).await
                }
                EmployeeAction::Update {
                    id,
                    name,
                    department,
                    photo,
                } => {
                    let update = domain::EmployeeUpdate {
                        name,
                        department,
                        photo,
                    };
                    commands::update_employee(&app, id, update).await
                }
                EmployeeAction::Delete { id, yes } => commands::delete_employee(&app, id, yes).await,
            },
            AdminAction::Tasks { action } => match action {
                AdminTaskAction::List => commands::task_board(&app).await,
                AdminTaskAction::Add {
                    name,
                    description,
                    assignee,
                    due,
                    priority,
                    status,
                } => {
                    let task = domain::NewTask {
                        task_name: name,
                        description,
                        assigned_employee: domain::Assignee::parse(&assignee),
                        due_date: due.parse()?,
                        priority: priority.parse()?,
                        status: status.parse()?,
                    };
                    commands::add_task(&app, task).await
                }
                AdminTaskAction::Update {
                    id,
                    status,
                    progress,
                } => commands::update_task(&app, id, status.parse()?, progress).await,
                AdminTaskAction::Delete { id, yes } => commands::delete_task(&app, id, yes).await,
            },
        },
    }
}
