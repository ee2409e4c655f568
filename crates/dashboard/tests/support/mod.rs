#![allow(dead_code)]

use async_trait::async_trait;
use dashboard::Dashboard;
use infrastructure::{
    CredentialStore, HttpRequest, HttpResponse, HttpTransport, KeyValueStore, MemoryStore,
    TransportError,
};
use serde_json::{json, Value};
use shared::{Config, RememberPolicy};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://backend.test";
pub const ADMIN_EMAIL: &str = "admin@teknosoft.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const EMPLOYEE_EMAIL: &str = "sara@teknosoft.com";
pub const EMPLOYEE_PASSWORD: &str = "sara1234";

struct Account {
    email: String,
    password: String,
    token: String,
    user: Value,
    admin: bool,
}

struct InjectedFailure {
    method: String,
    path: String,
    status: u16,
    message: String,
}

struct BackendState {
    accounts: Vec<Account>,
    valid_tokens: HashSet<String>,
    tasks: Vec<Value>,
    employees: Vec<Value>,
    next_id: i64,
    failures: VecDeque<InjectedFailure>,
    offline: bool,
    requests: Vec<HttpRequest>,
}

/// REST バックエンドを模したインメモリのトランスポート
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        let accounts = vec![
            Account {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                token: "admin-token".to_string(),
                user: json!({"id": 1, "name": "Admin", "email": ADMIN_EMAIL}),
                admin: true,
            },
            Account {
                email: EMPLOYEE_EMAIL.to_string(),
                password: EMPLOYEE_PASSWORD.to_string(),
                token: "sara-token".to_string(),
                user: json!({
                    "id": 2,
                    "name": "Sara",
                    "email": EMPLOYEE_EMAIL,
                    "department": "Frontend"
                }),
                admin: false,
            },
        ];
        let tasks = vec![
            json!({"id": 7, "task_name": "Landing page redesign", "description": "Hero + pricing",
                   "status": "in_progress", "progress_percentage": 40, "due_date": "2026-11-01",
                   "assigned_employee": 2, "priority": "high"}),
            json!({"id": 8, "task_name": "API docs", "description": "Document v2",
                   "status": "pending", "progress_percentage": 0, "due_date": "2026-11-15",
                   "assigned_employee": 2, "priority": "medium"}),
            json!({"id": 9, "task_name": "Release notes", "description": "October release",
                   "status": "completed", "progress_percentage": "100",
                   "due_date": "2026-10-10T00:00:00.000Z", "assigned_employee": "Omar"}),
        ];
        let employees = vec![
            json!({"id": 2, "name": "Sara", "department": "Frontend", "email": EMPLOYEE_EMAIL}),
            json!({"id": 3, "name": "Omar", "department": "Backend", "email": "omar@teknosoft.com"}),
        ];

        Self {
            state: Mutex::new(BackendState {
                valid_tokens: accounts.iter().map(|a| a.token.clone()).collect(),
                accounts,
                tasks,
                employees,
                next_id: 100,
                failures: VecDeque::new(),
                offline: false,
                requests: Vec::new(),
            }),
        }
    }

    /// 次に一致するリクエストを指定したステータスで失敗させる
    pub fn fail_next(&self, method: &str, path: &str, status: u16, message: &str) {
        self.state.lock().unwrap().failures.push_back(InjectedFailure {
            method: method.to_string(),
            path: path.to_string(),
            status,
            message: message.to_string(),
        });
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// 発行済みトークンをすべて失効させる
    pub fn expire_tokens(&self) {
        self.state.lock().unwrap().valid_tokens.clear();
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn task(&self, id: i64) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.tasks.iter().find(|t| t["id"] == id).cloned()
    }

    /// 管理画面を経由せずにタスクを削除する
    pub fn remove_task(&self, id: i64) {
        self.state.lock().unwrap().tasks.retain(|t| t["id"] != id);
    }

    pub fn employee(&self, id: i64) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.employees.iter().find(|e| e["id"] == id).cloned()
    }
}

fn reply(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

fn status_for(progress: i64) -> &'static str {
    match progress {
        100 => "completed",
        0 => "pending",
        _ => "in_progress",
    }
}

impl BackendState {
    fn account_for(&self, request: &HttpRequest) -> Option<usize> {
        let token = request.header("authorization")?.strip_prefix("Bearer ")?;
        if !self.valid_tokens.contains(token) {
            return None;
        }
        self.accounts.iter().position(|a| a.token == token)
    }

    fn count(&self, status: &str) -> usize {
        self.tasks.iter().filter(|t| t["status"] == status).count()
    }

    fn route(&mut self, request: &HttpRequest, path: &str) -> Result<HttpResponse, TransportError> {
        let method = request.method.as_str();
        let body: Value = request
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap())
            .unwrap_or(Value::Null);

        if method == "POST" && path == "/admin/login" {
            let found = self.accounts.iter().find(|a| {
                body["email"] == a.email.as_str() && body["password"] == a.password.as_str()
            });
            return match found {
                Some(account) => reply(
                    200,
                    json!({"message": "Login successful.", "token": account.token, "user": account.user}),
                ),
                None => reply(401, json!({"message": "Invalid email or password."})),
            };
        }

        let Some(account) = self.account_for(request) else {
            return reply(401, json!({"message": "Unauthorized"}));
        };

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        // ロールを検証するバックエンドは従業員トークンでの管理者APIを401で拒否する
        if segments.first() == Some(&"admin") && !self.accounts[account].admin {
            return reply(401, json!({"message": "Admin only"}));
        }
        let id = segments.get(2).and_then(|s| s.parse::<i64>().ok());

        match (method, segments.as_slice()) {
            ("GET", ["user", "dashboard"]) => reply(
                200,
                json!({
                    "totalTasks": self.tasks.len(),
                    "completedTasks": self.count("completed"),
                    "inProgressTasks": self.count("in_progress"),
                    "pendingTasks": self.count("pending")
                }),
            ),
            ("GET", ["user", "tasks"]) | ("GET", ["admin", "tasks"]) => {
                reply(200, Value::Array(self.tasks.clone()))
            }
            ("GET", ["user", "tasks", _]) => {
                match self.tasks.iter().find(|t| t["id"].as_i64() == id) {
                    Some(task) => reply(200, task.clone()),
                    None => reply(404, json!({"message": "Task not found"})),
                }
            }
            ("PUT", ["user", "tasks", _]) => {
                let progress = body["progress"].as_i64().unwrap_or(0);
                match self.tasks.iter_mut().find(|t| t["id"].as_i64() == id) {
                    Some(task) => {
                        task["progress_percentage"] = json!(progress);
                        task["status"] = json!(status_for(progress));
                        reply(200, json!({"message": "Progress updated"}))
                    }
                    None => reply(404, json!({"message": "Task not found"})),
                }
            }
            ("GET", ["user", "profile"]) => reply(200, self.accounts[account].user.clone()),
            ("PUT", ["user", "profile"]) => {
                let user = &mut self.accounts[account].user;
                for key in ["name", "email", "department", "photo"] {
                    if !body[key].is_null() {
                        user[key] = body[key].clone();
                    }
                }
                reply(200, json!({"message": "Profile updated"}))
            }
            ("GET", ["admin", "dashboard"]) => reply(
                200,
                json!({
                    "totalEmployees": self.employees.len(),
                    "totalTasks": self.tasks.len(),
                    "taskStatistics": {
                        "completed": self.count("completed"),
                        "in_progress": self.count("in_progress"),
                        "overdue": self.count("delayed")
                    }
                }),
            ),
            ("GET", ["admin", "progress"]) => {
                let rows: Vec<Value> = self
                    .tasks
                    .iter()
                    .map(|t| {
                        json!({
                            "task_name": t["task_name"],
                            "progress_percentage": t["progress_percentage"],
                            "employee": "Sara",
                            "updated_at": "2026-10-18T09:00:00Z"
                        })
                    })
                    .collect();
                reply(200, Value::Array(rows))
            }
            ("GET", ["admin", "employees"]) => reply(200, Value::Array(self.employees.clone())),
            ("POST", ["admin", "employees"]) => {
                self.next_id += 1;
                let employee = json!({
                    "id": self.next_id,
                    "name": body["name"],
                    "department": body["department"],
                    "email": body["email"],
                    "photo": body["photo"]
                });
                self.employees.push(employee.clone());
                reply(201, json!({"message": "Employee created", "user": employee}))
            }
            ("PUT", ["admin", "employees", _]) => {
                match self.employees.iter_mut().find(|e| e["id"].as_i64() == id) {
                    Some(employee) => {
                        for key in ["name", "department", "photo"] {
                            employee[key] = body[key].clone();
                        }
                        reply(200, employee.clone())
                    }
                    None => reply(404, json!({"message": "Employee not found"})),
                }
            }
            ("DELETE", ["admin", "employees", _]) => {
                self.employees.retain(|e| e["id"].as_i64() != id);
                reply(200, json!({"message": "Employee deleted"}))
            }
            ("POST", ["admin", "tasks"]) => {
                self.next_id += 1;
                let task = json!({
                    "id": self.next_id,
                    "task_name": body["task_name"],
                    "description": body["description"],
                    "status": body["status"],
                    "due_date": body["due_date"],
                    "priority": body["priority"],
                    "assigned_employee": body["assigned_employee"]
                });
                self.tasks.push(task.clone());
                reply(201, json!({"message": "Task created", "task": task}))
            }
            ("PUT", ["admin", "tasks", _]) => {
                match self.tasks.iter_mut().find(|t| t["id"].as_i64() == id) {
                    Some(task) => {
                        task["status"] = body["status"].clone();
                        task["progress_percentage"] = body["progress_percentage"].clone();
                        reply(200, json!({"message": "Task updated"}))
                    }
                    None => reply(404, json!({"message": "Task not found"})),
                }
            }
            ("DELETE", ["admin", "tasks", _]) => {
                self.tasks.retain(|t| t["id"].as_i64() != id);
                reply(200, json!({"message": "Task deleted"}))
            }
            _ => reply(404, json!({"message": "Not found"})),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if state.offline {
            return Err(TransportError("connection refused".to_string()));
        }

        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_string();

        let injected = state
            .failures
            .iter()
            .position(|f| f.method == request.method.as_str() && f.path == path);
        if let Some(index) = injected {
            if let Some(failure) = state.failures.remove(index) {
                return reply(failure.status, json!({"message": failure.message}));
            }
        }

        state.route(&request, &path)
    }
}

/// テスト用の組み立て済みダッシュボード
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub durable: Arc<MemoryStore>,
    pub session: Arc<MemoryStore>,
    pub dashboard: Dashboard,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_stores(
            Arc::new(FakeBackend::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// 既存のストアとバックエンドで組み立て直す（アプリ再起動に相当）
    pub fn with_stores(
        backend: Arc<FakeBackend>,
        durable: Arc<MemoryStore>,
        session: Arc<MemoryStore>,
    ) -> Self {
        let config = Config {
            api_base_url: BASE_URL.to_string(),
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(
            durable.clone() as Arc<dyn KeyValueStore>,
            session.clone() as Arc<dyn KeyValueStore>,
            RememberPolicy::Consistent,
        ));
        let dashboard = Dashboard::new(config, backend.clone(), credentials);
        Self {
            backend,
            durable,
            session,
            dashboard,
        }
    }

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) {
        let form = domain::LoginForm::new(email, password, remember_me);
        self.dashboard.login_flow().submit(&form).await.unwrap();
    }
}
