use crate::gateway::{ApiGateway, RequestOptions};
use crate::models::{EmployeeEnvelope, LoginRequest, LoginResponse, TaskEnvelope};
use domain::{
    AdminOverview, Employee, EmployeeId, EmployeeUpdate, NewEmployee, NewTask, ProfileUpdate,
    Progress, ProgressRow, ProgressUpdate, Task, TaskId, TaskStatusUpdate, UserDashboard,
    UserInfo,
};
use shared::ClientError;
use std::sync::Arc;
use tracing::debug;

pub const LOGIN_ENDPOINT: &str = "/admin/login";

/// 認証エンドポイント
#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<ApiGateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// 資格情報を送信する。トークンは付与せず、401もそのままエラーとして返す
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let options = RequestOptions::post(&LoginRequest { email, password })?.anonymous();
        self.gateway.call(LOGIN_ENDPOINT, options).await
    }
}

/// 従業員向けエンドポイント
#[derive(Clone)]
pub struct UserApi {
    gateway: Arc<ApiGateway>,
}

impl UserApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn dashboard(&self) -> Result<UserDashboard, ClientError> {
        self.gateway.get("/user/dashboard").await
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, ClientError> {
        let tasks: Vec<Task> = self.gateway.get("/user/tasks").await?;
        debug!(count = tasks.len(), "タスク一覧を取得しました");
        Ok(tasks)
    }

    pub async fn task(&self, id: TaskId) -> Result<Task, ClientError> {
        self.gateway.get(&format!("/user/tasks/{id}")).await
    }

    pub async fn update_progress(&self, id: TaskId, progress: Progress) -> Result<(), ClientError> {
        let options = RequestOptions::put(&ProgressUpdate { progress })?;
        self.gateway
            .call_value(&format!("/user/tasks/{id}"), options)
            .await
            .map(|_| ())
    }

    pub async fn profile(&self) -> Result<UserInfo, ClientError> {
        self.gateway.get("/user/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ClientError> {
        self.gateway
            .call_value("/user/profile", RequestOptions::put(update)?)
            .await
            .map(|_| ())
    }
}

/// 管理者向けエンドポイント
#[derive(Clone)]
pub struct AdminApi {
    gateway: Arc<ApiGateway>,
}

impl AdminApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn dashboard(&self) -> Result<AdminOverview, ClientError> {
        self.gateway.get("/admin/dashboard").await
    }

    pub async fn progress(&self) -> Result<Vec<ProgressRow>, ClientError> {
        self.gateway.get("/admin/progress").await
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, ClientError> {
        self.gateway.get("/admin/employees").await
    }

    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ClientError> {
        let envelope: EmployeeEnvelope = self.gateway.post("/admin/employees", employee).await?;
        Ok(envelope.user)
    }

    /// 更新後の従業員を返す
    pub async fn update_employee(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, ClientError> {
        self.gateway
            .put(&format!("/admin/employees/{id}"), update)
            .await
    }

    pub async fn delete_employee(&self, id: EmployeeId) -> Result<(), ClientError> {
        self.gateway.delete(&format!("/admin/employees/{id}")).await
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.gateway.get("/admin/tasks").await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let envelope: TaskEnvelope = self.gateway.post("/admin/tasks", task).await?;
        Ok(envelope.task)
    }

    pub async fn update_task(
        &self,
        id: TaskId,
        update: &TaskStatusUpdate,
    ) -> Result<(), ClientError> {
        self.gateway
            .call_value(&format!("/admin/tasks/{id}"), RequestOptions::put(update)?)
            .await
            .map(|_| ())
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        self.gateway.delete(&format!("/admin/tasks/{id}")).await
    }
}
