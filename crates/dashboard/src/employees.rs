use crate::confirm::{Confirmation, DELETE_EMPLOYEE_PROMPT};
use domain::{Employee, EmployeeId, EmployeeUpdate, NewEmployee};
use infrastructure::AdminApi;
use shared::ClientError;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// 従業員一覧の管理
pub struct EmployeeDirectory {
    api: AdminApi,
    employees: Mutex<Vec<Employee>>,
}

impl EmployeeDirectory {
    pub fn new(api: AdminApi) -> Self {
        Self {
            api,
            employees: Mutex::new(Vec::new()),
        }
    }

    fn with_employees<R>(&self, f: impl FnOnce(&mut Vec<Employee>) -> R) -> R {
        let mut employees = self.employees.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut employees)
    }

    pub async fn load(&self) -> Result<Vec<Employee>, ClientError> {
        let employees = self.api.employees().await?;
        self.with_employees(|current| *current = employees.clone());
        Ok(employees)
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.with_employees(|current| current.clone())
    }

    pub fn departments(&self) -> Vec<String> {
        let mut departments: Vec<String> = self
            .employees()
            .into_iter()
            .map(|employee| employee.department)
            .filter(|department| !department.is_empty())
            .collect();
        departments.sort();
        departments.dedup();
        departments
    }

    pub async fn create(&self, employee: &NewEmployee) -> Result<Employee, ClientError> {
        employee.validate()?;

        let created = self.api.create_employee(employee).await?;
        self.with_employees(|current| current.push(created.clone()));
        info!(employee_id = %created.id, "従業員を登録しました");
        Ok(created)
    }

    /// 氏名・部署・写真を更新し、サーバーの応答で一覧を置き換える
    pub async fn update(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, ClientError> {
        update.validate()?;

        let updated = self.api.update_employee(id, update).await?;
        self.with_employees(|current| {
            if let Some(slot) = current.iter_mut().find(|employee| employee.id == id) {
                *slot = updated.clone();
            }
        });
        info!(employee_id = %id, "従業員を更新しました");
        Ok(updated)
    }

    /// 確認が得られた場合のみ削除する。削除したかどうかを返す
    pub async fn delete(
        &self,
        id: EmployeeId,
        confirmation: &dyn Confirmation,
    ) -> Result<bool, ClientError> {
        if !confirmation.confirm(DELETE_EMPLOYEE_PROMPT) {
            return Ok(false);
        }

        self.api.delete_employee(id).await?;
        self.with_employees(|current| current.retain(|employee| employee.id != id));
        info!(employee_id = %id, "従業員を削除しました");
        Ok(true)
    }
}
