/// 破壊的操作の前に利用者の確認を求める
///
/// `false` を返した場合、呼び出し側はネットワーク呼び出しを一切行わない。
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const DELETE_EMPLOYEE_PROMPT: &str = "Are you sure you want to delete this employee?";
pub const DELETE_TASK_PROMPT: &str = "Delete this task?";
