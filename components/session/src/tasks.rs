use task_runner::{interval_fn_task, TaskRunner};

use crate::SessionManager;

/// Attaches the periodic revalidation loop to `runner`. Stopping the runner
/// cancels the timer, so no revalidation can fire against a torn-down scope.
pub fn add_session_tasks(manager: &SessionManager, runner: &TaskRunner) {
    runner.add(
        "session_revalidate",
        interval_fn_task(manager.clone(), manager.revalidate_interval, |_, manager| {
            let manager = manager.clone();
            async move {
                manager.tick().await;
            }
        }),
    );
}
