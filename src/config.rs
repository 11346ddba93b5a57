use std::time::Duration;

/// Controller tuning knobs.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Poll interval used while waiting on a task to reach a terminal state.
    pub wait_sleep: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            wait_sleep: Duration::from_millis(100),
        }
    }
}

impl ControllerConfig {
    pub fn with_wait_sleep(mut self, wait_sleep: Duration) -> Self {
        self.wait_sleep = wait_sleep;
        self
    }
}
