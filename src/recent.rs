use crate::store::RecentTaskStore;

pub const MAX_RECENT_TASKS: usize = 10;

/// Most-recent-first task names, de-duplicated and capped.
pub struct RecentTasks {
    tasks: Vec<String>,
    store: Box<dyn RecentTaskStore>,
}

impl RecentTasks {
    pub fn load(store: Box<dyn RecentTaskStore>) -> Self {
        let mut recent = Self {
            tasks: Vec::new(),
            store,
        };
        match recent.store.load() {
            Ok(tasks) => {
                // replay oldest first so the cap and de-dup rules hold even
                // for a hand-edited file
                for task in tasks.iter().rev() {
                    recent.insert(task);
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not load recent tasks"),
        }
        recent
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn push(&mut self, task: &str) {
        if !self.insert(task) {
            return;
        }
        if let Err(e) = self.store.save(&self.tasks) {
            tracing::warn!(error = %e, "could not persist recent tasks");
        }
    }

    fn insert(&mut self, task: &str) -> bool {
        let task = task.trim();
        if task.is_empty() {
            return false;
        }
        self.tasks.retain(|t| t != task);
        self.tasks.insert(0, task.to_string());
        self.tasks.truncate(MAX_RECENT_TASKS);
        true
    }
}
