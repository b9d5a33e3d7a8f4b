use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub done: bool,
}

/// Ordered checklist; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskList {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks not yet checked off.
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }

    pub fn get(&self, idx: usize) -> Option<&Task> {
        self.tasks.get(idx)
    }

    /// Append a task. Blank text is ignored; returns the new id otherwise.
    pub fn add(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.fresh_id();
        self.tasks.push(Task {
            id: id.clone(),
            text: text.to_string(),
            done: false,
        });
        Some(id)
    }

    /// Flip `done` on the matching task. Returns false for an unknown id.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.done = !task.done;
                true
            }
            None => false,
        }
    }

    fn fresh_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        loop {
            let id = format!("{millis}-{:04x}", rng.gen::<u16>());
            if !self.tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_undone_task() {
        let mut list = TaskList::default();
        let id = list.add("Read ch.3").unwrap();
        assert_eq!(list.len(), 1);
        let task = &list.tasks()[0];
        assert_eq!(task.id, id);
        assert_eq!(task.text, "Read ch.3");
        assert!(!task.done);
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut list = TaskList::default();
        assert_eq!(list.add(""), None);
        assert_eq!(list.add("   \t"), None);
        assert!(list.is_empty());
    }

    #[test]
    fn add_keeps_text_as_typed() {
        let mut list = TaskList::default();
        list.add("  padded ");
        assert_eq!(list.tasks()[0].text, "  padded ");
    }

    #[test]
    fn toggle_flips_done() {
        let mut list = TaskList::default();
        let id = list.add("Read ch.3").unwrap();
        assert!(list.toggle(&id));
        assert!(list.tasks()[0].done);
        assert!(list.toggle(&id));
        assert!(!list.tasks()[0].done);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut list = TaskList::default();
        list.add("Read ch.3");
        let before = list.clone();
        assert!(!list.toggle("nope"));
        assert_eq!(list, before);
    }

    #[test]
    fn ids_are_unique_and_order_is_kept() {
        let mut list = TaskList::default();
        for i in 0..200 {
            list.add(&format!("task {i}"));
        }
        let mut ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(list.tasks()[0].text, "task 0");
        assert_eq!(list.tasks()[199].text, "task 199");
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn remaining_counts_open_tasks() {
        let mut list = TaskList::default();
        let a = list.add("a").unwrap();
        list.add("b");
        list.toggle(&a);
        assert_eq!(list.remaining(), 1);
    }
}
