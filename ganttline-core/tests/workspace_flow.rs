use chrono::NaiveDate;
use ganttline_core::{
    Error, MemoryStore, NewTask, Now, Project, ProjectPatch, Store, StoreError, Task, TaskPatch,
    TaskStatus, Workspace,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Accepts nothing. Every write fails, like an unreachable service.
#[derive(Debug, Default)]
struct DownStore {
    attempts: usize,
}

impl DownStore {
    fn fail(&mut self) -> Result<(), StoreError> {
        self.attempts += 1;
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

impl Store for DownStore {
    fn load(&self) -> Result<(Vec<Project>, Vec<Task>), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn insert_project(&mut self, _: &Project) -> Result<(), StoreError> {
        self.fail()
    }
    fn update_project(&mut self, _: &str, _: &ProjectPatch) -> Result<(), StoreError> {
        self.fail()
    }
    fn delete_project(&mut self, _: &str) -> Result<(), StoreError> {
        self.fail()
    }
    fn insert_task(&mut self, _: &Task) -> Result<(), StoreError> {
        self.fail()
    }
    fn update_task(&mut self, _: &str, _: &TaskPatch) -> Result<(), StoreError> {
        self.fail()
    }
    fn delete_task(&mut self, _: &str) -> Result<(), StoreError> {
        self.fail()
    }
    fn delete_tasks_for_project(&mut self, _: &str) -> Result<usize, StoreError> {
        self.fail().map(|_| 0)
    }
}

#[test]
fn failed_load_starts_empty() {
    let ws = Workspace::hydrate(DownStore::default());
    assert!(ws.projects().is_empty());
    assert!(ws.tasks().is_empty());
}

#[test]
fn failed_writes_keep_local_changes() {
    let mut ws = Workspace::new(DownStore::default());
    let now = Now::on(d(2024, 3, 8));

    let pid = ws.add_project("Intern Prep", None, now).unwrap();
    let tid = ws.add_task(&pid, NewTask::titled("MVP"), now).unwrap();
    ws.update_task(&tid, TaskPatch { progress: Some(50), ..Default::default() }).unwrap();

    let t = ws.task(&tid).unwrap();
    assert_eq!((t.progress, t.status), (50, TaskStatus::Doing));
    assert_eq!(ws.store().attempts, 3);

    // no retries, no rollback on cascade either
    assert_eq!(ws.delete_project(&pid).unwrap(), 1);
    assert!(ws.tasks().is_empty());
    assert_eq!(ws.store().attempts, 5);
}

#[test]
fn hydrate_round_trips_through_a_store() {
    let mut ws = Workspace::new(MemoryStore::new());
    let pid = ws.add_project("EECS 151", Some("#2563eb"), Now::on(d(2024, 3, 1))).unwrap();
    let now = Now::on(d(2024, 3, 4));
    let a = ws.add_task(&pid, NewTask::titled("Lab 5").lasting(3), now).unwrap();
    let b = ws.add_task(&pid, NewTask::titled("Lab 6"), now).unwrap();
    ws.update_task(&b, TaskPatch { status: Some(TaskStatus::Blocked), ..Default::default() })
        .unwrap();

    let again = Workspace::hydrate(ws.into_store());
    let tasks = again.project_tasks(&pid);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, a);
    assert_eq!((tasks[1].planned_start, tasks[1].planned_end), (d(2024, 3, 7), d(2024, 3, 8)));
    assert_eq!(tasks[1].status, TaskStatus::Blocked);
    assert_eq!(again.project(&pid).unwrap().color, "#2563eb");
}

#[test]
fn last_write_wins_between_two_editors() {
    let mut first = Workspace::new(MemoryStore::new());
    let pid = first.add_project("Shared", None, Now::on(d(2024, 3, 1))).unwrap();
    let tid = first.add_task(&pid, NewTask::titled("Report"), Now::on(d(2024, 3, 1))).unwrap();

    let mut second = Workspace::hydrate(first.store().clone());
    second.update_task(&tid, TaskPatch { progress: Some(80), ..Default::default() }).unwrap();
    first.update_task(&tid, TaskPatch { progress: Some(20), ..Default::default() }).unwrap();

    // each editor's store copy holds its own last write; nothing detects the conflict
    let mine = first.store().collections().tasks[0].progress;
    let theirs = second.store().collections().tasks[0].progress;
    assert_eq!((mine, theirs), (20, 80));
}

#[test]
fn planning_views_follow_mutations() {
    let mut ws = Workspace::new(MemoryStore::new());
    let pid = ws.add_project("Thesis", None, Now::on(d(2024, 3, 1))).unwrap();
    let now = Now::on(d(2024, 3, 11));

    let outline = ws.add_task(&pid, NewTask::titled("Outline"), now).unwrap();
    let mut pinned = NewTask::titled("Read papers").planned(d(2024, 3, 1), d(2024, 3, 20));
    pinned.pinned_to_today = true;
    ws.add_task(&pid, pinned, now).unwrap();

    let today: Vec<&str> = ws.today(now.today).iter().map(|i| i.task.title.as_str()).collect();
    assert_eq!(today, vec!["Outline", "Read papers"]);

    ws.update_task(&outline, TaskPatch { progress: Some(100), ..Default::default() }).unwrap();
    let summary = ws.project_summary(&pid, now.today).unwrap();
    assert_eq!((summary.total, summary.done), (2, 1));
    assert_eq!(summary.next.map(|t| t.title.as_str()), Some("Read papers"));
    assert_eq!(summary.days_to_next, Some(-10));

    let tl = ws.timeline(&pid, 20.0, now.today).unwrap();
    assert_eq!(tl.rows.len(), 2);
    assert!(matches!(ws.timeline("missing", 20.0, now.today), Err(Error::UnknownProject(_))));
}
