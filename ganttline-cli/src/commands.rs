use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use ganttline_core::{
    Bar, DriftKind, NewTask, Now, Snapshot, Store, Task, TaskPatch, TaskStatus, Timeline, Workspace,
    format_date, parse_date,
};
use tracing::info;

use crate::config::{Config, clamp_day_width};
use crate::file_store::FileStore;
use crate::state;

pub fn open_workspace() -> Result<Workspace<FileStore>> {
    let path = state::data_path()?;
    let store = FileStore::open(&path).with_context(|| format!("open {}", path.display()))?;
    Ok(Workspace::hydrate(store))
}

/// The current instant, with "today" taken from `--today` when given and from
/// the configured timezone otherwise.
pub fn resolve_now(cfg: &Config, today: Option<&str>) -> Result<Now> {
    let utc = Utc::now();
    match today {
        Some(s) => Ok(Now { utc, today: parse_date(s)? }),
        None => Now::new(utc, &cfg.clock.timezone)
            .with_context(|| format!("resolve today in {}", cfg.clock.timezone)),
    }
}

/// Accept a project id or a case-insensitive project name.
pub fn resolve_project<S: Store>(ws: &Workspace<S>, key: &str) -> Result<String> {
    match ws.find_project(key) {
        Some(p) => Ok(p.id.clone()),
        None => bail!("no project matches '{key}' (see: ganttline project list)"),
    }
}

fn parse_opt_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose().map_err(Into::into)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub fn project_add<S: Store>(
    ws: &mut Workspace<S>,
    cfg: &Config,
    name: &str,
    color: Option<&str>,
) -> Result<()> {
    let now = resolve_now(cfg, None)?;
    let color = color.unwrap_or(&cfg.projects.default_color);
    let id = ws.add_project(name, Some(color), now)?;
    println!("Added project {id}");
    Ok(())
}

pub fn project_rename<S: Store>(ws: &mut Workspace<S>, key: &str, name: &str) -> Result<()> {
    let id = resolve_project(ws, key)?;
    ws.rename_project(&id, name)?;
    println!("Renamed {id} to {}", name.trim());
    Ok(())
}

pub fn project_color<S: Store>(ws: &mut Workspace<S>, key: &str, color: &str) -> Result<()> {
    let id = resolve_project(ws, key)?;
    ws.recolor_project(&id, color)?;
    println!("Set color of {id} to {}", color.trim());
    Ok(())
}

pub fn project_delete<S: Store>(ws: &mut Workspace<S>, key: &str) -> Result<()> {
    let id = resolve_project(ws, key)?;
    let removed = ws.delete_project(&id)?;
    println!("Deleted project {id} and {removed} task(s)");
    Ok(())
}

pub fn project_list<S: Store>(ws: &Workspace<S>, cfg: &Config, today: Option<&str>) -> Result<()> {
    let now = resolve_now(cfg, today)?;
    if ws.projects().is_empty() {
        println!("No projects yet. Add one with: ganttline project add <name>");
        return Ok(());
    }

    for p in ws.projects() {
        let s = ws.project_summary(&p.id, now.today)?;
        let next = match (s.next, s.days_to_next) {
            (Some(t), Some(days)) => format!("next: {} ({})", t.title, relative_days(days)),
            _ => "next: none".to_string(),
        };
        println!(
            "{}  {}  {}  {}/{} done  {} blocked  {}",
            p.id, p.color, p.name, s.done, s.total, s.blocked, next
        );
    }
    Ok(())
}

fn relative_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d > 1 => format!("in {d} days"),
        d => format!("started {} day(s) ago", -d),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TaskAddArgs {
    pub title: String,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<i64>,
    pub progress: Option<i64>,
    pub wbs: Option<String>,
    pub auto_wbs: bool,
    pub pin: bool,
    pub order: Option<i64>,
    pub today: Option<String>,
}

pub fn task_add<S: Store>(
    ws: &mut Workspace<S>,
    cfg: &Config,
    project: &str,
    args: TaskAddArgs,
) -> Result<()> {
    let project_id = resolve_project(ws, project)?;
    let now = resolve_now(cfg, args.today.as_deref())?;

    let new = NewTask {
        title: args.title,
        description: args.description,
        planned_start: parse_opt_date(args.start.as_deref())?,
        planned_end: parse_opt_date(args.end.as_deref())?,
        duration_days: Some(args.duration.unwrap_or(cfg.timeline.default_duration_days)),
        progress: args.progress,
        pinned_to_today: args.pin,
        wbs: args.wbs,
        auto_wbs: args.auto_wbs,
        order: args.order,
    };
    let id = ws.add_task(&project_id, new, now)?;

    if let Some(t) = ws.task(&id) {
        println!(
            "Added task {id}: {} .. {} ({})",
            format_date(t.planned_start),
            format_date(t.planned_end),
            t.status
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdateArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub start: Option<String>,
    pub end: Option<String>,
    pub actual_start: Option<String>,
    pub actual_end: Option<String>,
    pub clear_actual: bool,
    pub progress: Option<i64>,
    pub status: Option<String>,
    pub pin: bool,
    pub unpin: bool,
    pub wbs: Option<String>,
    pub clear_wbs: bool,
    pub order: Option<i64>,
}

impl TaskUpdateArgs {
    pub fn into_patch(self) -> Result<TaskPatch> {
        if self.pin && self.unpin {
            bail!("--pin and --unpin are mutually exclusive");
        }

        let mut patch = TaskPatch {
            title: self.title,
            planned_start: parse_opt_date(self.start.as_deref())?,
            planned_end: parse_opt_date(self.end.as_deref())?,
            progress: self.progress,
            status: self.status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
            order: self.order,
            ..Default::default()
        };

        if self.clear_description {
            patch.description = Some(None);
        } else if let Some(desc) = self.description {
            patch.description = Some(Some(desc));
        }

        if self.clear_actual {
            patch.actual_start = Some(None);
            patch.actual_end = Some(None);
        } else {
            if let Some(start) = parse_opt_date(self.actual_start.as_deref())? {
                patch.actual_start = Some(Some(start));
            }
            if let Some(end) = parse_opt_date(self.actual_end.as_deref())? {
                patch.actual_end = Some(Some(end));
            }
        }

        if self.pin {
            patch.pinned_to_today = Some(true);
        } else if self.unpin {
            patch.pinned_to_today = Some(false);
        }

        if self.clear_wbs {
            patch.wbs = Some(None);
        } else if let Some(wbs) = self.wbs {
            patch.wbs = Some(Some(wbs));
        }

        Ok(patch)
    }
}

pub fn task_update<S: Store>(ws: &mut Workspace<S>, id: &str, args: TaskUpdateArgs) -> Result<()> {
    let patch = args.into_patch()?;
    if patch.is_empty() {
        bail!("nothing to update (pass at least one field flag)");
    }
    ws.update_task(id, patch)?;

    if let Some(t) = ws.task(id) {
        println!("Updated task {id}: {}% {}", t.progress, t.status);
    }
    Ok(())
}

pub fn task_delete<S: Store>(ws: &mut Workspace<S>, id: &str) -> Result<()> {
    ws.delete_task(id)?;
    println!("Deleted task {id}");
    Ok(())
}

pub fn task_list<S: Store>(ws: &Workspace<S>, project: &str) -> Result<()> {
    let project_id = resolve_project(ws, project)?;
    let tasks = ws.project_tasks(&project_id);
    if tasks.is_empty() {
        println!("No tasks yet.");
        return Ok(());
    }
    for t in tasks {
        println!("{}", task_line(t));
    }
    Ok(())
}

fn task_line(t: &Task) -> String {
    format!(
        "{}  {:<5} {:<8} {:>3}%  {} .. {}  {}{}",
        t.id,
        t.wbs.as_deref().unwrap_or("-"),
        t.status,
        t.progress,
        format_date(t.planned_start),
        format_date(t.planned_end),
        t.title,
        if t.pinned_to_today { "  [pinned]" } else { "" }
    )
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

pub fn timeline<S: Store>(
    ws: &Workspace<S>,
    cfg: &Config,
    project: &str,
    day_width: Option<f64>,
    today: Option<&str>,
) -> Result<()> {
    let project_id = resolve_project(ws, project)?;
    let now = resolve_now(cfg, today)?;
    let day_width = clamp_day_width(day_width.unwrap_or(cfg.timeline.day_width));

    let tl = ws.timeline(&project_id, day_width, now.today)?;
    info!(project = %project_id, rows = tl.rows.len(), days = tl.viewport.total_days, "timeline");
    print!("{}", render_timeline(&tl, now.today));
    Ok(())
}

/// Plain-text rendering: one character per day, planned days as '=', recorded
/// actual days as '#', today's column as '|'. The drift label is prefixed with
/// '!' when behind and '+' when ahead.
pub fn render_timeline(tl: &Timeline, today: NaiveDate) -> String {
    let vp = &tl.viewport;
    let mut out = format!(
        "{} .. {}  ({} days, {}px/day, width {}px, today at {}px)\n",
        format_date(vp.start),
        format_date(vp.end),
        vp.total_days,
        tl.day_width,
        vp.width_px(tl.day_width),
        tl.today_left_px
    );

    for row in &tl.rows {
        let strip: String = vp
            .days()
            .into_iter()
            .map(|day| {
                let px = (day - vp.start).num_days() as f64 * tl.day_width;
                let in_bar = |bar: &Bar| px >= bar.left_px && px < bar.left_px + bar.width_px;
                if row.actual_recorded && in_bar(&row.actual) {
                    '#'
                } else if in_bar(&row.planned) {
                    '='
                } else if day == today {
                    '|'
                } else {
                    '.'
                }
            })
            .collect();

        out.push_str(&format!(
            "{:<5} {:<28} {}  {}d/{}wd  {:>3}% vs {:>3}%  {}{}\n",
            row.wbs.as_deref().unwrap_or("-"),
            truncate(&row.title, 28),
            strip,
            row.duration_days,
            row.work_days,
            row.progress,
            row.expected,
            drift_marker(row.drift.kind()),
            row.drift
        ));
    }
    out
}

fn drift_marker(kind: DriftKind) -> char {
    match kind {
        DriftKind::Bad => '!',
        DriftKind::Good => '+',
        DriftKind::Ok => ' ',
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('~');
    t
}

pub fn today<S: Store>(ws: &Workspace<S>, cfg: &Config, today: Option<&str>) -> Result<()> {
    let now = resolve_now(cfg, today)?;
    let items = ws.today(now.today);
    println!("Today ({})", format_date(now.today));
    if items.is_empty() {
        println!("Nothing pinned, starting or ending today.");
        return Ok(());
    }
    for item in items {
        println!(
            "[{}] {} - {} ({} .. {})",
            item.task.status,
            item.project_name,
            item.task.title,
            format_date(item.task.planned_start),
            format_date(item.task.planned_end)
        );
    }
    Ok(())
}

pub fn snapshot<S: Store>(ws: &Workspace<S>) -> Result<()> {
    let snap = Snapshot::from_domain(ws.projects(), ws.tasks());
    println!("{}", serde_json::to_string_pretty(&snap).context("serialize snapshot")?);
    Ok(())
}
