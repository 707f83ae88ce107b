// replay.rs — Feed a recorded event stream through the tracker.
//
// Each line of the events file is one `GameEvent` as JSON. Blank lines and
// lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use anyhow::Context;
use gt_tracker::{GameEvent, UpdateReport};

use crate::context::{load_host, TrackerContext};

pub fn execute(ctx: &TrackerContext, host: &Path, events: &Path) -> anyhow::Result<()> {
    let events = read_events(events)?;
    let mut controller = ctx.controller(load_host(Some(host))?);

    let mut total = UpdateReport::default();
    for event in &events {
        // The host mirrors what the event says before tasks look at it.
        controller.updater_mut().host_mut().observe(event);
        let report = controller.on_event(event);
        total.evaluated += report.evaluated;
        total.changed.extend(report.changed);
        total.completed.extend(report.completed);
        total.goals_completed.extend(report.goals_completed);
    }
    controller.shut_down();

    println!(
        "Replayed {} event(s): {} evaluated, {} changed, {} completed, {} goal(s) completed",
        events.len(),
        total.evaluated,
        total.changed.len(),
        total.completed.len(),
        total.goals_completed.len()
    );
    Ok(())
}

fn read_events(path: &Path) -> anyhow::Result<Vec<GameEvent>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read events {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid event", path.display(), n + 1))
        })
        .collect()
}
