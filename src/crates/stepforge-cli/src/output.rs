//! Terminal rendering for CLI results

use stepforge_core::{Artifact, Event, Step, StepStatus};
use stepforge_engine::{ApplyReport, PreviewReport};
use stepforge_tools::Preview;

fn status_marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => " ",
        StepStatus::Done => "+",
        StepStatus::Skipped => "·",
        StepStatus::Error => "!",
    }
}

pub fn print_steps(steps: &[Step]) {
    if steps.is_empty() {
        println!("no steps planned");
        return;
    }
    for step in steps {
        println!(
            "[{}] {:>3}  {:<28} {:<14} {}",
            status_marker(step.status),
            step.position,
            step.title,
            step.tool,
            step.status
        );
    }
}

pub fn print_preview(report: &PreviewReport) {
    match &report.preview {
        Preview::Diff { diff, files } => {
            for file in files {
                let marker = if file.existed_before { "modify" } else { "create" };
                println!("{marker}  {}", file.path);
            }
            if diff.is_empty() {
                println!("(no content changes)");
            } else {
                println!("{diff}");
            }
        }
        Preview::Command { rendered } => println!("{rendered}"),
    }
}

pub fn print_apply(report: &ApplyReport) {
    println!("applied step {}", report.step_id);
    println!("checkpoint: {}", report.checkpoint.archive_path.display());
    for artifact in &report.artifacts {
        println!("artifact: {}  sha256:{}", artifact.path, short_hash(&artifact.hash));
    }
    if let Some(process) = &report.outcome.process {
        if let Some(code) = process.exit_code {
            println!("exit code: {code}");
        }
        if process.timed_out {
            println!("(timed out)");
        }
        if !process.stdout.is_empty() {
            println!("{}", process.stdout.trim_end());
        }
        if !process.stderr.is_empty() {
            eprintln!("{}", process.stderr.trim_end());
        }
    }
}

pub fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("no events recorded");
        return;
    }
    for event in events {
        let step = event
            .step_id
            .map(|id| format!(" step={id}"))
            .unwrap_or_default();
        println!(
            "{}  {:?}{}  {}",
            event.at.format("%Y-%m-%d %H:%M:%S"),
            event.kind,
            step,
            event.payload
        );
    }
}

pub fn print_artifacts(artifacts: &[Artifact]) {
    for artifact in artifacts {
        println!(
            "{:?}  {}  sha256:{}",
            artifact.kind,
            artifact.path,
            short_hash(&artifact.hash)
        );
    }
}

fn short_hash(hash: &str) -> &str {
    if hash.len() > 12 {
        &hash[..12]
    } else {
        hash
    }
}
