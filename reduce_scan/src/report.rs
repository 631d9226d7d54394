use crate::harness::Timing;
use crate::task::Summary;
use std::fmt::Write;

/// Renders a finished task as a plain text table.
pub fn render(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (N = {})", summary.task, summary.size);
    let _ = writeln!(
        out,
        "{:<28} {:>8} {:>12} {:>12}",
        "variant", "valid", "avg ms", "Gelem/s"
    );

    for timing in &summary.timings {
        let valid = summary
            .outcomes
            .iter()
            .find(|(name, _)| *name == timing.label)
            .map_or("-", |(_, passed)| if *passed { "ok" } else { "FAILED" });
        row(&mut out, &timing.label, valid, timing);
    }
    // Variants that were validated but never timed.
    for (name, passed) in &summary.outcomes {
        if !summary.timings.iter().any(|t| t.label == *name) {
            let _ = writeln!(
                out,
                "{:<28} {:>8}",
                name,
                if *passed { "ok" } else { "FAILED" }
            );
        }
    }
    if let Some(cpu) = &summary.cpu {
        row(&mut out, &cpu.label, "", cpu);
    }
    out
}

fn row(out: &mut String, label: &str, valid: &str, timing: &Timing) {
    let _ = writeln!(
        out,
        "{:<28} {:>8} {:>12.4} {:>12.4}",
        label,
        valid,
        timing.avg_ms(),
        timing.throughput_gelems()
    );
}
