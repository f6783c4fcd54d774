use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::SweepResult;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    results: &'a [SweepResult],
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[SweepResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Square Occupancy Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;

    for result in results {
        let status = if result.passed() {
            "✅".green()
        } else {
            "❌".red()
        };
        writeln!(
            out,
            "{} d{} → {}",
            status,
            result.sides,
            result.encoded.bold()
        )?;
        let convergence = if result.converged {
            "converged".green()
        } else {
            "fixed".normal()
        };
        writeln!(
            out,
            "   Turns: {} ({convergence}, last delta {:.2e})",
            result.turns_run, result.last_delta
        )?;
        for (rank, square) in result.top.iter().enumerate() {
            writeln!(
                out,
                "   {:>2}. {:02} {:<5} {:>8.4}%",
                rank + 1,
                square.index,
                square.label,
                square.probability * 100.0
            )?;
        }
        if let Some(check) = &result.cross_check {
            let verdict = if check.passed {
                "agrees".green()
            } else {
                "disagrees".red()
            };
            writeln!(
                out,
                "   Monte-Carlo ({} rounds, seed {}): {verdict}, max error {:.5} on square {:02}",
                check.rounds, check.seed, check.max_abs_error, check.worst_square
            )?;
        }
        writeln!(out, "   Matrix: {}  Time: {:?}", result.fingerprint, result.duration)?;
        writeln!(out)?;
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    writeln!(out, "Configurations: {}", results.len())?;
    writeln!(out, "Failed cross-checks: {}", failed.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[SweepResult]) -> Result<()> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[SweepResult],
) -> Result<()> {
    writeln!(out, "# Boardodds Square Occupancy\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "| Dice | Top squares | Turns | Converged | Cross-check |")?;
    writeln!(out, "|------|-------------|-------|-----------|-------------|")?;
    for result in results {
        let labels: Vec<_> = result
            .top
            .iter()
            .map(|square| format!("{} ({:.2}%)", square.label, square.probability * 100.0))
            .collect();
        let check = result.cross_check.as_ref().map_or_else(
            || String::from("—"),
            |check| {
                let mark = if check.passed { "✅" } else { "❌" };
                format!("{mark} max error {:.5}", check.max_abs_error)
            },
        );
        writeln!(
            out,
            "| d{} | `{}` {} | {} | {} | {} |",
            result.sides,
            result.encoded,
            labels.join(", "),
            result.turns_run,
            result.converged,
            check
        )?;
    }
    Ok(())
}
