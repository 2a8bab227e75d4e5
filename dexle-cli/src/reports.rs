use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use dexle_game::{CatalogReport, DailyView, Entity, GuessOutcome, GuessSession, Outcome, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable, colored output
    Console,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyReport<'a> {
    date: String,
    reroll_count: u32,
    recent_answer_ids: &'a [u32],
    durable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a Entity>,
}

pub fn write_daily(
    out: &mut dyn Write,
    format: ReportFormat,
    view: &DailyView,
    reveal: bool,
) -> Result<()> {
    let report = DailyReport {
        date: view.state.date.to_string(),
        reroll_count: view.state.reroll_count,
        recent_answer_ids: view.state.recent_answer_ids.ids(),
        durable: view.durable,
        answer: reveal.then_some(&view.answer),
    };
    if format == ReportFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "{} {}", "📅 Daily creature for".bright_cyan().bold(), report.date.bold())?;
    match report.answer {
        Some(answer) => writeln!(out, "   Answer: {}", describe(answer))?,
        None => writeln!(out, "   Answer: {}", "hidden (pass --reveal)".dimmed())?,
    }
    writeln!(out, "   Rerolls today: {}", report.reroll_count)?;
    if reveal {
        let recent: Vec<String> = report.recent_answer_ids.iter().map(u32::to_string).collect();
        writeln!(out, "   Recent answers: {}", recent.join(", "))?;
    }
    if !report.durable {
        writeln!(
            out,
            "   {}",
            "⚠️  record could not be saved; other clients may see a different answer".yellow()
        )?;
    }
    Ok(())
}

pub fn write_guess(out: &mut dyn Write, format: ReportFormat, outcome: &GuessOutcome) -> Result<()> {
    if format == ReportFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(outcome)?)?;
        return Ok(());
    }
    write_guess_row(out, &outcome.guess.entity, &outcome.guess.verdict)?;
    if outcome.won {
        let plural = if outcome.attempts == 1 { "" } else { "s" };
        writeln!(
            out,
            "{}",
            format!(
                "🎉 Correct! Solved in {} attempt{plural}. Come back tomorrow for a new creature.",
                outcome.attempts
            )
            .green()
            .bold()
        )?;
    } else {
        writeln!(
            out,
            "   {} of 5 attributes match · attempt {}",
            outcome.guess.verdict.correct_count(),
            outcome.attempts
        )?;
    }
    if !outcome.durable {
        writeln!(out, "   {}", "⚠️  guess could not be saved".yellow())?;
    }
    Ok(())
}

pub fn write_history(out: &mut dyn Write, format: ReportFormat, session: &GuessSession) -> Result<()> {
    if format == ReportFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(session)?)?;
        return Ok(());
    }
    writeln!(
        out,
        "{} {} ({})",
        "🗒️  Guesses for".bright_cyan().bold(),
        session.date.to_string().bold(),
        session.attempts()
    )?;
    if session.guesses.is_empty() {
        writeln!(out, "   No guesses yet.")?;
    }
    for guess in session.newest_first() {
        write_guess_row(out, &guess.entity, &guess.verdict)?;
    }
    if session.won {
        writeln!(out, "{}", "🏆 Solved! Come back tomorrow.".green().bold())?;
    }
    Ok(())
}

pub fn write_suggestions(out: &mut dyn Write, format: ReportFormat, hits: &[&Entity]) -> Result<()> {
    if format == ReportFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(hits)?)?;
        return Ok(());
    }
    if hits.is_empty() {
        writeln!(out, "No creature found with that prefix.")?;
    }
    for entity in hits {
        let region = entity
            .region()
            .map_or_else(String::new, |r| format!("{r} • "));
        let tags: Vec<String> = entity.types.iter().map(|t| capitalize_first(t)).collect();
        writeln!(
            out,
            "  {} {}",
            capitalize_first(&entity.name).bold(),
            format!("{region}{}", tags.join(", ")).dimmed()
        )?;
    }
    Ok(())
}

pub fn write_catalog_report(
    out: &mut dyn Write,
    format: ReportFormat,
    path: &Path,
    report: &CatalogReport,
) -> Result<()> {
    if format == ReportFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }
    writeln!(out, "{} {}", "✅ Valid catalog".green().bold(), path.display())?;
    writeln!(out, "   Creatures: {}", report.entity_count)?;
    writeln!(out, "   Dual-typed: {}", report.dual_tagged)?;
    writeln!(out, "   Highest id: {}", report.highest_id)?;
    if let Some(first) = &report.first {
        writeln!(out, "   First entry: {}", capitalize_first(first))?;
    }
    let generations: Vec<String> = report
        .generations
        .iter()
        .map(|(generation, count)| format!("{generation}:{count}"))
        .collect();
    writeln!(out, "   Generations: {}", generations.join(" "))?;
    let regions: Vec<String> = report
        .regions
        .iter()
        .map(|(region, count)| format!("{region}:{count}"))
        .collect();
    writeln!(out, "   Regions: {}", regions.join(" "))?;
    writeln!(out, "   Types: {}", report.tags.join(", "))?;
    Ok(())
}

fn write_guess_row(out: &mut dyn Write, entity: &Entity, verdict: &Verdict) -> Result<()> {
    let badge = if verdict.is_win() { " 🏆" } else { "" };
    writeln!(
        out,
        "{} #{}{badge}",
        capitalize_first(&entity.name).bold(),
        entity.id
    )?;
    let values = [
        entity.generation.to_string(),
        entity.primary_tag().map_or_else(|| "-".to_string(), capitalize_first),
        entity.secondary_tag().map_or_else(|| "-".to_string(), capitalize_first),
        format!("{}m", entity.height),
        format!("{}kg", entity.weight),
    ];
    let cells: Vec<String> = verdict
        .outcomes()
        .iter()
        .zip(values)
        .map(|((label, outcome), value)| {
            format!("{label} {}", paint(*outcome, &format!("{value} {}", outcome.symbol())))
        })
        .collect();
    writeln!(out, "   {}", cells.join(" | "))?;
    Ok(())
}

fn paint(outcome: Outcome, text: &str) -> ColoredString {
    match outcome {
        Outcome::Correct => text.green().bold(),
        Outcome::Higher | Outcome::Lower => text.yellow(),
        Outcome::Wrong => text.bright_black(),
    }
}

fn describe(entity: &Entity) -> String {
    let tags: Vec<String> = entity.types.iter().map(|t| capitalize_first(t)).collect();
    format!(
        "{} #{} · Gen {} · {} · {}m · {}kg",
        capitalize_first(&entity.name),
        entity.id,
        entity.generation,
        tags.join("/"),
        entity.height,
        entity.weight
    )
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
