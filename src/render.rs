use comfy_table::{presets::UTF8_FULL, Cell, Table};
use core_types::artifact::display_relative;
use core_types::{AgentSummary, ArtifactDescriptor, Resolution};
use query::{ReportHeader, ReportView, SymbolSlice};
use std::fmt::Write;
use std::path::Path;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn header_table(header: &ReportHeader, kind: &str) -> Table {
    let mut t = table(&["Field", "Value"]);
    t.add_row(vec!["Kind", kind]);
    t.add_row(vec![Cell::new("Report"), Cell::new(&header.report_id)]);
    t.add_row(vec![Cell::new("Id"), Cell::new(&header.id)]);
    t.add_row(vec![Cell::new("Generated"), Cell::new(header.generated_at.as_deref().unwrap_or("-"))]);
    t.add_row(vec![Cell::new("Duration (s)"), Cell::new(format!("{:.0}", header.duration_seconds))]);
    t.add_row(vec![Cell::new("Trades"), Cell::new(header.total_trades)]);
    t.add_row(vec![Cell::new("Volume"), Cell::new(format!("{:.2}", header.total_volume))]);
    t
}

fn ranking_table(agents: &[AgentSummary]) -> Table {
    let mut t = table(&["#", "Agent", "Return %", "Sharpe", "Max DD %", "Trades"]);
    for (rank, agent) in agents.iter().enumerate() {
        t.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&agent.agent_id),
            Cell::new(opt(agent.total_return_pct)),
            Cell::new(opt(agent.sharpe_ratio)),
            Cell::new(opt(agent.max_drawdown_pct)),
            Cell::new(agent.total_trades),
        ]);
    }
    t
}

fn slice_table(slice: &SymbolSlice) -> Table {
    let mut t = table(&["#", "Agent", "Final", "Max", "Min", "Trades"]);
    for (rank, agent) in slice.agents.iter().enumerate() {
        t.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&agent.agent_id),
            Cell::new(opt(agent.final_profit)),
            Cell::new(opt(agent.max_profit)),
            Cell::new(opt(agent.min_profit)),
            Cell::new(agent.trade_count.unwrap_or(0)),
        ]);
    }
    t
}

/// The dashboard report as terminal tables.
pub fn report_view(view: &ReportView) -> String {
    let mut out = String::new();
    match view {
        ReportView::Backtest { header, start_date, end_date, symbols, ranking } => {
            let _ = writeln!(out, "{}", header_table(header, "backtest"));
            if let (Some(start), Some(end)) = (start_date, end_date) {
                let _ = writeln!(out, "Range: {start} .. {end}  Symbols: {}", symbols.join(", "));
            }
            let _ = writeln!(out, "{}", ranking_table(ranking));
        }
        ReportView::Simulation { header, slices, .. } => {
            let _ = writeln!(out, "{}", header_table(header, "simulation"));
            for (symbol, slice) in slices {
                let last = slice.price_series.points.last().map(|p| p.price);
                let _ = writeln!(
                    out,
                    "\n{symbol}: {} price samples, last {}, {} trades",
                    slice.price_series.len(),
                    opt(last),
                    slice.trade_count
                );
                if !slice.agents.is_empty() {
                    let _ = writeln!(out, "{}", slice_table(slice));
                }
            }
        }
    }
    out
}

/// Candidate paths in search order, and how the artifact resolved.
pub fn descriptor(descriptor: &ArtifactDescriptor, base: &Path) -> String {
    let found = descriptor.found_path();
    let mut t = table(&["#", "Candidate", "Status"]);
    for (i, candidate) in descriptor.candidates.iter().enumerate() {
        let status = if Some(candidate.as_path()) == found { "found" } else { "" };
        t.add_row(vec![Cell::new(i + 1), Cell::new(display_relative(candidate, base)), Cell::new(status)]);
    }

    let outcome = match &descriptor.resolution {
        Resolution::Found { path, via } => format!("{} -> {} ({via:?})", descriptor.name, path.display()),
        Resolution::NotFound { searched } => {
            format!("{} not found ({} locations searched)", descriptor.name, searched.len())
        }
    };
    format!("{t}\n{outcome}")
}
