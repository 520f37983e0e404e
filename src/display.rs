use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::format::in_big_blinds;
use crate::navigator::{AvailableAction, BreadcrumbItem, TreeStatistics};
use crate::settings::GameSettings;
use crate::spot::SpotRecord;
use crate::state::PotState;
use crate::storage::NodeStrategy;

pub fn action_style(label: &str) -> &'static str {
    let upper = label.to_uppercase();
    if upper.starts_with("RAISE") || upper.starts_with("ALL-IN") {
        "red"
    } else if upper.starts_with("CALL") {
        "green"
    } else if upper.starts_with("FOLD") {
        "dim"
    } else if upper.starts_with("CHECK") {
        "yellow"
    } else {
        "bold"
    }
}

pub fn styled_action(label: &str) -> String {
    match action_style(label) {
        "red" => label.red().bold().to_string(),
        "green" => label.green().bold().to_string(),
        "dim" => label.dimmed().bold().to_string(),
        "yellow" => label.yellow().bold().to_string(),
        _ => label.bold().to_string(),
    }
}

/// Render a breadcrumb trail: "Start > Raise 300K (P0) > Call 250K (P1)".
pub fn breadcrumb_trail(items: &[BreadcrumbItem]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item.action_taken {
            Some(_) => format!(
                "{} {}",
                styled_action(&item.label),
                format!("(P{})", item.acting_player).dimmed()
            ),
            None => item.label.bold().to_string(),
        })
        .collect();
    parts.join(&format!(" {} ", ">".dimmed()))
}

/// Frequency bar in the 0..1 range, colored by how often the action is
/// taken.
pub fn frequency_bar(freq: f64, width: usize) -> String {
    let filled = ((freq * width as f64) as usize).min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", freq * 100.0);

    if freq >= 0.5 {
        format!("{} {}", bar.green(), pct)
    } else if freq >= 0.15 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

pub fn actions_table(actions: &[AvailableAction]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Action".bold().to_string()),
        Cell::new("Amount").set_alignment(CellAlignment::Right),
        Cell::new("Target"),
    ]);
    for action in actions {
        table.add_row(vec![
            Cell::new(styled_action(&action.label)),
            Cell::new(
                action
                    .amount
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .set_alignment(CellAlignment::Right),
            Cell::new(&action.target_node),
        ]);
    }
    table.to_string()
}

pub fn statistics_table(stats: &TreeStatistics) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Total Nodes".bold().to_string()),
        Cell::new(stats.total_nodes.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Terminal Nodes".bold().to_string()),
        Cell::new(stats.terminal_nodes.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Max Depth".bold().to_string()),
        Cell::new(stats.max_depth.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Avg Branching".bold().to_string()),
        Cell::new(format!("{:.2}", stats.avg_branching_factor)),
    ]);
    table.add_row(vec![
        Cell::new("Max Branching".bold().to_string()),
        Cell::new(stats.max_branching_factor.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("With Hand Data".bold().to_string()),
        Cell::new(stats.nodes_with_hand_data.to_string()),
    ]);
    table.to_string()
}

/// Stack/pot table for one decision point. Amounts are shown in big-blind
/// units on this surface; the navigator's own labels use the
/// abbreviated-chip policy.
pub fn state_table(settings: &GameSettings, stacks: &[u64], pot: &PotState) -> String {
    let bb = settings.big_blind;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Seat".bold().to_string()),
        Cell::new("Stack").set_alignment(CellAlignment::Right),
        Cell::new("Street").set_alignment(CellAlignment::Right),
        Cell::new("Total").set_alignment(CellAlignment::Right),
    ]);
    for (seat, stack) in stacks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("P{}", seat).bold().to_string()),
            Cell::new(in_big_blinds(*stack, bb)).set_alignment(CellAlignment::Right),
            Cell::new(in_big_blinds(
                pot.street_contributions.get(seat).copied().unwrap_or(0),
                bb,
            ))
            .set_alignment(CellAlignment::Right),
            Cell::new(in_big_blinds(
                pot.total_contributions.get(seat).copied().unwrap_or(0),
                bb,
            ))
            .set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Pot".bold().to_string()),
        Cell::new(in_big_blinds(pot.total_pot, bb).bold().to_string())
            .set_alignment(CellAlignment::Right),
        Cell::new(""),
        Cell::new(""),
    ]);
    table.to_string()
}

pub fn spot_table(record: &SpotRecord) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Name".bold().to_string()),
        Cell::new(&record.name),
    ]);
    if !record.description.is_empty() {
        table.add_row(vec![
            Cell::new("Description".bold().to_string()),
            Cell::new(&record.description),
        ]);
    }
    let status = match record.status.as_str() {
        "completed" => record.status.as_str().green().bold().to_string(),
        "failed" => record.status.as_str().red().bold().to_string(),
        other => other.yellow().to_string(),
    };
    table.add_row(vec![
        Cell::new("Status".bold().to_string()),
        Cell::new(status),
    ]);
    if let Some(message) = &record.error_message {
        table.add_row(vec![
            Cell::new("Error".bold().to_string()),
            Cell::new(message.red().to_string()),
        ]);
    }
    if !record.created_at.is_empty() {
        table.add_row(vec![
            Cell::new("Created".bold().to_string()),
            Cell::new(&record.created_at),
        ]);
    }
    if let Some(locator) = &record.tree_locator {
        table.add_row(vec![
            Cell::new("Tree".bold().to_string()),
            Cell::new(locator.dimmed().to_string()),
        ]);
    }
    if let Some(locator) = &record.strategy_locator {
        table.add_row(vec![
            Cell::new("Strategy".bold().to_string()),
            Cell::new(locator.dimmed().to_string()),
        ]);
    }
    table.to_string()
}

/// Hand-by-hand strategy rows, heaviest hands first, capped at `limit`.
/// `labels` follow the node's action order, as do the frequency columns.
pub fn strategy_rows(strategy: &NodeStrategy, labels: &[String], limit: usize) -> String {
    let mut hands: Vec<(&String, &crate::storage::HandStrategy)> = strategy.iter().collect();
    hands.sort_by(|a, b| {
        b.1.weight
            .partial_cmp(&a.1.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![
        Cell::new("Hand".bold().to_string()),
        Cell::new("Weight").set_alignment(CellAlignment::Right),
    ];
    for label in labels {
        header.push(Cell::new(styled_action(label)));
    }
    table.set_header(header);

    for (hand, data) in hands.into_iter().take(limit) {
        let mut row = vec![
            Cell::new(hand.bold().to_string()),
            Cell::new(format!("{:.2}", data.weight)).set_alignment(CellAlignment::Right),
        ];
        for i in 0..labels.len() {
            let freq = data.played_frequencies.get(i).copied().unwrap_or(0.0);
            row.push(Cell::new(frequency_bar(freq, 12)));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
