use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    api::tibber::Home,
    quantity::{cost::Cost, rate::KilowattHourRate},
    report::{Report, Summary, Verdict},
};

pub fn build_days_table(report: &Report) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec![
        "Date",
        "Consumption",
        "Paid price",
        "Profiled price",
        "Cost",
        "Potential cost",
        "Savings",
    ]);
    for day in &report.days {
        let profiled_kwh_price = day.profiled_kwh_price();
        table.add_row(vec![
            Cell::new(day.start_time.format("%d/%m")),
            Cell::new(day.consumption).set_alignment(CellAlignment::Right),
            build_rate_cell(day.actual_kwh_price).fg(
                match (day.actual_kwh_price, profiled_kwh_price) {
                    (Some(paid), Some(profiled)) if paid < profiled => Color::Green,
                    (Some(paid), Some(profiled)) if paid > profiled => Color::Red,
                    _ => Color::Reset,
                },
            ),
            build_rate_cell(profiled_kwh_price),
            Cell::new(day.total_cost).set_alignment(CellAlignment::Right),
            Cell::new(day.potential_cost)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(day.savings()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_summary_table(report: &Report) -> Table {
    let summary = &report.summary;
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec![
        "Days",
        "Consumption",
        "Cost on hourly spot price",
        "Cost on profiled average",
        "Savings",
    ]);
    table.add_row(vec![
        Cell::new(summary.n_days).set_alignment(CellAlignment::Right),
        Cell::new(summary.consumption).set_alignment(CellAlignment::Right),
        Cell::new(format!("{} {}", summary.total_cost, report.currency))
            .set_alignment(CellAlignment::Right),
        Cell::new(format!("{} {}", summary.potential_cost, report.currency))
            .set_alignment(CellAlignment::Right),
        Cell::new(format!("{} {}", summary.savings(), report.currency))
            .set_alignment(CellAlignment::Right)
            .fg(if summary.savings() > Cost::ZERO { Color::Green } else { Color::Red }),
    ]);
    table
}

pub fn build_homes_table(homes: &[Home]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["ID", "Nickname"]);
    for home in homes {
        table.add_row(vec![
            Cell::new(&home.id),
            Cell::new(home.nickname.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

fn build_rate_cell(rate: Option<KilowattHourRate>) -> Cell {
    rate.map_or_else(|| Cell::new("n/a").add_attribute(Attribute::Dim), Cell::new)
        .set_alignment(CellAlignment::Right)
}

/// Human-readable conclusion over the whole window.
#[must_use]
pub fn verdict_text(summary: &Summary) -> String {
    match summary.verdict() {
        Verdict::Saved => "It seems you save money by using off-peak electricity, nice.".to_owned(),
        Verdict::PaidMore => format!(
            "You paid more during the last {} days than you would have if you had a contract \
             with daily spot-price. This can be due to using energy consuming appliances during \
             peak hours, and not using a significant amount of energy during off-peak hours.",
            summary.n_days,
        ),
    }
}
