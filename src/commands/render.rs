//! Terminal rendering of the inventory.

use colored::{ColoredString, Colorize};

use crate::application::{AttributeResolutionError, Inventory};
use crate::package::{Attribute, PackageAttributes, PackageName, PackageStatus};

/// Terminals at least this wide get the table layout.
pub const TABLE_MIN_WIDTH: usize = 150;

/// Shown for attributes that have no value.
pub const ABSENT: &str = "-";

const COLUMN_GAP: &str = "  ";

const HEADERS: [&str; 7] = [
    "package",
    "version",
    "file path",
    "branch",
    "describe",
    "latest version",
    "status",
];

pub fn render_inventory(inventory: &Inventory, width: Option<usize>) -> String {
    match width {
        Some(w) if w >= TABLE_MIN_WIDTH => render_table(inventory),
        _ => render_blocks(inventory),
    }
}

pub fn status_label(status: PackageStatus) -> &'static str {
    match status {
        PackageStatus::NotInstalled => "not installed",
        PackageStatus::UpToDate => "up to date",
        PackageStatus::UpgradeAvailable => "upgrade available",
        PackageStatus::Unknown => "latest version unknown",
    }
}

fn paint(text: &str, status: PackageStatus) -> ColoredString {
    match status {
        PackageStatus::NotInstalled => text.red(),
        PackageStatus::UpgradeAvailable => text.yellow(),
        PackageStatus::UpToDate => text.green(),
        PackageStatus::Unknown => text.normal(),
    }
}

fn cells(name: &PackageName, attributes: &PackageAttributes) -> [String; 7] {
    let value = |attribute: Attribute| attributes.get(attribute).unwrap_or(ABSENT).to_string();
    [
        name.to_string(),
        value(Attribute::Version),
        value(Attribute::FilePath),
        value(Attribute::Branch),
        value(Attribute::Describe),
        value(Attribute::LatestVersion),
        status_label(attributes.status()).to_string(),
    ]
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

/// One row per package, columns padded to the widest cell.
pub fn render_table(inventory: &Inventory) -> String {
    let rows: Vec<(PackageStatus, [String; 7])> = inventory
        .iter()
        .map(|(name, attributes)| (attributes.status(), cells(name, attributes)))
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for (_, row) in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let header = join_padded(&headers, &widths);
    let rule_len = widths.iter().sum::<usize>() + COLUMN_GAP.len() * (widths.len() - 1);

    let mut out = String::new();
    out.push_str(&format!("{}\n", header.bold()));
    out.push_str(&format!("{}\n", "-".repeat(rule_len)));
    for (status, row) in &rows {
        out.push_str(&format!("{}\n", paint(&join_padded(row, &widths), *status)));
    }
    out
}

/// One block per package, for narrow terminals.
pub fn render_blocks(inventory: &Inventory) -> String {
    let label_width = Attribute::ALL
        .iter()
        .map(|a| a.as_str().len())
        .max()
        .unwrap_or_default()
        + 1;

    let mut out = String::new();
    for (name, attributes) in inventory.iter() {
        let status = attributes.status();
        out.push_str(&format!(
            "{} ({})\n",
            paint(name.as_str(), status).bold(),
            paint(status_label(status), status)
        ));
        if attributes.importable() {
            for attribute in Attribute::ALL {
                out.push_str(&format!(
                    "  {:<width$} {}\n",
                    format!("{}:", attribute),
                    attributes.get(attribute).unwrap_or(ABSENT),
                    width = label_width
                ));
            }
        }
        out.push('\n');
    }
    out
}

/// `name: value` lines for `get`, or the bare value when one attribute is asked for.
pub fn render_attributes(attributes: &PackageAttributes, attribute: Option<Attribute>) -> String {
    match attribute {
        Some(attribute) => attributes.get(attribute).unwrap_or(ABSENT).to_string(),
        None => Attribute::ALL
            .iter()
            .map(|a| format!("{}: {}", a, attributes.get(*a).unwrap_or(ABSENT)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Lines describing packages that were left out of the report.
pub fn render_failures(failures: &[AttributeResolutionError]) -> Vec<String> {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.package, f.source))
        .collect()
}
