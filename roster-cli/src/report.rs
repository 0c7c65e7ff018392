//! Summary and unsigned-contributor table.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use roster_core::Developer;
use roster_reconcile::RunReport;

#[derive(Tabled)]
struct UnsignedRow {
    #[tabled(rename = "login")]
    login: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "emails")]
    emails: String,
    #[tabled(rename = "activity")]
    activity: usize,
}

impl From<&Developer> for UnsignedRow {
    fn from(dev: &Developer) -> Self {
        Self {
            login: dev.login().unwrap_or("-").to_owned(),
            name: dev.display_name().unwrap_or_default().to_owned(),
            emails: dev
                .emails()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            activity: dev.commits().len(),
        }
    }
}

pub fn print(report: &RunReport) {
    println!(
        "Roster v{} | {} repositories | {} developers | {} unsigned | {}",
        env!("CARGO_PKG_VERSION"),
        report.repositories.len(),
        report.save.written,
        report.save.unsigned.len(),
        report.save.path.display(),
    );

    if !report.has_unsigned() {
        println!("{}", "All contributors have signed.".green().bold());
        return;
    }

    let rows: Vec<UnsignedRow> = report.save.unsigned.iter().map(UnsignedRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{}",
        format!("{} contributors have not signed.", report.save.unsigned.len())
            .red()
            .bold()
    );
}
