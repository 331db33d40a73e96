//! Text rendering for the console.

use fair_dice_core::ProbabilityTable;
use prettytable::{Cell, Row, Table};

const CORNER: &str = "User dice v";

/// Uppercase hex, the form published values are shown in
pub fn hex_upper(value: &impl std::fmt::Display) -> String {
    value.to_string().to_uppercase()
}

/// Win probabilities for the user: rows are the user's die, columns the computer's
pub fn probability_table(table: &ProbabilityTable) -> String {
    let mut grid = Table::new();

    let mut titles = vec![Cell::new(CORNER)];
    titles.extend(table.dice().iter().map(|die| Cell::new(&die.to_string())));
    grid.set_titles(Row::new(titles));

    for (die, row) in table.dice().iter().zip(table.rows()) {
        let mut cells = vec![Cell::new(&die.to_string())];
        cells.extend(row.iter().map(|cell| match cell {
            Some(p) => Cell::new(&format!("{p:.4}")),
            None => Cell::new("-"),
        }));
        grid.add_row(Row::new(cells));
    }

    format!("Probability of the win for the user:\n{grid}")
}
