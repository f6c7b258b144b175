// kegel-pdf: settlement sheet (Abrechnung)

use crate::error::VpeError;
use crate::model::{Settlement, SettlementEntry};
use crate::vpe::{Align, Orientation};

use super::{
    draw_continuation, draw_letterhead, ensure_room, fit_columns, format_euro, header_row,
    start_document, table_row, Column, Letterhead,
};

const TITLE: &str = "Abrechnung";

const ROW_HEIGHT: f32 = 0.6;
const HEADER_HEIGHT: f32 = 0.7;

const COLUMNS: [Column; 5] = [
    Column::new("Name", 6.0, Align::Left),
    Column::new("Beitrag", 3.0, Align::Right),
    Column::new("Strafen", 3.0, Align::Right),
    Column::new("Bezahlt", 3.0, Align::Right),
    Column::new("Saldo", 3.0, Align::Right),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Totals {
    fee: i64,
    penalty: i64,
    paid: i64,
    outstanding: i64,
}

impl Totals {
    fn add(&mut self, entry: &SettlementEntry) {
        self.fee += entry.fee_cents;
        self.penalty += entry.penalty_cents;
        self.paid += entry.paid_cents;
        self.outstanding += entry.balance_cents().min(0);
    }

    fn balance(&self) -> i64 {
        self.paid - self.fee - self.penalty
    }
}

pub fn render(head: &Letterhead, settlement: &Settlement) -> Result<Vec<u8>, VpeError> {
    let mut vpe = start_document(TITLE, Orientation::Portrait, head.config)?;
    let left = vpe.margins().left;
    let width = vpe.right_limit() - left;
    let columns = fit_columns(&COLUMNS, width);

    draw_letterhead(&mut vpe, head, TITLE, &settlement.period)?;
    vpe.cursor.bottom += 0.4;
    header_row(&mut vpe, &columns, HEADER_HEIGHT)?;

    let mut totals = Totals::default();
    for entry in &settlement.entries {
        ensure_room(&mut vpe, ROW_HEIGHT, |vpe| {
            draw_continuation(vpe, head, TITLE)?;
            header_row(vpe, &columns, HEADER_HEIGHT)
        })?;
        totals.add(entry);
        let cells = vec![
            entry.name.clone(),
            format_euro(entry.fee_cents),
            format_euro(entry.penalty_cents),
            format_euro(entry.paid_cents),
            format_euro(entry.balance_cents()),
        ];
        table_row(&mut vpe, &columns, &cells, ROW_HEIGHT, false)?;
    }

    ensure_room(&mut vpe, ROW_HEIGHT + 1.0, |vpe| {
        draw_continuation(vpe, head, TITLE)?;
        header_row(vpe, &columns, HEADER_HEIGHT)
    })?;
    let sums = vec![
        "Summe".to_string(),
        format_euro(totals.fee),
        format_euro(totals.penalty),
        format_euro(totals.paid),
        format_euro(totals.balance()),
    ];
    table_row(&mut vpe, &columns, &sums, ROW_HEIGHT, true)?;

    let y = vpe.cursor.bottom + 0.3;
    vpe.write(
        left,
        y,
        -width,
        -0.6,
        &format!("Offene Beträge: {}", format_euro(-totals.outstanding)),
    );

    vpe.get_output()
}
