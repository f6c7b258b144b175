// kegel-pdf: league score sheet (Spielbericht)

use crate::error::VpeError;
use crate::model::{LaneResult, MatchDay, PlayerResult, LANES};
use crate::vpe::{Align, Orientation, PenStyle, Vpe};

use super::{
    draw_continuation, draw_letterhead, ensure_room, fit_columns, format_date, header_row,
    start_document, table_row, Column, Letterhead,
};

const TITLE: &str = "Spielbericht";

const NAME_HEIGHT: f32 = 0.7;
const ROW_HEIGHT: f32 = 0.6;
const BLOCK_GAP: f32 = 0.4;

const COLUMNS: [Column; 5] = [
    Column::new("Bahn", 3.0, Align::Left),
    Column::new("Volle", 3.75, Align::Right),
    Column::new("Abräumen", 3.75, Align::Right),
    Column::new("Fehlwürfe", 3.75, Align::Right),
    Column::new("Gesamt", 3.75, Align::Right),
];

fn block_height() -> f32 {
    NAME_HEIGHT + ROW_HEIGHT * (LANES as f32 + 2.0) + BLOCK_GAP
}

/// One block per player with four lanes and a sum row, followed by the team
/// total and signature lines. Missing results leave the boxes blank.
pub fn render(head: &Letterhead, day: &MatchDay) -> Result<Vec<u8>, VpeError> {
    let mut vpe = start_document(TITLE, Orientation::Portrait, head.config)?;
    let left = vpe.margins().left;
    let width = vpe.right_limit() - left;
    let columns = fit_columns(&COLUMNS, width);
    let name_column = [Column::new("", width, Align::Left)];

    let subtitle = format!(
        "{}, {}. Spieltag, {}",
        day.championship,
        day.number,
        format_date(day.date)
    );
    draw_letterhead(&mut vpe, head, TITLE, &subtitle)?;

    let details: Vec<String> = [("Mannschaft", &day.team), ("Bahnanlage", &day.venue)]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect();
    if !details.is_empty() {
        let y = vpe.cursor.bottom + 0.2;
        vpe.write(left, y, -width, -0.6, &details.join("    "));
    }
    vpe.cursor.bottom += BLOCK_GAP;

    for player in &day.players {
        ensure_room(&mut vpe, block_height(), |vpe| draw_continuation(vpe, head, TITLE))?;
        table_row(&mut vpe, &name_column, &[player.name.clone()], NAME_HEIGHT, true)?;
        header_row(&mut vpe, &columns, ROW_HEIGHT)?;
        for lane in 0..LANES {
            let cells = lane_cells(lane, player.lanes.get(lane));
            table_row(&mut vpe, &columns, &cells, ROW_HEIGHT, false)?;
        }
        table_row(&mut vpe, &columns, &sum_cells(player), ROW_HEIGHT, true)?;
        vpe.cursor.bottom += BLOCK_GAP;
    }

    ensure_room(&mut vpe, 3.0, |vpe| draw_continuation(vpe, head, TITLE))?;
    let total = day
        .team_total()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "______".to_string());
    vpe.set_font_attr(Align::Right, true, false, false, false)?;
    vpe.write(left, vpe.cursor.bottom, -width, -0.8, &format!("Mannschaft gesamt: {}", total));
    vpe.set_font_attr(Align::Left, false, false, false, false)?;

    draw_signatures(&mut vpe, left, width);

    vpe.get_output()
}

fn lane_cells(lane: usize, result: Option<&LaneResult>) -> Vec<String> {
    let mut cells = vec![format!("Bahn {}", lane + 1)];
    if let Some(r) = result {
        cells.extend([
            r.full.to_string(),
            r.clearing.to_string(),
            r.misses.to_string(),
            r.total().to_string(),
        ]);
    }
    cells
}

fn sum_cells(player: &PlayerResult) -> Vec<String> {
    let mut cells = vec!["Summe".to_string()];
    if player.total().is_some() {
        let lanes = player.lanes.iter().take(LANES);
        let (full, clearing, misses) = lanes.fold((0, 0, 0), |(f, c, m), r| {
            (f + r.full, c + r.clearing, m + r.misses)
        });
        cells.extend([
            full.to_string(),
            clearing.to_string(),
            misses.to_string(),
            (full + clearing).to_string(),
        ]);
    }
    cells
}

/// Two dashed signature lines with captions underneath.
fn draw_signatures(vpe: &mut Vpe, left: f32, width: f32) {
    let line_width = width * 0.4;
    let y = vpe.cursor.bottom + 1.5;

    vpe.pen_style = PenStyle::Dash;
    for (x, caption) in [
        (left, "Mannschaftsführer"),
        (left + width - line_width, "Schiedsrichter"),
    ] {
        vpe.line(x, y, x + line_width, y);
        vpe.write(x, vpe.cursor.bottom + 0.1, -line_width, -0.5, caption);
    }
    vpe.pen_style = PenStyle::Solid;
}
