// kegel-pdf: member list (Mitgliederliste)

use crate::error::VpeError;
use crate::model::Member;
use crate::vpe::{Align, Orientation};

use super::{
    draw_continuation, draw_letterhead, ensure_room, fit_columns, format_date, header_row,
    start_document, table_row, Column, Letterhead,
};

const TITLE: &str = "Mitgliederliste";

const ROW_HEIGHT: f32 = 0.6;
const HEADER_HEIGHT: f32 = 0.7;

/// Relative widths; scaled to the usable page width.
const COLUMNS: [Column; 8] = [
    Column::new("Nr.", 1.2, Align::Right),
    Column::new("Name", 4.0, Align::Left),
    Column::new("Vorname", 3.5, Align::Left),
    Column::new("Straße", 5.0, Align::Left),
    Column::new("PLZ / Ort", 5.0, Align::Left),
    Column::new("Telefon", 3.5, Align::Left),
    Column::new("Geburtstag", 2.5, Align::Center),
    Column::new("Seit", 2.0, Align::Center),
];

/// Landscape list with one row per member, repeating the column titles on
/// every page.
pub fn render(head: &Letterhead, members: &[Member]) -> Result<Vec<u8>, VpeError> {
    let mut vpe = start_document(TITLE, Orientation::Landscape, head.config)?;
    let columns = fit_columns(&COLUMNS, vpe.right_limit() - vpe.margins().left);

    draw_letterhead(&mut vpe, head, TITLE, "")?;
    vpe.cursor.bottom += 0.4;
    header_row(&mut vpe, &columns, HEADER_HEIGHT)?;

    for (idx, member) in members.iter().enumerate() {
        ensure_room(&mut vpe, ROW_HEIGHT, |vpe| {
            draw_continuation(vpe, head, TITLE)?;
            header_row(vpe, &columns, HEADER_HEIGHT)
        })?;
        table_row(&mut vpe, &columns, &member_cells(idx, member), ROW_HEIGHT, false)?;
    }

    ensure_room(&mut vpe, 1.0, |vpe| draw_continuation(vpe, head, TITLE))?;
    let left = vpe.margins().left;
    let width = vpe.right_limit() - left;
    let y = vpe.cursor.bottom + 0.3;
    vpe.write(left, y, -width, -0.6, &format!("Anzahl Mitglieder: {}", members.len()));

    vpe.get_output()
}

fn member_cells(idx: usize, member: &Member) -> Vec<String> {
    let number = member.number.unwrap_or(idx as u32 + 1);
    vec![
        number.to_string(),
        member.last_name.clone(),
        member.first_name.clone(),
        member.street.clone(),
        member.location(),
        member.phone.clone(),
        member.birthday.map(format_date).unwrap_or_default(),
        member
            .member_since
            .map(|year| year.to_string())
            .unwrap_or_default(),
    ]
}
