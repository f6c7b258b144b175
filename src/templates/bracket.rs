// kegel-pdf: single elimination tournament bracket (Turnierbaum)

use crate::error::VpeError;
use crate::font::PT_TO_CM;
use crate::model::Bracket;
use crate::vpe::{Align, Orientation, PenStyle, Vpe};
use tracing::debug;

use super::{draw_continuation, draw_letterhead, start_document, Letterhead};

/// Placeholder for an empty first-round slot
pub const BYE: &str = "Freilos";

const BOX_HEIGHT: f32 = 0.6;
/// Below this a page gets fewer first-column boxes instead of smaller ones
const MIN_SLOT_HEIGHT: f32 = 0.5;
const MIN_FONT_SIZE: f32 = 7.0;
/// Horizontal room between two rounds for the connector lines
const CONNECTOR_GAP: f32 = 0.8;
const LABEL_HEIGHT: f32 = 0.5;
const CELL_PAD: f32 = 0.1;

/// Number of first-round slots: the next power of two, at least two.
pub fn bracket_size(participants: usize) -> usize {
    participants.max(2).next_power_of_two()
}

/// First-round order. Participants fill every other slot first so byes are
/// spread over the pairings instead of meeting each other.
pub fn first_round(participants: &[String]) -> Vec<String> {
    let slots = bracket_size(participants.len());
    let order = (0..slots).step_by(2).chain((1..slots).step_by(2));
    let mut round = vec![BYE.to_string(); slots];
    for (slot, name) in order.zip(participants) {
        round[slot] = name.clone();
    }
    round
}

fn round_label(round: usize, rounds: usize) -> String {
    match rounds - round {
        0 => "Sieger".to_string(),
        1 => "Finale".to_string(),
        2 => "Halbfinale".to_string(),
        3 => "Viertelfinale".to_string(),
        _ => format!("{}. Runde", round + 1),
    }
}

/// Names per round, first round included. Explicit results win; otherwise an
/// entrant paired with a bye moves on by itself.
pub fn resolve_rounds(bracket: &Bracket, entrants: Vec<String>) -> Vec<Vec<String>> {
    let slots = entrants.len();
    let rounds = slots.trailing_zeros() as usize;
    let mut resolved = vec![entrants];
    for round in 1..=rounds {
        let previous = &resolved[round - 1];
        let given = bracket.rounds.get(round - 1);
        let current: Vec<String> = (0..slots >> round)
            .map(|idx| {
                let named = given
                    .and_then(|names| names.get(idx))
                    .filter(|name| !name.is_empty());
                if let Some(name) = named {
                    return name.clone();
                }
                match (previous[2 * idx].as_str(), previous[2 * idx + 1].as_str()) {
                    (BYE, other) | (other, BYE) if !other.is_empty() && other != BYE => {
                        other.to_string()
                    }
                    _ => String::new(),
                }
            })
            .collect();
        resolved.push(current);
    }
    resolved
}

/// A part of the bracket drawn on one page: rounds `first_round..=last_round`,
/// starting with `count` boxes at index `start` of the first of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub first_round: usize,
    pub last_round: usize,
    pub start: usize,
    pub count: usize,
}

/// Largest power of two of first-column boxes that fits into `available` cm.
fn slots_per_page(available: f32) -> usize {
    let fit = (available / MIN_SLOT_HEIGHT).floor() as usize;
    if fit < 2 {
        2
    } else {
        1 << (usize::BITS - 1 - fit.leading_zeros())
    }
}

/// Splits a bracket too tall for one page into sub-brackets of `per_page`
/// entrants. Their winners meet in later windows.
pub fn plan_windows(slots: usize, per_page: usize) -> Vec<Window> {
    let rounds = slots.trailing_zeros() as usize;
    let step = per_page.trailing_zeros() as usize;
    let mut windows = Vec::new();
    let mut first = 0;
    while slots >> first > per_page {
        for start in (0..slots >> first).step_by(per_page) {
            windows.push(Window {
                first_round: first,
                last_round: first + step,
                start,
                count: per_page,
            });
        }
        first += step;
    }
    windows.push(Window {
        first_round: first,
        last_round: rounds,
        start: 0,
        count: slots >> first,
    });
    windows
}

pub fn render(head: &Letterhead, bracket: &Bracket) -> Result<Vec<u8>, VpeError> {
    let mut vpe = start_document(&bracket.title, Orientation::Landscape, head.config)?;
    let subtitle = format!("{} Teilnehmer", bracket.participants.len());
    draw_letterhead(&mut vpe, head, &bracket.title, &subtitle)?;

    let entrants = first_round(&bracket.participants);
    let slots = entrants.len();
    let rounds = slots.trailing_zeros() as usize;
    let resolved = resolve_rounds(bracket, entrants);

    let first_top = vpe.cursor.bottom + 0.3 + LABEL_HEIGHT;
    let per_page = slots_per_page(vpe.bottom_limit() - first_top);
    let windows = plan_windows(slots, per_page);
    debug!(slots, per_page, pages = windows.len(), "bracket layout");

    for (n, window) in windows.iter().enumerate() {
        let top = if n == 0 {
            first_top
        } else {
            vpe.page_break();
            vpe.select_font(&head.config.font_family, head.config.font_size)?;
            draw_continuation(&mut vpe, head, &bracket.title)?;
            vpe.cursor.bottom + 0.3 + LABEL_HEIGHT
        };
        draw_window(&mut vpe, head, &resolved, window, rounds, top)?;
    }

    vpe.get_output()
}

fn draw_window(
    vpe: &mut Vpe,
    head: &Letterhead,
    resolved: &[Vec<String>],
    window: &Window,
    rounds: usize,
    top: f32,
) -> Result<(), VpeError> {
    let left = vpe.margins().left;
    let columns = window.last_round - window.first_round + 1;
    let column_width = (vpe.right_limit() - left) / columns as f32;
    let box_width = column_width - CONNECTOR_GAP;
    let slot_height = (vpe.bottom_limit() - top) / window.count as f32;
    let box_height = BOX_HEIGHT.min(slot_height * 0.9);

    let font_size = head
        .config
        .font_size
        .min(box_height * 0.7 / PT_TO_CM)
        .max(MIN_FONT_SIZE);
    vpe.select_font(&head.config.font_family, font_size)?;

    for (col, round) in (window.first_round..=window.last_round).enumerate() {
        let x = left + col as f32 * column_width;
        vpe.set_font_attr(Align::Center, true, false, false, false)?;
        vpe.write(x, top - LABEL_HEIGHT, -box_width, -LABEL_HEIGHT, &round_label(round, rounds));
        vpe.set_font_attr(Align::Left, false, false, false, false)?;

        let span = slot_height * (1usize << col) as f32;
        let offset = window.start >> col;
        for idx in 0..(window.count >> col) {
            let name = resolved[round].get(offset + idx).map_or("", String::as_str);

            let y = top + (idx as f32 + 0.5) * span - box_height / 2.0;
            vpe.draw_box(x, y, -box_width, -box_height);
            vpe.store_pos();
            vpe.write(x + CELL_PAD, y, -(box_width - 2.0 * CELL_PAD), -box_height, name);
            vpe.restore_pos();

            if round < window.last_round {
                let cursor = vpe.cursor;
                let mid = (cursor.top + cursor.bottom) / 2.0;
                let elbow = cursor.right + CONNECTOR_GAP / 2.0;
                vpe.pen_style = PenStyle::Dash;
                vpe.line(cursor.right, mid, elbow, mid);
                if idx % 2 == 1 {
                    let partner = mid - span;
                    vpe.line(elbow, partner, elbow, mid);
                    let joined = (partner + mid) / 2.0;
                    vpe.line(elbow, joined, x + column_width, joined);
                }
                vpe.pen_style = PenStyle::Solid;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn names(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("P{}", i)).collect()
    }

    #[test]
    fn test_bracket_size() {
        assert_eq!(bracket_size(0), 2);
        assert_eq!(bracket_size(2), 2);
        assert_eq!(bracket_size(5), 8);
        assert_eq!(bracket_size(16), 16);
        assert_eq!(bracket_size(17), 32);
    }

    #[test]
    fn test_byes_never_meet() {
        let round = first_round(&names(5));
        assert_eq!(round, vec!["P1", "P5", "P2", BYE, "P3", BYE, "P4", BYE]);
        for pair in round.chunks(2) {
            assert!(pair.iter().any(|name| name != BYE));
        }
    }

    #[test]
    fn test_round_labels() {
        assert_eq!(round_label(3, 3), "Sieger");
        assert_eq!(round_label(2, 3), "Finale");
        assert_eq!(round_label(0, 3), "Viertelfinale");
        assert_eq!(round_label(0, 5), "1. Runde");
    }

    #[test]
    fn test_bye_winners_advance() {
        let bracket = Bracket {
            title: "Pokal".to_string(),
            participants: names(5),
            rounds: vec![vec![String::new(), "Meier".to_string()]],
        };
        let resolved = resolve_rounds(&bracket, first_round(&bracket.participants));
        assert_eq!(resolved.len(), 4);
        // P1 vs P5 is open; the data overrides P2's bye win
        assert_eq!(resolved[1], vec!["", "Meier", "P3", "P4"]);
        assert_eq!(resolved[2], vec!["", ""]);
        assert_eq!(resolved[3], vec![""]);
    }

    #[test]
    fn test_small_fields_fit_one_page() {
        assert_eq!(slots_per_page(14.5), 16);
        assert_eq!(slots_per_page(0.3), 2);
        assert_eq!(
            plan_windows(8, 16),
            vec![Window {
                first_round: 0,
                last_round: 3,
                start: 0,
                count: 8
            }]
        );
    }

    #[test]
    fn test_large_fields_split_into_sub_brackets() {
        let windows = plan_windows(64, 16);
        assert_eq!(windows.len(), 5);
        for (n, window) in windows[..4].iter().enumerate() {
            assert_eq!(
                *window,
                Window {
                    first_round: 0,
                    last_round: 4,
                    start: n * 16,
                    count: 16
                }
            );
        }
        assert_eq!(
            windows[4],
            Window {
                first_round: 4,
                last_round: 6,
                start: 0,
                count: 4
            }
        );
    }

    #[test]
    fn test_renders_brackets_of_various_sizes() {
        let config = SheetConfig::default();
        let head = Letterhead {
            config: &config,
            logo: None,
            printed: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
        };
        for count in [0, 5, 16, 40, 200] {
            let bracket = Bracket {
                title: "Vereinspokal".to_string(),
                participants: names(count),
                rounds: vec![vec!["P1".to_string()]],
            };
            let bytes = render(&head, &bracket).unwrap();
            assert!(bytes.starts_with(b"%PDF"), "{} participants", count);
        }
    }
}
