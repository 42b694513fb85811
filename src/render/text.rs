//! Text output for terminals.

use super::{RenderKind, RenderOptions};
use crate::qrcode::QrCode;

const ANSI_DARK: &str = "\x1b[40m";
const ANSI_LIGHT: &str = "\x1b[47m";
const ANSI_RESET: &str = "\x1b[0m";

/// Renders `qr` as terminal text: ANSI colours for
/// [`RenderKind::Terminal`], half-block characters otherwise.
pub fn to_string(qr: &QrCode, opts: &RenderOptions) -> String {
    match opts.kind {
        RenderKind::Terminal => to_terminal(qr, opts.margin),
        _ => to_utf8(qr, opts.margin),
    }
}

/// Packs two module rows into each line of text:
/// ▀ = top dark, ▄ = bottom dark, █ = both dark, space = both light.
///
/// The margin is included; an odd total height leaves a light bottom half
/// on the last line.
pub fn to_utf8(qr: &QrCode, margin: u32) -> String {
    let margin = margin as i32;
    let size = qr.size() as i32;
    let mut result = String::new();
    for y in (-margin..size + margin).step_by(2) {
        for x in -margin..size + margin {
            let ch = match (qr.get_module(x, y), qr.get_module(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            result.push(ch);
        }
        result.push('\n');
    }
    result
}

/// One line per module row, each module two cells wide with a black or
/// white background.
pub fn to_terminal(qr: &QrCode, margin: u32) -> String {
    let margin = margin as i32;
    let size = qr.size() as i32;
    let mut result = String::new();
    for y in -margin..size + margin {
        for x in -margin..size + margin {
            result += if qr.get_module(x, y) { ANSI_DARK } else { ANSI_LIGHT };
            result += "  ";
        }
        result += ANSI_RESET;
        result.push('\n');
    }
    result
}
