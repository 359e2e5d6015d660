//! Display output command handlers.

use anyhow::bail;
use nattiq_braille::dots::{format_cell, parse_cell};
use nattiq_braille::RenderOutcome;

use super::{CommandResult, Context};

/// Show dot-number cells, blank-padded to the display width
pub fn write(ctx: &Context, cells: &[String]) -> CommandResult {
    let cells = parse_cells(cells)?;

    let mut driver = ctx.session.connect()?;
    let width = driver.text_columns();
    if cells.len() > width {
        let count = cells.len();
        driver.destruct()?;
        bail!("{count} cells given, display has {width}");
    }

    let window = pad_window(&cells, width);
    let outcome = driver.write_window(&window)?;
    let shown: Vec<_> = cells.iter().map(|c| format_cell(*c)).collect();
    match outcome {
        RenderOutcome::Transmitted => println!("Wrote {}/{} cells: {}", cells.len(), width, shown.join(" ")),
        RenderOutcome::Unchanged => println!("Display already blank"),
    }

    driver.destruct()?;
    Ok(())
}

/// Blank the display
pub fn clear(ctx: &Context) -> CommandResult {
    let mut driver = ctx.session.connect()?;
    driver.clear()?;
    println!("Cleared {} cells", driver.text_columns());
    driver.destruct()?;
    Ok(())
}

fn parse_cells(cells: &[String]) -> anyhow::Result<Vec<u8>> {
    Ok(cells
        .iter()
        .map(|c| parse_cell(c))
        .collect::<Result<_, _>>()?)
}

fn pad_window(cells: &[u8], width: usize) -> Vec<u8> {
    let mut window = cells.to_vec();
    window.resize(width, 0);
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_pads() {
        let cells = parse_cells(&["1245".into(), "0".into(), "1".into()]).unwrap();
        assert_eq!(cells, vec![0x1B, 0x00, 0x01]);
        assert_eq!(pad_window(&cells, 5), vec![0x1B, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn rejects_bad_dots() {
        assert!(parse_cells(&["129".into()]).is_err());
    }
}
