//! Key input command handlers.

use nattiq_braille::keys::ROUTING_KEY_NAME;
use nattiq_braille::{InputEvent, KeyTableId};
use nattiq_driver::Flow;
use serde::Serialize;

use super::{setup_interrupt_handler, CommandResult, Context};

#[derive(Serialize)]
struct KeyRecord {
    #[serde(flatten)]
    event: InputEvent,
    keys: Vec<String>,
}

/// Print key events until Ctrl-C or `count` events
pub fn keys(ctx: &Context, count: Option<usize>, json: bool) -> CommandResult {
    let running = setup_interrupt_handler();
    if !json {
        eprintln!("Press keys on the display, Ctrl-C to stop");
    }

    let mut seen = 0;
    ctx.session.monitor_input(&running, |driver, event| {
        let keys = key_names(driver.key_table(), event);
        if json {
            match serde_json::to_string(&KeyRecord { event, keys }) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("encode event: {e}"),
            }
        } else {
            println!("{}", describe_event(event, &keys));
        }

        seen += 1;
        match count {
            Some(n) if seen >= n => Flow::Stop,
            _ => Flow::Continue,
        }
    })?;
    Ok(())
}

fn key_names(table: KeyTableId, event: InputEvent) -> Vec<String> {
    match event {
        InputEvent::RoutingKeyPress { index } => vec![format!("{ROUTING_KEY_NAME}{}", u16::from(index) + 1)],
        InputEvent::NavigationKeySet { bits } => table.pressed_keys(bits),
    }
}

fn describe_event(event: InputEvent, keys: &[String]) -> String {
    match event {
        InputEvent::RoutingKeyPress { index } => format!("routing   cell {index:2}  {}", keys.join(" ")),
        InputEvent::NavigationKeySet { bits: 0 } => "keys      released".into(),
        InputEvent::NavigationKeySet { bits } => {
            format!("keys      {bits:08X}  {}", keys.join("+"))
        }
    }
}
