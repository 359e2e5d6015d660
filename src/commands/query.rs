//! Query command handlers.

use nattiq_braille::{CellCount, DeviceIdentity};

use super::{CommandResult, Context};

/// Connect and describe the display
pub fn info(ctx: &Context) -> CommandResult {
    let driver = ctx.session.connect()?;
    let channel = driver.channel_info();

    println!("Model:      {}", driver.model_name());
    println!(
        "Channel:    {:?} {:04X}:{:04X} {}",
        channel.transport_type, channel.vid, channel.pid, channel.device_path
    );
    if let Some(name) = &channel.resource_name {
        println!("Resource:   {name}");
    }
    println!("Identity:   {}", describe_identity(driver.identity()));
    println!("Cells:      {}", describe_cells(driver.cell_count()));
    println!("Rows:       {}", driver.text_rows());
    println!("Key table:  {}", driver.key_table());

    driver.destruct()?;
    Ok(())
}

/// Print the protocol profiles in effect
pub fn profiles(ctx: &Context, json: bool) -> CommandResult {
    let protocols = ctx.session.protocols();
    if json {
        println!("{}", serde_json::to_string_pretty(protocols)?);
        return Ok(());
    }

    let default = &protocols.default_profile().name;
    for profile in protocols.profiles() {
        let marker = if &profile.name == default { " (default)" } else { "" };
        println!("{}{}", profile.name, marker);
        println!("  model:         {}", profile.model_name);
        println!(
            "  prefix:        {}",
            profile.resource_name_prefix.as_deref().unwrap_or("-")
        );
        println!("  key table:     {}", profile.key_table);
        println!("  default cells: {}", profile.default_cell_count);
        match &profile.identities {
            Some(ids) => {
                let ids: Vec<_> = ids.iter().map(|i| describe_identity(Some(*i))).collect();
                println!("  identities:    {}", ids.join(", "));
            }
            None => println!("  identities:    (not probed)"),
        }
        for o in &profile.key_table_overrides {
            println!("  override:      {} columns: {} -> {}", o.columns, o.from, o.to);
        }
    }
    Ok(())
}

fn describe_identity(identity: Option<DeviceIdentity>) -> String {
    match identity {
        None => "none".into(),
        Some(id) if id.is_wildcard() => format!("assumed ({})", id.key_table),
        Some(id) => format!("{:02X}/{:02X} ({})", id.id1, id.id2, id.key_table),
    }
}

fn describe_cells(cells: CellCount) -> String {
    match cells {
        CellCount::Reported(n) => format!("{n}"),
        CellCount::Default(n) => format!("{n} (device did not report, profile default)"),
    }
}
