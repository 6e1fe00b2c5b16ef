use std::io::Write;

use anyhow::Result;
use pvplant_core::surface::SURFACE_ALBEDO;
use tabwriter::TabWriter;

pub fn handle() -> Result<()> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Surface\tAlbedo")?;
    for (name, albedo) in SURFACE_ALBEDO {
        writeln!(writer, "{name}\t{albedo:.2}")?;
    }
    writer.flush()?;
    print!("{}", String::from_utf8(writer.into_inner()?)?);
    Ok(())
}
