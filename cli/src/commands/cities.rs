use anyhow::Result;

use super::load_table;

pub fn run(cli: &crate::cli::Cli) -> Result<()> {
    let table = load_table(cli)?;

    for city in table.iter() {
        println!(
            "{:<12} {:<12} {:<12} ({:.4}, {:.4}) -> {}",
            city.key, city.name, city.district_name(), city.lat(), city.lng(), city.proposed_district_file,
        );
    }

    Ok(())
}
