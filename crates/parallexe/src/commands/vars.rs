use crate::GlobalArgs;
use anyhow::Result;
use parallexe_config::parser;
use parallexe_config::resolver::ResolutionContext;

pub fn run(global: &GlobalArgs, host: &str) -> Result<()> {
    let inventory = super::load_inventory(global)?;
    let config = parser::find_host(&inventory, host, &ResolutionContext::new())?;

    let variables = inventory.variables.resolve(&config);
    println!("{}", serde_json::to_string_pretty(&variables)?);
    Ok(())
}
