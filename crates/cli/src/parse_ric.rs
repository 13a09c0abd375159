use anyhow::Result;

pub fn run(ric: &str) -> Result<()> {
    let parts = ivol_transform::parse_ric(ric)?;
    println!("base:      {}", parts.base);
    println!("moneyness: {}", parts.moneyness);
    Ok(())
}
