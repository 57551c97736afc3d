use harvest::config;

fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;
    println!("config: {:?}", config);
    Ok(())
}
