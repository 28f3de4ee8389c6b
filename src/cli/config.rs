use ziprepo::config::Config;
use ziprepo::core::path::config_file;
use ziprepo::core::ZiprepoResult;

pub fn show() -> ZiprepoResult<()> {
    let config = Config::load()?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

pub fn path() -> ZiprepoResult<()> {
    println!("{}", config_file()?.display());
    Ok(())
}
