use std::env;
use std::path::PathBuf;

use instagent::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let candidates = [
        env::current_exe().ok().and_then(|exe| exe.parent().map(|p| p.to_path_buf())),
        env::current_dir().ok(),
        dirs::config_dir().map(|dir| dir.join("instagent")),
    ];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        None => return Err(format!("Could not find {}", CFG_FILE_NAME)),
        Some(x) => x,
    };

    println!("Reading config from {}", config_path.display());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            log.location = dirs::cache_dir().map(|dir| dir.join("instagent").join("log").join("instagent.log"));
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. No cache dir found, using console only"),
        }
        config.log = Some(log);
    } else {
        println!("Log file disabled. Using console");
    }

    Ok(config)
}
