use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{critical, error, info, warn};

use instagent::content::{ContentCategory, ContentType};
use instagent::logger::configure_logger;
use instagent::pipeline::{Mode, Pipeline, RunOptions};

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "instagent.toml";

/// Creates, posts and supervises knowledge-base driven Instagram content
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path. If empty, instagent.toml is searched next to the executable,
    /// in the current dir and in the user config dir
    #[arg(short, long)]
    config_path: Option<String>,

    /// Execution mode
    #[arg(short, long, value_enum, default_value_t = Mode::FullCycle)]
    mode: Mode,

    /// Only select concepts of this category
    #[arg(long, value_enum, ignore_case = true)]
    category: Option<ContentCategory>,

    /// Preferred content type
    #[arg(long, value_enum, ignore_case = true)]
    content_type: Option<ContentType>,

    /// Seed for a reproducible selection
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run instagent --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting instagent =-=-=-=-=-=-=-=-=-=-=-=-=-=-");

    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            critical!("Stopping, could not set up the agents: {:#}", err);
            return Ok(());
        }
    };

    let options = RunOptions {
        mode: args.mode,
        category: args.category,
        content_type: args.content_type,
        seed: args.seed,
    };

    if let Err(err) = pipeline.run(&options) {
        error!("Fatal error in the main flow: {:#}", err);
    }

    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_type_names() {
        let args = Args::try_parse_from(["instagent", "--category", "freudian_concepts", "--content-type", "quote"]).unwrap();
        assert_eq!(args.category, Some(ContentCategory::FreudianConcepts));
        assert_eq!(args.content_type, Some(ContentType::Quote));
        assert_eq!(args.mode, Mode::FullCycle);

        let args = Args::try_parse_from(["instagent", "-m", "create", "--category", "Conceitos_Lacanianos", "--content-type", "citacao"]).unwrap();
        assert_eq!(args.mode, Mode::Create);
        assert_eq!(args.category, Some(ContentCategory::LacanConcepts));
        assert_eq!(args.content_type, Some(ContentType::Quote));

        assert!(Args::try_parse_from(["instagent", "--category", "astrologia"]).is_err());
    }

    #[test]
    fn test_mode_and_seed() {
        let args = Args::try_parse_from(["instagent", "--mode", "full-cycle", "--seed", "42", "-c", "/etc/instagent.toml"]).unwrap();
        assert_eq!(args.mode, Mode::FullCycle);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.config_path.as_deref(), Some("/etc/instagent.toml"));
    }
}
