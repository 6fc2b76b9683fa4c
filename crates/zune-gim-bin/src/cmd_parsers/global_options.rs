/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::ArgMatches;
use log::{info, Level};
use zune_gim::GimSplitOptions;

#[derive(Debug, Clone)]
pub struct CmdOptions {
    /// Where outputs go, `None` writes next to the input
    pub out_dir: Option<PathBuf>,
    pub split:   GimSplitOptions,
    pub probe:   bool
}

impl CmdOptions {
    pub fn new() -> CmdOptions {
        CmdOptions {
            out_dir: None,
            split:   GimSplitOptions::default(),
            probe:   false
        }
    }
}

pub fn parse_options(options: &ArgMatches) -> CmdOptions {
    let mut cmd_options = CmdOptions::new();

    if let Some(dir) = options.get_one::<OsString>("out-dir") {
        info!("Writing outputs to {:?}", dir);
        cmd_options.out_dir = Some(PathBuf::from(dir));
    }
    if options.value_source("no-images") == Some(ValueSource::CommandLine) {
        info!("Not writing images");
        cmd_options.split.images = false;
    }
    if options.value_source("no-containers") == Some(ValueSource::CommandLine) {
        info!("Not writing pictures");
        cmd_options.split.containers = false;
    }
    cmd_options.probe = options.get_flag("probe");

    cmd_options
}

/// Set up logging options
pub fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if let Err(err) = simple_logger::init_with_level(log_level) {
        eprintln!("Could not initialize logger: {err}");
        return;
    }

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}

#[cfg(test)]
mod tests {
    use super::parse_options;
    use crate::cmd_args::create_cmd_args;

    #[test]
    fn defaults_split_everything() {
        let matches = create_cmd_args()
            .try_get_matches_from(["zune-gimsplit", "a.gim"])
            .unwrap();
        let options = parse_options(&matches);

        assert!(options.out_dir.is_none());
        assert!(options.split.images && options.split.containers);
        assert!(!options.probe);
    }

    #[test]
    fn flags_turn_off_outputs() {
        let matches = create_cmd_args()
            .try_get_matches_from(["zune-gimsplit", "a.gim", "--no-containers", "--out-dir", "x"])
            .unwrap();
        let options = parse_options(&matches);

        assert!(options.split.images);
        assert!(!options.split.containers);
        assert_eq!(options.out_dir.as_deref(), Some(std::path::Path::new("x")));
    }
}
