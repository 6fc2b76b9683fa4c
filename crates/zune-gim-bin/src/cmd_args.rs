/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, Command};

static AFTER_HELP: &str = "Outputs are named after the input, <stem>-<n>.png for images and \
<stem>-<n>.gim for pictures, numbered from 1 in the order they are found.";

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zune-gimsplit")
        .about("Split GIM containers into PNG images and standalone pictures")
        .after_help(AFTER_HELP)
        .author("Caleb Etemesi")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(Arg::new("in")
            .help("GIM file to split")
            .value_parser(value_parser!(OsString))
            .required(true))
        .arg(Arg::new("out-dir")
            .short('o')
            .long("out-dir")
            .help("Directory to write outputs to, defaults to the input's directory")
            .value_parser(value_parser!(OsString)))
        .arg(Arg::new("probe")
            .long("probe")
            .help("Print the block tree as JSON and exit")
            .action(ArgAction::SetTrue))
        .args(add_logging_options())
        .args(add_settings())
}

fn add_logging_options() -> [Arg; 4] {
    [
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display debug information and higher"),
        Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display very verbose information, every block walked"),
        Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display warnings and errors"),
        Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display information about the split")
    ]
}

fn add_settings() -> Vec<Arg> {
    let mut args = [
        Arg::new("max-width")
            .long("max-width")
            .help_heading("Image Settings")
            .help("Maximum width of images allowed")
            .default_value("16384")
            .value_parser(value_parser!(usize)),
        Arg::new("max-height")
            .long("max-height")
            .help_heading("Image Settings")
            .help("Maximum height of images allowed")
            .default_value("16384")
            .value_parser(value_parser!(usize)),
        Arg::new("no-images")
            .long("no-images")
            .help_heading("Image Settings")
            .help("Do not write PNG images")
            .action(ArgAction::SetTrue),
        Arg::new("no-containers")
            .long("no-containers")
            .help_heading("Image Settings")
            .help("Do not write standalone GIM pictures")
            .action(ArgAction::SetTrue)
    ];
    // list them in order
    args.sort_unstable_by(|x, y| x.get_id().cmp(y.get_id()));

    args.to_vec()
}

#[cfg(test)]
mod tests {
    use super::create_cmd_args;

    #[test]
    fn arguments_are_consistent() {
        create_cmd_args().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let matches = create_cmd_args()
            .try_get_matches_from(["zune-gimsplit", "a.gim", "-o", "out", "--no-images"])
            .unwrap();

        assert!(matches.get_flag("no-images"));
        assert!(!matches.get_flag("no-containers"));
        assert_eq!(matches.get_one::<usize>("max-width"), Some(&16384));
    }
}
