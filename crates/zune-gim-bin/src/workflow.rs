/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::fs::read;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::{debug, error, info};
use zune_core::bytestream::{ZByteIoError, ZCursor};
use zune_gim::{probe_gim, GimDecoder, GimDecoderErrors};

use crate::cmd_parsers::get_decoder_options;
use crate::cmd_parsers::global_options::CmdOptions;
use crate::file_io::FileSink;
use crate::probe_files::probe_input_file;

/// Output directory and file stem for `in_file`
fn output_location(in_file: &Path, out_dir: Option<&Path>) -> (PathBuf, String) {
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => in_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };
    let stem = in_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gim".to_string());

    (dir, stem)
}

pub(crate) fn create_and_exec_workflow_from_cmd(
    args: &ArgMatches, cmd_opts: &CmdOptions
) -> Result<(), GimDecoderErrors> {
    let in_file = args
        .get_one::<OsString>("in")
        .ok_or(GimDecoderErrors::GenericStatic("No input file"))?;

    info!("Reading {:?}", in_file);
    let data = read(in_file).map_err(ZByteIoError::from)?;

    if cmd_opts.probe {
        return probe_input_file(in_file, &data);
    }

    if !probe_gim(&data) {
        error!("{:?} is not a GIM file, it does not start with MIG.00.1PSP", in_file);
        return Err(GimDecoderErrors::InvalidMagicBytes);
    }

    let (out_dir, stem) = output_location(Path::new(in_file), cmd_opts.out_dir.as_deref());

    if !out_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&out_dir).map_err(ZByteIoError::from)?;
    }

    let mut sink = FileSink::new(out_dir, stem);
    let mut decoder = GimDecoder::new_with_options(ZCursor::new(&data[..]), get_decoder_options(args));

    let next = decoder.split(&mut sink, &cmd_opts.split, 1)?;

    info!("Wrote {} files", next - 1);
    for path in sink.written() {
        debug!("{:?}", path);
    }
    Ok(())
}
