// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/main.rs

// Command line driver: reads a program from a file or stdin and prints
// the result of each top level expression.

// <>

use rivet::Interpreter;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

const USAGE: &str = "usage: rivet [FILE]

Evaluates a Scheme program read from FILE, or from standard input when
FILE is absent or '-', printing the value of each top level expression.

Set RUST_LOG (e.g. RUST_LOG=trace) for diagnostic output on stderr.";

fn main() {
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("logger setup failed: {}", e);
    }

    // cargo run <filename> to run a file, no argument for stdin
    let args: Vec<String> = env::args().skip(1).collect();
    let path = match args.as_slice() {
        [] => None,
        [flag] if flag == "--help" || flag == "-h" => {
            println!("{}", USAGE);
            return;
        }
        [path] if path == "-" => None,
        [path] => Some(path.as_str()),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let code = match read_input(path) {
        Ok(code) => code,
        Err(e) => {
            log::error!("could not read input: {}", e);
            eprintln!("rivet: {}: {}", path.unwrap_or("<stdin>"), e);
            process::exit(1);
        }
    };

    let mut interp = Interpreter::new();

    if let Err(e) = interp.run_source(&code, |line| println!("{}", line)) {
        println!("{}", e);
        log::error!("{:?}", e);
        interp.exit_with(1);
    }

    log::info!(
        "finished with {} values in region",
        interp.region().stats().values
    );
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut code = String::new();
            io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}
