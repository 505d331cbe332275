#[macro_use]
extern crate log;
#[macro_use]
extern crate clap;

mod cli;
mod convert;
mod info;
mod logger;

use dotxsi::errors::Error;
use std::process::exit;

fn main() {
    let matches = cli::app().get_matches();

    logger::init(cli::log_level(&matches));

    let res = match matches.subcommand() {
        ("convert", Some(m)) => convert::main(m),
        ("info", Some(m)) => info::main(m),
        ("version", _) => {
            print_version_info();
            Ok(())
        }
        _ => {
            error!("missing subcommand; try --help");
            exit(2);
        }
    };

    if let Err(e) = res {
        report(&e);
        exit(1);
    }
}

fn report(e: &Error) {
    error!("{}", e);
    for cause in e.iter().skip(1) {
        error!("caused by: {}", cause);
    }
}

fn print_version_info() {
    println!("dotxsi {}", crate_version!());
    println!("build commit: {}", include_str!(concat!(env!("OUT_DIR"), "/git-commit")));
    println!("compile date: {}", include_str!(concat!(env!("OUT_DIR"), "/compile-date")));
}
