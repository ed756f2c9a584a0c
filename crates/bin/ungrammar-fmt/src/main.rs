//! Command line formatter for ungrammar files.
//!
//! Prints the formatted grammar to stdout, or with `--check` reports
//! problems and exits with a failure when the input is not formatted.

use ungrammar_fmt::lib_main;
use ungrammar_lang::log;

fn main() {
    if cfg!(debug_assertions) | cfg!(test) {
        colog::default_builder()
            .filter_level(log::LevelFilter::Trace)
            .init();
    } else {
        colog::default_builder().init();
    }

    if let Err(e) = lib_main() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
