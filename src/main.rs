use std::{env, process};

use cadence::Cadence;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        #[cfg(feature = "repl")]
        1 => Cadence::run_repl(),
        #[cfg(not(feature = "repl"))]
        1 => {
            eprintln!("Must enable 'repl' feature flag!");
            process::exit(1);
        }
        2 => Cadence::run_script(&args[1]),
        _ => {
            eprintln!("Usage: cadence [<filename>]");
            process::exit(1);
        }
    }
}
