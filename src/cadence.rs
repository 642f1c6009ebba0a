use std::process;

#[cfg(feature = "repl")]
use crate::repl::Repl;
use crate::{context::CadenceContext, domain::Source};

/// The entrypoint to the Cadence executable. Supports script mode or REPL mode.
pub struct Cadence;

impl Cadence {
    pub fn run_script(filepath: &str) {
        let source = Source::from_path(filepath)
            .map_err(|err| {
                eprintln!("{err}");
                process::exit(1);
            })
            .unwrap();

        if let Err(err) = CadenceContext::new(source).run() {
            eprintln!("{err}");
            process::exit(1);
        }
    }

    #[cfg(feature = "repl")]
    pub fn run_repl() {
        Repl::default().run();
    }
}
