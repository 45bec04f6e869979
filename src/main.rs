//! Crane CLI - run a fleet of containers from a Cranefile

use clap::Parser;
use crane::cli::{Args, SubCommand};
use crane::context::sweep_id_files;
use crane::engine::actions::create_project;
use crane::process::{ElevatedExecutor, SshShell};
use crane::{execute_command, format_output, Context, OutputFormat};

fn main() {
    let args = Args::parse();
    crane::logging::init(args.debug);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> crane::Result<()> {
    let output_format = OutputFormat::from_json_flag(args.json);

    let result = match args.command {
        // Nothing to load yet: this is what writes the Cranefile.
        SubCommand::Create => {
            sweep_id_files(&args.workdir)?;
            create_project(&args.workdir)?
        }
        ref command => {
            let executor = ElevatedExecutor::new(&args.elevate, &args.runtime, &args.workdir);
            let shell = SshShell;
            let ctx = Context::load(&args.workdir, &executor, &shell)?;
            execute_command(command, &ctx)?
        }
    };

    let output = format_output(&result, output_format);
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
