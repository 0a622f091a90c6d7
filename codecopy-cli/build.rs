use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the indentation modes accepted by `codecopy copy --mode`.
// Build scripts can't access src/ modules, so they are duplicated here.
const INDENTATION_MODES: &[&str] = &["tabs", "spaces", "nbsp"];

fn source_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("input")
                .help("Source file, or - for stdin")
                .required(true)
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("theme")
                .long("theme")
                .short('t')
                .value_hint(ValueHint::Other),
        )
        .arg(Arg::new("line-numbers").long("line-numbers").action(ArgAction::SetTrue))
        .arg(Arg::new("no-format").long("no-format").action(ArgAction::SetTrue))
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("codecopy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copy syntax-highlighted code as rich text")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            source_command("highlight", "Print highlighted HTML")
                .arg(Arg::new("standalone").long("standalone").action(ArgAction::SetTrue)),
        )
        .subcommand(
            source_command("copy", "Copy highlighted code to the clipboard")
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            INDENTATION_MODES,
                        )),
                )
                .arg(Arg::new("tab-size").long("tab-size"))
                .arg(Arg::new("stdout").long("stdout").action(ArgAction::SetTrue))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
                .arg(Arg::new("dry-run").long("dry-run").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("languages")
                .about("List the known languages")
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("themes").about("List the bundled highlighting themes"))
        .subcommand(
            Command::new("css")
                .about("Print the stylesheet of a theme")
                .arg(Arg::new("theme").index(1)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "codecopy", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "codecopy", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "codecopy", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
