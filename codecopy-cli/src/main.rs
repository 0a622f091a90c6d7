// Command-line interface for codecopy
//
// This binary highlights source files and copies them to the clipboard as rich text, so they paste
// into word processors with colors and indentation intact.
//
// The heavy lifting lives in codecopy-core. This crate wires the core to files, stdin, the
// configuration loader and the system clipboard.
//
// Usage:
//  codecopy highlight <file|-> [--language <id>] [--theme <name>] [--line-numbers] [--standalone]
//  codecopy copy <file|-> [--language <id>] [--mode <mode>] [--tab-size <n>] [--stdout [--json]]
//  codecopy languages [--json]
//  codecopy themes
//  codecopy css [<theme>]
//
// The language is auto-detected from the file extension, while being overridable by an explicit
// --language flag.
//
// Extra Parameters:
//
// Configuration values can be overridden with --extra-<key> <value>. Dotted keys address the
// configuration file directly (--extra-highlighting.indentation_size 4), a few short names are
// accepted as well (--extra-theme, --extra-print-width, --extra-fold-umlauts).

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use codecopy_config::{CodecopyConfig, Loader, PROJECT_CONFIG_FILE};
use codecopy_core::{
    CodeFormatter, CopyReport, FormatError, HighlightService, IndentationMode, LanguageRegistry,
    MemoryClipboard, Notifier, PrettierFormatter, RecordingNotifier, SheetStyleResolver,
    SyntectHighlighter, SystemClipboard,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

const STDIN_PATH: &str = "-";

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Source file, or - for stdin")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn language_arg() -> Arg {
    Arg::new("language")
        .long("language")
        .short('l')
        .help("Language id or alias (auto-detected from the file extension if not specified)")
        .value_hint(ValueHint::Other)
}

fn theme_arg() -> Arg {
    Arg::new("theme")
        .long("theme")
        .short('t')
        .help("Highlighting theme (see `codecopy themes`)")
        .value_hint(ValueHint::Other)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .action(ArgAction::SetTrue)
}

fn build_cli() -> Command {
    Command::new("codecopy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copy syntax-highlighted code as rich text")
        .long_about(
            "codecopy highlights source code and copies it to the clipboard as HTML plus a\n\
            plain-text fallback. The HTML carries inline styles, tab stops and preserved\n\
            indentation, so it pastes faithfully into word processors.\n\n\
            Configuration:\n  \
            Defaults are layered with ./codecopy.toml, then --config <path>, then\n  \
            --extra-<key> <value> overrides and the command flags.\n\n\
            Examples:\n  \
            codecopy copy src/main.rs                       # Copy to the clipboard\n  \
            codecopy copy main.js --mode tabs --tab-size 4  # Tab indentation for Word\n  \
            codecopy copy main.js --stdout --json           # Print both representations\n  \
            codecopy highlight main.py --standalone > out.html",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a codecopy.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for trace output)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("highlight")
                .about("Print highlighted HTML")
                .long_about(
                    "Highlight a source file and print the output container as HTML.\n\n\
                    With --standalone a complete page is printed, including the theme\n\
                    stylesheet.\n\n\
                    Examples:\n  \
                    codecopy highlight lib.rs                        # HTML fragment\n  \
                    codecopy highlight lib.rs --standalone > lib.html",
                )
                .arg(input_arg())
                .arg(language_arg())
                .arg(theme_arg())
                .arg(flag("line-numbers", "Prefix every line with its number"))
                .arg(flag("no-format", "Skip the external formatter"))
                .arg(flag("standalone", "Print a complete HTML page with the theme CSS")),
        )
        .subcommand(
            Command::new("copy")
                .about("Copy highlighted code to the clipboard")
                .long_about(
                    "Run the whole pipeline and write HTML and plain text to the clipboard\n\
                    as one item.\n\n\
                    Indentation modes:\n  \
                    - tabs:   tab characters with word-processor tab stops\n  \
                    - spaces: non-breaking spaces (default)\n  \
                    - nbsp:   non-breaking spaces\n\n\
                    With --stdout nothing is written to the clipboard. The HTML is printed,\n\
                    followed by an empty line and the plain text, or a JSON object with\n\
                    both when --json is given.\n\n\
                    Examples:\n  \
                    codecopy copy main.js\n  \
                    cat main.js | codecopy copy - --language javascript\n  \
                    codecopy copy main.js --stdout --json",
                )
                .arg(input_arg())
                .arg(language_arg())
                .arg(theme_arg())
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .help("Indentation mode")
                        .value_parser(["tabs", "spaces", "nbsp"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("tab-size")
                        .long("tab-size")
                        .help("Columns per indentation level (1 to 8)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(flag("line-numbers", "Prefix every line with its number"))
                .arg(flag("no-format", "Skip the external formatter"))
                .arg(flag("stdout", "Print the clipboard contents instead of copying"))
                .arg(
                    flag("json", "With --stdout, print a JSON object with html and text")
                        .requires("stdout"),
                )
                .arg(
                    flag("dry-run", "Run the copy against an in-memory clipboard")
                        .conflicts_with("stdout"),
                ),
        )
        .subcommand(
            Command::new("languages")
                .about("List the known languages")
                .arg(flag("json", "Print the language table as JSON")),
        )
        .subcommand(Command::new("themes").about("List the bundled highlighting themes"))
        .subcommand(
            Command::new("css")
                .about("Print the stylesheet of a theme")
                .long_about(
                    "Outputs the CSS used to resolve colors and fonts for a theme.\n\n\
                    Examples:\n  \
                    codecopy css                     # Configured theme\n  \
                    codecopy css \"Solarized (dark)\" > solarized.css",
                )
                .arg(
                    Arg::new("theme")
                        .help("Theme name (defaults to the configured theme)")
                        .index(1)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);
    let matches = build_cli().get_matches_from(&cleaned_args);

    init_logging(matches.get_count("verbose"));

    let mut config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &mut extra_params,
    );
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        log::warn!("ignoring unknown parameter --extra-{key}");
    }

    match matches.subcommand() {
        Some(("highlight", sub_matches)) => {
            apply_flag_overrides(&mut config, sub_matches);
            handle_highlight_command(sub_matches, &config);
        }
        Some(("copy", sub_matches)) => {
            apply_flag_overrides(&mut config, sub_matches);
            handle_copy_command(sub_matches, &config);
        }
        Some(("languages", sub_matches)) => {
            handle_languages_command(sub_matches.get_flag("json"));
        }
        Some(("themes", _)) => {
            handle_themes_command(&config);
        }
        Some(("css", sub_matches)) => {
            let theme = sub_matches
                .get_one::<String>("theme")
                .cloned()
                .unwrap_or_else(|| config.theme.name.clone());
            handle_css_command(&theme);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbosity {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.format_timestamp_millis().init();
}

/// Source code and the language it should be highlighted as.
struct SourceInput {
    code: String,
    language: String,
}

fn read_source(sub_matches: &ArgMatches, registry: &LanguageRegistry) -> SourceInput {
    let input = sub_matches
        .get_one::<String>("input")
        .expect("input is required");

    let code = if input == STDIN_PATH {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        });
        buffer
    } else {
        fs::read_to_string(input).unwrap_or_else(|e| {
            eprintln!("Error reading file '{input}': {e}");
            std::process::exit(1);
        })
    };

    let language = match sub_matches.get_one::<String>("language") {
        Some(language) => language.clone(),
        None => match registry.detect_from_filename(input) {
            Some(detected) => detected.id.clone(),
            None => {
                eprintln!("Error: Could not detect language from filename '{input}'");
                eprintln!("Please specify --language explicitly");
                std::process::exit(1);
            }
        },
    };

    SourceInput { code, language }
}

fn build_service<N: Notifier>(
    config: &CodecopyConfig,
    notifier: N,
) -> HighlightService<SyntectHighlighter, N> {
    let settings = config.highlighting_settings().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    });
    HighlightService::with_parts(
        SyntectHighlighter::new(),
        LanguageRegistry::with_defaults(),
        notifier,
    )
    .with_settings(settings)
    .with_sanitize_options((&config.sanitize).into())
    .with_char_width_px(config.layout.char_width_px)
    .with_print_width(config.formatter.print_width)
}

fn resolve_formatter(config: &CodecopyConfig) -> Result<PrettierFormatter, FormatError> {
    match &config.formatter.command {
        Some(command) => Ok(PrettierFormatter::with_binary(command)),
        None => PrettierFormatter::locate(),
    }
}

/// Format and highlight the input, returning highlighted HTML.
fn highlight_source<N: Notifier>(
    service: &HighlightService<SyntectHighlighter, N>,
    config: &CodecopyConfig,
    source: &SourceInput,
) -> String {
    let code = if service.settings().enable_formatting {
        match resolve_formatter(config) {
            Ok(formatter) => format_with(service, &formatter, source),
            Err(err) => {
                log::debug!("formatting skipped: {err}");
                source.code.clone()
            }
        }
    } else {
        source.code.clone()
    };
    service.highlight_code(&code, &source.language)
}

fn format_with<N: Notifier, F: CodeFormatter>(
    service: &HighlightService<SyntectHighlighter, N>,
    formatter: &F,
    source: &SourceInput,
) -> String {
    let outcome = service.format(formatter, &source.code, &source.language);
    if !outcome.formatting_successful {
        eprintln!("Warning: formatting failed, using the code as is");
    }
    outcome.code
}

/// Theme stylesheet and a resolver evaluating it.
fn theme_resolver<N: Notifier>(
    service: &HighlightService<SyntectHighlighter, N>,
    theme: &str,
) -> (String, SheetStyleResolver) {
    let css = service.highlighter().theme_css(theme).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("Use `codecopy themes` to list the available themes");
        std::process::exit(1);
    });
    let resolver = SheetStyleResolver::from_css(&css);
    (css, resolver)
}

fn report_notifications(notifier: &RecordingNotifier) {
    for notification in notifier.take() {
        eprintln!("{notification}");
    }
}

/// Handle the highlight command
fn handle_highlight_command(sub_matches: &ArgMatches, config: &CodecopyConfig) {
    let notifier = RecordingNotifier::new();
    let service = build_service(config, &notifier);
    let source = read_source(sub_matches, service.registry());

    let html = highlight_source(&service, config, &source);
    let output = service.render_output(&html);
    let container = output.container_html().unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    report_notifications(&notifier);

    if sub_matches.get_flag("standalone") {
        let (css, _) = theme_resolver(&service, &config.theme.name);
        println!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{css}</style>\n</head>\n<body>\n{container}\n</body>\n</html>"
        );
    } else {
        println!("{container}");
    }
}

/// Handle the copy command
fn handle_copy_command(sub_matches: &ArgMatches, config: &CodecopyConfig) {
    let notifier = RecordingNotifier::new();
    let service = build_service(config, &notifier);
    let source = read_source(sub_matches, service.registry());

    let output = service.render_output(&highlight_source(&service, config, &source));
    let (_, resolver) = theme_resolver(&service, &config.theme.name);

    if sub_matches.get_flag("stdout") {
        let payload = service
            .prepare_clipboard_payload(output.document(), &resolver)
            .unwrap_or_else(|e| {
                report_notifications(&notifier);
                eprintln!("Copy failed: {e}");
                std::process::exit(1);
            });
        report_notifications(&notifier);
        if sub_matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&payload).unwrap_or_else(|e| {
                eprintln!("Serialization error: {e}");
                std::process::exit(1);
            });
            println!("{json}");
        } else {
            println!("{}\n\n{}", payload.html, payload.text);
        }
        return;
    }

    let report = if sub_matches.get_flag("dry-run") {
        let mut clipboard = MemoryClipboard::new();
        service.copy_to_clipboard(output.document(), &resolver, &mut clipboard)
    } else {
        let mut clipboard = SystemClipboard::new().unwrap_or_else(|e| {
            report_notifications(&notifier);
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
        service.copy_to_clipboard(output.document(), &resolver, &mut clipboard)
    };
    report_notifications(&notifier);

    if let CopyReport::Failed { error } = report {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

/// Handle the languages command
fn handle_languages_command(json: bool) {
    let registry = LanguageRegistry::with_defaults();
    let languages = registry.list();
    if json {
        let output = serde_json::to_string_pretty(&languages).unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
        println!("{output}");
        return;
    }

    for language in languages {
        let aliases = if language.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", language.aliases.join(", "))
        };
        println!("  {:<20}{}{aliases}", language.id, language.title);
    }
}

/// Handle the themes command
fn handle_themes_command(config: &CodecopyConfig) {
    let highlighter = SyntectHighlighter::new();
    for name in highlighter.theme_names() {
        let marker = if name == config.theme.name { "*" } else { " " };
        println!("{marker} {name}");
    }
}

/// Handle the css command
fn handle_css_command(theme: &str) {
    let css = SyntectHighlighter::new().theme_css(theme).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    print!("{css}");
}

/// Load the configuration: defaults, ./codecopy.toml, --config, then dotted
/// `--extra-<section>.<key>` overrides, which are consumed from `extra_params`.
fn load_cli_config(
    explicit_path: Option<&str>,
    extra_params: &mut HashMap<String, String>,
) -> CodecopyConfig {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let dotted: Vec<String> = extra_params
        .keys()
        .filter(|key| key.contains('.'))
        .cloned()
        .collect();
    for key in dotted {
        if let Some(value) = extra_params.remove(&key) {
            loader = loader.set_override(&key, value).unwrap_or_else(|err| {
                eprintln!("Invalid override --extra-{key}: {err}");
                std::process::exit(1);
            });
        }
    }

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut CodecopyConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["theme"]) {
        config.theme.name = raw;
    }
    if let Some(raw) = take_override(extra_params, &["mode", "indentation-mode"]) {
        config.highlighting.indentation_mode = parse_mode_arg("indentation-mode", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["tab-size", "indentation-size"]) {
        config.highlighting.indentation_size = parse_usize_arg("indentation-size", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["format", "formatting"]) {
        config.highlighting.enable_formatting = parse_bool_arg("formatting", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["linum", "line-numbers"]) {
        config.highlighting.show_line_numbers = parse_bool_arg("line-numbers", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["print-width"]) {
        config.formatter.print_width = parse_usize_arg("print-width", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["prettier", "formatter-command"]) {
        config.formatter.command = Some(PathBuf::from(raw));
    }
    if let Some(raw) = take_override(extra_params, &["fold-umlauts"]) {
        config.sanitize.fold_umlauts = parse_bool_arg("fold-umlauts", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["char-width"]) {
        config.layout.char_width_px = raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid number '{raw}' for --extra-char-width");
            std::process::exit(1);
        });
    }
}

/// Dedicated command flags win over every configuration layer.
fn apply_flag_overrides(config: &mut CodecopyConfig, sub_matches: &ArgMatches) {
    if let Some(theme) = sub_matches.get_one::<String>("theme") {
        config.theme.name = theme.clone();
    }
    if sub_matches.get_flag("line-numbers") {
        config.highlighting.show_line_numbers = true;
    }
    if sub_matches.get_flag("no-format") {
        config.highlighting.enable_formatting = false;
    }
    if let Ok(Some(mode)) = sub_matches.try_get_one::<String>("mode") {
        config.highlighting.indentation_mode = parse_mode_arg("mode", mode);
    }
    if let Ok(Some(size)) = sub_matches.try_get_one::<usize>("tab-size") {
        config.highlighting.indentation_size = *size;
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

fn parse_usize_arg(flag: &str, raw: &str) -> usize {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid number '{raw}' for --extra-{flag}");
        std::process::exit(1);
    })
}

fn parse_mode_arg(flag: &str, raw: &str) -> IndentationMode {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("{e} (--{flag})");
        std::process::exit(1);
    })
}
