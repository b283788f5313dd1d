use bluebook::config::RunConfig;
use bluebook::http::ReqwestTransport;
use bluebook::runner;
use clap::{Arg, ArgMatches, Command};
use std::fs;
use std::path::Path;
use std::process;
use std::rc::Rc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let file_arg = Arg::new("file")
        .help("The BCL file to load")
        .value_name("FILE")
        .required(true)
        .index(1);

    let matches = Command::new("bluebook")
        .about("Runs HTTP API tests written in BCL")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List the tests of a file")
                .arg(file_arg.clone()),
        )
        .subcommand(
            Command::new("run")
                .about("Run the tests of a file")
                .arg(file_arg)
                .arg(
                    Arg::new("test")
                        .short('t')
                        .long("test")
                        .value_name("KEY")
                        .help("Run only the test with this reference key"),
                ),
        )
        .get_matches();

    let code = match matches.subcommand() {
        Some(("list", args)) => {
            let (source, path) = read_source(args);
            runner::list(&source, Some(path.as_str()))
        }
        Some(("run", args)) => {
            let (source, path) = read_source(args);
            let transport = match ReqwestTransport::new() {
                Ok(transport) => transport,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            let config = RunConfig::default().with_filter(args.get_one::<String>("test").cloned());
            runner::run(&source, Some(path.as_str()), Rc::new(transport), config)
        }
        _ => 1,
    };
    process::exit(code);
}

fn read_source(args: &ArgMatches) -> (String, String) {
    let path = match args.get_one::<String>("file") {
        Some(path) => Path::new(path),
        None => process::exit(1),
    };

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => (source, path.display().to_string()),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
