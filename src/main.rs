use clap::{App, Arg, ArgMatches};
use num_traits::ToPrimitive;
use plc::analyzer::Analyzer;
use plc::ast::AstPrinter;
use plc::interpreter::Interpreter;
use plc::value::Value;
use plc::{parser, scanner, Error};
use std::fs;
use std::io::{self, Read};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// https://www.freebsd.org/cgi/man.cgi?query=sysexits
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;
const EX_SOFTWARE: i32 = 70;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = App::new("plc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Checks and runs programs written in LET/DEF source form")
        .arg(
            Arg::with_name("SCRIPT")
                .help("Program to run; reads standard input when absent or '-'")
                .index(1),
        )
        .arg(
            Arg::with_name("tokens")
                .long("tokens")
                .help("Print the token stream and stop"),
        )
        .arg(
            Arg::with_name("ast")
                .long("ast")
                .conflicts_with("tokens")
                .help("Print the syntax tree and stop"),
        )
        .arg(
            Arg::with_name("check")
                .long("check")
                .conflicts_with_all(&["tokens", "ast"])
                .help("Analyze the program without running it"),
        )
        .get_matches();

    let contents = match read_source(matches.value_of("SCRIPT")) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(EX_NOINPUT);
        }
    };
    match run(&contents, &matches) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(if err.is_static() {
                EX_DATAERR
            } else {
                EX_SOFTWARE
            });
        }
    }
}

fn read_source(path: Option<&str>) -> io::Result<String> {
    match path {
        None | Some("-") => {
            let mut contents = String::new();
            io::stdin().read_to_string(&mut contents)?;
            Ok(contents)
        }
        Some(path) => fs::read_to_string(path),
    }
}

/// Runs the stages requested on the command line and returns the exit code.
fn run(source: &str, matches: &ArgMatches) -> Result<i32, Error> {
    let tokens = scanner::scan_tokens(source)?;
    if matches.is_present("tokens") {
        for token in &tokens {
            println!("{:>6} {:<10} {}", token.offset, token.tokentype.to_string(), token.literal);
        }
        return Ok(0);
    }
    let ast = parser::parse(&tokens)?;
    if matches.is_present("ast") {
        println!("{}", AstPrinter {}.print(&ast));
        return Ok(0);
    }
    let mut analyzer = Analyzer::new();
    analyzer.analyze(&ast)?;
    if matches.is_present("check") {
        return Ok(0);
    }
    let mut interpreter = Interpreter::new();
    let value = interpreter.interpret(&ast)?;
    debug!(%value, "main returned");
    Ok(match value {
        Value::Integer(x) => x.to_i32().unwrap_or(EX_SOFTWARE),
        _ => EX_SOFTWARE,
    })
}
