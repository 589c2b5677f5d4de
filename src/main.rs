// Main entry point for the ParamQL CLI
// This provides an interactive shell that compiles loose query params
// into SQL WHERE fragments

use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use clap::Parser as ClapParser;
use paramql::{sql, ColumnType, ConditionBuilder, Dialect, Operator};
use std::io::{self, Write};

/// ParamQL - compile loose query params into SQL WHERE conditions
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target dialect: mysql or postgres
    #[arg(short, long, default_value = "mysql")]
    dialect: String,

    /// Compile a single "<column> <param>" pair and exit
    #[arg(short, long)]
    execute: Option<String>,

    /// Column type hint: numeric, textual, boolean or datetime
    #[arg(short = 'c', long)]
    column_type: Option<String>,

    /// Default operator applied when a value carries no prefix
    #[arg(short, long, default_value = "=")]
    operator: String,

    /// Compare text case-insensitively
    #[arg(short = 'i', long)]
    case_insensitive: bool,

    /// Treat params as date params
    #[arg(long)]
    date: bool,

    /// Also print the query-builder JSON form of each condition
    #[arg(short, long)]
    json: bool,

    /// Reference timezone offset for date params, e.g. +02:00
    #[arg(short, long, default_value = "+00:00")]
    tz: String,
}

/// The shell's mutable settings, adjusted with dot-commands
struct Session {
    builder: ConditionBuilder,
    default_operator: Operator,
    case_insensitive: bool,
    column_type: Option<ColumnType>,
    date_mode: bool,
    json: bool,
    tz: FixedOffset,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut session = Session {
        builder: ConditionBuilder::new(parse_dialect(&args.dialect)?),
        default_operator: Operator::from_token(&args.operator)
            .ok_or_else(|| anyhow!("Unknown operator: {}", args.operator))?,
        case_insensitive: args.case_insensitive,
        column_type: parse_column_type(&args.column_type.unwrap_or_default())?,
        date_mode: args.date,
        json: args.json,
        tz: parse_offset(&args.tz)?,
    };

    // If a pair was provided, compile it and exit
    if let Some(line) = args.execute {
        return session.compile(&line);
    }

    println!("╔════════════════════════════════════════════╗");
    println!("║          ParamQL Interactive Shell         ║");
    println!("║   Query Params to WHERE Clauses in Rust    ║");
    println!("╚════════════════════════════════════════════╝");
    println!();
    println!("Type '<column> <param>' or '.help' for help");
    println!("Type '.exit' to quit");
    println!();

    repl(&mut session)
}

/// REPL (Read-Eval-Print Loop) implementation
fn repl(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        // Print prompt
        print!("paramql> ");
        stdout.flush()?;

        // Read user input
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        // Handle special commands (starting with .)
        if input.starts_with('.') {
            match session.command(input) {
                Ok(true) => break,
                Ok(false) => continue,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    continue;
                }
            }
        }

        // Compile the param
        if let Err(e) = session.compile(input) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

impl Session {
    /// Compile one "<column> <param>" line and print the result
    fn compile(&self, line: &str) -> Result<()> {
        let (column, value) = match line.trim().split_once(char::is_whitespace) {
            Some((column, rest)) => (column, rest.trim()),
            None => return Err(anyhow!("Expected '<column> <param>'")),
        };

        let condition = if self.date_mode {
            self.builder
                .parse_date(column, value, self.default_operator, self.tz)?
        } else {
            self.builder.parse(
                column,
                value,
                self.default_operator,
                self.case_insensitive,
                self.column_type,
            )?
        };

        if condition.is_empty() {
            println!("(no constraint)");
        } else {
            println!("{}", sql::to_where_sql(&condition));
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&condition.to_param())?);
        }

        Ok(())
    }

    /// Handle a dot-command; returns true when the shell should exit
    fn command(&mut self, input: &str) -> Result<bool> {
        let mut words = input.split_whitespace();
        let command = words.next().unwrap_or(input);
        let argument = words.next().unwrap_or("");

        match command {
            ".exit" | ".quit" => {
                println!("Goodbye!");
                return Ok(true);
            }
            ".help" => print_help(),
            ".dialect" => {
                self.builder = ConditionBuilder::new(parse_dialect(argument)?);
                println!("Dialect set to {}", argument);
            }
            ".type" => {
                self.column_type = parse_column_type(argument)?;
                let shown = if argument.is_empty() { "auto" } else { argument };
                println!("Column type set to {}", shown);
            }
            ".op" => {
                self.default_operator = Operator::from_token(argument)
                    .ok_or_else(|| anyhow!("Unknown operator: {}", argument))?;
                println!("Default operator set to {}", self.default_operator.symbol());
            }
            ".ci" => {
                self.case_insensitive = parse_toggle(argument)?;
                println!("Case-insensitive: {}", self.case_insensitive);
            }
            ".date" => {
                self.date_mode = parse_toggle(argument)?;
                println!("Date mode: {}", self.date_mode);
            }
            ".json" => {
                self.json = parse_toggle(argument)?;
                println!("JSON output: {}", self.json);
            }
            ".tz" => {
                self.tz = parse_offset(argument)?;
                println!("Reference timezone set to {}", argument);
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type '.help' for help");
            }
        }
        Ok(false)
    }
}

fn parse_dialect(name: &str) -> Result<Dialect> {
    match name.to_lowercase().as_str() {
        "mysql" => Ok(Dialect::mysql()),
        "postgres" | "postgresql" | "pgsql" => Ok(Dialect::postgres()),
        _ => Err(anyhow!("Unknown dialect: {} (try mysql or postgres)", name)),
    }
}

fn parse_column_type(name: &str) -> Result<Option<ColumnType>> {
    match name.to_lowercase().as_str() {
        "" | "auto" | "none" => Ok(None),
        "numeric" => Ok(Some(ColumnType::Numeric)),
        "textual" | "text" => Ok(Some(ColumnType::Textual)),
        "boolean" | "bool" => Ok(Some(ColumnType::Boolean)),
        "datetime" | "date" => Ok(Some(ColumnType::DateTime)),
        _ => Err(anyhow!("Unknown column type: {}", name)),
    }
}

fn parse_toggle(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("Expected 'on' or 'off', got '{}'", value)),
    }
}

/// Parse a "+HH:MM" / "-HH:MM" offset into a fixed timezone
fn parse_offset(value: &str) -> Result<FixedOffset> {
    let (sign, rest) = match value.strip_prefix('+') {
        Some(rest) => (1, rest),
        None => match value.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, value),
        },
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid timezone offset: {}", value))?;
    let hours: i32 = hours.parse()?;
    let minutes: i32 = minutes.parse()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("Invalid timezone offset: {}", value))
}

/// Print help information
fn print_help() {
    println!("╔════════════════════════════════════════════╗");
    println!("║                ParamQL Help                ║");
    println!("╚════════════════════════════════════════════╝");
    println!();
    println!("Input:");
    println!("  <column> <param>   Compile a param into a WHERE fragment");
    println!();
    println!("Special Commands:");
    println!("  .help              Show this help message");
    println!("  .dialect <name>    Switch dialect (mysql, postgres)");
    println!("  .type <type>       Column type (numeric, textual, boolean, datetime, auto)");
    println!("  .op <operator>     Default operator (=, !=, <, <=, >, >=, not)");
    println!("  .ci on|off         Case-insensitive comparison");
    println!("  .date on|off       Treat params as date params");
    println!("  .json on|off       Also print the query-builder JSON form");
    println!("  .tz <offset>       Reference timezone, e.g. +02:00");
    println!("  .exit, .quit       Exit the shell");
    println!();
    println!("Param Examples:");
    println!();
    println!("  Lists collapse to IN:");
    println!("    status active,pending");
    println!();
    println!("  Leading glue and operator prefixes:");
    println!("    id and,!=1,!=2");
    println!("    age and,>=21,<65");
    println!();
    println!("  Wildcards become LIKE:");
    println!("    title *rust*");
    println!();
    println!("  Empty markers:");
    println!("    email :empty:");
    println!("    email :notempty:");
    println!();
    println!("Notes:");
    println!("  - Escape literal commas and asterisks with a backslash");
    println!("  - The param 'not' on its own means 'no constraint'");
    println!();
}
