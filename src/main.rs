use std::{env, io::Write, process::ExitCode};

use lontar::{
    api::{db_info, list_tables, run_query},
    art::welcome_message,
    executor::query::QueryResult,
    storage::{database::DatabaseReader, schema::SchemaResolver},
    utils::log::DecodeLog,
};
use rustyline::{DefaultEditor, Result, error::ReadlineError};
use serde::Serialize;

const HISTORY_FILE: &str = ".lontar_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Table,
    Json,
}

struct Session {
    reader: DatabaseReader,
    mode: OutputMode,
    show_logs: bool,
}

fn read_multiline_command(rl: &mut DefaultEditor) -> Result<String> {
    let mut input = String::new();
    let mut prompt = "lontar> ".to_string();

    loop {
        let line = rl.readline(&prompt)?;
        let trimmed_line = line.trim_end();

        // Trailing backslash continues the command on the next line
        if let Some(head) = trimmed_line.strip_suffix('\\') {
            input.push_str(head);
            input.push(' ');
            prompt = "     -> ".to_string();
        } else {
            input.push_str(trimmed_line);
            break;
        }
    }

    Ok(input)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Error: {}", e),
    }
}

fn print_table(result: &QueryResult) {
    if result.columns.is_empty() {
        return;
    }

    let cells: Vec<Vec<String>> = result
        .values
        .iter()
        .map(|row| row.iter().map(|value| value.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
            .collect::<Vec<_>>()
            .join("|")
    };
    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");

    println!("{}", render(&result.columns));
    println!("{}", separator);
    for row in &cells {
        println!("{}", render(row));
    }
}

fn print_result(session: &Session, result: &QueryResult) {
    match session.mode {
        OutputMode::Json => {
            if session.show_logs {
                print_json(result);
            } else {
                let mut result = result.clone();
                result.logs.clear();
                print_json(&result);
            }
        }
        OutputMode::Table => {
            print_table(result);
            println!("{}", result.message);
            if session.show_logs {
                for line in &result.logs {
                    println!("  {}", line);
                }
            }
        }
    }
}

fn print_schema(session: &Session, table: Option<&str>) {
    let log = DecodeLog::disabled();
    match SchemaResolver::new(&session.reader).entries(&log) {
        Ok(entries) => {
            for entry in entries
                .iter()
                .filter(|entry| table.is_none_or(|name| entry.table_name == name))
            {
                println!("{};", entry.sql);
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn print_help() {
    println!(
        r#"
Available commands:
  .dbinfo              - Page size and number of catalog entries
  .tables              - List user tables
  .schema [table]      - Show CREATE statements
  .mode table|json     - Choose the output format
  .logs on|off         - Show the decode trace after each query
  .help                - Show this help message
  .clear               - Clear the screen
  .exit, .quit         - Leave the shell

Queries:
  SELECT * FROM <table> [LIMIT <n>]
  SELECT <col>, ... FROM <table> WHERE <col> = '<value>'

Use '\' at the end of a line for multiline input.
Use Up/Down arrows to navigate command history.
"#
    );
}

fn process_command(session: &mut Session, command: &str) -> bool {
    let cmd = command.trim();
    let mut words = cmd.split_whitespace();
    let head = words.next().unwrap_or_default().to_lowercase();
    let arg = words.next();

    match head.as_str() {
        "" => {}
        ".exit" | ".quit" => {
            println!("Goodbye!");
            return false;
        }
        ".help" => print_help(),
        ".clear" => {
            print!("\x1B[2J\x1B[1;1H");
            let _ = std::io::stdout().flush();
        }
        ".dbinfo" => {
            let log = DecodeLog::disabled();
            let info = db_info(&session.reader, &log);
            match session.mode {
                OutputMode::Json => print_json(&info),
                OutputMode::Table => {
                    println!("database page size:  {}", info.page_size);
                    match info.number_of_tables {
                        Some(count) => println!("number of tables:    {}", count),
                        None => println!("number of tables:    unknown"),
                    }
                }
            }
        }
        ".tables" => {
            let log = DecodeLog::disabled();
            match list_tables(&session.reader, &log) {
                Ok(response) => match session.mode {
                    OutputMode::Json => print_json(&response),
                    OutputMode::Table => println!("{}", response.tables.join("  ")),
                },
                Err(e) => println!("Error: {}", e),
            }
        }
        ".schema" => print_schema(session, arg),
        ".mode" => match arg {
            Some("table") => session.mode = OutputMode::Table,
            Some("json") => session.mode = OutputMode::Json,
            _ => println!("Usage: .mode table|json"),
        },
        ".logs" => match arg {
            Some("on") => session.show_logs = true,
            Some("off") => session.show_logs = false,
            _ => println!("Usage: .logs on|off"),
        },
        dot if dot.starts_with('.') => {
            println!("Unknown command: {}. Type .help for commands.", dot);
        }
        _ => {
            let result = run_query(&session.reader, cmd);
            print_result(session, &result);
        }
    }

    true
}

fn main() -> ExitCode {
    println!("{}", welcome_message("LONTAR"));

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: lontar <database-file>");
        return ExitCode::FAILURE;
    };

    let reader = match DatabaseReader::from_path(&path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    println!("Opened {} ({} pages).", path, reader.page_count());

    let mut session = Session {
        reader,
        mode: OutputMode::Table,
        show_logs: false,
    };

    match repl(&mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn repl(session: &mut Session) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    // No history yet on first run.
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let command = input.trim().to_string();

                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                    if !process_command(session, &command) {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_FILE)
}
