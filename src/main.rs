mod ast_printer;
mod environment;
mod errors;
mod expr;
mod stmt;
mod interpreter;
mod lox_callable;
mod lox_class;
mod lox_function;
mod lox_instance;
mod lox_native;
mod native_functions;
mod object;
mod parser;
mod resolver;
mod scanner;
mod token;
mod token_type;

use std::io::{self, Write};
use std::{env, fs, process};

use errors::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use stmt::Stmt;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: rslox [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Unable to read '{path}': {e}");
        process::exit(64);
    });

    let mut interpreter = Interpreter::new();
    match run(&mut interpreter, &source, false) {
        RunOutcome::Ok => process::exit(0),
        RunOutcome::CompileError => process::exit(65),
        RunOutcome::RuntimeError => process::exit(70),
    }
}

fn run_prompt() {
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new();

    loop {
        print!("> ");
        io::stdout().flush().expect("unable to flush stdout");

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).expect("unable to read stdin");
        if bytes_read == 0 {
            break;
        }

        run(&mut interpreter, &line, true);
    }
}

enum RunOutcome {
    Ok,
    CompileError,
    RuntimeError,
}

fn run(interpreter: &mut Interpreter, source: &str, repl: bool) -> RunOutcome {
    let diagnostics = Diagnostics::new();
    let tokens = Scanner::new(source, &diagnostics).scan_tokens();
    let mut parser = Parser::new(tokens, &diagnostics);
    let statements = parser.parse();

    if diagnostics.had_error() {
        return RunOutcome::CompileError;
    }

    let locals = Resolver::new(&diagnostics).resolve(&statements);
    if diagnostics.had_error() {
        return RunOutcome::CompileError;
    }
    interpreter.resolve(locals);

    // The REPL prints the value of a bare expression statement in addition
    // to whatever it prints itself.
    if repl {
        if let [Stmt::Expression { expression }] = statements.as_slice() {
            return match interpreter.evaluate_for_repl(expression) {
                Ok(value) => {
                    println!("{value}");
                    RunOutcome::Ok
                }
                Err(e) => {
                    eprintln!("{e}");
                    RunOutcome::RuntimeError
                }
            };
        }
    }

    match interpreter.interpret(&statements) {
        Ok(()) => RunOutcome::Ok,
        Err(e) => {
            eprintln!("{e}");
            RunOutcome::RuntimeError
        }
    }
}
