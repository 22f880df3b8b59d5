use std::env;
use std::io;
use std::io::Write;
use std::process;

use mcfg_chart::Grammar;

fn usage(prog_name: &str) -> String {
  format!(
    r"
Usage: {} FILE [options]

Options:
  -h, --help        Print this message
  -c, --chart       Print the parse chart (defaults to not printing)
  -r, --recognize   Only report recognition, don't build parse trees",
    prog_name
  )
}

fn parse(g: &Grammar, sentence: &str, print_chart: bool, recognize_only: bool) {
  let tokens = sentence.split_whitespace().collect::<Vec<_>>();

  if print_chart {
    println!("chart:\n{}\n", g.chart(&tokens));
  }

  if recognize_only {
    println!("recognized: {}", g.recognize(&tokens));
    return;
  }

  let trees = g.parse(&tokens);
  println!("parsed {} tree{}", trees.len(), if trees.len() == 1 { "" } else { "s" });
  for tree in &trees {
    println!("{tree}");
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let opts: Vec<String> = env::args().collect();
  let prog_name = opts[0].clone();

  if opts.len() < 2 {
    println!("{}", usage(&prog_name));
    process::exit(1);
  }

  let mut opts = opts.into_iter().skip(1);
  let filename = opts.next().unwrap();

  let mut print_chart = false;
  let mut recognize_only = false;
  for o in opts {
    if o == "-h" || o == "--help" {
      println!("{}", usage(&prog_name));
      process::exit(0);
    } else if o == "-c" || o == "--chart" {
      print_chart = true;
    } else if o == "-r" || o == "--recognize" {
      recognize_only = true;
    }
  }

  let grammar = match Grammar::read_from_file(&filename) {
    Ok(g) => g,
    Err(e) => {
      eprintln!("could not load grammar: {e}");
      process::exit(1);
    }
  };

  let mut input = String::new();
  loop {
    print!("> ");
    if io::stdout().flush().is_err() {
      return;
    }

    match io::stdin().read_line(&mut input) {
      Ok(0) => return, // ctrl+d
      Ok(_) => {
        parse(&grammar, input.trim(), print_chart, recognize_only);
        input.clear();
      }
      Err(error) => {
        eprintln!("error reading input: {error}");
        return;
      }
    }
  }
}
