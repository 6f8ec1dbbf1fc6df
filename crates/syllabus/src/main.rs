/// CLI module - command-line interface for syllabus
mod cli;

fn main() {
    cli::run_cli();
}
