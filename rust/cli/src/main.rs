use std::io;

fn main() {
    let mut out = io::stdout();
    let mut err = io::stderr();
    let code = fairdeal_cli::run(std::env::args(), &mut out, &mut err);
    std::process::exit(code);
}
