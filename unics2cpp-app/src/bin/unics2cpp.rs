use clap::Parser;
use unics2cpp_app::cli::Cli;

fn main() {
    let cli = Cli::parse();
    let code = match unics2cpp_app::launch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("unics2cpp: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
