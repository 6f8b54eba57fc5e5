use clap::Parser;

use objfs_cli::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match objfs_cli::execute(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
