use notescript_lib::cli::{CliArgs, USAGE};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let args = match CliArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }

    notescript_lib::init_logging(args.verbose);

    if let Err(e) = notescript_lib::run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
