use clap::Parser;
use triage::cli::{
    handle_config_init, handle_rules_list, handle_run, Cli, Commands, ConfigCommands,
    RulesCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => match handle_run(&args) {
            Ok(status) => {
                std::process::exit(status.code());
            }
            Err(e) => Err(e),
        },
        Commands::Rules(cmd) => match cmd {
            RulesCommands::List(args) => match handle_rules_list(&args) {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
