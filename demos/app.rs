use commander::prelude::*;
use commander::{Cli, Context, Target};

fn main() {
    let log = Target::default();
    let embed = Target::default();
    let dir = Target::default();
    let mut cli = Cli::new("app", "your awesome cli");
    cli.flag("log", "log level")
        .short('L')
        .string(&log)
        .default("info");
    cli.flag("embed", "embed the code")
        .bool(&embed)
        .default(false);

    let command = cli.command("new", "create a new project");
    command.arg("dir", "where to create it").string(&dir);
    let (log_in, embed_in, dir_in) = (log.clone(), embed.clone(), dir.clone());
    command.run(move |_| {
        println!(
            "new project in {} (log: {}, embed: {})",
            dir_in.get(),
            log_in.get(),
            embed_in.get()
        );
        Ok(())
    });

    if let Err(error) = cli.parse_args(&Context::background()) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
