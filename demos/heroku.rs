use commander::prelude::*;
use commander::{Cli, Context, Error, Target};

fn main() {
    let app = Target::default();
    let remote = Target::default();
    let scale = Target::default();
    let mut cli = Cli::new("heroku", "CLI to interact with Heroku").version("8.1.9");
    cli.flag("app", "app to run command against")
        .short('a')
        .env("HEROKU_APP")
        .string(&app);
    cli.flag("remote", "git remote of app to use")
        .short('r')
        .optional()
        .string(&remote);

    let ps = cli.command("ps", "list dynos for an app");
    let app_in = app.clone();
    ps.run(move |_| {
        println!("dynos for {}", app_in.get());
        Ok(())
    });

    let command = ps.command("scale", "scale dyno quantity up or down");
    command
        .args("scale", "type=amount pairs")
        .optional()
        .strings(&scale);
    let (app_in, scale_in) = (app.clone(), scale.clone());
    command.run(move |context| {
        context.check()?;

        if scale_in.borrow().is_empty() {
            return Err(Error::Usage);
        }

        println!("scaling {} to {:?}", app_in.get(), scale_in.get());
        Ok(())
    });

    cli.command("login", "login with your Heroku credentials")
        .advanced()
        .run(|_| Ok(()));

    if let Err(error) = cli.parse_args(&Context::background()) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
