// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use makerrepo_sdk::{
    account::or_not_available, config::Environment, staff_dashboard::SpaceRoster, Client,
    FileStore, Navigation, Route, TapOutcome,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod reader;

use reader::LineNfcReader;

/// The front desk kiosk of a MakerRepo makerspace.
///
/// Staff log in once; the session is kept in the data directory. Afterwards
/// the kiosk shows who is in the space, signs people in and out by hand, or
/// reads RFID card serials from the standard input, one per line, and signs
/// the card owners in and out of the space.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// The deployment to talk to, `development` or `production`. Defaults to
    /// the one matching the build.
    #[arg(long, global = true)]
    env: Option<Environment>,

    /// Talk to this server instead of the one of the deployment.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Where to keep the session.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long, global = true, action)]
    verbose: bool,

    /// The sub-command to run.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and keep the session.
    Login {
        /// The username or email address.
        username_email: String,
        /// The password. Asked for interactively when left out.
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and forget the session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Show who is in the current space.
    Roster,
    /// Switch to another space.
    ChangeSpace {
        /// The identifier of the space, see `roster`.
        space_id: u64,
    },
    /// Sign people into the space by hand.
    SignIn {
        /// The usernames.
        #[arg(required = true)]
        usernames: Vec<String>,
    },
    /// Sign people out of the space by hand.
    SignOut {
        /// The usernames.
        #[arg(required = true)]
        usernames: Vec<String>,
    },
    /// Show the opening hours of the spaces.
    Hours,
    /// Show the staff shifts of a space.
    Shifts {
        /// The space whose schedule to show.
        #[arg(long)]
        space: u64,
        /// Only show the shifts of the logged in user.
        #[arg(long)]
        mine: bool,
    },
    /// Read card serials from the standard input and sign their owners in
    /// and out.
    Scan {
        /// The space to sign people in and out of.
        #[arg(long)]
        space: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = build_client(&cli).await?;

    match cli.command {
        Command::Login { username_email, password } => {
            login(&client, &username_email, password).await
        }
        Command::Hours => hours(&client).await,
        Command::Logout => {
            require_session(&client, Route::Home).await?;
            client.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => whoami(&client).await,
        Command::Roster => {
            require_session(&client, Route::Home).await?;
            print_roster(&client.staff_dashboard().roster().await?);
            Ok(())
        }
        Command::ChangeSpace { space_id } => {
            require_session(&client, Route::Home).await?;
            print_roster(&client.staff_dashboard().change_space(space_id).await?);
            Ok(())
        }
        Command::SignIn { usernames } => {
            require_session(&client, Route::Home).await?;
            let dashboard = client.staff_dashboard();

            let mut roster = None;
            for username in &usernames {
                roster = Some(dashboard.sign_in_user(username).await?);
            }
            if let Some(roster) = roster {
                print_roster(&roster);
            }
            Ok(())
        }
        Command::SignOut { usernames } => {
            require_session(&client, Route::Home).await?;
            let usernames: Vec<&str> = usernames.iter().map(String::as_str).collect();
            print_roster(&client.staff_dashboard().sign_out_users(&usernames).await?);
            Ok(())
        }
        Command::Shifts { space, mine } => shifts(&client, space, mine).await,
        Command::Scan { space } => scan(&client, space).await,
    }
}

async fn build_client(cli: &Cli) -> Result<Client> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .context("no data directory found, pass --data-dir")?
            .join("makerrepo/kiosk"),
    };
    debug!(data_dir = %data_dir.display(), "Using the data directory");

    let mut builder = Client::builder()
        .environment(cli.env.unwrap_or_else(Environment::current))
        .session_store(FileStore::open(&data_dir).await?)
        .user_agent(concat!("makerrepo-kiosk/", env!("CARGO_PKG_VERSION")));

    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url);
    }

    Ok(builder.build()?)
}

/// Validate the stored session and make sure `route` may be shown.
async fn require_session(client: &Client, route: Route) -> Result<()> {
    client.bootstrap().await?;

    match client.route_guard().resolve(route).await? {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(_) => bail!("Not logged in, run `makerrepo-kiosk login` first"),
    }
}

async fn login(client: &Client, username_email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    match client.login(username_email, &password).await {
        Ok(user) => {
            println!("Logged in as {} ({})", user.name, user.role);
            Ok(())
        }
        Err(error) if error.is_invalid_credentials() => bail!("Invalid username or password."),
        Err(error) => Err(error.into()),
    }
}

async fn whoami(client: &Client) -> Result<()> {
    require_session(client, Route::Home).await?;

    let user = client.user().context("the session has no profile")?;
    println!("{} <{}>", user.name, user.email);
    println!("username: {}", user.username);
    println!("role:     {}", user.role);

    if let Some(view) = client.route_guard().home_view() {
        println!("home:     {view:?}");
    }

    Ok(())
}

async fn hours(client: &Client) -> Result<()> {
    for space in client.account().space_hours().await? {
        println!("{}", or_not_available(space.name.as_deref()));
        println!("  email:    {}", or_not_available(space.email.as_deref()));
        println!("  address:  {}", or_not_available(space.address.as_deref()));
        println!("  phone:    {}", or_not_available(space.phone_number.as_deref()));
        println!("  students: {}", or_not_available(space.opening_hour.students.as_deref()));
        println!("  public:   {}", or_not_available(space.opening_hour.public.as_deref()));
        println!("  summer:   {}", or_not_available(space.opening_hour.summer.as_deref()));
    }

    Ok(())
}

async fn shifts(client: &Client, space_id: u64, mine: bool) -> Result<()> {
    require_session(client, Route::Home).await?;

    let user_id = if mine {
        Some(client.user().context("the session has no profile")?.id)
    } else {
        None
    };

    for shift in client.shifts().list(space_id, user_id).await? {
        let draft = if shift.draft { " (draft)" } else { "" };
        println!("{} to {}  {}{draft}", shift.start, shift.end, shift.title);
    }

    Ok(())
}

async fn scan(client: &Client, space_id: u64) -> Result<()> {
    require_session(client, Route::Home).await?;

    let handler = client.rfid(space_id);
    let reader = LineNfcReader::stdin();
    let mut taps = handler.process_taps(&reader)?;

    println!("Tap a card, or press Ctrl-D to stop");
    while let Some((serial, outcome)) = taps.next().await {
        println!("{}", describe_tap(&serial, &outcome));
    }

    Ok(())
}

fn describe_tap(serial: &str, outcome: &TapOutcome) -> String {
    match outcome {
        TapOutcome::Processed(status) => {
            format!("[{:?}] {} {}", status.severity(), status.card_number, status.message())
        }
        TapOutcome::Busy => format!("[Ignored] {serial}: another tap is still being processed"),
        TapOutcome::InvalidCard => format!("[Ignored] {serial:?} is not a card number"),
    }
}

fn print_roster(roster: &SpaceRoster) {
    match &roster.space {
        Some(space) => println!("{} ({} signed in)", space.name, roster.space_users.len()),
        None => println!("No space selected"),
    }

    for user in &roster.space_users {
        let flag = if user.flagged { " [flagged]" } else { "" };
        println!("  {:<20} {}{flag}", user.username, user.name);
    }

    if !roster.space_list.is_empty() {
        println!("Spaces:");
        for space in &roster.space_list {
            println!("  {:>4}  {}", space.id, space.name);
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
