use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, ApiClient, BookingSource, ClassSource, ClientError, ContactSource, FileStore,
    PageSource, RemoteCollection, UserSource,
};
use serde::Serialize;
use shared::{
    domain::{BookingStatus, ClassId, ContactId, ContactStatus, Role, UserId},
    protocol::{ClassInput, RevenueQuery},
};
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;
mod search;

use render::Row;

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Studio admin dashboard from the terminal")]
struct Cli {
    /// Overrides the configured studio API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print listings as JSON together with their pagination info.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session token for later commands.
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signout,
    Whoami,
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Bookings(BookingsCommand),
    #[command(subcommand)]
    Contacts(ContactsCommand),
    #[command(subcommand)]
    Classes(ClassesCommand),
    /// Dashboard counters and the latest bookings.
    Stats,
    /// Successful payments in a date range (defaults to the last month).
    Revenue {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print the server's CSV export instead of a summary.
        #[arg(long)]
        csv: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct PageArgs {
    /// Page to show; out-of-range pages land on the nearest valid one.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    /// Items per page; defaults to the configured page size.
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        role: Option<Role>,
    },
    SetRole {
        id: u64,
        role: Role,
    },
}

#[derive(Subcommand, Debug)]
enum BookingsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        status: Option<BookingStatus>,
    },
}

#[derive(Subcommand, Debug)]
enum ContactsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        status: Option<ContactStatus>,
    },
    Mark {
        id: u64,
        status: ContactStatus,
    },
}

#[derive(Subcommand, Debug)]
enum ClassesCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Matches name, teacher, day or level.
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Reads search text line by line from stdin and shows matching classes
    /// once typing pauses.
    Search {
        #[arg(long)]
        limit: Option<u64>,
    },
    Create(ClassArgs),
    Update {
        id: u64,
        #[command(flatten)]
        class: ClassArgs,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct ClassArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    teacher: String,
    /// Weekday, e.g. `Monday`.
    #[arg(long)]
    day: String,
    /// Start time, e.g. `08:00 AM`.
    #[arg(long)]
    time: String,
    /// Minutes.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    duration: u32,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    capacity: u32,
    #[arg(long)]
    level: String,
}

impl From<ClassArgs> for ClassInput {
    fn from(args: ClassArgs) -> Self {
        ClassInput {
            name: args.name,
            description: args.description,
            teacher: args.teacher,
            day: args.day,
            time: args.time,
            duration: args.duration,
            capacity: args.capacity,
            level: args.level,
        }
    }
}

struct Output {
    json: bool,
    page_size: u64,
}

impl Output {
    async fn show<S>(&self, source: S, filter: S::Filter, args: &PageArgs) -> Result<()>
    where
        S: PageSource,
        S::Item: Row + Serialize,
    {
        let limit = args.limit.unwrap_or(self.page_size);
        let mut collection = RemoteCollection::new(source, limit)?.with_filter(filter);
        collection
            .open_at(args.page)
            .await
            .context("failed to load listing")?;

        self.print(&collection)
    }

    fn print<S>(&self, collection: &RemoteCollection<S>) -> Result<()>
    where
        S: PageSource,
        S::Item: Row + Serialize,
    {
        let info = collection.page_info();
        if self.json {
            println!("{}", render::json_page(collection.items(), &info)?);
        } else {
            print!("{}", render::table(collection.items(), &info));
        }
        Ok(())
    }
}

fn require_session(api: &ApiClient) -> Result<()> {
    if api.is_signed_in() {
        Ok(())
    } else {
        Err(ClientError::NotSignedIn.into())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }

    let session_path = settings.session_path();
    let store = FileStore::open(&session_path)
        .with_context(|| format!("failed to open session file {}", session_path.display()))?;
    let api = ApiClient::from_settings(&settings, Arc::new(store))
        .with_context(|| format!("invalid api url '{}'", settings.api_base_url))?;
    debug!(api_url = api.base_url(), session = %session_path.display(), "admin client ready");
    let output = Output {
        json: cli.json,
        page_size: settings.page_size,
    };

    match cli.command {
        Command::Signin { email, password } => {
            let user = api
                .sign_in(&email, &password)
                .await
                .context("sign in failed")?;
            println!("signed in as {} ({})", user.email, user.role);
        }
        Command::Signout => {
            api.sign_out().context("failed to clear session")?;
            println!("signed out");
        }
        Command::Whoami => match api.current_user() {
            Some(user) if output.json => println!("{}", serde_json::to_string_pretty(&user)?),
            Some(user) => println!("{} <{}> role={}", user.name, user.email, user.role),
            None => println!("not signed in"),
        },
        Command::Users(UsersCommand::List { page, role }) => {
            require_session(&api)?;
            output.show(UserSource::new(api), role, &page).await?;
        }
        Command::Users(UsersCommand::SetRole { id, role }) => {
            require_session(&api)?;
            api.update_user_role(UserId(id), role)
                .await
                .with_context(|| format!("failed to change role of user {id}"))?;
            println!("user {id} is now {role}");
        }
        Command::Bookings(BookingsCommand::List { page, status }) => {
            require_session(&api)?;
            output.show(BookingSource::new(api), status, &page).await?;
        }
        Command::Contacts(ContactsCommand::List { page, status }) => {
            require_session(&api)?;
            output.show(ContactSource::new(api), status, &page).await?;
        }
        Command::Contacts(ContactsCommand::Mark { id, status }) => {
            require_session(&api)?;
            api.update_contact_status(ContactId(id), status)
                .await
                .with_context(|| format!("failed to update contact message {id}"))?;
            println!("message {id} marked {status}");
        }
        Command::Classes(ClassesCommand::List { page, search }) => {
            output.show(ClassSource::new(api), search, &page).await?;
        }
        Command::Classes(ClassesCommand::Search { limit }) => {
            let limit = limit.unwrap_or(settings.page_size);
            let mut collection = RemoteCollection::new(ClassSource::new(api), limit)?;
            collection.refresh().await.context("failed to load classes")?;
            output.print(&collection)?;
            let stdin = BufReader::new(tokio::io::stdin());
            let json = output.json;
            search::run_search(stdin, &mut collection, settings.search_debounce(), |c| {
                let shown = if json {
                    render::json_page(c.items(), &c.page_info()).map(|raw| raw + "\n")
                } else {
                    Ok(render::table(c.items(), &c.page_info()))
                };
                match shown {
                    Ok(text) => print!("{text}"),
                    Err(error) => eprintln!("failed to render results: {error}"),
                }
            })
            .await?;
        }
        Command::Classes(ClassesCommand::Create(class)) => {
            require_session(&api)?;
            let created = api
                .create_class(&class.into())
                .await
                .context("failed to create class")?;
            println!("created class {} ({})", created.id, created.name);
        }
        Command::Classes(ClassesCommand::Update { id, class }) => {
            require_session(&api)?;
            let updated = api
                .update_class(ClassId(id), &class.into())
                .await
                .with_context(|| format!("failed to update class {id}"))?;
            println!("updated class {} ({})", updated.id, updated.name);
        }
        Command::Classes(ClassesCommand::Delete { id }) => {
            require_session(&api)?;
            api.delete_class(ClassId(id))
                .await
                .with_context(|| format!("failed to delete class {id}"))?;
            println!("deleted class {id}");
        }
        Command::Stats => {
            require_session(&api)?;
            let stats = api.dashboard_stats().await.context("failed to load stats")?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render::stats(&stats));
            }
        }
        Command::Revenue { from, to, csv } => {
            require_session(&api)?;
            let query = RevenueQuery { from, to };
            if csv {
                let csv = api
                    .revenue_csv(&query)
                    .await
                    .context("failed to export revenue")?;
                print!("{csv}");
            } else {
                let report = api
                    .revenue_report(&query)
                    .await
                    .context("failed to load revenue report")?;
                if output.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", render::revenue(&report));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
