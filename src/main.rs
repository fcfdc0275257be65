use clap::{Parser, Subcommand};
use tracing::debug;

use jsonstore::todos::TodoList;
use jsonstore::{Config, StoreClient};

#[derive(Parser, Debug)]
#[clap(
    name = "todos",
    version = env!("CARGO_PKG_VERSION"),
    about = "todos - simple todo tool backed by a JSON store (set JSONSTORE_TOKEN)"
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all active todos
    Ls,
    /// Add a new todo
    Add {
        /// Todo title
        #[clap(value_name = "TITLE")]
        title: String,
    },
    /// Mark a todo as completed
    Complete {
        #[clap(value_name = "ID")]
        id: u64,
    },
    /// Delete a todo
    Delete {
        #[clap(value_name = "ID")]
        id: u64,
    },
}

async fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = StoreClient::with_config(config.client_config())?;
    debug!("Using store client {:?}", client);

    let mut todos = TodoList::open(client).await?;

    match command {
        Command::Ls => {
            for todo in todos.list().await? {
                println!("{}", todo);
            }
        }
        Command::Add { title } => {
            let todo = todos.add(&title).await?;
            println!("Todo: '{}' added", todo.title);
        }
        Command::Complete { id } => match todos.complete(id).await? {
            Some(todo) if !todo.title.is_empty() => println!("'{}' set to done", todo.title),
            _ => println!("Todo with id {} set to done", id),
        },
        Command::Delete { id } => {
            todos.remove(id).await?;
            println!("Todo deleted");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli.command.unwrap_or(Command::Ls)).await
}
