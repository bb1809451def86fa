use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use trello_core::{
    AuthStyle, CardFilter, CardUpdate, MemberInvite, MemberType, NewCard, Position, TrelloId,
};
use trello_transport::{Config, Error, Trello, UreqTransport};

/// Command-line access to Trello boards, lists and cards
#[derive(Parser, Debug)]
#[command(name = "trello", version, about)]
struct Cli {
    /// TOML file with base_url, api_key, token, timeout_secs and auth_style
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API root, e.g. http://127.0.0.1:3000/1 for the mock server
    #[arg(long, env = "TRELLO_BASE_URL")]
    base_url: Option<String>,

    /// Developer API key
    #[arg(long, env = "TRELLO_API_KEY", hide_env_values = true)]
    key: Option<String>,

    /// User token
    #[arg(long, env = "TRELLO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Send credentials in an OAuth Authorization header instead of the query
    #[arg(long)]
    header_auth: bool,

    /// Log each request at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Boards of the token's member
    Boards,
    /// Board name to id
    BoardIds,
    /// One board
    Board { id: TrelloId },
    /// Lists on a board
    Lists { board: TrelloId },
    /// Invite someone to a board by email
    Invite {
        board: TrelloId,
        email: String,
        /// admin, normal or observer
        #[arg(long = "type", default_value = "normal")]
        member_type: MemberType,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Cards on a board, open ones unless --filter is given
    Cards {
        board: TrelloId,
        #[arg(long)]
        filter: Option<CardFilter>,
    },
    /// One card
    Card { id: TrelloId },
    /// Add a card to a list
    CreateCard {
        list: TrelloId,
        name: String,
        #[arg(long)]
        desc: Option<String>,
        /// Place the card at the top of the list
        #[arg(long)]
        top: bool,
    },
    /// Move a card to another list
    MoveCard { id: TrelloId, list: TrelloId },
    ArchiveCard { id: TrelloId },
    DeleteCard { id: TrelloId },
    /// Checklists on a card
    Checklists { card: TrelloId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, Error> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(key) = &cli.key {
        config.api_key = key.clone();
    }
    if let Some(token) = &cli.token {
        config.token = token.clone();
    }
    if cli.header_auth {
        config.auth_style = AuthStyle::Header;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = load_config(&cli)?;
    let trello = Trello::new(config.client(), UreqTransport::new(config.timeout()));

    match cli.command {
        Command::Boards => print(&trello.boards()?),
        Command::BoardIds => print(&trello.board_ids()?),
        Command::Board { id } => print(&trello.board(&id)?),
        Command::Lists { board } => print(&trello.lists(&board)?),
        Command::Invite {
            board,
            email,
            member_type,
            full_name,
        } => {
            let invite = MemberInvite {
                member_type,
                full_name,
                ..MemberInvite::new(email)
            };
            print(&trello.invite_member(&board, &invite)?)
        }
        Command::Cards { board, filter } => print(&trello.cards(&board, filter)?),
        Command::Card { id } => print(&trello.card(&id)?),
        Command::CreateCard {
            list,
            name,
            desc,
            top,
        } => {
            let input = NewCard {
                desc,
                pos: top.then_some(Position::Top),
                ..NewCard::new(list, name)
            };
            print(&trello.create_card(&input)?)
        }
        Command::MoveCard { id, list } => {
            let update = CardUpdate {
                id_list: Some(list),
                ..CardUpdate::default()
            };
            print(&trello.update_card(&id, &update)?)
        }
        Command::ArchiveCard { id } => print(&trello.archive_card(&id)?),
        Command::DeleteCard { id } => {
            trello.delete_card(&id)?;
            println!("deleted {id}");
            Ok(())
        }
        Command::Checklists { card } => print(&trello.card_checklists(&card)?),
    }
}

fn print<T: Serialize>(value: &T) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Api(trello_core::ApiError::Serialization(e.to_string())))?;
    println!("{json}");
    Ok(())
}
