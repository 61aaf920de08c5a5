//! services/client/src/bin/studysmarter.rs

use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{FileStore, HttpApiAdapter},
    config::Config,
    error::ClientError,
    prefs::Theme,
    views::{
        auth::{self, LoginForm, SignupForm},
        dashboard, profile,
        room_detail::RoomDetail,
        rooms::{self, CreateRoomForm},
        AppState, DetailState, RoomDetailController, Tab,
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use studysmarter_core::dashboard::events_on;
use studysmarter_core::domain::Status;
use studysmarter_core::synthesis::RoomOrigin;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "studysmarter", about = "StudySmarter study rooms from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the stored session.
    Whoami,
    /// Schedule, tasks, community and featured rooms.
    Dashboard,
    /// Show or change the theme (light, dark or toggle).
    Theme { value: Option<String> },
    /// Show or update profile details.
    Profile {
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    #[command(subcommand)]
    Rooms(RoomsCommand),
}

#[derive(Subcommand)]
enum RoomsCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    Show {
        id: String,
        #[arg(long)]
        materials: bool,
    },
    Create(CreateArgs),
    Join { id: String },
    Leave { id: String },
    /// Post a chat message (kept for this run only).
    Chat { id: String, message: String },
    Status {
        id: String,
        participant: String,
        status: Status,
    },
    Avatar {
        id: String,
        participant: String,
        file: PathBuf,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    capacity: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    date: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    mode: String,
    #[arg(long)]
    creator_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api_url = %config.api_url, "Configuration loaded.");

    // --- 2. Initialize Adapters ---
    let store = Arc::new(FileStore::open(&config.store_path)?);
    let api = Arc::new(HttpApiAdapter::from_config(&config)?);
    let state = AppState::new(api, store, config.clone());

    // --- 3. Dispatch ---
    match cli.command {
        Command::Login { email, password } => {
            let outcome = auth::login(&state, &LoginForm { email, password }).await?;
            println!(
                "Logged in as {}. Next: {}",
                outcome.session.username.as_deref().unwrap_or("(unknown)"),
                outcome.next
            );
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let form = SignupForm {
                username,
                email,
                password,
            };
            let outcome = auth::signup(&state, &form).await?;
            println!("Welcome, {}! Next: {}", form.username, outcome.next);
        }
        Command::Logout => {
            let next = auth::logout(&state).await?;
            println!("Logged out. Next: {}", next);
        }
        Command::Whoami => {
            let session = auth::require_session(&state)?;
            println!("user id:  {}", session.user_id.as_deref().unwrap_or("-"));
            println!("username: {}", session.username.as_deref().unwrap_or("-"));
            println!("email:    {}", session.email.as_deref().unwrap_or("-"));
        }
        Command::Dashboard => print_dashboard(&state)?,
        Command::Theme { value } => {
            let theme = match value.as_deref() {
                None => state.prefs.theme()?,
                Some("toggle") => profile::toggle_theme(&state)?,
                Some(raw) => {
                    let theme: Theme = raw.parse().map_err(ClientError::Internal)?;
                    profile::set_theme(&state, theme)?
                }
            };
            println!("Theme: {}", theme);
        }
        Command::Profile {
            gender,
            region,
            phone,
        } => {
            let details = if gender.is_some() || region.is_some() || phone.is_some() {
                profile::update_profile(&state, gender.as_deref(), region.as_deref(), phone.as_deref())?
            } else {
                profile::load_profile(&state)?
            };
            let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
            println!("username: {}", show(&details.username));
            println!("email:    {}", show(&details.email));
            println!("gender:   {}", show(&details.gender));
            println!("region:   {}", show(&details.region));
            println!("phone:    {}", show(&details.phone));
        }
        Command::Rooms(command) => run_rooms(&state, command).await?,
    }

    Ok(())
}

async fn run_rooms(state: &AppState, command: RoomsCommand) -> Result<(), ClientError> {
    match command {
        RoomsCommand::List { search } => {
            let listings = rooms::list_rooms(state).await?;
            let matches = rooms::search(&listings, &search);
            if matches.is_empty() {
                println!("No study rooms found.");
            }
            let tags = rooms::all_tags(&listings);
            if !tags.is_empty() {
                println!("Tags: {}", tags.join(", "));
            }
            for l in matches {
                let s = &l.summary;
                println!(
                    "[{}] {} ({}/{}) {} {} @ {}{}",
                    s.room_id,
                    s.name,
                    s.participants,
                    s.capacity,
                    s.date,
                    s.time,
                    s.location,
                    if l.joined { "  (joined)" } else { "" }
                );
            }
        }
        RoomsCommand::Show { id, materials } => {
            let mut controller = open_room(state, &id).await?;
            if materials {
                controller.select_tab(Tab::Materials)?;
            }
            print_room(&controller)?;
        }
        RoomsCommand::Create(args) => {
            let form = CreateRoomForm {
                name: args.name,
                capacity: args.capacity,
                description: args.description,
                date: args.date,
                location: args.location,
                mode: args.mode,
                creator_id: args.creator_id,
            };
            let created = rooms::create_room(state, &form).await?;
            println!("Study room created successfully! Next: {}", created.next);
        }
        RoomsCommand::Join { id } => {
            let mut controller = open_room(state, &id).await?;
            controller.join()?;
            print_banner(&controller);
        }
        RoomsCommand::Leave { id } => {
            let mut controller = open_room(state, &id).await?;
            controller.leave()?;
            print_banner(&controller);
        }
        RoomsCommand::Chat { id, message } => {
            let mut controller = open_room(state, &id).await?;
            let sent = controller.send_message(&message)?;
            println!("[{}] {}: {}", sent.timestamp, sent.user_name, sent.content);
        }
        RoomsCommand::Status {
            id,
            participant,
            status,
        } => {
            let mut controller = open_room(state, &id).await?;
            controller.set_status(&participant, status)?;
            println!("{} is now {}", participant, status);
        }
        RoomsCommand::Avatar {
            id,
            participant,
            file,
        } => {
            let mut controller = open_room(state, &id).await?;
            controller.upload_avatar(&participant, &file).await?;
            println!("Avatar updated for {}", participant);
        }
    }
    Ok(())
}

/// Loads a room, abandoning the request on Ctrl-C.
async fn open_room(state: &AppState, id: &str) -> Result<RoomDetailController, ClientError> {
    let mut controller = RoomDetailController::new(state.clone(), id);
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    if !controller.load_until(&cancel).await? {
        return Err(ClientError::NotReady("cancelled".to_string()));
    }
    match controller.state() {
        DetailState::Error(message) => Err(ClientError::LoadFailed(message.clone())),
        _ => Ok(controller),
    }
}

fn print_banner(controller: &RoomDetailController) {
    if let Some(banner) = controller.banner() {
        println!("{}", banner.message());
    }
}

fn print_room(controller: &RoomDetailController) -> Result<(), ClientError> {
    let Some(RoomDetail {
        room,
        origin,
        is_joined,
        active_tab,
        ..
    }) = controller.detail()
    else {
        return Err(ClientError::NotReady("room is not loaded".to_string()));
    };

    println!("{} [{}]", room.name, room.tags.join(", "));
    if *origin == RoomOrigin::Fallback {
        println!("(offline copy: the live room could not be fetched)");
    }
    println!("{}", room.description);
    println!("Date:     {}", room.date);
    println!("Time:     {} ({})", room.time, room.duration);
    println!("Capacity: {}/{} participants", room.participants.len(), room.capacity);
    println!("Location: {}", room.location);
    println!("Mode:     {}", room.mode);
    println!();
    println!("Participants:");
    for p in &room.participants {
        println!("  - {} ({}, {}) [{}]", p.name, p.role, p.status, p.id);
    }
    println!();
    match active_tab {
        Tab::Chat => {
            println!("Chat:");
            for m in &room.messages {
                println!("  [{}] {}: {}", m.timestamp, m.user_name, m.content);
            }
            if !is_joined {
                println!("  Join the room to participate in the chat");
            }
        }
        Tab::Materials => {
            println!("Study Materials:");
            for m in &room.materials {
                println!(
                    "  - {} ({}, {}) uploaded by {} {}",
                    m.name, m.kind, m.size, m.uploaded_by, m.uploaded_at
                );
            }
        }
    }
    Ok(())
}

fn print_dashboard(state: &AppState) -> Result<(), ClientError> {
    let view = dashboard::load(state)?;
    println!("Welcome back, {}!", view.username);
    println!();
    println!("This week:");
    for (offset, day) in view.week.iter().enumerate() {
        let marker = if day.is_today { "*" } else { " " };
        let titles: Vec<&str> = events_on(&view.events, offset as u32)
            .into_iter()
            .map(|e| e.title)
            .collect();
        println!("{} {} {:>2}  {}", marker, day.day_name, day.day_of_month, titles.join(", "));
    }
    println!();
    println!("Today's tasks ({} left):", view.todos.remaining());
    for task in view.todos.tasks() {
        println!("  [{}] {}", if task.completed { "x" } else { " " }, task.text);
    }
    println!();
    println!("Community discussions:");
    for d in &view.discussions {
        println!("  {} by {} ({} replies, {})", d.title, d.author, d.replies, d.time);
    }
    println!();
    println!("Join a study room:");
    for r in &view.featured_rooms {
        println!(
            "  {} - {} {}/{} {} @ {}{}",
            r.name,
            r.subject,
            r.participants,
            r.max_participants,
            r.schedule,
            r.venue,
            if r.is_full() { " (full)" } else { "" }
        );
    }
    Ok(())
}
