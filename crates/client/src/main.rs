//! Baduk console client
//!
//! - `BADUK_ROOM_ID` set: join that chat room and relay stdin lines
//! - `BADUK_GAME_ID` set: join that game room and read commands from stdin
//! - neither: watch the lobby
//!
//! `BADUK_USERNAME` picks the participant name (default `guest`).

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use baduk_client::application::ConsoleCommand;
use baduk_client::{
    ChatApi, ChatChannel, ClientConfig, FnSink, GameApi, GameChannel, LobbyChannel, ProposalState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baduk_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    let username = std::env::var("BADUK_USERNAME").unwrap_or_else(|_| "guest".to_string());

    tracing::info!("Starting baduk client as {}", username);

    if let Ok(room_id) = std::env::var("BADUK_ROOM_ID") {
        run_chat(&config, &room_id, &username).await
    } else if let Ok(game_id) = std::env::var("BADUK_GAME_ID") {
        run_game(&config, &game_id, &username).await
    } else {
        run_lobby(&config).await
    }
}

fn printing_sink(label: &'static str) -> Arc<FnSink<impl Fn(Value) + Send + Sync>> {
    Arc::new(FnSink::new(move |event: Value| println!("[{}] {}", label, event)))
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Next non-empty stdin line, or `None` on EOF or Ctrl-C.
async fn next_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(None),
            line = lines.next_line() => match line.context("reading stdin")? {
                Some(line) if line.trim().is_empty() => continue,
                other => return Ok(other),
            },
        }
    }
}

async fn run_lobby(config: &ClientConfig) -> anyhow::Result<()> {
    match ChatApi::new(config).get_rooms().await {
        Ok(rooms) => {
            println!("{} room(s):", rooms.len());
            for room in rooms {
                println!("  {}", room);
            }
        }
        Err(e) => tracing::warn!("Could not list rooms: {}", e),
    }

    let lobby = LobbyChannel::new(config, printing_sink("lobby"));
    lobby.connect().await.context("connecting to the lobby")?;
    println!("Watching the lobby; Ctrl-C to quit.");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    lobby.disconnect();
    Ok(())
}

async fn run_chat(config: &ClientConfig, room_id: &str, username: &str) -> anyhow::Result<()> {
    let chat = ChatChannel::new(config, room_id, username, printing_sink("chat"))?;
    chat.connect().await.context("connecting to the chat room")?;
    println!("In room {} as {}; type to talk, Ctrl-C to quit.", room_id, username);

    let mut lines = stdin_lines();
    while let Some(line) = next_line(&mut lines).await? {
        if let Err(e) = chat.send_message(line.trim()) {
            tracing::error!("Message not sent: {}", e);
            break;
        }
    }

    chat.disconnect();
    Ok(())
}

async fn run_game(config: &ClientConfig, game_id: &str, username: &str) -> anyhow::Result<()> {
    let game = GameChannel::new(config, game_id, username, printing_sink("game"))?;
    let katago = GameApi::new(config);
    game.connect().await.context("connecting to the game room")?;
    println!(
        "In game {} as {}; commands: move x y, start, undo, score, analysis, \
         request|accept|reject <start|undo|score>, hint, estimate, status, leave",
        game_id, username
    );

    let mut lines = stdin_lines();
    while let Some(line) = next_line(&mut lines).await? {
        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let sent = match command {
            ConsoleCommand::Move { x, y } => game.play_move(x, y),
            ConsoleCommand::Start => game.start(),
            ConsoleCommand::Undo => game.undo(),
            ConsoleCommand::Score => game.score(),
            ConsoleCommand::Analysis => game.analysis(),
            ConsoleCommand::Request(kind) => game.request(kind),
            ConsoleCommand::Respond { kind, accepted } => game.respond(kind, accepted),
            ConsoleCommand::Hint => {
                match katago.get_blue_spots(game_id).await {
                    Ok(spot) => println!("KataGo suggests ({}, {})", spot.x, spot.y),
                    Err(e) => tracing::warn!("{}", e),
                }
                Ok(())
            }
            ConsoleCommand::Estimate => {
                match katago.get_score(game_id).await {
                    Ok(score) => println!("Estimate: {}", score.result),
                    Err(e) => tracing::warn!("{}", e),
                }
                Ok(())
            }
            ConsoleCommand::Status => {
                print_status(&game);
                Ok(())
            }
            ConsoleCommand::Leave => break,
            ConsoleCommand::Unknown(text) => {
                println!("Unknown command: {}", text);
                Ok(())
            }
        };

        if let Err(e) = sent {
            println!("{}", e);
        }
    }

    game.disconnect();
    Ok(())
}

fn print_status(game: &GameChannel) {
    println!("Connection: {:?}", game.state());
    let pending = game.pending_proposals();
    if pending.is_empty() {
        println!("No pending proposals");
    }
    for (kind, state) in pending {
        match state {
            ProposalState::Sent => println!("Waiting for the opponent to answer {}", kind.as_str()),
            ProposalState::Received => {
                println!("Opponent proposed {} (accept|reject {})", kind.as_str(), kind.as_str())
            }
            ProposalState::Idle => {}
        }
    }
}
