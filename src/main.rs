#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_arena::{
    config::DEFAULT_BIND, init_logging, local::play_ai_match, BotClient, BotOutcome, GameMode,
    Server, ServerConfig, TcpTransport,
};

#[cfg(feature = "std")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::net::SocketAddr;
#[cfg(feature = "std")]
use std::time::Duration;
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum Mode {
    Pvp,
    Pve,
}

#[cfg(feature = "std")]
impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Pvp => GameMode::Pvp,
            Mode::Pve => GameMode::Pve,
        }
    }
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the match server.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,
        #[arg(long, default_value_t = 600, help = "Seconds a player may hold the turn")]
        turn_timeout: u64,
        #[arg(long, default_value_t = 500, help = "Milliseconds the AI waits before firing")]
        ai_delay: u64,
        #[arg(long, help = "Fix the AI's RNG seed (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect a bot that plays one match.
    Bot {
        #[arg(long, default_value = DEFAULT_BIND)]
        connect: String,
        #[arg(long, default_value = "bot")]
        name: String,
        #[arg(long, value_enum, default_value_t = Mode::Pve)]
        mode: Mode,
        #[arg(long, help = "Fix RNG seed for reproducible play (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play an AI vs AI match in process.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn seeded(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LevelFilter::Info);
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            turn_timeout,
            ai_delay,
            seed,
        } => {
            let config = ServerConfig {
                bind,
                turn_timeout: Duration::from_secs(turn_timeout),
                ai_move_delay: Duration::from_millis(ai_delay),
                ..ServerConfig::default()
            };
            let listener = TcpListener::bind(config.bind).await?;
            Server::with_seed(config, seed).serve(listener).await?;
        }
        Commands::Bot {
            connect,
            name,
            mode,
            seed,
        } => {
            let transport = TcpTransport::connect(&connect).await?;
            let mut bot = BotClient::new(transport, name, mode.into(), seeded(seed));
            match bot.run().await? {
                BotOutcome::Finished(summary) => println!(
                    "{} (winner: {}, reason: {}, shots: {}, hits: {})",
                    if summary.won { "Victory" } else { "Defeat" },
                    summary.winner,
                    summary.reason,
                    summary.shots,
                    summary.hits
                ),
                BotOutcome::Cancelled(reason) => println!("Game cancelled: {}", reason),
            }
        }
        Commands::Local { seed } => {
            let mut first = seeded(seed);
            let mut second = seeded(seed.map(|s| s.wrapping_add(1)));
            let result = play_ai_match(&mut first, &mut second)?;
            println!(
                "Player {} wins ({} shots vs {})",
                result.winner + 1,
                result.shots[result.winner],
                result.shots[1 - result.winner]
            );
        }
    }
    Ok(())
}
